//! Dense text grid of a worksheet

use calamine::{Data, Range};

/// Cell text of a worksheet addressed from `A1`, whatever the used range
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

/// Text of a cell value
pub fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(dt) => dt.clone(),
        Data::DurationIso(d) => d.clone(),
        Data::Error(e) => format!("ERROR: {e:?}"),
        Data::Empty => String::new(),
    }
}

impl Grid {
    /// Build from a used range, shifting it to its absolute position
    pub fn from_range(range: &Range<Data>) -> Self {
        let (row_offset, col_offset) = range
            .start()
            .map_or((0, 0), |(r, c)| (r as usize, c as usize));

        let mut rows = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![String::new(); col_offset];
            cells.extend(row.iter().map(data_to_string));
            rows.push(cells);
        }
        Self { rows }
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Text of a cell, empty outside the grid
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", String::as_str)
    }

    /// Whether every cell of the row is blank
    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .is_none_or(|cells| cells.iter().all(|c| c.trim().is_empty()))
    }

    #[cfg(test)]
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_access() {
        let grid = Grid::from_rows(&[&["#", "Attribute Name"], &[], &["1", ""]]);
        assert_eq!(grid.cell(0, 1), "Attribute Name");
        assert_eq!(grid.cell(5, 5), "");
        assert!(grid.is_blank_row(1));
        assert!(!grid.is_blank_row(2));
        assert!(grid.is_blank_row(9));
        assert_eq!(grid.height(), 3);
    }

    #[test]
    fn test_data_to_string() {
        assert_eq!(data_to_string(&Data::Float(3.0)), "3");
        assert_eq!(data_to_string(&Data::Int(7)), "7");
        assert_eq!(data_to_string(&Data::Empty), "");
    }
}
