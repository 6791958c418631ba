use dezmap_core::error::{MappingError, Result};

/// Safely cast usize to u16 for spreadsheet column indices.
/// Worksheets have a maximum of 16,384 columns (2^14).
pub(super) fn usize_to_u16_column(value: usize) -> Result<u16> {
    const MAX_EXCEL_COLUMNS: usize = 16_384;

    if value >= MAX_EXCEL_COLUMNS {
        return Err(MappingError::output(format!(
            "Too many columns for a worksheet: {value} (max: {MAX_EXCEL_COLUMNS})"
        )));
    }

    u16::try_from(value)
        .map_err(|_| MappingError::output(format!("Column index {value} cannot fit in u16")))
}

/// Safely cast usize to u32 for spreadsheet row indices.
/// Worksheets have a maximum of 1,048,576 rows (2^20).
pub(super) fn usize_to_u32_row(value: usize) -> Result<u32> {
    const MAX_EXCEL_ROWS: usize = 1_048_576;

    if value >= MAX_EXCEL_ROWS {
        return Err(MappingError::output(format!(
            "Too many rows for a worksheet: {value} (max: {MAX_EXCEL_ROWS})"
        )));
    }

    u32::try_from(value)
        .map_err(|_| MappingError::output(format!("Row index {value} cannot fit in u32")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        assert_eq!(usize_to_u16_column(17).unwrap(), 17);
        assert!(usize_to_u16_column(16_384).is_err());
        assert_eq!(usize_to_u32_row(9).unwrap(), 9);
        assert!(usize_to_u32_row(1_048_576).is_err());
    }
}
