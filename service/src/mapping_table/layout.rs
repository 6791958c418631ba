//! Fixed sheet geometry shared by every template version
//!
//! Rows and columns are zero-based. The transformation table header row
//! depends on the number of sourcing dependencies and is located by its `#`
//! caption when reading.

/// Name prefix of the per-table sheets
pub const SHEET_PREFIX: &str = "Transformation - Sourcing";

/// Name of the version history sheet
pub const VERSION_CONTROL_SHEET: &str = "Version Control";

/// Title cell (`A1`)
pub const TITLE_ROW: u32 = 0;

/// Template version row (`A2` label, `B2` value)
pub const VERSION_ROW: u32 = 1;
/// Label of the template version row
pub const VERSION_LABEL: &str = "Template Version";

/// Table description row (`A4` label, `B4` value)
pub const DESCRIPTION_ROW: u32 = 3;
/// Label of the table description row
pub const DESCRIPTION_LABEL: &str = "Table Description";

/// Table options row (`A5` label, `B5` value)
pub const OPTIONS_ROW: u32 = 4;
/// Label of the table options row
pub const OPTIONS_LABEL: &str = "Table Options";

/// Table review notes row (`A6` label, `B6` value)
pub const NOTES_ROW: u32 = 5;
/// Label of the table review notes row
pub const NOTES_LABEL: &str = "Review Notes";

/// Column holding metadata values (`B`)
pub const METADATA_VALUE_COL: u16 = 1;

/// Header row of the sourcing dependency block (`A7`)
pub const DEPENDENCY_HEADER_ROW: u32 = 6;
/// Captions of the sourcing dependency block
pub const DEPENDENCY_HEADERS: [&str; 4] = [
    "Dependency",
    "Source Database",
    "Table Name/Dataset Name",
    "Source Column",
];

/// Prefix older generators wrote above the table header instead of `B5`
pub const INLINE_OPTIONS_PREFIX: &str = "Table options:";

/// Header row of the version history table (`B4:F4`)
pub const VERSION_CONTROL_HEADER_ROW: u32 = 3;
/// First column of the version history table
pub const VERSION_CONTROL_FIRST_COL: u16 = 1;
/// Captions of the version history table
pub const VERSION_CONTROL_HEADERS: [&str; 5] =
    ["Version", "Date", "Change Reference", "Description", "Who By"];

/// Row of the transformation table header for a number of dependencies
///
/// One blank row separates the dependency block from the table.
#[must_use]
pub fn table_header_row(dependency_count: usize) -> u32 {
    let count = u32::try_from(dependency_count).unwrap_or(u32::MAX - DEPENDENCY_HEADER_ROW - 2);
    DEPENDENCY_HEADER_ROW + count + 2
}

/// Sheet name of the `n`-th table (1-based)
#[must_use]
pub fn sheet_name(n: usize) -> String {
    format!("{SHEET_PREFIX} ({n})")
}
