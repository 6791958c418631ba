//! Worksheet renderers

mod transformation;
mod version_control;

pub(super) use transformation::{SheetContext, write_table_sheet};
pub use version_control::VersionControlEntry;
pub(super) use version_control::write_version_control;
