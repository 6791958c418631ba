//! Shared helpers for the integration tests

#![allow(dead_code)]

pub mod legacy_workbook;

use std::path::PathBuf;

/// Path of a fixture under `tests/data`
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Contents of a fixture under `tests/data`
pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}
