//! Shared test utilities for the hunkscan workspace.
//!
//! This crate provides:
//! - **arb**: Proptest strategies for paths, hunks, whole diffs and configs
//! - **diff_builder**: Unified diff builders that know their expected parse
//! - **fixtures**: Sample configs and diffs for the shapes git produces
//!
//! # Example
//!
//! ```rust,ignore
//! use hunkscan_testkit::arb;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     fn counts_match(diff in arb::arb_diff()) {
//!         let result = hunkscan_diff::parse_str(&diff.text);
//!         prop_assert_eq!(result.file_count(), diff.expected_files);
//!     }
//! }
//! ```

pub mod arb;
pub mod diff_builder;
pub mod fixtures;

pub use arb::{arb_config_file, arb_diff, arb_file, arb_file_path, arb_hunk, arb_line_content};
pub use diff_builder::{DiffBuilder, FileBuilder, GeneratedDiff, HunkBuilder};
pub use fixtures::{sample_configs, sample_diffs};
