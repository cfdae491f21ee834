//! Proptest strategies for generating valid test inputs.
//!
//! Strategies are constructive: they build well-formed paths, line contents
//! and diffs from known-valid pieces instead of filtering random strings.
//!
//! # Bounds
//!
//! To keep tests fast, the following bounds are enforced:
//! - Max files per diff: 5
//! - Max hunks per file: 5
//! - Max lines per hunk: 20
//! - Max line length: 200 bytes
//! - Max intern seed paths: 5

use hunkscan_types::{ConfigFile, Defaults, FileStatus, InternConfig, LineKind, OutputFormat};
use proptest::prelude::*;

use crate::diff_builder::{DiffBuilder, FileBuilder, GeneratedDiff, HunkBuilder};

// =============================================================================
// Constants for bounding generated data
// =============================================================================

/// Maximum number of files in a generated diff
pub const MAX_FILES: usize = 5;

/// Maximum number of hunks per file
pub const MAX_HUNKS_PER_FILE: usize = 5;

/// Maximum number of lines per hunk
pub const MAX_LINES_PER_HUNK: usize = 20;

/// Maximum line length in bytes
pub const MAX_LINE_LENGTH: usize = 200;

/// Maximum number of configured intern seed paths
pub const MAX_SEED_PATHS: usize = 5;

// =============================================================================
// Enum Strategies
// =============================================================================

pub fn arb_file_status() -> impl Strategy<Value = FileStatus> {
    prop_oneof![
        Just(FileStatus::Added),
        Just(FileStatus::Modified),
        Just(FileStatus::Deleted),
        Just(FileStatus::Renamed),
    ]
}

pub fn arb_line_kind() -> impl Strategy<Value = LineKind> {
    prop_oneof![
        Just(LineKind::Addition),
        Just(LineKind::Deletion),
        Just(LineKind::Context),
    ]
}

pub fn arb_output_format() -> impl Strategy<Value = OutputFormat> {
    prop_oneof![Just(OutputFormat::Json), Just(OutputFormat::Text)]
}

// =============================================================================
// Helper Strategies
// =============================================================================

fn arb_identifier() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,15}").expect("valid regex for identifier")
}

fn arb_file_extension() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "rs", "py", "js", "ts", "jsx", "tsx", "go", "java", "kt", "rb", "c", "cpp", "h", "hpp",
        "cs", "txt", "md", "json", "yaml", "toml", "sql", "png",
    ])
    .prop_map(|s| s.to_string())
}

fn arb_dir_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "src", "lib", "bin", "tests", "test", "benches", "docs", "scripts", "utils", "core",
        "api", "internal", "pkg", "cmd", "app", "migrations",
    ])
    .prop_map(|s| s.to_string())
}

// =============================================================================
// Diff Content Strategies
// =============================================================================

/// Relative paths like `src/core/parser.rs`, without spaces.
pub fn arb_file_path() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(arb_dir_name(), 1..4),
        arb_identifier(),
        arb_file_extension(),
    )
        .prop_map(|(dirs, name, ext)| format!("{}/{}.{}", dirs.join("/"), name, ext))
}

/// Line content that is safe after any marker.
pub fn arb_safe_line_content() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_(){}\\[\\];:,.<>=*/& ]{0,199}")
        .expect("valid regex for safe line content")
}

/// Line content that includes text which looks like diff syntax once a
/// marker is prepended (`--- x`, `+++ y`, `@@ z`, empty lines).
pub fn arb_line_content() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => arb_safe_line_content(),
        1 => arb_safe_line_content().prop_map(|s| format!("-- {}", truncate(&s, 190))),
        1 => arb_safe_line_content().prop_map(|s| format!("++ {}", truncate(&s, 190))),
        1 => arb_safe_line_content().prop_map(|s| format!("@@ {}", truncate(&s, 190))),
        1 => Just(String::new()),
    ]
}

fn truncate(s: &str, max: usize) -> &str {
    // contents are ASCII, so any index is a char boundary
    &s[..s.len().min(max)]
}

/// Strategy for generating a vector of line contents.
pub fn arb_lines(max_lines: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_safe_line_content(), 1..=max_lines)
}

/// A hunk with between 1 and MAX_LINES_PER_HUNK lines and derived counts.
pub fn arb_hunk() -> impl Strategy<Value = HunkBuilder> {
    (
        1u32..5000,
        0u32..50,
        prop::collection::vec((arb_line_kind(), arb_line_content()), 1..=MAX_LINES_PER_HUNK),
    )
        .prop_map(|(old_start, shift, lines)| {
            lines.iter().fold(
                HunkBuilder::at(old_start, old_start + shift),
                |hunk, (kind, content)| hunk.line(*kind, content),
            )
        })
}

/// A hunk that only adds lines, as written for new files.
fn arb_addition_hunk() -> impl Strategy<Value = HunkBuilder> {
    arb_lines(MAX_LINES_PER_HUNK).prop_map(|lines| {
        lines
            .iter()
            .fold(HunkBuilder::at(0, 1), |hunk, line| hunk.add_line(line))
    })
}

/// A hunk that only removes lines, as written for deleted files.
fn arb_deletion_hunk() -> impl Strategy<Value = HunkBuilder> {
    arb_lines(MAX_LINES_PER_HUNK).prop_map(|lines| {
        lines
            .iter()
            .fold(HunkBuilder::at(1, 0), |hunk, line| hunk.remove(line))
    })
}

fn with_hunks(file: FileBuilder, hunks: Vec<HunkBuilder>) -> FileBuilder {
    hunks.into_iter().fold(file, FileBuilder::add_hunk)
}

/// One file block of any shape git produces: modified, added, deleted,
/// renamed (with or without content), binary, or mode-only.
pub fn arb_file() -> impl Strategy<Value = FileBuilder> {
    let hunks = || prop::collection::vec(arb_hunk(), 1..=MAX_HUNKS_PER_FILE);
    prop_oneof![
        4 => (arb_file_path(), hunks())
            .prop_map(|(path, hunks)| with_hunks(FileBuilder::new(&path), hunks)),
        1 => (arb_file_path(), arb_addition_hunk())
            .prop_map(|(path, hunk)| FileBuilder::new(&path).new_file().add_hunk(hunk)),
        1 => (arb_file_path(), arb_deletion_hunk())
            .prop_map(|(path, hunk)| FileBuilder::new(&path).deleted().add_hunk(hunk)),
        1 => (arb_file_path(), arb_file_path(), prop::collection::vec(arb_hunk(), 0..=2))
            .prop_map(|(old, new, hunks)| {
                with_hunks(FileBuilder::new(&new).rename_from(&old), hunks)
            }),
        1 => arb_file_path().prop_map(|path| FileBuilder::new(&path).binary()),
        1 => arb_file_path().prop_map(|path| FileBuilder::new(&path).new_file().binary()),
        1 => arb_file_path()
            .prop_map(|path| FileBuilder::new(&path).mode_change("100644", "100755")),
    ]
}

/// A whole diff of 1 to MAX_FILES files with its expected parse.
pub fn arb_diff() -> impl Strategy<Value = GeneratedDiff> {
    prop::collection::vec(arb_file(), 1..=MAX_FILES).prop_map(|files| {
        files
            .into_iter()
            .fold(DiffBuilder::new(), DiffBuilder::add_file)
            .generate()
    })
}

// =============================================================================
// ConfigFile Strategy
// =============================================================================

pub fn arb_defaults() -> impl Strategy<Value = Defaults> {
    (
        prop::option::of(arb_output_format()),
        prop::option::of(any::<bool>()),
        prop::option::of(any::<bool>()),
        prop::option::of(1usize..1_000_000),
    )
        .prop_map(
            |(format, include_lines, shared_pool, capacity_hint)| Defaults {
                format,
                include_lines,
                shared_pool,
                capacity_hint,
            },
        )
}

pub fn arb_config_file() -> impl Strategy<Value = ConfigFile> {
    (
        arb_defaults(),
        prop::collection::vec(arb_file_path(), 0..=MAX_SEED_PATHS),
    )
        .prop_map(|(defaults, seed_paths)| ConfigFile {
            defaults,
            intern: InternConfig { seed_paths },
        })
}

// =============================================================================
// Tests
// =============================================================================
