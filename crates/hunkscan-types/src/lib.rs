//! Data types (config + reports) for hunkscan.
//!
//! This crate is intentionally "dumb": plain DTOs with serde + schemars.
//! The record tags (`FileStatus`, `LineKind`) live here so that the parser
//! core and every consumer agree on one small integer vocabulary.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Schema Identifiers ─────────────────────────────────────────
pub const REPORT_SCHEMA_V1: &str = "hunkscan.report.v1";

// ── Config Limits ──────────────────────────────────────────────
/// Upper bound for `capacity_hint`; larger values are almost certainly typos.
pub const MAX_CAPACITY_HINT: usize = 64 * 1024 * 1024;

/// Upper bound for the length of a configured intern seed path.
pub const MAX_SEED_PATH_LEN: usize = 4096;

// ── Record Tags ────────────────────────────────────────────────

/// Change status of one file in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FileStatus {
    Added = 0,
    Modified = 1,
    Deleted = 2,
    Renamed = 3,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Deleted => "deleted",
            FileStatus::Renamed => "renamed",
        }
    }

    /// Single-letter code as printed by `git diff --name-status`.
    pub fn code(self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(FileStatus::Added),
            1 => Some(FileStatus::Modified),
            2 => Some(FileStatus::Deleted),
            3 => Some(FileStatus::Renamed),
            _ => None,
        }
    }
}

/// Kind of a line recorded inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LineKind {
    Addition = 0,
    Deletion = 1,
    Context = 2,
}

impl LineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::Addition => "addition",
            LineKind::Deletion => "deletion",
            LineKind::Context => "context",
        }
    }

    /// The unified-diff marker byte for this kind.
    pub fn marker(self) -> u8 {
        match self {
            LineKind::Addition => b'+',
            LineKind::Deletion => b'-',
            LineKind::Context => b' ',
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(LineKind::Addition),
            1 => Some(LineKind::Deletion),
            2 => Some(LineKind::Context),
            _ => None,
        }
    }
}

// ── Statistics ─────────────────────────────────────────────────

/// Counters produced by one parse pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ParseStats {
    pub total_bytes: u64,
    pub parse_time_ms: f64,
    pub files_found: u32,
    pub hunks_found: u32,
    pub lines_found: u32,
}

/// Diagnostics exposed by the string intern pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct InternStats {
    pub hits: u64,
    pub misses: u64,
    pub collisions: u64,
    /// Number of distinct hash buckets in the table.
    pub buckets: u64,
    /// Number of canonical strings stored (including seeded ones).
    pub unique: u64,
}

impl InternStats {
    /// Fraction of lookups served from the table, `0.0` when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ── Reports ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// Machine-readable rendering of one parse result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiffReport {
    pub schema: String,
    pub tool: ToolMeta,
    pub stats: ParseStats,
    pub intern: InternStats,
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileSummary {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "is_false")]
    pub binary: bool,
    pub additions: u32,
    pub deletions: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hunks: Vec<HunkSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HunkSummary {
    /// The exact `@@ ... @@` header line as it appeared in the input.
    pub header: String,
    /// Section heading git writes after the closing `@@`, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<LineSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LineSummary {
    pub kind: LineKind,
    pub old_line: u32,
    pub new_line: u32,
    pub content: String,
}

fn is_false(v: &bool) -> bool {
    !*v
}

// ── Config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

/// Top-level `hunkscan.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub intern: InternConfig,
}

impl ConfigFile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.defaults.validate()?;
        self.intern.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    /// Include per-line records in reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_lines: Option<bool>,

    /// Parse through the process-wide intern pool instead of a fresh one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_pool: Option<bool>,

    /// Expected number of line records; overrides the size heuristic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_hint: Option<usize>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            format: Some(OutputFormat::Json),
            include_lines: Some(false),
            shared_pool: Some(false),
            capacity_hint: None,
        }
    }
}

impl Defaults {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.capacity_hint {
            Some(0) => Err(ConfigError::ZeroCapacityHint),
            Some(n) if n > MAX_CAPACITY_HINT => Err(ConfigError::CapacityHintTooLarge {
                value: n,
                max: MAX_CAPACITY_HINT,
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct InternConfig {
    /// Extra paths to pre-populate the intern pool with (e.g. project manifests).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed_paths: Vec<String>,
}

impl InternConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, path) in self.seed_paths.iter().enumerate() {
            if path.is_empty() {
                return Err(ConfigError::EmptySeedPath { index });
            }
            if path.contains('\n') || path.contains('\r') {
                return Err(ConfigError::MultiLineSeedPath { index });
            }
            if path.len() > MAX_SEED_PATH_LEN {
                return Err(ConfigError::SeedPathTooLong {
                    index,
                    len: path.len(),
                    max: MAX_SEED_PATH_LEN,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("defaults.capacity_hint must be greater than zero")]
    ZeroCapacityHint,

    #[error("defaults.capacity_hint {value} exceeds the maximum of {max}")]
    CapacityHintTooLarge { value: usize, max: usize },

    #[error("intern.seed_paths[{index}] is empty")]
    EmptySeedPath { index: usize },

    #[error("intern.seed_paths[{index}] spans multiple lines")]
    MultiLineSeedPath { index: usize },

    #[error("intern.seed_paths[{index}] is {len} bytes, the maximum is {max}")]
    SeedPathTooLong { index: usize, len: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_kind_as_str() {
        assert_eq!(FileStatus::Added.as_str(), "added");
        assert_eq!(FileStatus::Modified.as_str(), "modified");
        assert_eq!(FileStatus::Deleted.as_str(), "deleted");
        assert_eq!(FileStatus::Renamed.as_str(), "renamed");

        assert_eq!(LineKind::Addition.as_str(), "addition");
        assert_eq!(LineKind::Deletion.as_str(), "deletion");
        assert_eq!(LineKind::Context.as_str(), "context");
    }

    #[test]
    fn tags_round_trip_through_u8() {
        for status in [
            FileStatus::Added,
            FileStatus::Modified,
            FileStatus::Deleted,
            FileStatus::Renamed,
        ] {
            assert_eq!(FileStatus::from_u8(status as u8), Some(status));
        }
        for kind in [LineKind::Addition, LineKind::Deletion, LineKind::Context] {
            assert_eq!(LineKind::from_u8(kind as u8), Some(kind));
        }
        assert_eq!(FileStatus::from_u8(4), None);
        assert_eq!(LineKind::from_u8(3), None);
    }

    #[test]
    fn status_codes_match_name_status() {
        let codes: String = [
            FileStatus::Added,
            FileStatus::Modified,
            FileStatus::Deleted,
            FileStatus::Renamed,
        ]
        .iter()
        .map(|s| s.code())
        .collect();
        assert_eq!(codes, "AMDR");
    }

    #[test]
    fn line_markers() {
        assert_eq!(LineKind::Addition.marker(), b'+');
        assert_eq!(LineKind::Deletion.marker(), b'-');
        assert_eq!(LineKind::Context.marker(), b' ');
    }

    #[test]
    fn hit_rate_handles_empty_pool() {
        assert_eq!(InternStats::default().hit_rate(), 0.0);

        let stats = InternStats {
            hits: 3,
            misses: 1,
            ..InternStats::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults_match_expected_values() {
        let defaults = Defaults::default();
        assert_eq!(defaults.format, Some(OutputFormat::Json));
        assert_eq!(defaults.include_lines, Some(false));
        assert_eq!(defaults.shared_pool, Some(false));
        assert_eq!(defaults.capacity_hint, None);
        assert!(defaults.validate().is_ok());
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg: ConfigFile = toml::from_str(
            r#"
[defaults]
format = "text"
include_lines = true
capacity_hint = 1024

[intern]
seed_paths = ["src/main.rs", "Makefile"]
"#,
        )
        .expect("parse config");

        assert_eq!(cfg.defaults.format, Some(OutputFormat::Text));
        assert_eq!(cfg.defaults.include_lines, Some(true));
        assert_eq!(cfg.defaults.shared_pool, None);
        assert_eq!(cfg.defaults.capacity_hint, Some(1024));
        assert_eq!(cfg.intern.seed_paths, vec!["src/main.rs", "Makefile"]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: ConfigFile = toml::from_str("").expect("parse empty config");
        assert_eq!(cfg, ConfigFile::default());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut cfg = ConfigFile::default();
        cfg.defaults.capacity_hint = Some(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCapacityHint));

        cfg.defaults.capacity_hint = Some(MAX_CAPACITY_HINT + 1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::CapacityHintTooLarge { .. })
        ));

        cfg.defaults.capacity_hint = None;
        cfg.intern.seed_paths = vec!["ok.rs".to_string(), String::new()];
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySeedPath { index: 1 }));

        cfg.intern.seed_paths = vec!["a\nb".to_string()];
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::MultiLineSeedPath { index: 0 })
        );

        cfg.intern.seed_paths = vec!["x".repeat(MAX_SEED_PATH_LEN + 1)];
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::SeedPathTooLong { index: 0, .. })
        ));
    }

    #[test]
    fn file_summary_omits_empty_fields() {
        let summary = FileSummary {
            path: "src/lib.rs".to_string(),
            old_path: None,
            status: FileStatus::Modified,
            binary: false,
            additions: 1,
            deletions: 0,
            hunks: vec![],
        };
        let value = serde_json::to_value(&summary).expect("serialize summary");
        let obj = value.as_object().expect("summary should be object");
        assert!(!obj.contains_key("old_path"));
        assert!(!obj.contains_key("binary"));
        assert!(!obj.contains_key("hunks"));
        assert_eq!(obj["status"], "modified");
    }
}
