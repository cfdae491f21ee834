//! Configuration loading.
//!
//! `hunkscan.toml` is optional. An explicit `--config` path must exist; the
//! implicit `./hunkscan.toml` is used only when present. Either way the file
//! is validated before any flag is merged on top of it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use hunkscan_types::ConfigFile;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_NAME: &str = "hunkscan.toml";

/// Load and validate one configuration file.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    debug!("Loading config from '{}'", path.display());

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    parse_config(&text).with_context(|| format!("load config '{}'", path.display()))
}

/// Parse and validate configuration text.
pub fn parse_config(text: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(text).context("parse config")?;
    config.validate().context("validate config")?;
    Ok(config)
}

/// The configuration in effect for a run.
///
/// `explicit` comes from `--config`; `cwd` is where `hunkscan.toml` is
/// looked up otherwise.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file not found: '{}'", path.display());
        }
        return load_config(path);
    }

    let implicit: PathBuf = cwd.join(DEFAULT_CONFIG_NAME);
    if implicit.is_file() {
        return load_config(&implicit);
    }

    debug!("No config file found, using defaults");
    Ok(ConfigFile::default())
}

/// The file `hunkscan init` writes: every setting at its default value.
pub fn default_config_text() -> String {
    r#"# hunkscan configuration
#
# Command-line flags override the values below.

[defaults]
# Report format: "json" or "text".
format = "json"

# Include every hunk line (kind, line numbers, content) in reports.
include_lines = false

# Decode paths through the process-wide intern pool.
shared_pool = false

# Expected number of diff lines; sizes the record arena up front.
# capacity_hint = 4096

[intern]
# Paths to pre-populate the intern pool with, in addition to common
# manifests and lockfiles.
seed_paths = []
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hunkscan_types::{ConfigError, Defaults, OutputFormat};
    use tempfile::TempDir;

    #[test]
    fn default_config_text_parses_to_defaults() {
        let config = parse_config(&default_config_text()).expect("default config");
        assert_eq!(config.defaults, Defaults::default());
        assert!(config.intern.seed_paths.is_empty());
    }

    #[test]
    fn invalid_values_are_rejected_with_context() {
        let err = parse_config("[defaults]\ncapacity_hint = 0\n").unwrap_err();
        assert!(err.to_string().contains("validate config"));
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroCapacityHint)
        );
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = parse_config("[defaults\nformat = ").unwrap_err();
        assert!(err.to_string().contains("parse config"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = resolve_config(Some(&missing), dir.path()).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn implicit_config_is_picked_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            "[defaults]\nformat = \"text\"\n",
        )
        .unwrap();

        let config = resolve_config(None, dir.path()).expect("implicit config");
        assert_eq!(config.defaults.format, Some(OutputFormat::Text));
    }

    #[test]
    fn missing_implicit_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = resolve_config(None, dir.path()).expect("defaults");
        assert_eq!(config, ConfigFile::default());
    }
}
