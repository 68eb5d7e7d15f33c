use crate::error::{FitError, Result};
use crate::types::config::{FitConfig, BUILTIN_CONFIG};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use toml::Value;
use tracing::{debug, warn};

pub const DEFAULT_CONFIG_FILE: &str = "fitsize.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".fitsize/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/fitsize/config.toml";
pub const BUILTIN_SOURCE: &str = "<built-in>";

/// A validated configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: FitConfig,
    pub sources: Vec<String>,
    /// Hex SHA-256 of the merged configuration, stamped on every report.
    pub digest: String,
}

pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<LoadedConfig> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, explicit, global.as_deref())
}

/// Layers, later wins: built-in charts, global file, project file (or `explicit`), local override.
/// Tables merge key by key; arrays such as `charts` are replaced whole.
pub(crate) fn load_config_with_global(
    root: &Path,
    explicit: Option<&Path>,
    global_path: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut merged: Value = toml::from_str(BUILTIN_CONFIG)
        .map_err(|e| FitError::ConfigParse(format!("{BUILTIN_SOURCE}: {e}")))?;
    let mut sources = vec![BUILTIN_SOURCE.to_string()];

    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path, &mut sources)?;
    }

    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(FitError::ConfigNotFound(path.display().to_string()));
            }
            merge_file_if_exists(&mut merged, path, &mut sources)?;
        }
        None => merge_file_if_exists(&mut merged, &root.join(DEFAULT_CONFIG_FILE), &mut sources)?,
    }
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE), &mut sources)?;

    let config: FitConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| FitError::ConfigParse(e.to_string()))?;
    config.validate()?;
    for warning in config.warnings() {
        warn!(%warning, "chart configuration");
    }

    let digest = digest(&config)?;
    debug!(sources = ?sources, %digest, "configuration loaded");
    Ok(LoadedConfig {
        config,
        sources,
        digest,
    })
}

pub fn digest(config: &FitConfig) -> Result<String> {
    let bytes = serde_json::to_vec(config)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path, sources: &mut Vec<String>) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    sources.push(path.display().to_string());
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| FitError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SINGLE_CHART: &str = r#"
[[charts]]
gender = "unisex"
category = "hats"

[[charts.sizes]]
label = "S"
ranges = { height = [150.0, 170.0] }

[[charts.sizes]]
label = "L"
ranges = { height = [170.0, 190.0] }
"#;

    #[test]
    fn builtin_charts_load_without_any_files() {
        let dir = TempDir::new().expect("temp dir should be created");
        let loaded = load_config_with_global(dir.path(), None, None).expect("load should succeed");
        assert_eq!(loaded.sources, vec![BUILTIN_SOURCE.to_string()]);
        assert_eq!(loaded.config.charts.len(), 2);
        assert_eq!(loaded.digest.len(), 64);
    }

    #[test]
    fn layers_merge_global_project_and_local_in_order() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");

        fs::write(
            &global_path,
            r#"
[fallback]
recommended = "L"
alternative = "XL"

[llm]
model = "gpt-4o-mini"
"#,
        )
        .expect("global config should write");

        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            r#"
[body_types]
curvy = 0.15
"#,
        )
        .expect("project config should write");

        fs::create_dir_all(root.path().join(".fitsize")).expect("local dir should create");
        fs::write(
            root.path().join(DEFAULT_LOCAL_FILE),
            r#"
[fallback]
alternative = "M"
"#,
        )
        .expect("local override should write");

        let loaded = load_config_with_global(root.path(), None, Some(&global_path))
            .expect("load should succeed");
        let cfg = &loaded.config;

        assert_eq!(loaded.sources.len(), 4);
        assert_eq!(cfg.fallback.recommended, "L");
        assert_eq!(cfg.fallback.alternative, "M");
        assert_eq!(cfg.body_types["curvy"], 0.15);
        assert_eq!(cfg.body_types["plus-size"], 0.2);
        assert_eq!(cfg.llm().model, "gpt-4o-mini");
        assert_eq!(cfg.charts.len(), 2);
    }

    #[test]
    fn chart_arrays_replace_the_builtin_set() {
        let root = TempDir::new().expect("temp dir should be created");
        let custom = root.path().join("custom.toml");
        fs::write(&custom, SINGLE_CHART).expect("custom config should write");

        let loaded = load_config_with_global(root.path(), Some(&custom), None)
            .expect("load should succeed");
        assert_eq!(loaded.config.charts.len(), 1);
        assert_eq!(loaded.config.charts[0].id(), "unisex_hats");
    }

    #[test]
    fn explicit_config_overrides_project_file_discovery() {
        let root = TempDir::new().expect("temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[body_types]\ncurvy = 0.3\n")
            .expect("project config should write");
        let custom = root.path().join("custom.toml");
        fs::write(&custom, SINGLE_CHART).expect("custom config should write");

        let loaded = load_config_with_global(root.path(), Some(&custom), None)
            .expect("load should succeed");
        assert_eq!(loaded.config.body_types["curvy"], 0.1);
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let root = TempDir::new().expect("temp dir should be created");
        let err = load_config_with_global(root.path(), Some(&root.path().join("nope.toml")), None)
            .expect_err("missing explicit file should fail");
        assert!(matches!(err, FitError::ConfigNotFound(_)));
    }

    #[test]
    fn malformed_layer_reports_its_path() {
        let root = TempDir::new().expect("temp dir should be created");
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[fallback\n")
            .expect("project config should write");
        let err = load_config_with_global(root.path(), None, None)
            .expect_err("malformed toml should fail");
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn merged_config_is_validated() {
        let root = TempDir::new().expect("temp dir should be created");
        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            "[body_types]\nplus-size = 3.0\n",
        )
        .expect("project config should write");
        let err = load_config_with_global(root.path(), None, None)
            .expect_err("out-of-range offset should fail");
        assert!(matches!(err, FitError::ConfigParse(_)));
    }

    #[test]
    fn digest_tracks_configuration_changes() {
        let root = TempDir::new().expect("temp dir should be created");
        let before = load_config_with_global(root.path(), None, None)
            .expect("load should succeed")
            .digest;
        fs::write(root.path().join(DEFAULT_CONFIG_FILE), "[body_types]\ncurvy = 0.12\n")
            .expect("project config should write");
        let after = load_config_with_global(root.path(), None, None)
            .expect("load should succeed")
            .digest;
        assert_ne!(before, after);
    }
}
