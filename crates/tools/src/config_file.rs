//! TOML configuration files for the command line tools.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use meiro_core::GameConfig;

/// Reads a TOML file into a `GameConfig`; absent sections and keys keep their defaults.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<GameConfig> {
    let config: GameConfig = toml::from_str(content)?;
    config.validate().context("Invalid config values")?;
    Ok(config)
}

/// Writes through a sibling temp file so a crash never leaves half a config behind.
pub fn write_config_atomic(config: &GameConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write config file: {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move config into place: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use meiro_core::{GeneratorConfig, LayoutKind};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [generator]
            layout = "Maze"
            widen_chance = 1.0

            [level]
            max_depth = 3
            "#,
        )
        .expect("parse");
        assert_eq!(config.generator.layout, LayoutKind::Maze);
        assert!((config.generator.widen_chance - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.generator.room_size, GeneratorConfig::default().room_size);
        assert_eq!(config.level.max_depth, 3);
        assert_eq!(config.behavior, GameConfig::default().behavior);
    }

    #[test]
    fn atomic_write_and_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("meiro.toml");
        let mut config = GameConfig::default();
        config.level.base_width = 21;
        config.items.potion_heal = 11;

        write_config_atomic(&config, &path).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, config);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn inverted_repath_bounds_are_rejected() {
        let error = parse_config(
            r#"
            [behavior]
            repath_min_turns = 5
            repath_max_turns = 2
            "#,
        )
        .expect_err("inverted range");
        assert!(format!("{error:#}").contains("repath_min_turns"));
    }

    #[test]
    fn load_errors_name_the_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[generator\nlayout = 3").expect("write");
        let error = load_config(&path).expect_err("malformed toml");
        assert!(format!("{error:#}").contains("broken.toml"));

        let missing = load_config(&dir.path().join("missing.toml")).expect_err("missing file");
        assert!(missing.to_string().contains("missing.toml"));
    }
}
