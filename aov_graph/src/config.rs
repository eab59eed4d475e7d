use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GraphError;

const CONFIG_FILE: &str = "engine.toml";

/// Node-size constants the layout works from. Heights are in canvas units.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct LayoutMetrics {
    pub input_base_height: f64,
    pub input_buffer: f64,
    /// Added to the input height per enabled socket.
    pub socket_height: f64,
    pub output_base_height: f64,
    /// Added to an output node's height per slot.
    pub slot_height: f64,
    /// Gap between the right edge of an input node and its output column.
    pub column_gap: f64,
    pub output_width_scale: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            input_base_height: 79.0,
            input_buffer: 100.0,
            socket_height: 22.0,
            output_base_height: 75.27,
            slot_height: 22.0,
            column_gap: 240.0,
            output_width_scale: 2.0,
        }
    }
}

impl LayoutMetrics {
    pub fn input_height(&self, enabled_sockets: usize) -> f64 {
        self.input_base_height + self.input_buffer + enabled_sockets as f64 * self.socket_height
    }

    pub fn output_height(&self, slots: usize) -> f64 {
        self.output_base_height + slots as f64 * self.slot_height
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Base directory written into newly created output nodes.
    pub output_root: String,
    pub layout: LayoutMetrics,
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "aov-graph", "aov_graph")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Strict variant: any read or parse failure is returned.
pub fn load_config_from(path: &Path) -> Result<EngineConfig, GraphError> {
    let toml_str = fs::read_to_string(path)?;
    Ok(toml::from_str(&toml_str)?)
}

/// Loads the user's engine config, falling back to defaults.
pub fn load_config() -> EngineConfig {
    if let Some(path) = config_path() {
        if path.exists() {
            match load_config_from(&path) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to load {}, using defaults: {}", path.display(), e),
            }
        }
    }
    EngineConfig::default()
}

pub fn save_config_to(config: &EngineConfig, path: &Path) -> Result<(), GraphError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let toml_str = toml::to_string_pretty(config)?;
    fs::write(path, toml_str)?;
    info!("Engine config saved to {}", path.display());
    Ok(())
}

pub fn save_config(config: &EngineConfig) -> Result<PathBuf, GraphError> {
    let path = config_path()
        .ok_or_else(|| GraphError::host("no config directory for this platform"))?;
    save_config_to(config, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_own_project() {
        if let Some(path) = config_path() {
            let shown = path.to_string_lossy().to_lowercase();
            assert!(path.ends_with(CONFIG_FILE));
            assert!(shown.contains("aov"));
            assert!(!shown.contains("liesegang"));
        }
    }

    #[test]
    fn test_defaults() {
        let metrics = LayoutMetrics::default();
        assert_eq!(metrics.input_height(0), 179.0);
        assert_eq!(metrics.input_height(3), 245.0);
        assert!((metrics.output_height(2) - 119.27).abs() < 1e-9);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
output_root = "/mnt/renders"

[layout]
column_gap = 300.0
"#,
        )
        .unwrap();
        assert_eq!(config.output_root, "/mnt/renders");
        assert_eq!(config.layout.column_gap, 300.0);
        assert_eq!(config.layout.socket_height, 22.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = std::env::temp_dir().join(format!("aov_graph_cfg_{}", uuid::Uuid::new_v4()));
        let path = dir.join("engine.toml");
        let mut config = EngineConfig::default();
        config.output_root = "/tmp/out".to_string();
        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_from_bad_file_is_error() {
        let dir = std::env::temp_dir().join(format!("aov_graph_cfg_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.toml");
        fs::write(&path, "layout = 3").unwrap();
        assert!(matches!(load_config_from(&path), Err(GraphError::Config(_))));
        let _ = fs::remove_dir_all(&dir);
    }
}
