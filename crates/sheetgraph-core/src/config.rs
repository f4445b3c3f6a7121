//! Configuration schema (sheetgraph.toml)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Type tag of the only record kind that becomes a graph node
pub const MEASURE_SHEET_TYPE: &str = "MeasureSheet";

/// Parent ids of the archive folders in the production export
pub const DEFAULT_EXCLUDED_PARENT_IDS: [i64; 11] = [
    24200, 24225, 24532, 25061, 25083, 24413, 24374, 24738, 25211, 230, 23795,
];

/// Leading number code of a display name, e.g. "12.3" in "12.3 Revenue"
pub const DEFAULT_LABEL_PATTERN: &str = r"^([0-9\.]+).*";

/// Rules deciding which records are eligible graph nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Type tag a record must carry to be kept
    #[serde(default = "default_measure_sheet_type")]
    pub measure_sheet_type: String,

    /// Records whose parent id is listed here are dropped
    #[serde(default = "default_excluded_parent_ids")]
    pub excluded_parent_ids: Vec<i64>,
}

fn default_measure_sheet_type() -> String {
    MEASURE_SHEET_TYPE.to_string()
}

fn default_excluded_parent_ids() -> Vec<i64> {
    DEFAULT_EXCLUDED_PARENT_IDS.to_vec()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            measure_sheet_type: default_measure_sheet_type(),
            excluded_parent_ids: default_excluded_parent_ids(),
        }
    }
}

impl FilterConfig {
    /// Check if a parent group is on the denylist
    pub fn is_parent_excluded(&self, parent_id: i64) -> bool {
        self.excluded_parent_ids.contains(&parent_id)
    }
}

/// How display names are shortened into diagram labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Regex whose first capture group becomes the label
    #[serde(default = "default_label_pattern")]
    pub pattern: String,
}

fn default_label_pattern() -> String {
    DEFAULT_LABEL_PATTERN.to_string()
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            pattern: default_label_pattern(),
        }
    }
}

impl LabelConfig {
    /// Compile the label pattern
    pub fn compile(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.pattern)
            .map_err(|e| ConfigError::InvalidPattern(self.pattern.clone(), e.to_string()))
    }
}

/// Which diagram renderer to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// External `d2` binary producing SVG
    D2,

    /// Write the diagram source text itself
    Source,
}

impl Default for RendererKind {
    fn default() -> Self {
        Self::D2
    }
}

/// Renderer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Renderer kind
    #[serde(default)]
    pub kind: RendererKind,

    /// Program invoked by the d2 renderer
    #[serde(default = "default_command")]
    pub command: String,

    /// Extra arguments passed before the stdin/stdout operands
    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

fn default_command() -> String {
    "d2".to_string()
}

fn default_args() -> Vec<String> {
    ["--layout", "elk", "--pad", "5"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kind: RendererKind::default(),
            command: default_command(),
            args: default_args(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Export file to read
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory diagrams are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Continue past per-node render/write failures and report them at the end
    #[serde(default)]
    pub keep_going: bool,

    /// Record filter rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Label shortening
    #[serde(default)]
    pub labels: LabelConfig,

    /// Renderer settings
    #[serde(default)]
    pub renderer: RendererConfig,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("diagrams")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
            keep_going: false,
            filter: FilterConfig::default(),
            labels: LabelConfig::default(),
            renderer: RendererConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Relative paths in the file are relative to the file itself
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        config.labels.compile()?;
        Ok(config)
    }

    /// Input path resolved against the project root
    pub fn input_path(&self) -> PathBuf {
        self.resolve(&self.input)
    }

    /// Output directory resolved against the project root
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid label pattern '{0}': {1}")]
    InvalidPattern(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.filter.measure_sheet_type, "MeasureSheet");
        assert_eq!(config.filter.excluded_parent_ids.len(), 11);
        assert_eq!(config.renderer.kind, RendererKind::D2);
        assert!(!config.keep_going);
    }

    #[test]
    fn parent_denylist() {
        let filter = FilterConfig::default();
        assert!(filter.is_parent_excluded(230));
        assert!(filter.is_parent_excluded(25211));
        assert!(!filter.is_parent_excluded(231));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            output_dir = "out"

            [filter]
            excluded_parent_ids = [1, 2]

            [renderer]
            kind = "source"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.input, PathBuf::from("data.json"));
        assert_eq!(config.filter.excluded_parent_ids, vec![1, 2]);
        assert_eq!(config.filter.measure_sheet_type, "MeasureSheet");
        assert_eq!(config.renderer.kind, RendererKind::Source);
        assert_eq!(config.renderer.command, "d2");
    }

    #[test]
    fn invalid_label_pattern_rejected() {
        let err = Config::from_toml("[labels]\npattern = \"([0-9\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern(..)));
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let mut config = Config::default();
        config.project_root = PathBuf::from("/srv/export");
        assert_eq!(config.input_path(), PathBuf::from("/srv/export/data.json"));

        config.output_dir = PathBuf::from("/tmp/diagrams");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/diagrams"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.filter, parsed.filter);
        assert_eq!(config.renderer, parsed.renderer);
    }
}
