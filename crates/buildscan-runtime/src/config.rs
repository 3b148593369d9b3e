use crate::{Error, Result};
use buildscan_core::resolve_workspace_path;
use buildscan_engine::{AnalysisOptions, SanityOptions};
use buildscan_parser::ParserOptions;
use buildscan_parser::invocation::DEFAULT_TEMP_DIRECTORY_MARKER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub temp_directory_marker: String,
    /// `0` uses every available processor.
    pub max_parallelism: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            temp_directory_marker: DEFAULT_TEMP_DIRECTORY_MARKER.to_string(),
            max_parallelism: 0,
            base_directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub augment_metadata_as_source: bool,
    pub validate_outputs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            augment_metadata_as_source: true,
            validate_outputs: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub sanity: SanityOptions,
    pub output: OutputConfig,
}

impl Config {
    /// Load the config at `explicit_path`, or the default location.
    ///
    /// A missing default config yields the defaults; a missing explicit one is
    /// an error.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match explicit_path {
            Some(path) if !path.exists() => Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            ))),
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::default_path()?),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_workspace_path(None)?.join(CONFIG_FILE_NAME))
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            parser: ParserOptions {
                temp_directory_marker: self.analysis.temp_directory_marker.clone(),
            },
            max_parallelism: self.analysis.max_parallelism,
            base_directory: self.analysis.base_directory.clone(),
        }
    }
}
