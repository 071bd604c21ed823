use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct Config {
    #[validate]
    #[serde(default)]
    pub judge: Judge,

    #[validate]
    #[serde(default)]
    pub docker: Docker,
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct Judge {
    /// Build contexts are created under this directory.
    pub workspace_root: PathBuf,

    /// Where the submission lives inside every image.
    #[validate(length(min = 1))]
    pub script_path: String,

    #[validate(range(min = 100, max = 600000))]
    pub timeout: u64, // milliseconds
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct Docker {
    pub bin: PathBuf,

    /// Holds one `<tag>/Dockerfile` definition per language.
    pub languages_dir: PathBuf,
}

impl Default for Judge {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir().join("golf-judge"),
            script_path: "/tmp/userScript".to_owned(),
            timeout: 10_000,
        }
    }
}

impl Default for Docker {
    fn default() -> Self {
        Self {
            bin: "docker".into(),
            languages_dir: "languages".into(),
        }
    }
}

impl Judge {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: path = {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
