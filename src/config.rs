use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CBS_PLANNER";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scenarios: ScenarioConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Bounds of the resolution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Latest timestep a single-agent search may reach its goal.
    pub max_timesteps: usize,
    /// Constraint-splitting rounds before giving up.
    pub replan_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub data_dir: Option<PathBuf>,
    pub default_scenario: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub render_timesteps: bool,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the optional TOML file, then `CBS_PLANNER__SECTION__KEY`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder().add_source(
            ::config::Config::try_from(&Config::default()).context("encoding default configuration")?,
        );
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration sources")?
            .try_deserialize()
            .context("decoding configuration")
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_timesteps: 200,
            replan_limit: 10_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_scenario: "warehouse".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            render_timesteps: true,
        }
    }
}
