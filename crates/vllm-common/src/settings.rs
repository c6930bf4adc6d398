use std::{env, path::PathBuf, sync::OnceLock, time::Duration};

use anyhow::Context;
use config::{Environment, File};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs::canonicalize;

pub static CONFIG_INSTANCE: OnceLock<Settings> = OnceLock::new();

use crate::error::{VllmError, VllmResult};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OperatorArgs {
    /// Namespace to watch. Every namespace when unset.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Delay before re-running a pass that created or updated the deployment.
    #[serde(default = "default_requeue_after_secs")]
    pub requeue_after_secs: u64,

    /// Delay before retrying a pass that failed.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,
}

impl Default for OperatorArgs {
    fn default() -> Self {
        Self {
            namespace: None,
            requeue_after_secs: default_requeue_after_secs(),
            error_backoff_secs: default_error_backoff_secs(),
        }
    }
}

impl OperatorArgs {
    pub fn requeue_after(&self) -> Duration {
        Duration::from_secs(self.requeue_after_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_log_level")]
    pub log_level: LevelFilter,

    #[serde(default = "OperatorArgs::default")]
    pub operator: OperatorArgs,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            operator: OperatorArgs::default(),
        }
    }
}

pub fn get_config() -> VllmResult<&'static Settings> {
    CONFIG_INSTANCE
        .get()
        .ok_or_else(|| VllmError::Cli("Config not initialized".to_string()))
}

impl Settings {
    /// Layers, lowest priority first: `root` (a file, or a directory holding
    /// `config.*`), `config`, `config/default`, `config.<RUN_MODE>`, then
    /// `VLLM__*` environment variables.
    pub fn from_root(root: Option<PathBuf>) -> VllmResult<Self> {
        let curr_dir = std::env::current_dir().context("unable to get working directory")?;
        let root = root.unwrap_or(curr_dir);
        let root = canonicalize(root).context("unable to canonicalize root directory")?;

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut s = config::Config::builder();
        if root.is_file() {
            s = s.add_source(File::from(root.as_path()));
        } else {
            s = s.add_source(
                File::with_name(&root.join("config").to_string_lossy()).required(false),
            );
        }
        let s = s
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config.{}", run_mode)).required(false))
            .add_source(
                Environment::with_prefix("VLLM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg = s.try_deserialize()?;
        Ok(cfg)
    }
}

fn default_log_level() -> LevelFilter {
    LevelFilter::Info
}

fn default_requeue_after_secs() -> u64 {
    1
}

fn default_error_backoff_secs() -> u64 {
    5
}
