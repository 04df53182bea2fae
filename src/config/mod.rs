use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ErrorCode, Result, ShardctlError};
use crate::mongo::{DEFAULT_INITIAL_WAIT, DEFAULT_MAX_RETRIES};

pub mod loader;

pub use loader::ConfigLoader;

/// Location of the per-user configuration file, if a home directory exists
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "shardctl", "shardctl")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Effective settings after every layer has been applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardctlConfig {
    /// Shell client executable
    pub mongo_binary: String,
    /// Endpoint the shell connects to
    pub host: String,
    /// Database the expression is evaluated in
    pub context: String,
    pub max_retries: u32,
    #[serde(with = "humantime_serde")]
    pub initial_wait: Duration,
    #[serde(with = "humantime_serde")]
    pub command_timeout: Option<Duration>,
    /// Extra shell arguments, already split
    pub extra_args: Vec<String>,
    pub log_level: Option<String>,
}

impl Default for ShardctlConfig {
    fn default() -> Self {
        Self {
            mongo_binary: "mongo".to_string(),
            host: "127.0.0.1:27017".to_string(),
            context: "admin".to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_wait: DEFAULT_INITIAL_WAIT,
            command_timeout: None,
            extra_args: Vec::new(),
            log_level: None,
        }
    }
}

/// One configuration layer. Unset fields leave the layer below untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub mongo_binary: Option<String>,
    pub host: Option<String>,
    pub context: Option<String>,
    pub max_retries: Option<u32>,
    #[serde(default, with = "humantime_serde")]
    pub initial_wait: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub command_timeout: Option<Duration>,
    /// Shell-quoted, e.g. `--ssl --sslCAFile "/etc/ssl/ca.pem"`
    pub extra_args: Option<String>,
    pub log_level: Option<String>,
}

impl ConfigOverlay {
    /// Overlay read from `SHARDCTL_*` variables through `lookup`
    pub fn from_env_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_retries = match lookup("SHARDCTL_MAX_RETRIES") {
            Some(raw) => Some(raw.parse::<u32>().map_err(|e| {
                ShardctlError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("SHARDCTL_MAX_RETRIES must be a non-negative integer, got '{}'", raw),
                    None,
                )
                .with_source(e)
            })?),
            None => None,
        };

        Ok(Self {
            mongo_binary: lookup("SHARDCTL_MONGO"),
            host: lookup("SHARDCTL_HOST"),
            context: lookup("SHARDCTL_CONTEXT"),
            max_retries,
            initial_wait: None,
            command_timeout: None,
            extra_args: None,
            log_level: lookup("SHARDCTL_LOG_LEVEL"),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply(self, config: &mut ShardctlConfig) -> Result<()> {
        if let Some(binary) = self.mongo_binary {
            config.mongo_binary = binary;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(context) = self.context {
            config.context = context;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(wait) = self.initial_wait {
            config.initial_wait = wait;
        }
        if self.command_timeout.is_some() {
            config.command_timeout = self.command_timeout;
        }
        if let Some(args) = self.extra_args {
            config.extra_args = shell_words::split(&args).map_err(|e| {
                ShardctlError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("extra_args is not valid shell syntax: {}", args),
                    None,
                )
                .with_source(e)
            })?;
        }
        if self.log_level.is_some() {
            config.log_level = self.log_level;
        }
        Ok(())
    }
}

impl ShardctlConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> {
            Err(ShardctlError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                message,
                None,
            ))
        };

        if self.mongo_binary.trim().is_empty() {
            return invalid("mongo_binary must not be empty");
        }
        if self.host.trim().is_empty() {
            return invalid("host must not be empty");
        }
        if self.context.trim().is_empty() {
            return invalid("context must not be empty");
        }
        if self.initial_wait.is_zero() {
            return invalid("initial_wait must be greater than zero");
        }
        Ok(())
    }
}
