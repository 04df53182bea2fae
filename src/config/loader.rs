use std::path::Path;
use tokio::fs;

use super::{global_config_path, ConfigOverlay, ShardctlConfig};
use crate::error::{ErrorCode, Result, ShardctlError};

/// Builds a [`ShardctlConfig`] from defaults, files, the environment and
/// command-line overrides, each layer overriding the previous one.
pub struct ConfigLoader {
    config: ShardctlConfig,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config: ShardctlConfig::default(),
        }
    }

    /// Apply the per-user config file when one exists
    pub async fn load_global(&mut self) -> Result<()> {
        let Some(path) = global_config_path() else {
            tracing::debug!("No home directory; skipping global configuration");
            return Ok(());
        };

        if fs::try_exists(&path).await.unwrap_or(false) {
            self.load_file(&path).await?;
        }
        Ok(())
    }

    /// Apply a config file that must exist (`.toml`, `.yml` or `.yaml`)
    pub async fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                ErrorCode::CONFIG_NOT_FOUND
            } else {
                ErrorCode::CONFIG_GENERIC
            };
            ShardctlError::config_with_code(
                code,
                "Cannot read configuration file",
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })?;

        let overlay = parse_overlay(path, &content).map_err(|e| match e {
            ShardctlError::Config {
                code,
                message,
                source,
                ..
            } => ShardctlError::Config {
                code,
                message,
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        })?;

        tracing::debug!("Loaded configuration from {}", path.display());
        self.apply(overlay)
    }

    /// Apply `SHARDCTL_*` environment variables
    pub fn load_env(&mut self) -> Result<()> {
        let overlay = ConfigOverlay::from_env()?;
        self.apply(overlay)
    }

    pub fn apply(&mut self, overlay: ConfigOverlay) -> Result<()> {
        overlay.apply(&mut self.config)
    }

    /// Validate and return the effective configuration
    pub fn finish(self) -> Result<ShardctlConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_overlay(path: &Path, content: &str) -> Result<ConfigOverlay> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(toml::from_str(content)?),
        Some("yml") | Some("yaml") => Ok(serde_yaml::from_str(content)?),
        other => Err(ShardctlError::config_with_code(
            ErrorCode::CONFIG_UNSUPPORTED_FORMAT,
            format!(
                "Unsupported configuration format {:?}; use .toml, .yml or .yaml",
                other.unwrap_or("")
            ),
            Some(path.to_path_buf()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shardctl.toml");
        std::fs::write(
            &path,
            r#"
host = "mongos1:27017"
max_retries = 2
command_timeout = "30s"
extra_args = "--ssl"
"#,
        )
        .unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&path).await.unwrap();
        let config = loader.finish().unwrap();

        assert_eq!(config.host, "mongos1:27017");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.command_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.extra_args, vec!["--ssl"]);
        assert_eq!(config.context, "admin");
    }

    #[tokio::test]
    async fn test_load_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shardctl.yml");
        std::fs::write(&path, "context: config\ninitial_wait: 1s\n").unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&path).await.unwrap();
        let config = loader.finish().unwrap();

        assert_eq!(config.context, "config");
        assert_eq!(config.initial_wait, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_later_layers_win() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shardctl.toml");
        std::fs::write(&path, "host = \"from-file:27017\"\nmax_retries = 7\n").unwrap();

        let mut loader = ConfigLoader::new();
        loader.load_file(&path).await.unwrap();
        loader
            .apply(ConfigOverlay {
                host: Some("from-cli:27017".to_string()),
                ..Default::default()
            })
            .unwrap();
        let config = loader.finish().unwrap();

        assert_eq!(config.host, "from-cli:27017");
        assert_eq!(config.max_retries, 7);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert!(err.user_message().contains("absent.toml"));
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shardctl.toml");
        std::fs::write(&path, "hostname = \"typo:27017\"\n").unwrap();

        let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
        assert!(matches!(err, ShardctlError::Config { path: Some(_), .. }));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shardctl.ini");
        std::fs::write(&path, "host=x\n").unwrap();

        let err = ConfigLoader::new().load_file(&path).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_UNSUPPORTED_FORMAT);
    }

    #[test]
    fn test_finish_validates() {
        let mut loader = ConfigLoader::new();
        loader
            .apply(ConfigOverlay {
                context: Some(String::new()),
                ..Default::default()
            })
            .unwrap();
        assert!(loader.finish().is_err());
    }
}
