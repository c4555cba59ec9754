use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::alerting::AlertPolicy;
use crate::notifications::{models::PushoverConfig, senders::pushover::DEFAULT_API_URL};

pub const DEFAULT_STATUS_PARAM: &str = "/homelab/plex_remote_status";
pub const DEFAULT_MARKER: &str = "machineIdentifier=";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse TOML from config file at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Fully resolved settings for one probe run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub check_url: String,
    pub status_param: String,
    pub pushover: PushoverConfig,
    pub expected_marker: String,
    pub probe_timeout: Duration,
    pub service_name: String,
    pub data_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub alert_on_initial_down: bool,
}

/// One layer of configuration; any field may be absent.
#[derive(Deserialize, Default, Debug)]
pub struct PartialProbeConfig {
    check_url: Option<String>,
    status_param: Option<String>,
    pushover_token: Option<String>,
    pushover_user: Option<String>,
    pushover_api_url: Option<String>,
    expected_marker: Option<String>,
    probe_timeout_secs: Option<u64>,
    service_name: Option<String>,
    data_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    alert_on_initial_down: Option<bool>,
}

impl PartialProbeConfig {
    /// Reads a TOML layer. A missing file yields an empty layer.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a layer from `KEY=value` pairs, e.g. the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter(vars)?)
    }
}

// Empty strings count as unset.
fn pick(primary: Option<String>, fallback: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
}

impl ProbeConfig {
    /// Loads `.env`, the optional TOML file, then the environment. The
    /// environment overrides the file.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path) => PartialProbeConfig::from_file(path)?,
            None => PartialProbeConfig::default(),
        };
        let env_config = PartialProbeConfig::from_vars(std::env::vars())?;

        Self::merge(file_config, env_config)
    }

    pub fn merge(
        file_config: PartialProbeConfig,
        env_config: PartialProbeConfig,
    ) -> Result<Self, ConfigError> {
        let check_url = pick(env_config.check_url, file_config.check_url)
            .ok_or(ConfigError::Missing("CHECK_URL"))?;
        let token = pick(env_config.pushover_token, file_config.pushover_token)
            .ok_or(ConfigError::Missing("PUSHOVER_TOKEN"))?;
        let user = pick(env_config.pushover_user, file_config.pushover_user)
            .ok_or(ConfigError::Missing("PUSHOVER_USER"))?;

        let probe_timeout_secs = env_config
            .probe_timeout_secs
            .or(file_config.probe_timeout_secs)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS);

        let config = ProbeConfig {
            check_url,
            status_param: pick(env_config.status_param, file_config.status_param)
                .unwrap_or_else(|| DEFAULT_STATUS_PARAM.to_string()),
            pushover: PushoverConfig {
                api_url: pick(env_config.pushover_api_url, file_config.pushover_api_url)
                    .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
                token,
                user,
            },
            // The marker is matched verbatim, so surrounding spaces are kept.
            expected_marker: env_config
                .expected_marker
                .or(file_config.expected_marker)
                .unwrap_or_else(|| DEFAULT_MARKER.to_string()),
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            service_name: pick(env_config.service_name, file_config.service_name)
                .unwrap_or_else(|| AlertPolicy::default().service_name),
            data_dir: env_config
                .data_dir
                .or(file_config.data_dir)
                .unwrap_or_else(|| PathBuf::from("data")),
            log_dir: env_config.log_dir.or(file_config.log_dir),
            alert_on_initial_down: env_config
                .alert_on_initial_down
                .or(file_config.alert_on_initial_down)
                .unwrap_or(true),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.check_url).map_err(|e| ConfigError::Invalid {
            key: "CHECK_URL",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                key: "CHECK_URL",
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "PROBE_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.expected_marker.is_empty() {
            return Err(ConfigError::Invalid {
                key: "EXPECTED_MARKER",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            service_name: self.service_name.clone(),
            alert_on_initial_down: self.alert_on_initial_down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> PartialProbeConfig {
        PartialProbeConfig::from_vars(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CHECK_URL", "https://plex.example.com/identity"),
            ("PUSHOVER_TOKEN", "app-token"),
            ("PUSHOVER_USER", "user-key"),
        ]
    }

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = ProbeConfig::merge(PartialProbeConfig::default(), vars(&required())).unwrap();

        assert_eq!(config.check_url, "https://plex.example.com/identity");
        assert_eq!(config.status_param, DEFAULT_STATUS_PARAM);
        assert_eq!(config.pushover.api_url, DEFAULT_API_URL);
        assert_eq!(config.pushover.token, "app-token");
        assert_eq!(config.expected_marker, DEFAULT_MARKER);
        assert_eq!(config.probe_timeout, Duration::from_secs(10));
        assert_eq!(config.service_name, "Plex remote");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.log_dir.is_none());
        assert!(config.alert_on_initial_down);
    }

    #[test]
    fn missing_required_key_is_reported() {
        let err = ProbeConfig::merge(
            PartialProbeConfig::default(),
            vars(&[("CHECK_URL", "https://x/identity"), ("PUSHOVER_TOKEN", "t")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PUSHOVER_USER")));

        let err = ProbeConfig::merge(
            PartialProbeConfig::default(),
            vars(&[("CHECK_URL", ""), ("PUSHOVER_TOKEN", "t"), ("PUSHOVER_USER", "u")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CHECK_URL")));
    }

    #[test]
    fn environment_overrides_file() {
        let file: PartialProbeConfig = toml::from_str(
            r#"
            check_url = "https://file.example.com/identity"
            pushover_token = "file-token"
            pushover_user = "file-user"
            status_param = "/file/status"
            probe_timeout_secs = 3
            alert_on_initial_down = false
            "#,
        )
        .unwrap();
        let env = vars(&[
            ("CHECK_URL", "https://env.example.com/identity"),
            ("PROBE_TIMEOUT_SECS", "7"),
            ("SERVICE_NAME", "Jellyfin"),
        ]);

        let config = ProbeConfig::merge(file, env).unwrap();
        assert_eq!(config.check_url, "https://env.example.com/identity");
        assert_eq!(config.pushover.token, "file-token");
        assert_eq!(config.status_param, "/file/status");
        assert_eq!(config.probe_timeout, Duration::from_secs(7));
        assert_eq!(config.service_name, "Jellyfin");
        assert!(!config.alert_on_initial_down);
        assert_eq!(config.alert_policy().service_name, "Jellyfin");
    }

    #[test]
    fn rejects_invalid_values() {
        let mut pairs = required();
        pairs.push(("PROBE_TIMEOUT_SECS", "0"));
        assert!(matches!(
            ProbeConfig::merge(PartialProbeConfig::default(), vars(&pairs)),
            Err(ConfigError::Invalid { key: "PROBE_TIMEOUT_SECS", .. })
        ));

        let mut pairs = required();
        pairs[0] = ("CHECK_URL", "ftp://plex.example.com/identity");
        assert!(matches!(
            ProbeConfig::merge(PartialProbeConfig::default(), vars(&pairs)),
            Err(ConfigError::Invalid { key: "CHECK_URL", .. })
        ));

        let mut pairs = required();
        pairs.push(("EXPECTED_MARKER", ""));
        assert!(matches!(
            ProbeConfig::merge(PartialProbeConfig::default(), vars(&pairs)),
            Err(ConfigError::Invalid { key: "EXPECTED_MARKER", .. })
        ));
    }

    #[test]
    fn non_numeric_timeout_fails_to_parse() {
        let result = PartialProbeConfig::from_vars(vec![(
            "PROBE_TIMEOUT_SECS".to_string(),
            "soon".to_string(),
        )]);
        assert!(matches!(result, Err(ConfigError::Env(_))));
    }

    #[test]
    fn missing_config_file_is_an_empty_layer() {
        let dir = tempfile::TempDir::new().unwrap();
        let layer = PartialProbeConfig::from_file(&dir.path().join("absent.toml")).unwrap();
        assert!(layer.check_url.is_none());
    }
}
