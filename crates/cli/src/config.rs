//! Process configuration.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. An optional TOML file (`config.toml` unless `--config` says otherwise).
//!    A missing file is fine; an unreadable or malformed one is an error.
//! 3. `FOCALBOARD_MONITOR_*` environment variables.
//!
//! ```toml
//! [server]
//! address = "0.0.0.0:8080"
//!
//! [auth]
//! token = "change-me"
//!
//! [log]
//! level = "INFO"
//! filePath = ""
//! ```
//!
//! Only TOML is read. Deployments that still carry a `config.yaml` must
//! convert it: the YAML file is never opened, and since a missing
//! `config.toml` falls back to defaults the old settings would be dropped
//! without an error.

use std::{
    env, fs,
    io::ErrorKind,
    net::{AddrParseError, SocketAddr},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "FOCALBOARD_MONITOR";

/// Tokens shipped in sample configs. Running with one of these is allowed but
/// logged as a security warning.
pub const DEFAULT_TOKENS: [&str; 2] = [
    "default-secret-token",
    "a-very-secret-token-you-should-change",
];

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `server.address` is not a socket address.
    #[error("Invalid server address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    /// `auth.token` is empty, which would accept unauthenticated requests.
    #[error("auth.token must not be empty")]
    EmptyToken,
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address. `":8080"` is accepted as shorthand for all interfaces.
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8080".into(),
        }
    }
}

/// Webhook authentication settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared secret expected in the `Authorization: Bearer` header.
    pub token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKENS[0].into(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `DEBUG`, `INFO`, `WARN` or `ERROR`; anything else means `INFO`.
    pub level: String,
    /// Append JSON logs to this file instead of stdout when non-empty.
    #[serde(rename = "filePath", alias = "file_path")]
    pub file_path: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "INFO".into(),
            file_path: String::new(),
        }
    }
}

impl Config {
    /// Loads `path` (if present), applies environment overrides and validates
    /// the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reads the TOML file at `path`, falling back to defaults when it does
    /// not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Overrides fields from `FOCALBOARD_MONITOR_<SECTION>_<KEY>` variables
    /// resolved through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields: [(&str, &mut String); 4] = [
            ("SERVER_ADDRESS", &mut self.server.address),
            ("AUTH_TOKEN", &mut self.auth.token),
            ("LOG_LEVEL", &mut self.log.level),
            ("LOG_FILEPATH", &mut self.log.file_path),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(&format!("{ENV_PREFIX}_{key}")) {
                *field = value;
            }
        }
    }

    /// Rejects settings the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.auth.token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(())
    }

    /// Parses `server.address`, expanding the `":port"` shorthand.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = self.server.address.trim();
        let expanded = if address.starts_with(':') {
            format!("0.0.0.0{address}")
        } else {
            address.to_string()
        };
        expanded
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                address: self.server.address.clone(),
                source,
            })
    }

    /// Returns `true` when the webhook token is one of the published samples.
    pub fn uses_default_token(&self) -> bool {
        DEFAULT_TOKENS.contains(&self.auth.token.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.address, "0.0.0.0:8080");
        assert_eq!(config.auth.token, "default-secret-token");
        assert_eq!(config.log.level, "INFO");
        assert!(config.log.file_path.is_empty());
        assert!(config.uses_default_token());
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            concat!(
                "[server]\naddress = \"127.0.0.1:9000\"\n",
                "[auth]\ntoken = \"s3cret\"\n",
                "[log]\nlevel = \"debug\"\nfilePath = \"/tmp/monitor.log\"\n",
            ),
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.server.address, "127.0.0.1:9000");
        assert_eq!(config.auth.token, "s3cret");
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.file_path, "/tmp/monitor.log");
        assert!(!config.uses_default_token());
    }

    #[test]
    fn yaml_config_beside_missing_toml_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "server:\n  address: \"127.0.0.1:9000\"\nauth:\n  token: \"s3cret\"\n",
        )
        .unwrap();

        let config = Config::from_file(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[auth]\ntoken = \"only-this\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();

        assert_eq!(config.auth.token, "only-this");
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\naddress = ").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<String, String> = [
            ("FOCALBOARD_MONITOR_SERVER_ADDRESS", ":7000"),
            ("FOCALBOARD_MONITOR_AUTH_TOKEN", "from-env"),
            ("FOCALBOARD_MONITOR_LOG_FILEPATH", "/var/log/m.log"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let mut config = Config::default();

        config.apply_overrides(|key| vars.get(key).cloned());

        assert_eq!(config.server.address, ":7000");
        assert_eq!(config.auth.token, "from-env");
        assert_eq!(config.log.level, "INFO");
        assert_eq!(config.log.file_path, "/var/log/m.log");
    }

    #[test]
    fn load_applies_process_environment() {
        let _g = ENV_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[log]\nlevel = \"WARN\"\n").unwrap();
        env::set_var("FOCALBOARD_MONITOR_LOG_LEVEL", "ERROR");
        env::remove_var("FOCALBOARD_MONITOR_SERVER_ADDRESS");
        env::remove_var("FOCALBOARD_MONITOR_AUTH_TOKEN");
        env::remove_var("FOCALBOARD_MONITOR_LOG_FILEPATH");

        let config = Config::load(&path);
        env::remove_var("FOCALBOARD_MONITOR_LOG_LEVEL");

        assert_eq!(config.unwrap().log.level, "ERROR");
    }

    #[test]
    fn colon_port_shorthand_binds_all_interfaces() {
        let mut config = Config::default();
        config.server.address = ":8081".into();
        assert_eq!(
            config.socket_addr().unwrap(),
            "0.0.0.0:8081".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn invalid_address_fails_validation() {
        let mut config = Config::default();
        config.server.address = "not-an-address".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn empty_token_fails_validation() {
        let mut config = Config::default();
        config.auth.token.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyToken)));
    }
}
