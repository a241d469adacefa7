//! Loading and validating `SiteOptions`.

use std::path::{Path, PathBuf};

use insite_telemetry::parse_flag;
use tracing::{debug, info};

use super::{ConfigError, DatabaseOptions, SiteOptions, TlsOptions};

/// Options file read by [`SiteOptions::from_env`] when `INSITE_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "insite.json";

/// Database name used when `INSITE_DATABASE_URL` introduces a database section.
pub const DEFAULT_DATABASE_NAME: &str = "insite";

impl SiteOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a JSON options file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), "Loaded options file");
        Self::from_json_str(&json)
    }

    /// Load options the way the `insite` binary does.
    ///
    /// # Environment Variables
    ///
    /// - `INSITE_CONFIG`: options file (default: `insite.json`, skipped if missing)
    /// - `INSITE_PORT`: shared binding port
    /// - `INSITE_DATABASE_URL`: database url
    /// - `INSITE_VERBOSE_CONNECTIONS`: log every real-time connection
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = match lookup("INSITE_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    info!("No {} found, starting from empty options", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        options.apply_overrides(lookup)?;
        Ok(options)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("INSITE_PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid(format!("INSITE_PORT is not a port: {port:?}")))?;
            self.network.get_or_insert_with(Default::default).port = Some(port);
        }

        if let Some(url) = lookup("INSITE_DATABASE_URL") {
            match &mut self.database {
                Some(database) => database.url = url,
                None => self.database = Some(DatabaseOptions::new(url, DEFAULT_DATABASE_NAME)),
            }
        }

        if let Some(flag) = lookup("INSITE_VERBOSE_CONNECTIONS") {
            self.verbose_connection_logs = parse_flag(&flag);
        }

        Ok(())
    }

    /// Reject values no collaborator could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(database) = &self.database {
            if database.url.trim().is_empty() {
                return Err(ConfigError::Invalid("database.url is empty".into()));
            }
            if database.name.trim().is_empty() {
                return Err(ConfigError::Invalid("database.name is empty".into()));
            }
        }

        let ports = [
            ("network.port", self.network.as_ref().and_then(|n| n.port)),
            ("realtime.port", self.realtime.as_ref().and_then(|r| r.port)),
            ("http.port", self.http.as_ref().and_then(|h| h.port)),
        ];
        for (key, port) in ports {
            if port == Some(0) {
                return Err(ConfigError::Invalid(format!("{key} must not be 0")));
            }
        }

        let tls = [
            ("network.tls", self.network.as_ref().and_then(|n| n.tls.as_ref())),
            ("realtime.tls", self.realtime.as_ref().and_then(|r| r.tls.as_ref())),
            ("http.tls", self.http.as_ref().and_then(|h| h.tls.as_ref())),
        ];
        for (key, tls) in tls {
            if let Some(TlsOptions { cert, key: private_key }) = tls {
                if cert.is_empty() || private_key.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "{key} needs both cert and key"
                    )));
                }
            }
        }

        Ok(())
    }
}
