use std::{env, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

const SETTINGS_FILENAME: &str = "settings.json";
const SETTINGS_PATH_VAR: &str = "TASKDECK_SETTINGS";
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub tcp_socket_binding: String,
    pub tcp_socket_port: u16,
    pub database_path: String,
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_in_minutes: u32,
    /// Origin allowed to make credentialed CORS requests.
    pub client_url: String,
    /// Built frontend to serve for non-API paths, if any.
    #[serde(default)]
    pub static_dir: Option<String>,
    /// Adds `Secure` to the session cookie.
    #[serde(default)]
    pub secure_cookies: bool,
    /// Answer 404 instead of 403 for tasks owned by someone else.
    #[serde(default)]
    pub conceal_foreign_tasks: bool,
}

fn default_jwt_expiration() -> u32 {
    7 * 24 * 60
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl Settings {
    /// Load from `$TASKDECK_SETTINGS`, falling back to `settings.json` in the
    /// working directory, and validate.
    pub fn load() -> Result<Settings, SettingsError> {
        let path = env::var(SETTINGS_PATH_VAR).unwrap_or_else(|_| SETTINGS_FILENAME.to_string());
        Settings::load_from(path)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings: Settings = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.jwt_secret.chars().count() < MIN_JWT_SECRET_LEN {
            return Err(SettingsError::Invalid(format!(
                "jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters long"
            )));
        }
        if !self.client_url.starts_with("http://") && !self.client_url.starts_with("https://") {
            return Err(SettingsError::Invalid("client_url must be an http(s) URL".to_string()));
        }
        if self.tcp_socket_port == 0 {
            return Err(SettingsError::Invalid("tcp_socket_port must be non-zero".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(SettingsError::Invalid("database_path must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.tcp_socket_binding, self.tcp_socket_port)
    }
}

#[cfg(test)]
impl Settings {
    /// Valid settings for tests; the database path is unused by the service layer.
    pub fn for_tests() -> Settings {
        Settings {
            tcp_socket_binding: "127.0.0.1".into(),
            tcp_socket_port: 5000,
            database_path: "unused.redb".into(),
            jwt_secret: "a-test-secret-that-is-definitely-long-enough".into(),
            jwt_expiration_in_minutes: 60,
            client_url: "http://localhost:5173".into(),
            static_dir: None,
            secure_cookies: false,
            conceal_foreign_tasks: false,
        }
    }
}
