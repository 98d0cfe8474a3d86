use std::path::PathBuf;

use crate::{ConfigError, SessionFile};

#[derive(Clone)]
pub struct AppConfig {
    /// `DATABASE_URL` from the environment. When unset the session file's
    /// `db_url` is used instead, see [`AppConfig::resolve_database_url`].
    pub database_url: Option<String>,
    pub log_level: String,
    pub session_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl AppConfig {
    /// Pick the database URL: the environment wins over the session file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when neither source provides one.
    pub fn resolve_database_url(&self, file: &SessionFile) -> Result<String, ConfigError> {
        self.database_url
            .clone()
            .or_else(|| file.db_url.clone())
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("session_path", &self.session_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
