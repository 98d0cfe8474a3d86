mod app_config;
mod config;
pub mod interval;
pub mod session;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use interval::{parse_interval, IntervalError};
pub use session::{Session, SessionError, SessionFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("cannot locate the session file: set GATOR_CONFIG_PATH or HOME")]
    NoSessionPath,
}
