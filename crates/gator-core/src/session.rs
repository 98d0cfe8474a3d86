//! The on-disk session file and the resolved [`Session`] handed to
//! authenticated commands.
//!
//! The file only records *which* user is current. Resolving that name to a
//! database row happens once per invocation in the CLI; handlers receive the
//! resulting [`Session`] value instead of rereading the file.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no user is logged in; run `gator login <name>` or `gator register <name>`")]
    NoCurrentUser,

    #[error("current user '{0}' not found")]
    UnknownUser(String),
}

/// Contents of `~/.gatorconfig.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_name: Option<String>,
}

impl SessionFile {
    /// Read the session file. A missing file is an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be read, or
    /// [`SessionError::Json`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| SessionError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Write the file through a temporary sibling and rename it into place.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the directory, temp file, or rename fails.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_vec_pretty(self).map_err(|source| SessionError::Json {
            path: path.display().to_string(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Record `name` as the current user and persist the file.
    ///
    /// # Errors
    ///
    /// See [`SessionFile::save`].
    pub fn set_user(&mut self, path: &Path, name: &str) -> Result<(), SessionError> {
        self.current_user_name = Some(name.to_string());
        self.save(path)
    }

    /// The current user name, or [`SessionError::NoCurrentUser`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoCurrentUser`] when no user has logged in.
    pub fn require_user_name(&self) -> Result<&str, SessionError> {
        self.current_user_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(SessionError::NoCurrentUser)
    }
}

/// The authenticated user for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub user_name: String,
}
