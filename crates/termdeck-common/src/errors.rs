use std::path::PathBuf;

use crate::id::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown session: {0}")]
    UnknownSession(SessionId),

    #[error("session limit reached ({max} open)")]
    SessionLimit { max: usize },

    #[error("pty error: {0}")]
    Pty(String),

    #[error("ipc error: {0}")]
    Ipc(String),

    #[error("fit error: {0}")]
    Fit(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("{0}")]
    Other(String),
}
