use std::path::PathBuf;

use thiserror::Error;

/// The typed error surface of the fingerprinting core (see spec §7/§4.8).
///
/// `EmptyFingerprint` is deliberately absent here: an empty peak or hash list is not an
/// error, it is a normal (if unlucky) result represented by an empty `Vec`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to acquire audio from {path}: {message}")]
    Acquisition { path: PathBuf, message: String },

    #[error("failed to decode audio at {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("store I/O error: {0}")]
    StoreIo(#[from] diesel::result::Error),

    #[error("failed to open store at {path}: {message}")]
    StoreConnection { path: PathBuf, message: String },

    #[error(
        "index was built with a different parameter set (stored {stored:?}, requested {requested:?})"
    )]
    SchemaMismatch {
        stored: Box<crate::config::Config>,
        requested: Box<crate::config::Config>,
    },

    #[error("usage error: {0}")]
    Usage(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
