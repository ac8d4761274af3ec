use std::{io, path::PathBuf};

use fluid_tokens_core::TokenError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Token source {} does not exist", .path.display())]
    MissingInputFile { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config file {} does not exist", .path.display())]
    MissingConfig { path: PathBuf },

    #[error("Invalid config {}: {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Failed to serialize {artifact}: {source}")]
    Serialize {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
