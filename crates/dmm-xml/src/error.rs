#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed xml at byte {position}: {message}")]
    Parse { position: u64, message: String },

    #[error("invalid document: {message}")]
    Malformed { message: String },

    #[error("failed to serialize document: {message}")]
    Serialize { message: String },
}

impl XmlError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(position: u64, error: impl std::fmt::Display) -> Self {
        Self::Parse {
            position,
            message: error.to_string(),
        }
    }
}
