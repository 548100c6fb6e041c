#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Xml(#[from] dmm_xml::XmlError),

    #[error("template is missing a required <{name}> element")]
    MissingNode { name: String },

    #[error("no output column selected")]
    MissingSelection,

    #[error("no declared column matches reference \"{reference}\"")]
    UnknownColumn { reference: String },

    #[error("invalid manifest {path}: {message}")]
    ManifestFormat { path: PathBuf, message: String },
}

impl DocumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_node(name: impl Into<String>) -> Self {
        Self::MissingNode { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, DocumentError>;
