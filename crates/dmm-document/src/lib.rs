#![deny(unsafe_code)]

//! Mining-model document engine: typed column views, the mutation pipeline
//! that turns a template into a generated mining-structure definition, and
//! project-manifest synchronization.

pub mod column;
pub mod document;
pub mod error;
pub mod manifest;

pub use column::{MiningColumn, Role};
pub use document::{
    Document, MODEL_CATEGORY_MARKERS, PersistOutcome, ROOT_NAMESPACE_HEADER, Selection,
    delete_artifact,
};
pub use error::{DocumentError, Result};
pub use manifest::ProjectManifest;

/// File extension of generated mining-structure artifacts.
pub const MODEL_EXTENSION: &str = "dmm";
