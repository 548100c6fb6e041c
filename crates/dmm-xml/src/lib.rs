#![deny(unsafe_code)]

//! Minimal owned XML element tree over `quick-xml`.
//!
//! This is not a general XML library. It carries exactly what the document
//! mutation engine needs: an owned tree with qualified-name accessors,
//! whitespace-preserving round trips, and deep attribute stripping.
//! Namespaces are not resolved; tag and attribute names compare as written.

pub mod error;
pub mod reader;
pub mod tree;
pub mod writer;

pub use error::XmlError;
pub use reader::parse_str;
pub use tree::{Element, Node, XmlDocument};
