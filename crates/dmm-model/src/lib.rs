#![deny(unsafe_code)]

pub mod identity;
pub mod report;
pub mod synthesizer;

pub use identity::{canonical, level, names_match, shortname};
pub use report::{BatchReport, UnitOutcome, UnitResult};
pub use synthesizer::{DEFAULT_NAME_LIMIT, NameSynthesizer, TokenStyle, derive_root, truncate_name};
