//! CLI library components for Mining Model Studio.

pub mod batch;
pub mod logging;
pub mod prompt;
pub mod spec_table;
