//! CLI argument definitions for Mining Model Studio.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use dmm_model::DEFAULT_NAME_LIMIT;

/// Structure columns excluded from pruning by default; they carry shared
/// context every generated model relies on.
pub const DEFAULT_IGNORED_COLUMNS: &[&str] = &[
    "Genre",
    "Rollenrelevanz",
    "Geschlecht",
    "Dominante Charaktereigenschaft",
];

#[derive(Parser)]
#[command(
    name = "mining-model-studio",
    version,
    about = "Mining Model Studio - Generate mining-structure definitions from a template",
    long_about = "Generate SQL Server Analysis Services mining-structure definitions (.dmm)\n\
                  from an XML template.\n\n\
                  Each run selects input and output columns, synthesizes a deterministic\n\
                  artifact name, rewrites the mining models around the selection, and keeps\n\
                  the project manifest in sync."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate one artifact from a template, interactively or via flags.
    Generate(GenerateArgs),

    /// Generate a whole batch of artifacts driven by a spec table (CSV).
    Batch(BatchArgs),

    /// Write an empty spec-table matrix for the template's columns.
    Export(ExportArgs),

    /// List the columns a template declares.
    Columns(ColumnsArgs),

    /// Delete generated artifacts and their manifest entries.
    Delete(DeleteArgs),
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Path to the mining-structure template (.dmm).
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Input column reference (repeatable). Omit together with --output for
    /// interactive selection.
    #[arg(long = "input", value_name = "NAME")]
    pub inputs: Vec<String>,

    /// Output (predicted) column reference.
    #[arg(long = "output", value_name = "NAME")]
    pub output: Option<String>,

    /// Explicit artifact name, bypassing name synthesis.
    #[arg(long = "name", value_name = "NAME")]
    pub name: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Column kept during pruning regardless of use (repeatable, replaces
    /// the default protected set).
    #[arg(long = "ignore", value_name = "NAME", default_values_t = DEFAULT_IGNORED_COLUMNS.iter().copied().map(String::from))]
    pub ignore: Vec<String>,

    /// Keep every declared structure column instead of pruning unused ones.
    #[arg(long = "no-prune")]
    pub no_prune: bool,

    /// Maximum synthesized-name length before token substitution.
    #[arg(long = "length-limit", value_name = "CHARS", default_value_t = DEFAULT_NAME_LIMIT)]
    pub length_limit: usize,

    /// Overwrite an existing artifact without asking.
    #[arg(long = "force")]
    pub force: bool,

    /// Skip the final confirmation prompt.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,
}

#[derive(Parser)]
pub struct BatchArgs {
    /// Path to the mining-structure template (.dmm).
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Path to the spec table (CSV) describing one artifact per row.
    #[arg(value_name = "SPEC_TABLE")]
    pub spec_table: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Column kept during pruning regardless of use (repeatable, replaces
    /// the default protected set).
    #[arg(long = "ignore", value_name = "NAME", default_values_t = DEFAULT_IGNORED_COLUMNS.iter().copied().map(String::from))]
    pub ignore: Vec<String>,

    /// Keep every declared structure column instead of pruning unused ones.
    #[arg(long = "no-prune")]
    pub no_prune: bool,

    /// Maximum synthesized-name length before token substitution.
    #[arg(long = "length-limit", value_name = "CHARS", default_value_t = DEFAULT_NAME_LIMIT)]
    pub length_limit: usize,

    /// Regenerate artifacts that already exist (default: skip them).
    #[arg(long = "force")]
    pub force: bool,

    /// Write a JSON batch report to this path.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Path to the mining-structure template (.dmm).
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Where to write the matrix (default: <root>_spec.csv next to the
    /// template).
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// Path to the mining-structure template (.dmm).
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,
}

#[derive(Parser)]
pub struct DeleteArgs {
    /// Path to the mining-structure template (.dmm); locates the artifact
    /// directory and manifest.
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Artifact names to delete (without the .dmm extension).
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Delete without asking for confirmation.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,
}

/// Where artifacts and the manifest live. Shared by every writing command.
#[derive(Parser)]
pub struct TargetArgs {
    /// Directory for generated artifacts (default: the template's directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Project manifest path (default: project_items.txt in the artifact
    /// directory).
    #[arg(long = "manifest", value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
