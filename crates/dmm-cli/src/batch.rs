//! Batch generation driver.
//!
//! Each spec-table row is one generation unit with its own freshly loaded
//! template. A failing unit is recorded and logged; later units still run.
//! Batch mode never prompts: an existing artifact skips the unit unless
//! `force` regenerates it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use dmm_document::{Document, MODEL_EXTENSION, PersistOutcome, ProjectManifest, Selection};
use dmm_model::synthesizer::{NameSynthesizer, TokenStyle};
use dmm_model::{BatchReport, DEFAULT_NAME_LIMIT, UnitOutcome, UnitResult};

use crate::spec_table::{self, SpecRow};

/// Default manifest file name, resolved inside the artifact directory.
pub const MANIFEST_FILE_NAME: &str = "project_items.txt";

/// Everything a batch run needs, independent of the argument parser.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub template: PathBuf,
    pub spec_table: PathBuf,
    /// Artifact directory; defaults to the template's directory.
    pub output_dir: Option<PathBuf>,
    /// Manifest path; defaults to `project_items.txt` in the artifact
    /// directory.
    pub manifest: Option<PathBuf>,
    pub ignore: Vec<String>,
    pub no_prune: bool,
    pub length_limit: usize,
    pub force: bool,
    /// When set, the JSON report is written here.
    pub report: Option<PathBuf>,
}

impl BatchOptions {
    pub fn new(template: impl Into<PathBuf>, spec_table: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            spec_table: spec_table.into(),
            output_dir: None,
            manifest: None,
            ignore: Vec::new(),
            no_prune: false,
            length_limit: DEFAULT_NAME_LIMIT,
            force: false,
            report: None,
        }
    }
}

/// Run the whole spec table and return the per-row report.
pub fn run_batch(options: &BatchOptions) -> Result<BatchReport> {
    let rows = spec_table::read_spec_table(&options.spec_table)?;
    if rows.is_empty() {
        bail!(
            "spec table {} has no data rows",
            options.spec_table.display()
        );
    }
    let dir = artifact_dir(options);
    let manifest = manifest_for(options, &dir);
    let synthesizer = NameSynthesizer::new(options.length_limit, TokenStyle::default());

    let mut report = BatchReport::new(options.template.clone());
    for row in &rows {
        let result = match run_batch_unit(options, row, &dir, &manifest, &synthesizer) {
            Ok((name, outcome)) => UnitResult {
                row: row.row,
                name: Some(name),
                outcome,
                message: None,
            },
            Err(error) => {
                warn!(row = row.row, %error, "generation unit failed");
                UnitResult {
                    row: row.row,
                    name: None,
                    outcome: UnitOutcome::Failed,
                    message: Some(format!("{error:#}")),
                }
            }
        };
        report.results.push(result);
    }

    if let Some(path) = &options.report {
        let json = serde_json::to_string_pretty(&report).context("serialize batch report")?;
        fs::write(path, json)
            .with_context(|| format!("write batch report: {}", path.display()))?;
        info!(path = %path.display(), "batch report written");
    }
    Ok(report)
}

fn run_batch_unit(
    options: &BatchOptions,
    row: &SpecRow,
    dir: &Path,
    manifest: &ProjectManifest,
    synthesizer: &NameSynthesizer,
) -> Result<(String, UnitOutcome)> {
    if row.output_ref.is_empty() {
        bail!("row {} has no output column reference", row.row);
    }
    let mut document = Document::load(&options.template)?;
    let mut selection = Selection::new();
    for reference in &row.input_refs {
        selection.add_input(document.resolve_column(reference)?);
    }
    selection.set_output(document.resolve_column(&row.output_ref)?);

    let name = document.synthesized_name(&selection, synthesizer, row.explicit_name.as_deref());
    let target = dir.join(format!("{name}.{MODEL_EXTENSION}"));
    if target.is_file() && !options.force {
        info!(target = %target.display(), "existing artifact kept");
        return Ok((name, UnitOutcome::Skipped));
    }

    document.prepare(&selection, &name, options.length_limit)?;
    if !options.no_prune {
        document.prune_unused(&selection, &options.ignore)?;
    }
    let mut confirm = |_: &Path| true;
    match document.persist(&name, Some(dir), manifest, &mut confirm)? {
        PersistOutcome::Written(_) => Ok((name, UnitOutcome::Written)),
        PersistOutcome::Skipped => Ok((name, UnitOutcome::Skipped)),
    }
}

fn artifact_dir(options: &BatchOptions) -> PathBuf {
    match &options.output_dir {
        Some(dir) => dir.clone(),
        None => options
            .template
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    }
}

fn manifest_for(options: &BatchOptions, dir: &Path) -> ProjectManifest {
    match &options.manifest {
        Some(path) => ProjectManifest::new(path.clone()),
        None => ProjectManifest::new(dir.join(MANIFEST_FILE_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?><MiningStructure xmlns="http://schemas.microsoft.com/analysisservices/2003/engine">
  <ID>muse_template</ID>
  <Name>muse_template</Name>
  <Columns>
    <Column>
      <ID>Genre</ID>
      <Name>Genre</Name>
    </Column>
    <Column>
      <ID>Figur_L2</ID>
      <Name>Figur_L2</Name>
    </Column>
    <Column>
      <ID>Rollenrelevanz</ID>
      <Name>Rollenrelevanz</Name>
    </Column>
  </Columns>
  <MiningModels>
    <MiningModel>
      <ID>basis</ID>
      <Name>basis</Name>
      <Columns>
        <Column>
          <ID>Fall</ID>
          <Name>Fall</Name>
          <SourceColumnID>Rollenrelevanz</SourceColumnID>
          <Usage>Key</Usage>
        </Column>
      </Columns>
    </MiningModel>
  </MiningModels>
</MiningStructure>
"#;

    fn options_in(dir: &Path, spec: &str) -> BatchOptions {
        let template = dir.join("muse_template.dmm");
        fs::write(&template, TEMPLATE).expect("write template");
        let spec_table = dir.join("spec.csv");
        fs::write(&spec_table, spec).expect("write spec table");
        BatchOptions::new(template, spec_table)
    }

    #[test]
    fn failed_row_does_not_stop_later_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = options_in(
            dir.path(),
            ",Figur,filename\n\
             Unbekannt,x,\n\
             Genre,x,\n",
        );
        let report = run_batch(&options).expect("run batch");

        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.written_count(), 1);
        assert_eq!(report.results[0].outcome, UnitOutcome::Failed);
        assert_eq!(report.results[1].outcome, UnitOutcome::Written);
        // The second unit really reached disk.
        assert!(dir.path().join("muse__Figur__Genre.dmm").is_file());
        let manifest = fs::read_to_string(dir.path().join(MANIFEST_FILE_NAME))
            .expect("read manifest");
        assert!(manifest.contains("muse__Figur__Genre.dmm"));
    }

    #[test]
    fn row_without_output_reference_fails_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = options_in(
            dir.path(),
            ",Figur,filename\n\
             ,x,\n\
             Genre,,extern\n",
        );
        let report = run_batch(&options).expect("run batch");
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.written_count(), 1);
        assert!(dir.path().join("extern.dmm").is_file());
    }

    #[test]
    fn existing_artifacts_are_skipped_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = options_in(dir.path(), ",Figur,filename\nGenre,x,\n");
        assert_eq!(run_batch(&options).expect("first run").written_count(), 1);

        let second = run_batch(&options).expect("second run");
        assert_eq!(second.written_count(), 0);
        assert_eq!(second.skipped_count(), 1);

        let forced = BatchOptions {
            force: true,
            ..options
        };
        assert_eq!(run_batch(&forced).expect("forced run").written_count(), 1);
    }
}
