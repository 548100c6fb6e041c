//! Command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use tracing::info;

use dmm_cli::batch::{self, BatchOptions, MANIFEST_FILE_NAME};
use dmm_cli::{prompt, spec_table};
use dmm_document::{
    Document, MODEL_EXTENSION, MiningColumn, PersistOutcome, ProjectManifest, Selection,
    delete_artifact,
};
use dmm_model::synthesizer::{NameSynthesizer, TokenStyle};
use dmm_model::{BatchReport, derive_root};

use crate::cli::{BatchArgs, ColumnsArgs, DeleteArgs, ExportArgs, GenerateArgs, TargetArgs};
use crate::summary::{apply_table_style, print_batch_summary};

pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    let mut document = Document::load(&args.template)?;

    let selection = if args.inputs.is_empty() && args.output.is_none() {
        select_interactively(&document.declared_columns()?)?
    } else {
        let mut selection = Selection::new();
        for reference in &args.inputs {
            selection.add_input(document.resolve_column(reference)?);
        }
        let output = args
            .output
            .as_deref()
            .ok_or_else(|| anyhow!("--output is required when --input is given"))?;
        selection.set_output(document.resolve_column(output)?);
        selection
    };

    let synthesizer = NameSynthesizer::new(args.length_limit, TokenStyle::default());
    let name = document.synthesized_name(&selection, &synthesizer, args.name.as_deref());
    if !args.yes {
        let question = format!("Generate artifact '{name}'?");
        if !prompt::confirm(&question, true).context("read confirmation")? {
            println!("Aborted.");
            return Ok(());
        }
    }

    document.prepare(&selection, &name, args.length_limit)?;
    if !args.no_prune {
        let removed = document.prune_unused(&selection, &args.ignore)?;
        info!(removed, "pruned unused structure columns");
    }

    let dir = artifact_dir(&args.template, &args.target);
    let manifest = manifest_for(&dir, &args.target);
    let mut confirm = overwrite_confirm(args.force);
    match document.persist(&name, Some(&dir), &manifest, &mut confirm)? {
        PersistOutcome::Written(path) => println!("Wrote {}", path.display()),
        PersistOutcome::Skipped => println!("Skipped {name} (existing artifact kept)."),
    }
    Ok(())
}

/// Numbered-menu selection: repeated input picks finished by a blank line,
/// then exactly one output pick. A menu pick takes the listed column as-is,
/// without reference resolution.
fn select_interactively(columns: &[MiningColumn]) -> Result<Selection> {
    let names: Vec<&str> = columns.iter().map(MiningColumn::display_name).collect();
    let mut selection = Selection::new();
    loop {
        let choice = prompt::select(
            "Select an input column (blank line to finish):",
            &names,
            true,
        )
        .context("read input selection")?;
        let Some(index) = choice else { break };
        selection.add_input(columns[index].clone());
    }
    let output = prompt::select("Select the output column:", &names, false)
        .context("read output selection")?
        .ok_or_else(|| anyhow!("no output column selected"))?;
    selection.set_output(columns[output].clone());
    Ok(selection)
}

pub fn run_batch(args: &BatchArgs) -> Result<BatchReport> {
    let options = BatchOptions {
        template: args.template.clone(),
        spec_table: args.spec_table.clone(),
        output_dir: args.target.output_dir.clone(),
        manifest: args.target.manifest.clone(),
        ignore: args.ignore.clone(),
        no_prune: args.no_prune,
        length_limit: args.length_limit,
        force: args.force,
        report: args.report.clone(),
    };
    let report = batch::run_batch(&options)?;
    print_batch_summary(&report);
    Ok(report)
}

pub fn run_export(args: &ExportArgs) -> Result<()> {
    let document = Document::load(&args.template)?;
    let columns = document.declared_columns()?;
    let shortnames = spec_table::export_shortnames(&columns);
    let out = match &args.out {
        Some(path) => path.clone(),
        None => default_matrix_path(&args.template),
    };
    spec_table::write_column_matrix(&out, &shortnames)?;
    println!(
        "Wrote {} ({} columns)",
        out.display(),
        shortnames.len()
    );
    Ok(())
}

fn default_matrix_path(template: &Path) -> PathBuf {
    let stem = template
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = format!("{}_spec.csv", derive_root(&stem));
    template
        .parent()
        .map_or_else(|| PathBuf::from(&file), |dir| dir.join(&file))
}

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let document = Document::load(&args.template)?;
    let columns = document.declared_columns()?;
    let mut table = Table::new();
    table.set_header(vec!["Name", "Source ID", "Level", "Nested"]);
    apply_table_style(&mut table);
    for column in &columns {
        table.add_row(vec![
            column.display_name().to_string(),
            column.source_id().to_string(),
            column.level().to_string(),
            if column.is_nested() { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{table}");
    println!("{} columns declared", columns.len());
    Ok(())
}

pub fn run_delete(args: &DeleteArgs) -> Result<()> {
    let dir = artifact_dir(&args.template, &args.target);
    let manifest = manifest_for(&dir, &args.target);
    if !args.yes {
        let question = format!(
            "Delete {} artifact(s) from {}?",
            args.names.len(),
            dir.display()
        );
        if !prompt::confirm(&question, false).context("read confirmation")? {
            println!("Aborted.");
            return Ok(());
        }
    }
    for name in &args.names {
        delete_artifact(&dir, name, &manifest)?;
        println!("Deleted {name}.{MODEL_EXTENSION}");
    }
    Ok(())
}

fn artifact_dir(template: &Path, target: &TargetArgs) -> PathBuf {
    match &target.output_dir {
        Some(dir) => dir.clone(),
        None => template
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
    }
}

fn manifest_for(dir: &Path, target: &TargetArgs) -> ProjectManifest {
    match &target.manifest {
        Some(path) => ProjectManifest::new(path.clone()),
        None => ProjectManifest::new(dir.join(MANIFEST_FILE_NAME)),
    }
}

/// Overwrite policy for single-artifact generation: ask on the terminal
/// unless `--force` was given.
fn overwrite_confirm(force: bool) -> impl FnMut(&Path) -> bool {
    move |target: &Path| {
        if force {
            return true;
        }
        let question = format!("{} exists. Overwrite?", target.display());
        prompt::confirm(&question, false).unwrap_or(false)
    }
}
