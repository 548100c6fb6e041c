#![deny(unsafe_code)]

//! The document mutation pipeline.
//!
//! A `Document` owns one parsed template tree. A caller loads it, resolves a
//! `Selection` against the declared columns, then runs `prepare`, optionally
//! `prune_unused`, and `persist`. The pipeline is meant to run at most once
//! per loaded instance; independent generation units each reload the
//! template.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use dmm_model::identity::canonical;
use dmm_model::synthesizer::{NameSynthesizer, truncate_name};
use dmm_xml::XmlDocument;

use crate::MODEL_EXTENSION;
use crate::column::{MiningColumn, Role};
use crate::error::{DocumentError, Result};
use crate::manifest::ProjectManifest;

/// Design-time marker attribute stripped before writing (local name; the
/// template carries it with a `dwd:` prefix).
const DESIGN_TIME_MARKER: &str = "design-time-name";

/// Model sections whose name contains one of these markers get their
/// identifier and name rewritten to `{marker}__{synthesized name}`.
pub const MODEL_CATEGORY_MARKERS: &[&str] = &["western", "highschool_komoedie"];

/// Complete namespace-declaration header written as the artifact's first
/// line. The serializer drops namespace declarations it never resolved, so
/// the first line is rewritten wholesale after serialization.
pub const ROOT_NAMESPACE_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<MiningStructure xmlns:xsd="http://www.w3.org/2001/XMLSchema""#,
    r#" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance""#,
    r#" xmlns:ddl2="http://schemas.microsoft.com/analysisservices/2003/engine/2""#,
    r#" xmlns:ddl2_2="http://schemas.microsoft.com/analysisservices/2003/engine/2/2""#,
    r#" xmlns:ddl100_100="http://schemas.microsoft.com/analysisservices/2008/engine/100/100""#,
    r#" xmlns:ddl200="http://schemas.microsoft.com/analysisservices/2010/engine/200""#,
    r#" xmlns:ddl200_200="http://schemas.microsoft.com/analysisservices/2010/engine/200/200""#,
    r#" xmlns:ddl300="http://schemas.microsoft.com/analysisservices/2011/engine/300""#,
    r#" xmlns:ddl300_300="http://schemas.microsoft.com/analysisservices/2011/engine/300/300""#,
    r#" xmlns:ddl400="http://schemas.microsoft.com/analysisservices/2012/engine/400""#,
    r#" xmlns:ddl400_400="http://schemas.microsoft.com/analysisservices/2012/engine/400/400""#,
    r#" xmlns:dwd="http://schemas.microsoft.com/DataWarehouse/Designer/1.0""#,
    r#" xmlns="http://schemas.microsoft.com/analysisservices/2003/engine">"#,
);

/// One generation unit's column selection. Created fresh per unit; never
/// shared across units.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    inputs: Vec<MiningColumn>,
    output: Option<MiningColumn>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, column: MiningColumn) {
        self.inputs.push(column);
    }

    pub fn set_output(&mut self, column: MiningColumn) {
        self.output = Some(column);
    }

    pub fn inputs(&self) -> &[MiningColumn] {
        &self.inputs
    }

    pub fn output(&self) -> Option<&MiningColumn> {
        self.output.as_ref()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
        self.output = None;
    }

    pub fn input_shortnames(&self) -> Vec<String> {
        self.inputs.iter().map(MiningColumn::shortname).collect()
    }
}

/// Result of a persist attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written(PathBuf),
    /// Target existed and overwrite was declined; not an error.
    Skipped,
}

#[derive(Debug)]
pub struct Document {
    template_path: PathBuf,
    root_token: String,
    xml: XmlDocument,
}

impl Document {
    /// Load a template from disk. The root naming token is derived from the
    /// file stem.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let template_path = path.into();
        if !template_path.is_file() {
            return Err(DocumentError::TemplateNotFound {
                path: template_path,
            });
        }
        let xml = XmlDocument::parse_file(&template_path)?;
        let stem = template_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let root_token = dmm_model::derive_root(stem).to_string();
        debug!(template = %template_path.display(), root = %root_token, "template loaded");
        Ok(Self {
            template_path,
            root_token,
            xml,
        })
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn root_token(&self) -> &str {
        &self.root_token
    }

    /// All top-level declared columns, sorted by display name (ordinal).
    pub fn declared_columns(&self) -> Result<Vec<MiningColumn>> {
        let columns = self
            .xml
            .root
            .child("Columns")
            .ok_or_else(|| DocumentError::missing_node("Columns"))?;
        let mut declared = columns
            .children_named("Column")
            .map(MiningColumn::from_element)
            .collect::<Result<Vec<_>>>()?;
        declared.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        Ok(declared)
    }

    /// Resolve a name reference to a declared column.
    ///
    /// Non-strict matching; among several leveled variants the one with the
    /// maximum level wins. Zero matches is fatal.
    pub fn resolve_column(&self, reference: &str) -> Result<MiningColumn> {
        self.declared_columns()?
            .into_iter()
            .filter(|column| column.matches(reference, false))
            .max_by_key(MiningColumn::level)
            .ok_or_else(|| DocumentError::UnknownColumn {
                reference: reference.to_string(),
            })
    }

    /// Canonical names of every column in use: per-model source references
    /// plus the current selection.
    pub fn used_column_names(&self, selection: &Selection) -> BTreeSet<String> {
        let mut used = BTreeSet::new();
        if let Some(models) = self.xml.root.child("MiningModels") {
            for model in models.children_named("MiningModel") {
                for source in model.descendants("SourceColumnID") {
                    used.insert(canonical(source.text().trim()));
                }
            }
        }
        for input in selection.inputs() {
            used.insert(canonical(input.display_name()));
        }
        if let Some(output) = selection.output() {
            used.insert(canonical(output.display_name()));
        }
        used
    }

    /// The name this document will be generated under.
    pub fn synthesized_name(
        &self,
        selection: &Selection,
        synthesizer: &NameSynthesizer,
        explicit: Option<&str>,
    ) -> String {
        let inputs = selection.input_shortnames();
        let output = selection.output().map(MiningColumn::shortname);
        synthesizer.synthesize(&self.root_token, &inputs, output.as_deref(), explicit)
    }

    /// Rewrite the tree for generation.
    ///
    /// Strips design-time markers (idempotent), renames the document,
    /// rebuilds every mining model's column list around the selection, and
    /// renames category-marked model sections. Requires an output column.
    pub fn prepare(
        &mut self,
        selection: &Selection,
        name: &str,
        length_limit: usize,
    ) -> Result<()> {
        let output = selection.output().ok_or(DocumentError::MissingSelection)?;

        let stripped = self.xml.root.strip_attr_deep(DESIGN_TIME_MARKER);
        debug!(stripped, "design-time markers removed");

        set_child_text(&mut self.xml.root, "ID", name)?;
        set_child_text(&mut self.xml.root, "Name", name)?;

        let Some(models) = self.xml.root.child_mut("MiningModels") else {
            debug!("template declares no mining models");
            return Ok(());
        };
        for model in models.children_named_mut("MiningModel") {
            let columns = model
                .child_mut("Columns")
                .ok_or_else(|| DocumentError::missing_node("Columns"))?;
            // Structural keys survive; everything else is regenerated.
            columns.retain_elements(|column| {
                column.name() != "Column"
                    || column
                        .child("Usage")
                        .is_some_and(|usage| usage.text().trim() == Role::Key.as_str())
            });
            for input in selection.inputs() {
                input.materialize(columns, None);
            }
            output.materialize(columns, Some(Role::PredictOnly));

            let model_name = model
                .child("Name")
                .ok_or_else(|| DocumentError::missing_node("Name"))?
                .text();
            if let Some(marker) = MODEL_CATEGORY_MARKERS
                .iter()
                .find(|marker| model_name.contains(*marker))
            {
                let renamed = truncate_name(format!("{marker}__{name}"), length_limit);
                set_child_text(model, "ID", &renamed)?;
                set_child_text(model, "Name", &renamed)?;
                debug!(model = %renamed, "category model renamed");
            }
        }
        Ok(())
    }

    /// Drop declared columns that are not in use and not protected.
    ///
    /// Every used name protects its most specific declared variant (the
    /// same max-level rule as reference resolution), so stale lower-level
    /// duplicates of a selected concept are removed. The selection's own
    /// columns and every column canonically matching an `ignore` entry are
    /// never removed. Returns the number removed.
    pub fn prune_unused(&mut self, selection: &Selection, ignore: &[String]) -> Result<usize> {
        let declared = self.declared_columns()?;
        let mut protected: BTreeSet<String> = BTreeSet::new();
        for input in selection.inputs() {
            protected.insert(input.display_name().to_string());
        }
        if let Some(output) = selection.output() {
            protected.insert(output.display_name().to_string());
        }
        for name in self.used_column_names(selection) {
            let resolved = declared
                .iter()
                .filter(|column| column.matches(&name, false))
                .max_by_key(|column| column.level());
            if let Some(column) = resolved {
                protected.insert(column.display_name().to_string());
            }
        }
        let ignored: BTreeSet<String> = ignore.iter().map(|name| canonical(name)).collect();

        let columns = self
            .xml
            .root
            .child_mut("Columns")
            .ok_or_else(|| DocumentError::missing_node("Columns"))?;
        let mut removed = 0;
        columns.retain_elements(|element| {
            if element.name() != "Column" {
                return true;
            }
            let keep = match MiningColumn::from_element(element) {
                Ok(column) => {
                    protected.contains(column.display_name())
                        || ignored.contains(&canonical(column.display_name()))
                }
                // A malformed declaration is left for `prepare` to surface.
                Err(_) => true,
            };
            if !keep {
                removed += 1;
            }
            keep
        });
        info!(removed, "unused columns pruned");
        Ok(removed)
    }

    /// Serialize to `<dir>/<name>.dmm`, fix the namespace header, and
    /// register the artifact in the manifest.
    ///
    /// An existing target is only replaced when `confirm` agrees; a declined
    /// overwrite skips the unit silently. There is no partial-artifact
    /// cleanup if writing fails mid-way.
    pub fn persist(
        &self,
        name: &str,
        output_dir: Option<&Path>,
        manifest: &ProjectManifest,
        confirm: &mut dyn FnMut(&Path) -> bool,
    ) -> Result<PersistOutcome> {
        let dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => self
                .template_path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        };
        let target = dir.join(format!("{name}.{MODEL_EXTENSION}"));
        if target.is_file() && !confirm(&target) {
            info!(target = %target.display(), "overwrite declined, skipping");
            return Ok(PersistOutcome::Skipped);
        }
        let bytes = self.xml.to_bytes()?;
        fs::write(&target, &bytes).map_err(|e| DocumentError::io(&target, e))?;
        fix_namespace_header(&target)?;
        manifest.register(name)?;
        info!(target = %target.display(), "artifact written");
        Ok(PersistOutcome::Written(target))
    }
}

fn set_child_text(parent: &mut dmm_xml::Element, name: &str, text: &str) -> Result<()> {
    parent
        .child_mut(name)
        .ok_or_else(|| DocumentError::missing_node(name))?
        .set_text(text);
    Ok(())
}

/// Replace the artifact's first line with the complete namespace header.
///
/// The serializer writes the declaration and root start tag on one line and
/// the template's own line structure below it, so exactly that first line is
/// swapped.
fn fix_namespace_header(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
    let rest = content.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    let fixed = format!("{ROOT_NAMESPACE_HEADER}\n{rest}");
    fs::write(path, fixed).map_err(|e| DocumentError::io(path, e))
}

/// Remove a generated artifact and its manifest entry.
///
/// Idempotent: a missing artifact is not an error and the manifest is still
/// unregistered.
pub fn delete_artifact(dir: &Path, name: &str, manifest: &ProjectManifest) -> Result<()> {
    let target = dir.join(format!("{name}.{MODEL_EXTENSION}"));
    match fs::remove_file(&target) {
        Ok(()) => info!(target = %target.display(), "artifact deleted"),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(target = %target.display(), "artifact already absent");
        }
        Err(error) => return Err(DocumentError::io(&target, error)),
    }
    manifest.unregister(name)?;
    Ok(())
}
