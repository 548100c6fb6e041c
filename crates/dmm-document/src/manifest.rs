#![deny(unsafe_code)]

//! Project manifest synchronization.
//!
//! The manifest is a text file of `<ProjectItem>` blocks inside a
//! `<ProjectItems>` wrapper, one block per generated artifact. Registration
//! is idempotent and inserts immediately before the closing marker;
//! unregistration removes every block mentioning the artifact. The file is
//! read, modified, and written back in one unguarded pass; concurrent
//! writers race and the last one wins.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::MODEL_EXTENSION;
use crate::error::{DocumentError, Result};

const ITEM_OPEN: &str = "<ProjectItem>";
const ITEM_CLOSE: &str = "</ProjectItem>";
const LIST_OPEN: &str = "<ProjectItems>";
const LIST_CLOSE: &str = "</ProjectItems>";

#[derive(Debug, Clone)]
pub struct ProjectManifest {
    path: PathBuf,
}

impl ProjectManifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a registration block for `name`. Returns false when an entry for
    /// the artifact already exists.
    pub fn register(&self, name: &str) -> Result<bool> {
        let artifact = artifact_file_name(name);
        let content = self.read_or_skeleton()?;
        if contains_entry(&content, &artifact) {
            debug!(name, "artifact already registered, skipping");
            return Ok(false);
        }
        let close = content.find(LIST_CLOSE).ok_or_else(|| {
            DocumentError::ManifestFormat {
                path: self.path.clone(),
                message: format!("missing closing marker {LIST_CLOSE}"),
            }
        })?;
        let block = format!(
            "    {ITEM_OPEN}\n      <Name>{artifact}</Name>\n      <FullPath>{artifact}</FullPath>\n    {ITEM_CLOSE}\n",
        );
        let mut updated = String::with_capacity(content.len() + block.len());
        updated.push_str(&content[..close]);
        updated.push_str(&block);
        updated.push_str(&content[close..]);
        self.write(&updated)?;
        info!(name, manifest = %self.path.display(), "registered artifact");
        Ok(true)
    }

    /// Remove every block mentioning `name`. Returns the number of blocks
    /// removed; a missing manifest is not an error.
    pub fn unregister(&self, name: &str) -> Result<usize> {
        if !self.path.is_file() {
            debug!(name, "manifest absent, nothing to unregister");
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DocumentError::io(&self.path, e))?;
        let (updated, removed) = remove_blocks(&content, &artifact_file_name(name));
        if removed > 0 {
            self.write(&updated)?;
            info!(name, removed, "unregistered artifact");
        }
        Ok(removed)
    }

    fn read_or_skeleton(&self) -> Result<String> {
        if self.path.is_file() {
            fs::read_to_string(&self.path).map_err(|e| DocumentError::io(&self.path, e))
        } else {
            Ok(format!("{LIST_OPEN}\n{LIST_CLOSE}\n"))
        }
    }

    fn write(&self, content: &str) -> Result<()> {
        fs::write(&self.path, content).map_err(|e| DocumentError::io(&self.path, e))
    }
}

fn artifact_file_name(name: &str) -> String {
    format!("{name}.{MODEL_EXTENSION}")
}

fn contains_entry(content: &str, needle: &str) -> bool {
    scan_blocks(content, needle, |_| {}) > 0
}

/// Drop every block mentioning `needle`, keeping everything else verbatim.
fn remove_blocks(content: &str, needle: &str) -> (String, usize) {
    let mut kept = String::with_capacity(content.len());
    let removed = scan_blocks(content, needle, |line| {
        kept.push_str(line);
        kept.push('\n');
    });
    (kept, removed)
}

/// Line-based block scanner. Calls `keep` for every line outside a matching
/// block and returns the number of blocks that mention `needle`.
fn scan_blocks(content: &str, needle: &str, mut keep: impl FnMut(&str)) -> usize {
    let mut block: Vec<&str> = Vec::new();
    let mut in_block = false;
    let mut matched = 0;
    for line in content.lines() {
        if !in_block && line.contains(ITEM_OPEN) {
            in_block = true;
            block.clear();
        }
        if in_block {
            block.push(line);
            if line.contains(ITEM_CLOSE) {
                in_block = false;
                if block.iter().any(|l| l.contains(needle)) {
                    matched += 1;
                } else {
                    for l in &block {
                        keep(l);
                    }
                }
            }
        } else {
            keep(line);
        }
    }
    // An unterminated trailing block is passed through untouched.
    if in_block {
        for l in &block {
            keep(l);
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_in(dir: &Path) -> ProjectManifest {
        ProjectManifest::new(dir.join("project_items.txt"))
    }

    #[test]
    fn register_creates_skeleton_and_block() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = manifest_in(dir.path());
        assert!(manifest.register("muse__Figur__Genre").expect("register"));
        let content = fs::read_to_string(manifest.path()).expect("read manifest");
        assert!(content.starts_with(LIST_OPEN));
        assert!(content.contains("<Name>muse__Figur__Genre.dmm</Name>"));
        assert!(content.contains("<FullPath>muse__Figur__Genre.dmm</FullPath>"));
        assert!(content.trim_end().ends_with(LIST_CLOSE));
    }

    #[test]
    fn register_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = manifest_in(dir.path());
        assert!(manifest.register("muse__Figur__Genre").expect("register"));
        assert!(!manifest.register("muse__Figur__Genre").expect("register again"));
        let content = fs::read_to_string(manifest.path()).expect("read manifest");
        assert_eq!(content.matches(ITEM_OPEN).count(), 1);
    }

    #[test]
    fn register_does_not_confuse_name_prefixes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = manifest_in(dir.path());
        assert!(manifest.register("muse__Figur__Genre").expect("register"));
        assert!(manifest.register("muse__Figur__Genre2").expect("register longer"));
        let content = fs::read_to_string(manifest.path()).expect("read manifest");
        assert_eq!(content.matches(ITEM_OPEN).count(), 2);
    }

    #[test]
    fn new_blocks_land_before_the_closing_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = manifest_in(dir.path());
        manifest.register("erste").expect("register");
        manifest.register("zweite").expect("register");
        let content = fs::read_to_string(manifest.path()).expect("read manifest");
        let close = content.find(LIST_CLOSE).expect("closing marker");
        assert!(content.find("erste.dmm").expect("first entry") < close);
        assert!(content.find("zweite.dmm").expect("second entry") < close);
    }

    #[test]
    fn unregister_removes_only_matching_blocks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = manifest_in(dir.path());
        manifest.register("bleibt").expect("register");
        manifest.register("geht").expect("register");
        assert_eq!(manifest.unregister("geht").expect("unregister"), 1);
        let content = fs::read_to_string(manifest.path()).expect("read manifest");
        assert!(content.contains("bleibt.dmm"));
        assert!(!content.contains("geht.dmm"));
    }

    #[test]
    fn unregister_on_missing_manifest_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = manifest_in(dir.path());
        assert_eq!(manifest.unregister("nie_registriert").expect("unregister"), 0);
        assert!(!manifest.path().exists());
    }
}
