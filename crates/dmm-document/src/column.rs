#![deny(unsafe_code)]

//! Typed views over template column nodes.

use dmm_model::identity;
use dmm_xml::Element;

use crate::error::{DocumentError, Result};

/// Type marker carried by table-typed (nested) columns.
pub const TABLE_COLUMN_TYPE: &str = "TableMiningStructureColumn";

/// Structural purpose of a per-model column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Key,
    Predict,
    PredictOnly,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Key => "Key",
            Role::Predict => "Predict",
            Role::PredictOnly => "PredictOnly",
        }
    }
}

/// Owned snapshot of one declared column.
///
/// A nested column wraps exactly one child column; all identity operations
/// delegate one level down. Nesting depth is 0 or 1 in this domain, never
/// deeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningColumn {
    name: String,
    id: String,
    child: Option<Box<MiningColumn>>,
}

impl MiningColumn {
    /// Extract a snapshot from a `Column` element.
    pub fn from_element(element: &Element) -> Result<Self> {
        let name = element
            .child("Name")
            .ok_or_else(|| DocumentError::missing_node("Name"))?
            .text();
        let id = element
            .child("ID")
            .ok_or_else(|| DocumentError::missing_node("ID"))?
            .text();
        let child = if element.attr("xsi:type") == Some(TABLE_COLUMN_TYPE) {
            let nested = element
                .child("Columns")
                .and_then(|columns| columns.child("Column"))
                .ok_or_else(|| DocumentError::missing_node("Column"))?;
            Some(Box::new(MiningColumn::from_element(nested)?))
        } else {
            None
        };
        Ok(Self { name, id, child })
    }

    /// The column's own declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable identifier, distinct from the display name.
    pub fn source_id(&self) -> &str {
        &self.id
    }

    pub fn is_nested(&self) -> bool {
        self.child.is_some()
    }

    pub fn child(&self) -> Option<&MiningColumn> {
        self.child.as_deref()
    }

    /// The name identity operations run on; nested columns delegate to the
    /// child.
    pub fn display_name(&self) -> &str {
        match &self.child {
            Some(child) => child.display_name(),
            None => &self.name,
        }
    }

    pub fn level(&self) -> u32 {
        identity::level(self.display_name())
    }

    pub fn shortname(&self) -> String {
        identity::shortname(self.display_name())
    }

    /// Whether a name reference denotes this column, modulo the level-suffix
    /// convention unless `strict`.
    pub fn matches(&self, reference: &str, strict: bool) -> bool {
        identity::names_match(self.display_name(), reference, strict)
    }

    /// Append a per-model column node for this column under `parent`.
    ///
    /// A nested column gets a `Columns` container whose child is always
    /// materialized with role `Key`, regardless of this column's role.
    pub fn materialize(&self, parent: &mut Element, role: Option<Role>) {
        let mut column = Element::new("Column");
        column.push_text_element("ID", &self.name);
        column.push_text_element("Name", &self.name);
        column.push_text_element("SourceColumnID", &self.id);
        if let Some(role) = role {
            column.push_text_element("Usage", role.as_str());
        }
        if let Some(child) = &self.child {
            let mut columns = Element::new("Columns");
            child.materialize(&mut columns, Some(Role::Key));
            column.push_element(columns);
        }
        parent.push_element(column);
    }
}
