#![deny(unsafe_code)]

//! Owned element tree with qualified-name accessors.

use std::fs;
use std::path::Path;

use crate::XmlError;
use crate::reader::parse_str;

/// One child slot of an element: a nested element or a text run.
///
/// Whitespace text runs are kept verbatim so a serialized document keeps the
/// template's formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and children, names as written in the
/// source (no namespace resolution).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Remove, across the whole subtree, every attribute whose local name
    /// (the part after a `prefix:`) equals `local`. Returns the number of
    /// attributes removed; zero on an already-stripped tree.
    pub fn strip_attr_deep(&mut self, local: &str) -> usize {
        let before = self.attributes.len();
        self.attributes
            .retain(|(k, _)| local_name(k) != local);
        let mut removed = before - self.attributes.len();
        for child in self.child_elements_mut() {
            removed += child.strip_attr_deep(local);
        }
        removed
    }

    /// Direct child elements, any name.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given qualified name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|el| el.name == name)
    }

    /// All direct child elements with the given qualified name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |el| el.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> {
        self.child_elements_mut().filter(move |el| el.name == name)
    }

    /// All elements with the given qualified name anywhere in the subtree,
    /// in document order. Does not include `self`.
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        for child in self.child_elements() {
            if child.name == name {
                found.push(child);
            }
            found.extend(child.descendants(name));
        }
        found
    }

    /// Concatenated direct text content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    /// Replace the element's text content, leaving child elements in place.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|node| matches!(node, Node::Element(_)));
        self.children.insert(0, Node::Text(text.into()));
    }

    pub fn push_element(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Append a child element holding only text.
    pub fn push_text_element(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let mut el = Element::new(name);
        el.set_text(text);
        self.push_element(el);
    }

    /// Drop direct child elements failing the predicate; text runs stay.
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        self.children.retain(|node| match node {
            Node::Element(el) => keep(el),
            Node::Text(_) => true,
        });
    }
}

/// The local part of a qualified name (`dwd:design-time-name` →
/// `design-time-name`).
pub fn local_name(qualified: &str) -> &str {
    match qualified.split_once(':') {
        Some((_, local)) => local,
        None => qualified,
    }
}

/// A parsed document: the root element plus parse/serialize entry points.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub root: Element,
}

impl XmlDocument {
    pub fn parse_file(path: &Path) -> Result<Self, XmlError> {
        let content = fs::read_to_string(path).map_err(|e| XmlError::io(path, e))?;
        parse_str(&content)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        crate::writer::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        let mut root = Element::new("Columns");
        let mut col = Element::new("Column");
        col.set_attr("xsi:type", "TableMiningStructureColumn");
        col.push_text_element("Name", "Figur_L2");
        root.push_element(col);
        root
    }

    #[test]
    fn child_lookup_is_by_qualified_name() {
        let root = sample();
        let col = root.child("Column").expect("column child");
        assert_eq!(col.child("Name").expect("name child").text(), "Figur_L2");
        assert!(root.child("Name").is_none());
    }

    #[test]
    fn set_text_replaces_only_text() {
        let mut el = Element::new("Name");
        el.set_text("alt");
        el.set_text("neu");
        assert_eq!(el.text(), "neu");
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn strip_attr_deep_matches_local_name_and_counts() {
        let mut root = sample();
        root.set_attr("dwd:design-time-name", "aaaa");
        root.child_mut("Column")
            .expect("column")
            .set_attr("dwd:design-time-name", "bbbb");
        assert_eq!(root.strip_attr_deep("design-time-name"), 2);
        assert_eq!(root.strip_attr_deep("design-time-name"), 0);
        // Unrelated attributes survive.
        assert!(
            root.child("Column")
                .expect("column")
                .attr("xsi:type")
                .is_some()
        );
    }

    #[test]
    fn retain_elements_keeps_text_runs() {
        let mut root = sample();
        root.children.insert(0, Node::Text("\n  ".to_string()));
        root.retain_elements(|el| el.name() != "Column");
        assert_eq!(root.child_elements().count(), 0);
        assert_eq!(root.text(), "\n  ");
    }

    #[test]
    fn descendants_walks_the_whole_subtree() {
        let root = sample();
        assert_eq!(root.descendants("Name").len(), 1);
        assert_eq!(root.descendants("Column").len(), 1);
    }
}
