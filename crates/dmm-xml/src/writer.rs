#![deny(unsafe_code)]

//! Serialization back to bytes.
//!
//! Events are written 1:1 from the tree, so a document parsed from a
//! formatted template serializes with the same line structure. The XML
//! declaration and the root start tag share the first output line; the
//! persistence layer relies on that when it rewrites the first line with the
//! full namespace header.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::XmlError;
use crate::tree::{Element, Node, XmlDocument};

pub fn serialize(document: &XmlDocument) -> Result<Vec<u8>, XmlError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(serialize_error)?;
    write_element(&mut writer, &document.root)?;
    Ok(writer.into_inner())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }
    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(serialize_error);
    }
    writer
        .write_event(Event::Start(start))
        .map_err(serialize_error)?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(serialize_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(serialize_error)
}

fn serialize_error(error: impl std::fmt::Display) -> XmlError {
    XmlError::Serialize {
        message: error.to_string(),
    }
}
