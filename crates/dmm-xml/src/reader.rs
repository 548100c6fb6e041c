#![deny(unsafe_code)]

//! Event-loop parse into the owned tree.

use quick_xml::Reader;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::XmlError;
use crate::tree::{Element, Node, XmlDocument};

/// Parse a complete document. Text runs (including whitespace) become
/// `Node::Text`; entity references are resolved into the surrounding run.
/// The declaration, comments, and processing instructions are dropped.
pub fn parse_str(input: &str) -> Result<XmlDocument, XmlError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event().map_err(|e| XmlError::parse(position, e))? {
            Event::Start(start) => {
                stack.push(element_from(&start, position)?);
            }
            Event::Empty(start) => {
                let element = element_from(&start, position)?;
                place(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| XmlError::Malformed {
                    message: "closing tag without an open element".to_string(),
                })?;
                place(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let value = text
                    .xml_content()
                    .map_err(|e| XmlError::parse(position, e))?;
                append_text(&mut stack, &value);
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(data.as_ref()).into_owned();
                append_text(&mut stack, &value);
            }
            // Entity references arrive as separate events; resolve them into
            // the current text run or their content is lost.
            Event::GeneralRef(entity) => {
                let resolved = resolve_entity(&entity, position)?;
                append_text(&mut stack, &resolved);
            }
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Malformed {
            message: "document ended with unclosed elements".to_string(),
        });
    }
    root.ok_or_else(|| XmlError::Malformed {
        message: "document has no root element".to_string(),
    })
    .map(|root| XmlDocument { root })
}

fn element_from(start: &BytesStart<'_>, position: u64) -> Result<Element, XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::parse(position, e))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| XmlError::parse(position, e))?
            .into_owned();
        element.set_attr(key, value);
    }
    Ok(element)
}

/// Append text to the innermost open element, merging with a trailing text
/// node so a run interrupted by entity references stays one `Node::Text`.
/// Text outside the root element is dropped.
fn append_text(stack: &mut [Element], value: &str) {
    if let Some(parent) = stack.last_mut() {
        if let Some(Node::Text(existing)) = parent.children.last_mut() {
            existing.push_str(value);
        } else {
            parent.children.push(Node::Text(value.to_string()));
        }
    }
}

/// Resolve a character reference or one of the five predefined entities.
/// Anything else has no definition in this document model and is fatal.
fn resolve_entity(entity: &BytesRef<'_>, position: u64) -> Result<String, XmlError> {
    if let Some(ch) = entity
        .resolve_char_ref()
        .map_err(|e| XmlError::parse(position, e))?
    {
        return Ok(ch.to_string());
    }
    let name = entity.decode().map_err(|e| XmlError::parse(position, e))?;
    let resolved = match name.as_ref() {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        _ => {
            return Err(XmlError::Malformed {
                message: format!("unresolved entity reference &{name};"),
            });
        }
    };
    Ok(resolved.to_string())
}

fn place(
    stack: &mut Vec<Element>,
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.push_element(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Malformed {
            message: "multiple root elements".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let doc = parse_str(
            r#"<?xml version="1.0"?>
<MiningStructure xmlns="urn:test">
  <Columns>
    <Column xsi:type="TableMiningStructureColumn">
      <Name>Figur_L2</Name>
    </Column>
    <Empty/>
  </Columns>
</MiningStructure>"#,
        )
        .expect("parse");
        assert_eq!(doc.root.name(), "MiningStructure");
        assert_eq!(doc.root.attr("xmlns"), Some("urn:test"));
        let columns = doc.root.child("Columns").expect("columns");
        let column = columns.child("Column").expect("column");
        assert_eq!(column.attr("xsi:type"), Some("TableMiningStructureColumn"));
        assert_eq!(column.child("Name").expect("name").text(), "Figur_L2");
        assert!(columns.child("Empty").is_some());
    }

    #[test]
    fn preserves_whitespace_text_runs() {
        let doc = parse_str("<a>\n  <b>x</b>\n</a>").expect("parse");
        assert_eq!(doc.root.text(), "\n  \n");
    }

    #[test]
    fn unescapes_entities() {
        let doc = parse_str("<a name=\"x &amp; y\">1 &lt; 2</a>").expect("parse");
        assert_eq!(doc.root.attr("name"), Some("x & y"));
        assert_eq!(doc.root.text(), "1 < 2");
    }

    #[test]
    fn resolves_character_references() {
        let doc = parse_str("<a>&#169; &#x41;</a>").expect("parse");
        assert_eq!(doc.root.text(), "\u{a9} A");
    }

    #[test]
    fn entity_references_stay_inside_one_text_run() {
        let doc = parse_str("<a>Tom &amp; Jerry</a>").expect("parse");
        assert_eq!(doc.root.children.len(), 1);
        assert!(matches!(&doc.root.children[0], Node::Text(t) if t == "Tom & Jerry"));
    }

    #[test]
    fn undefined_entities_are_fatal() {
        assert!(matches!(
            parse_str("<a>&undefined;</a>"),
            Err(XmlError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_unbalanced_documents() {
        assert!(parse_str("<a><b></a>").is_err());
    }
}
