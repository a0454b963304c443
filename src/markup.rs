//! The structural document primitive: an element tree parsed from and
//! serialized back to scheme markup.
//!
//! Widget attributes are persisted as `data-<property>`. Attributes whose
//! property name starts with [`RESERVED_PREFIX`] are internal and are never
//! written back out.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::error::MarkupError;

/// Persisted attribute-name prefix for widget properties.
pub const DATA_PREFIX: &str = "data-";

/// Marks synthetic properties and internal attributes.
pub const RESERVED_PREFIX: char = '_';

/// Returns `true` for attribute names that must not be projected or saved.
pub fn is_reserved_attribute(name: &str) -> bool {
    property_name(name).starts_with(RESERVED_PREFIX)
}

/// Returns `true` for property names handled outside generic attribute storage.
pub fn is_reserved_property(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Strips the persisted `data-` prefix from an attribute name.
pub fn property_name(attribute: &str) -> &str {
    attribute.strip_prefix(DATA_PREFIX).unwrap_or(attribute)
}

/// Builds the persisted attribute name for a property.
pub fn attribute_name(property: &str) -> String {
    format!("{DATA_PREFIX}{property}")
}

/// One element of a scheme document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder form of [`Node::set_data`].
    pub fn with_data(mut self, property: &str, value: impl Into<String>) -> Self {
        self.set_data(property, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an attribute, keeping its original position when it already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let idx = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(idx).1)
    }

    /// Reads the `data-<property>` attribute.
    pub fn data(&self, property: &str) -> Option<&str> {
        self.attribute(&attribute_name(property))
    }

    pub fn set_data(&mut self, property: &str, value: impl Into<String>) {
        self.set_attribute(attribute_name(property), value);
    }

    pub fn id(&self) -> Option<&str> {
        self.data("id")
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Number of direct children with the given tag.
    pub fn count_children(&self, tag: &str) -> usize {
        self.children.iter().filter(|c| c.is(tag)).count()
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Stores text the way parsing would read it back.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = normalize_text(&text.into());
    }

    /// Serializes this element and its subtree.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        write_node(&mut out, self);
        out
    }
}

/// Parses scheme markup into its single root element.
///
/// Declarations, doctypes, comments and processing instructions are skipped.
/// Text content is trimmed and whitespace-only text is dropped.
pub fn parse(source: &str) -> Result<Node, MarkupError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| MarkupError::Syntax {
            position,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                let node = open_element(&e, position)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = open_element(&e, position)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let Some(mut node) = stack.pop() else {
                    return Err(MarkupError::UnexpectedClose(name));
                };
                if !node.is(&name) {
                    return Err(MarkupError::MismatchedClose {
                        expected: node.tag,
                        found: name,
                        position,
                    });
                }
                finish_text(&mut node);
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| MarkupError::Syntax {
                    position,
                    message: e.to_string(),
                })?;
                push_text(&mut stack, &text, position)?;
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t).to_string();
                push_text(&mut stack, &text, position)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed(open.tag));
    }
    root.ok_or(MarkupError::NoRoot)
}

fn open_element(e: &BytesStart<'_>, position: u64) -> Result<Node, MarkupError> {
    let mut node = Node::new(String::from_utf8_lossy(e.name().as_ref()).to_string());
    for attr in e.attributes() {
        let attr = attr.map_err(|err| MarkupError::Syntax {
            position,
            message: format!("attribute error: {err}"),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(|err| MarkupError::Syntax {
            position,
            message: format!("attribute `{key}`: {err}"),
        })?;
        node.attributes.push((key, value.into_owned()));
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), MarkupError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(MarkupError::MultipleRoots(node.tag));
    }
    *root = Some(node);
    Ok(())
}

fn push_text(stack: &mut [Node], text: &str, position: u64) -> Result<(), MarkupError> {
    match stack.last_mut() {
        Some(node) => {
            node.text.get_or_insert_with(String::new).push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(MarkupError::StrayText(position)),
    }
}

fn finish_text(node: &mut Node) {
    node.text = node.text.take().and_then(|text| normalize_text(&text));
}

/// Trimmed text, or `None` when only whitespace is left.
fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn write_node(out: &mut String, node: &Node) {
    out.push('<');
    out.push_str(&node.tag);
    for (name, value) in &node.attributes {
        if is_reserved_attribute(name) {
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&quick_xml::escape::escape(value.as_str()));
        out.push('"');
    }
    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&quick_xml::escape::escape(text.as_str()));
    }
    for child in &node.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&node.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_nested_elements_and_attributes() {
        let src = r#"<div>
            <application-window data-id="main" data-width="400">
                <gui-vbox>
                    <gui-vbox-container data-grow="1">
                        <gui-button data-icon="">Click &amp; go</gui-button>
                    </gui-vbox-container>
                </gui-vbox>
            </application-window>
        </div>"#;
        let root = parse(src).unwrap();
        assert_eq!(root.tag, "div");
        assert_eq!(root.children.len(), 1);

        let win = &root.children[0];
        assert_eq!(win.id(), Some("main"));
        assert_eq!(win.data("width"), Some("400"));
        assert_eq!(win.text, None);

        let button = &win.children[0].children[0].children[0];
        assert_eq!(button.tag, "gui-button");
        assert_eq!(button.text(), "Click & go");
        assert_eq!(button.data("icon"), Some(""));
    }

    #[test]
    fn test_parse_skips_doctype_and_comments() {
        let src = "<!DOCTYPE html>\n<!-- scheme -->\n<div><application-window data-id=\"a\"/></div>\n";
        let root = parse(src).unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].id(), Some("a"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(""), Err(MarkupError::NoRoot)));
        assert!(matches!(parse("<div>"), Err(MarkupError::Unclosed(_))));
        assert!(matches!(
            parse("<div></span>"),
            Err(MarkupError::MismatchedClose { .. })
        ));
        assert!(matches!(
            parse("<div></div><div></div>"),
            Err(MarkupError::MultipleRoots(_))
        ));
        assert!(matches!(parse("hello <div></div>"), Err(MarkupError::StrayText(_))));
        assert!(parse("<div data-x=\"1></div>").is_err());
    }

    #[test]
    fn test_serialize_is_compact_and_reparses() {
        let node = Node::new("div").with_child(
            Node::new("application-window")
                .with_data("id", "main")
                .with_child(Node::new("gui-label").with_data("label", "a \"quoted\" <label>")),
        );
        let markup = node.to_markup();
        assert_eq!(
            markup,
            "<div><application-window data-id=\"main\"><gui-label data-label=\"a &quot;quoted&quot; &lt;label&gt;\"></gui-label></application-window></div>"
        );
        assert_eq!(parse(&markup).unwrap(), node);
    }

    #[test]
    fn test_padded_text_survives_reparse() {
        let mut button = Node::new("gui-button");
        button.set_text("  OK  ");
        assert_eq!(button.text(), "OK");
        let mut blank = Node::new("gui-button");
        blank.set_text(" \n\t ");
        assert_eq!(blank.text, None);

        let node = Node::new("div").with_child(button).with_child(blank);
        assert_eq!(parse(&node.to_markup()).unwrap(), node);

        let parsed = parse("<div><gui-button>\n  Save  \n</gui-button></div>").unwrap();
        assert_eq!(parsed.children[0].text(), "Save");
    }

    #[test]
    fn test_reserved_attributes_are_not_serialized() {
        let mut node = Node::new("gui-hbox");
        node.set_data("_size", "3");
        node.set_attribute("_ide", "true");
        node.set_data("grow", "1");
        assert_eq!(node.to_markup(), "<gui-hbox data-grow=\"1\"></gui-hbox>");
    }

    #[test]
    fn test_attribute_helpers() {
        let mut node = Node::new("gui-text");
        node.set_data("value", "a");
        node.set_data("placeholder", "b");
        node.set_data("value", "c");
        assert_eq!(
            node.attributes,
            vec![
                ("data-value".to_string(), "c".to_string()),
                ("data-placeholder".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(node.remove_attribute("data-value"), Some("c".to_string()));
        assert_eq!(node.remove_attribute("data-value"), None);
        assert!(is_reserved_attribute("data-_size"));
        assert!(is_reserved_attribute("_flag"));
        assert!(!is_reserved_attribute("data-size"));
        assert_eq!(property_name("data-label"), "label");
    }
}
