//! XML document model
//!
//! Tag names keep their namespace prefix as written (`cbc:ID`);
//! [`Element::local_name`] strips it for mapping keys.

use indexmap::IndexMap;

/// Parsed XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Element,
}

/// XML element with ordered attributes and content
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

/// Content node inside an element
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    /// Tag name with any namespace prefix stripped
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Iterator over element children, skipping text nodes
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// First element child, if any
    pub fn first_element(&self) -> Option<&Element> {
        self.elements().next()
    }

    pub fn has_element_children(&self) -> bool {
        self.first_element().is_some()
    }

    /// True if any text node carries non-whitespace content
    pub fn has_significant_text(&self) -> bool {
        self.children.iter().any(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            Node::Element(_) => false,
        })
    }

    /// Concatenated text content of this element (direct text nodes only)
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }
}

/// Local part of a possibly prefix-qualified tag name
pub(crate) fn local_part(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}
