//! Envelope location and the core invoice mapping parser
//!
//! [`parse`] is the heart of the library: a pure recursive traversal of
//! one invoice element into a [`FieldMap`]. The result carries a single
//! top-level key, the element's own stripped tag name, so
//! `<Invoice><Number>123</Number></Invoice>` becomes
//! `{"Invoice": {"Number": "123"}}`.

use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{FieldMap, Value};
use crate::xml::{Document, Element, Reader};

/// Envelope tag used by the exchange service for regular invoices
pub const DEFAULT_ENVELOPE_TAG: &str = "InvoiceEnvelope";

/// Parse one invoice element into a field mapping.
///
/// Rules, applied per immediate child:
/// - the key is the tag name with its namespace prefix stripped;
/// - a leaf child contributes its trimmed text content (empty string if
///   it has none);
/// - a child with element children recurses into a nested object;
/// - same-named siblings aggregate into a list in document order, while
///   a lone occurrence stays unwrapped.
///
/// Absent optional elements produce no key. An element mixing
/// non-whitespace text with child elements fails with a malformed-input
/// error and no partial mapping is returned.
pub fn parse(element: &Element) -> Result<FieldMap> {
    let body = convert(element)?;
    let mut map = FieldMap::with_capacity(1);
    map.insert(element.local_name(), body);
    debug!(root = element.local_name(), "parsed invoice element");
    Ok(map)
}

fn convert(element: &Element) -> Result<Value> {
    if !element.has_element_children() {
        return Ok(Value::Scalar(element.text().trim().to_string()));
    }
    if element.has_significant_text() {
        return Err(Error::malformed(format!(
            "mixed text and element content in <{}>",
            element.name
        )));
    }

    let mut map = FieldMap::new();
    for child in element.elements() {
        let value = convert(child)?;
        map.aggregate(child.local_name(), value);
    }
    Ok(Value::Object(map))
}

/// Find the envelope element anywhere under the document root.
///
/// Matches on the stripped tag name, depth first, root included. Fails
/// with `EnvelopeNotFound` before the parser ever runs.
pub fn locate_envelope<'a>(document: &'a Document, envelope_tag: &str) -> Result<&'a Element> {
    find_by_local_name(&document.root, envelope_tag)
        .ok_or_else(|| Error::envelope_not_found(envelope_tag))
}

fn find_by_local_name<'a>(element: &'a Element, tag: &str) -> Option<&'a Element> {
    if element.local_name() == tag {
        return Some(element);
    }
    element
        .elements()
        .find_map(|child| find_by_local_name(child, tag))
}

/// The invoice body is the first element child of the envelope wrapper.
pub fn invoice_body(envelope: &Element) -> Result<&Element> {
    envelope.first_element().ok_or_else(|| {
        Error::malformed(format!(
            "envelope <{}> has no invoice body",
            envelope.name
        ))
    })
}

/// Read raw XML, locate the envelope and parse its invoice body.
pub fn extract_from_str(xml: &str, envelope_tag: &str) -> Result<FieldMap> {
    let document = Reader::new(xml.as_bytes()).read_document()?;
    let envelope = locate_envelope(&document, envelope_tag)?;
    parse(invoice_body(envelope)?)
}
