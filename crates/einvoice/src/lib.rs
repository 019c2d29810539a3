//! einvoice - parser for e-invoice exchange envelopes
//!
//! Takes the XML returned by an e-invoice exchange service, locates the
//! `InvoiceEnvelope` (or `CreditNoteEnvelope`) subtree and converts the
//! invoice body into an order-preserving field mapping. Repeated sibling
//! elements aggregate into lists, absent optional elements simply yield
//! no key.
//!
//! # Quick Start
//!
//! ```
//! use einvoice::{extract_from_str, Value, DEFAULT_ENVELOPE_TAG};
//! # fn main() -> Result<(), einvoice::Error> {
//! let xml = "<Response><InvoiceEnvelope><Invoice>\
//!            <Number>123</Number>\
//!            </Invoice></InvoiceEnvelope></Response>";
//! let mapping = extract_from_str(xml, DEFAULT_ENVELOPE_TAG)?;
//! let number = mapping
//!     .get_path(&["Invoice", "Number"])
//!     .and_then(Value::as_scalar)
//!     .unwrap_or_default();
//! assert_eq!(number, "123");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod cursor;
pub use cursor::Cursor;

pub mod xml;
pub use xml::{Document, Element, Node, Reader};

pub mod value;
pub use value::{FieldMap, Value};

pub mod envelope;
pub use envelope::{
    extract_from_str, invoice_body, locate_envelope, parse, DEFAULT_ENVELOPE_TAG,
};

pub mod flatten;
pub use flatten::{flatten, DocumentKind, FlatInvoice, Header, LineItem, Party};

pub mod source;
pub use source::{DocumentSource, StaticSource};

/// Parse raw XML into a document tree
pub fn from_str(xml: &str) -> Result<Document> {
    Reader::new(xml.as_bytes()).read_document()
}

/// Parse raw XML bytes into a document tree
pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
    Reader::new(bytes).read_document()
}

/// Locate the envelope, parse the invoice body and flatten it in one go
pub fn extract_flat(xml: &str, kind: DocumentKind) -> Result<FlatInvoice> {
    let mapping = extract_from_str(xml, kind.envelope_tag())?;
    flatten(&mapping, kind)
}
