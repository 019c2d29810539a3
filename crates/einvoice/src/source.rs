//! Capability seam towards the exchange service
//!
//! The parser never performs I/O. Anything that can authenticate and hand
//! over raw invoice XML implements [`DocumentSource`]; the real HTTP
//! client lives outside this crate, while tests and the CLI use
//! [`StaticSource`].

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Narrow interface to whatever fetches raw invoice documents
pub trait DocumentSource {
    /// Establish or refresh a session with the remote service
    fn authenticate(&mut self) -> Result<()>;

    /// Fetch the raw XML text of one document by its identifier
    fn fetch_raw(&mut self, document_id: &str) -> Result<String>;
}

/// In-memory document source backed by pre-loaded XML strings
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    documents: IndexMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under `id`, replacing any previous entry
    pub fn insert(&mut self, id: impl Into<String>, xml: impl Into<String>) {
        self.documents.insert(id.into(), xml.into());
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for StaticSource {
    fn authenticate(&mut self) -> Result<()> {
        Ok(())
    }

    fn fetch_raw(&mut self, document_id: &str) -> Result<String> {
        self.documents
            .get(document_id)
            .cloned()
            .ok_or_else(|| Error::source(format!("document {document_id} not found")))
    }
}
