//! Minimal XML front end: document model and reader

pub mod model;
pub mod reader;

pub use model::{Document, Element, Node};
pub use reader::Reader;
