//! XML reader
//!
//! Covers the subset of XML the exchange service emits: elements,
//! attributes, character data, CDATA sections, character entities,
//! comments, processing instructions and a DOCTYPE without an internal
//! subset. No schema validation is performed.

use indexmap::IndexMap;

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result};
use crate::xml::model::{Document, Element, Node};

/// Pull-free recursive XML reader
#[derive(Debug)]
pub struct Reader<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Reader<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Read a complete document: prolog, one root element, trailing misc
    pub fn read_document(&mut self) -> Result<Document> {
        self.skip_misc()?;
        if self.cursor.is_eof() {
            return Err(self.err(ErrorKind::UnexpectedEof, "document has no root element"));
        }
        let root = self.read_element()?;
        self.skip_misc()?;
        if !self.cursor.is_eof() {
            return Err(self.err(ErrorKind::InvalidToken, "content after document root"));
        }
        Ok(Document { root })
    }

    fn read_element(&mut self) -> Result<Element> {
        self.expect(b'<')?;
        let name = self.read_name()?;
        let attributes = self.read_attributes()?;

        if self.cursor.consume(b'/') {
            self.expect(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }

        self.expect(b'>')?;
        let children = self.read_content(&name)?;
        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    /// Read child nodes until the matching close tag of `open`
    fn read_content(&mut self, open: &str) -> Result<Vec<Node>> {
        let mut children = Vec::new();
        loop {
            if self.cursor.is_eof() {
                return Err(self.err(
                    ErrorKind::UnexpectedEof,
                    format!("element <{open}> is never closed"),
                ));
            }

            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let close = self.read_name()?;
                if close != open {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            open: open.to_string(),
                            close,
                        },
                        self.cursor.position(),
                    ));
                }
                self.cursor.skip_whitespace();
                self.expect(b'>')?;
                return Ok(children);
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.take_until(b"]]>")?;
                children.push(Node::Text(bytes_to_string(text)?));
                continue;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.take_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.take_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                children.push(Node::Element(self.read_element()?));
                continue;
            }

            if let Some(text) = self.read_text()? {
                children.push(Node::Text(text));
            }
        }
    }

    fn read_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attributes = IndexMap::new();
        loop {
            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/') | Some(b'>') => return Ok(attributes),
                Some(_) => {}
                None => {
                    return Err(self.err(ErrorKind::UnexpectedEof, "input ended inside a tag"));
                }
            }

            let name = self.read_name()?;
            self.cursor.skip_whitespace();
            self.expect(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.read_attribute_value()?;

            if attributes.contains_key(&name) {
                return Err(Error::at(
                    ErrorKind::DuplicateAttribute { name },
                    self.cursor.position(),
                ));
            }
            attributes.insert(name, value);
        }
    }

    fn read_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(self.err(ErrorKind::InvalidToken, "expected quoted attribute value"));
            }
        };
        self.cursor.advance();

        let start = self.cursor.offset();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                return decode_entities(&bytes_to_string(raw)?);
            }
            self.cursor.advance();
        }
        Err(self.err(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    /// Character data up to the next markup; `None` when whitespace-only
    fn read_text(&mut self) -> Result<Option<String>> {
        let start = self.cursor.offset();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let text = bytes_to_string(self.cursor.slice_from(start))?;
        let text = decode_entities(&text)?;
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }

    fn read_name(&mut self) -> Result<String> {
        let start = self.cursor.offset();
        match self.cursor.current() {
            Some(b) if is_name_start(b) => self.cursor.advance(),
            _ => return Err(self.err(ErrorKind::InvalidToken, "expected a tag name")),
        }
        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        bytes_to_string(self.cursor.slice_from(start))
    }

    /// Skip whitespace, XML declaration / PIs, comments and DOCTYPE
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.take_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.take_until(b"-->")?;
            } else if self.cursor.starts_with(b"<!") {
                self.cursor.advance_by(2);
                self.take_until(b">")?;
            } else {
                return Ok(());
            }
        }
    }

    /// Consume up to and including `pattern`, returning the bytes before it
    fn take_until(&mut self, pattern: &[u8]) -> Result<&'a [u8]> {
        let start = self.cursor.offset();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let consumed = self.cursor.slice_from(start);
                self.cursor.advance_by(pattern.len());
                return Ok(consumed);
            }
            self.cursor.advance();
        }
        Err(self.err(ErrorKind::UnexpectedEof, "unterminated markup"))
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.err(
                ErrorKind::InvalidToken,
                format!("expected `{}`", char::from(expected)),
            ))
        }
    }

    fn err(&self, kind: ErrorKind, message: impl Into<String>) -> Error {
        Error::with_message(
            kind,
            crate::error::Span::at(self.cursor.position()),
            message,
        )
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| Error::new(ErrorKind::InvalidUtf8, crate::error::Span::empty()))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            out.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }
        if !terminated {
            return Err(Error::new(ErrorKind::InvalidEntity, crate::error::Span::empty()));
        }

        let decoded = match entity.as_str() {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(&entity),
        };
        match decoded {
            Some(ch) => out.push(ch),
            None => {
                return Err(Error::new(ErrorKind::InvalidEntity, crate::error::Span::empty()));
            }
        }
    }
    Ok(out)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
