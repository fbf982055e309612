//! XML isomorphism of the JSON data model.
//!
//! Generation wraps a document in `<json>`, turns object members into
//! sanitized tags, array elements into `<row>` tags and null into a
//! self-closing tag. The reverse transform applies the same
//! conventions: an element whose children are all `<row>` becomes an
//! array, other element children become object members, text content
//! is sniffed for `true`/`false`/numbers and a childless element
//! becomes null.

use std::fmt;

use smol_str::SmolStr;

use crate::error::{Error, Result};
use crate::largetext::LargeText;
use crate::rowset::{Cell, RowSet};
use crate::value::{format_number, json_number};

/// An XML document held as paged text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Markup {
    text: LargeText,
}

impl Markup {
    pub fn from_text(text: impl Into<LargeText>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &LargeText {
        &self.text
    }

    /// Applies the JSON conventions to rebuild a value tree.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        markup_to_json(self)
    }
}

impl From<&str> for Markup {
    fn from(text: &str) -> Self {
        Self::from_text(LargeText::from(text))
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text.fmt(f)
    }
}

/// Maps a member name onto a well-formed tag name. Characters outside
/// alnum/dash/underscore become underscores; a leading dash gets an
/// underscore prefix.
pub fn sanitize_tag(name: &str) -> SmolStr {
    let mut tag = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
            tag.push(ch);
        } else {
            tag.push('_');
        }
    }
    if tag.is_empty() || tag.starts_with('-') {
        tag.insert(0, '_');
    }
    SmolStr::new(tag)
}

/// Entity-escapes `text` for element content.
pub fn escape_text_into(out: &mut LargeText, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
}

/// Renders a row set as `<rowset><row>...</row></rowset>` markup, the
/// serialization path used when a column holds structured data. Null
/// cells are omitted; structured cells are spliced in verbatim.
pub fn rowset_to_markup(rows: &RowSet) -> Markup {
    let mut out = LargeText::new();
    out.push_str("<rowset>");
    for row in rows.rows() {
        out.push_str("<row>");
        for (column, cell) in rows.columns().iter().zip(row) {
            if matches!(cell, Cell::Null) {
                continue;
            }
            let tag = sanitize_tag(&column.name);
            out.push('<');
            out.push_str(&tag);
            out.push('>');
            match cell {
                Cell::Null => {}
                Cell::Varchar(text) => escape_text_into(&mut out, text),
                Cell::Number(value) => out.push_str(&format_number(*value)),
                Cell::Date(value) => out.push_str(&value.to_string()),
                Cell::Timestamp(value) => out.push_str(&value.to_string()),
                Cell::Clob(text) => {
                    for page in text.pages() {
                        escape_text_into(&mut out, page);
                    }
                }
                Cell::Structured(markup) => {
                    for page in markup.text().pages() {
                        out.push_str(page);
                    }
                }
            }
            out.push_str("</");
            out.push_str(&tag);
            out.push('>');
        }
        out.push_str("</row>");
    }
    out.push_str("</rowset>");
    Markup::from_text(out)
}

/// Rebuilds a JSON value from markup following the generator's
/// conventions. The name of the document element is ignored;
/// attributes are skipped.
pub fn markup_to_json(markup: &Markup) -> Result<serde_json::Value> {
    let text = markup.to_string();
    let mut scan = XmlScan { text: &text, pos: 0 };
    scan.skip_misc()?;
    if scan.at_end() {
        return Err(Error::markup("empty document"));
    }
    let (_, children) = scan.parse_element()?;
    scan.skip_misc()?;
    if !scan.at_end() {
        return Err(scan.error("content after the document element"));
    }
    children_to_value(&children)
}

enum Node {
    Text(String),
    Element { name: String, children: Vec<Node> },
}

fn children_to_value(children: &[Node]) -> Result<serde_json::Value> {
    let mut text = String::new();
    let mut elements: Vec<(&str, &[Node])> = Vec::new();
    for child in children {
        match child {
            Node::Text(part) => text.push_str(part),
            Node::Element { name, children } => elements.push((name, children)),
        }
    }
    if elements.is_empty() {
        if children.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        return Ok(sniff_scalar(&text));
    }
    if !text.trim().is_empty() {
        return Err(Error::markup("mixed text and element content"));
    }
    if elements.iter().all(|(name, _)| *name == "row") {
        let mut items = Vec::with_capacity(elements.len());
        for (_, grandchildren) in &elements {
            items.push(children_to_value(grandchildren)?);
        }
        return Ok(serde_json::Value::Array(items));
    }
    let mut map = serde_json::Map::new();
    for (name, grandchildren) in &elements {
        map.insert((*name).to_string(), children_to_value(grandchildren)?);
    }
    Ok(serde_json::Value::Object(map))
}

fn sniff_scalar(text: &str) -> serde_json::Value {
    let trimmed = text.trim();
    match trimmed {
        "true" => return serde_json::Value::Bool(true),
        "false" => return serde_json::Value::Bool(false),
        _ => {}
    }
    let numeric = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.' | 'e' | 'E'));
    if numeric {
        if let Ok(parsed) = trimmed.parse::<f64>() {
            if parsed.is_finite() {
                return json_number(parsed);
            }
        }
    }
    serde_json::Value::String(text.to_string())
}

struct XmlScan<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> XmlScan<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.text[self.pos..].starts_with(prefix)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_ws();
            if self.starts_with("<?") {
                match self.text[self.pos..].find("?>") {
                    Some(offset) => self.pos += offset + 2,
                    None => return Err(self.error("unterminated processing instruction")),
                }
            } else if self.starts_with("<!--") {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<()> {
        match self.text[self.pos..].find("-->") {
            Some(offset) => {
                self.pos += offset + 3;
                Ok(())
            }
            None => Err(self.error("unterminated comment")),
        }
    }

    fn read_name(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b':') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a tag name"));
        }
        Ok(self.text[start..self.pos].to_string())
    }

    fn parse_element(&mut self) -> Result<(String, Vec<Node>)> {
        self.expect(b'<')?;
        let name = self.read_name()?;
        self.skip_attributes()?;
        if self.eat("/>") {
            return Ok((name, Vec::new()));
        }
        self.expect(b'>')?;
        let mut children = Vec::new();
        loop {
            if self.eat("</") {
                let closing = self.read_name()?;
                if closing != name {
                    return Err(self.error(format!(
                        "closing tag </{closing}> does not match <{name}>"
                    )));
                }
                self.skip_ws();
                self.expect(b'>')?;
                return Ok((name, children));
            }
            if self.starts_with("<!--") {
                self.skip_comment()?;
            } else if self.peek() == Some(b'<') {
                let (child_name, child_children) = self.parse_element()?;
                children.push(Node::Element {
                    name: child_name,
                    children: child_children,
                });
            } else if self.at_end() {
                return Err(self.error(format!("unterminated element <{name}>")));
            } else {
                let text = self.read_text();
                children.push(Node::Text(text));
            }
        }
    }

    fn skip_attributes(&mut self) -> Result<()> {
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated tag")),
                Some(b'>') => return Ok(()),
                Some(b'/') if self.text.as_bytes().get(self.pos + 1) == Some(&b'>') => {
                    return Ok(())
                }
                Some(quote @ (b'"' | b'\'')) => {
                    self.pos += 1;
                    loop {
                        match self.peek() {
                            None => return Err(self.error("unterminated attribute value")),
                            Some(byte) if byte == quote => {
                                self.pos += 1;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn read_text(&mut self) -> String {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b'<' {
                break;
            }
            self.pos += 1;
        }
        decode_entities(&self.text[start..self.pos])
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::markup(format!("{} at offset {}", message.into(), self.pos))
    }
}

/// Resolves the predefined and numeric character references; anything
/// unrecognized passes through literally.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let Some(end) = rest[1..].find(';') else {
            out.push('&');
            rest = &rest[1..];
            continue;
        };
        let name = &rest[1..1 + end];
        let decoded = match name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => name.strip_prefix('#').and_then(|digits| {
                let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => digits.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[end + 2..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
