//! Conversion of XML documents into generic `serde_json::Value` trees.
//!
//! The shape mirrors what the schema validator expects:
//!
//! - an element holding only text becomes a string, or a number when the text is
//!   a canonical numeric literal (`"45.5"`, `"12"`, but not `"007"` or `"1e3"`);
//! - an element with children becomes an object keyed by the children's local names,
//!   with any loose text stored under `#text`;
//! - an empty element becomes an empty string;
//! - a child name that occurs more than once becomes an array, in document order.
//!
//! Namespace prefixes are dropped (`cap:alert` and `alert` produce the same key) and
//! attributes, comments, processing instructions and doctypes are ignored.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Number, Value};
use thiserror::Error;

pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {source}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("unexpected closing tag")]
    UnexpectedEnd,
    #[error("document has no root element")]
    Empty,
}

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return scalar(self.text);
        }
        let mut children = self.children;
        if !self.text.is_empty() {
            insert_child(&mut children, TEXT_KEY.to_string(), scalar(self.text));
        }
        Value::Object(children)
    }
}

/// Parses an XML document into a generic value tree keyed by the root element's name.
pub fn parse_document(xml: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![Frame::new(String::new())];

    loop {
        let event = reader.read_event().map_err(|source| XmlError::Syntax {
            position: reader.error_position() as u64,
            source,
        })?;

        match event {
            Event::Start(start) => {
                stack.push(Frame::new(local_name(start.local_name().as_ref())));
            }
            Event::Empty(empty) => {
                let name = local_name(empty.local_name().as_ref());
                let parent = stack.last_mut().ok_or(XmlError::UnexpectedEnd)?;
                insert_child(&mut parent.children, name, Value::String(String::new()));
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(|source| XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&cdata));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(XmlError::UnexpectedEnd);
                }
                let frame = stack.pop().ok_or(XmlError::UnexpectedEnd)?;
                let name = frame.name.clone();
                let value = frame.into_value();
                let parent = stack.last_mut().ok_or(XmlError::UnexpectedEnd)?;
                insert_child(&mut parent.children, name, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() > 1 {
        let open = stack.pop().map(|frame| frame.name).unwrap_or_default();
        return Err(XmlError::Unclosed(open));
    }

    let root = stack.pop().ok_or(XmlError::Empty)?;
    if root.children.is_empty() {
        return Err(XmlError::Empty);
    }
    Ok(Value::Object(root.children))
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Adds a child value, turning a repeated name into an array.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Text that prints back identically as a JSON number becomes a number; everything else
/// stays a string so no formatting is lost.
fn scalar(text: String) -> Value {
    if let Ok(integer) = text.parse::<i64>() {
        if integer.to_string() == text {
            return Value::from(integer);
        }
    }
    if let Ok(float) = text.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            if number.to_string() == text {
                return Value::Number(number);
            }
        }
    }
    Value::String(text)
}
