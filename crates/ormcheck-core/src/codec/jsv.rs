//! Compact JSV text encoding for collection columns
//!
//! Sequences render as `[a,b]`, maps as `{k:v}` and records as
//! `{Id:0,Name:Name0}`. Scalars are unquoted unless they are empty, contain
//! one of `[]{},:"`, or start or end with whitespace; quoted scalars double any
//! inner `"`. Element order is preserved, and maps are written in key order so
//! equal maps always produce equal text.
//!
//! ```
//! use ormcheck_core::codec::jsv;
//!
//! let text = jsv::to_string(&vec!["a".to_string(), "b,c".to_string()]);
//! assert_eq!(text, r#"[a,"b,c"]"#);
//! ```

use super::CodecError;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;
use uuid::Uuid;

const SPECIAL: &[char] = &['[', ']', '{', '}', ',', ':', '"'];

/// Parsed JSV value
#[derive(Debug, Clone, PartialEq)]
pub enum JsvNode {
    Scalar(String),
    List(Vec<JsvNode>),
    Map(Vec<(String, JsvNode)>),
}

impl JsvNode {
    pub fn as_scalar(&self) -> Result<&str, CodecError> {
        match self {
            JsvNode::Scalar(s) => Ok(s),
            _ => Err(CodecError::WrongShape { expected: "scalar" }),
        }
    }

    pub fn as_list(&self) -> Result<&[JsvNode], CodecError> {
        match self {
            JsvNode::List(items) => Ok(items),
            _ => Err(CodecError::WrongShape { expected: "list" }),
        }
    }

    pub fn as_map(&self) -> Result<&[(String, JsvNode)], CodecError> {
        match self {
            JsvNode::Map(entries) => Ok(entries),
            _ => Err(CodecError::WrongShape { expected: "map" }),
        }
    }

    /// Field lookup on a record-shaped node
    pub fn field(&self, name: &'static str) -> Result<&JsvNode, CodecError> {
        self.as_map()?
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
            .ok_or(CodecError::MissingField(name))
    }
}

/// Types that write themselves as JSV
pub trait JsvEncode {
    fn write_jsv(&self, out: &mut String);
}

/// Types that read themselves back from a parsed JSV node
pub trait JsvDecode: Sized {
    fn from_jsv(node: &JsvNode) -> Result<Self, CodecError>;
}

pub fn to_string<T: JsvEncode + ?Sized>(value: &T) -> String {
    let mut out = String::new();
    value.write_jsv(&mut out);
    out
}

pub fn from_str<T: JsvDecode>(text: &str) -> Result<T, CodecError> {
    T::from_jsv(&parse(text)?)
}

/// Write a scalar, quoting it when it would otherwise be ambiguous
pub fn write_scalar(out: &mut String, value: &str) {
    let needs_quotes = value.is_empty()
        || value.contains(SPECIAL)
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if needs_quotes {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// Write `{key:value,...}` for a record's fields in declaration order
pub fn write_record(out: &mut String, fields: &[(&str, &dyn JsvEncode)]) {
    out.push('{');
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_scalar(out, name);
        out.push(':');
        value.write_jsv(out);
    }
    out.push('}');
}

pub fn parse(text: &str) -> Result<JsvNode, CodecError> {
    let mut parser = Parser {
        chars: text.char_indices().peekable(),
    };
    let node = parser.value()?;
    match parser.chars.peek() {
        None => Ok(node),
        Some(&(offset, _)) => Err(CodecError::TrailingInput { offset }),
    }
}

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), CodecError> {
        match self.chars.next() {
            Some((_, c)) if c == wanted => Ok(()),
            Some((offset, found)) => Err(CodecError::UnexpectedChar {
                found,
                offset,
                expected,
            }),
            None => Err(CodecError::UnexpectedEnd { expected }),
        }
    }

    fn eat(&mut self, wanted: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == wanted) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<JsvNode, CodecError> {
        match self.chars.peek() {
            Some(&(_, '[')) => self.list(),
            Some(&(_, '{')) => self.map(),
            _ => self.scalar().map(JsvNode::Scalar),
        }
    }

    fn list(&mut self) -> Result<JsvNode, CodecError> {
        self.expect('[', "'['")?;
        let mut items = Vec::new();
        if self.eat(']') {
            return Ok(JsvNode::List(items));
        }
        loop {
            items.push(self.value()?);
            if self.eat(']') {
                return Ok(JsvNode::List(items));
            }
            self.expect(',', "',' or ']'")?;
        }
    }

    fn map(&mut self) -> Result<JsvNode, CodecError> {
        self.expect('{', "'{'")?;
        let mut entries = Vec::new();
        if self.eat('}') {
            return Ok(JsvNode::Map(entries));
        }
        loop {
            let key = self.scalar()?;
            self.expect(':', "':'")?;
            entries.push((key, self.value()?));
            if self.eat('}') {
                return Ok(JsvNode::Map(entries));
            }
            self.expect(',', "',' or '}'")?;
        }
    }

    fn scalar(&mut self) -> Result<String, CodecError> {
        if self.eat('"') {
            let mut out = String::new();
            loop {
                match self.chars.next() {
                    Some((_, '"')) if self.eat('"') => out.push('"'),
                    Some((_, '"')) => return Ok(out),
                    Some((_, c)) => out.push(c),
                    None => break,
                }
            }
            return Err(CodecError::UnexpectedEnd {
                expected: "closing '\"'",
            });
        }

        let mut out = String::new();
        while let Some(&(_, c)) = self.chars.peek() {
            if SPECIAL.contains(&c) {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        if out.is_empty() {
            return match self.chars.peek() {
                Some(&(offset, found)) => Err(CodecError::UnexpectedChar {
                    found,
                    offset,
                    expected: "a value",
                }),
                None => Err(CodecError::UnexpectedEnd {
                    expected: "a value",
                }),
            };
        }
        Ok(out)
    }
}

fn parse_scalar<T: std::str::FromStr>(
    node: &JsvNode,
    target: &'static str,
) -> Result<T, CodecError> {
    let text = node.as_scalar()?;
    text.parse().map_err(|_| CodecError::InvalidScalar {
        value: text.to_string(),
        target,
    })
}

macro_rules! jsv_display_scalar {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl JsvEncode for $ty {
                fn write_jsv(&self, out: &mut String) {
                    write_scalar(out, &self.to_string());
                }
            }

            impl JsvDecode for $ty {
                fn from_jsv(node: &JsvNode) -> Result<Self, CodecError> {
                    parse_scalar(node, $name)
                }
            }
        )*
    };
}

jsv_display_scalar! {
    i32 => "i32",
    i64 => "i64",
    String => "string",
}

impl JsvEncode for str {
    fn write_jsv(&self, out: &mut String) {
        write_scalar(out, self);
    }
}

impl JsvEncode for Uuid {
    fn write_jsv(&self, out: &mut String) {
        out.push_str(&self.hyphenated().to_string());
    }
}

impl JsvDecode for Uuid {
    fn from_jsv(node: &JsvNode) -> Result<Self, CodecError> {
        let text = node.as_scalar()?;
        Uuid::parse_str(text).map_err(|_| CodecError::InvalidScalar {
            value: text.to_string(),
            target: "uuid",
        })
    }
}

impl<T: JsvEncode> JsvEncode for [T] {
    fn write_jsv(&self, out: &mut String) {
        out.push('[');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            item.write_jsv(out);
        }
        out.push(']');
    }
}

impl<T: JsvEncode> JsvEncode for Vec<T> {
    fn write_jsv(&self, out: &mut String) {
        self.as_slice().write_jsv(out);
    }
}

impl<T: JsvDecode> JsvDecode for Vec<T> {
    fn from_jsv(node: &JsvNode) -> Result<Self, CodecError> {
        node.as_list()?.iter().map(T::from_jsv).collect()
    }
}

impl<K: JsvEncode, V: JsvEncode> JsvEncode for BTreeMap<K, V> {
    fn write_jsv(&self, out: &mut String) {
        out.push('{');
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            key.write_jsv(out);
            out.push(':');
            value.write_jsv(out);
        }
        out.push('}');
    }
}

impl<K: JsvDecode + Ord, V: JsvDecode> JsvDecode for BTreeMap<K, V> {
    fn from_jsv(node: &JsvNode) -> Result<Self, CodecError> {
        node.as_map()?
            .iter()
            .map(|(key, value)| {
                let key = K::from_jsv(&JsvNode::Scalar(key.clone()))?;
                Ok((key, V::from_jsv(value)?))
            })
            .collect()
    }
}
