//! Values and commands produced by the parser.
//!
//! Values are immutable once built. Each one carries a [`Symbol`]: two values
//! with the same text parsed from different places compare equal but have
//! different symbols, and line numbers are recorded per symbol.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::diagnostics::Symbol;

/// A parsed value.
#[derive(Debug, Clone)]
pub struct Value {
    symbol: Symbol,
    kind: ValueKind,
}

/// The shape of a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// Whitespace-normalized text.
    Text(String),
    /// Named fields; names are unique.
    Object(BTreeMap<String, Value>),
    /// Items in document order, all of the same shape.
    List(Vec<Value>),
    /// Attribute fields plus the element's own text stored under
    /// `content_field`.
    ContentObject {
        fields: BTreeMap<String, Value>,
        content_field: String,
    },
}

impl Value {
    pub(crate) fn new(kind: ValueKind, symbol: Symbol) -> Self {
        Value { symbol, kind }
    }

    pub(crate) fn text(text: impl Into<String>, symbol: Symbol) -> Self {
        Value::new(ValueKind::Text(text.into()), symbol)
    }

    /// Identity of this value in the line registry.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut ValueKind {
        &mut self.kind
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// Field lookup on objects and content objects.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match &self.kind {
            ValueKind::Object(fields) | ValueKind::ContentObject { fields, .. } => fields.get(field),
            _ => None,
        }
    }

    /// Text of a content object.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::ContentObject {
                fields,
                content_field,
            } => fields.get(content_field).and_then(Value::as_text),
            _ => None,
        }
    }

    /// Direct children, in field-name or item order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Value> + '_> {
        match &self.kind {
            ValueKind::Text(_) => Box::new(std::iter::empty()),
            ValueKind::Object(fields) | ValueKind::ContentObject { fields, .. } => {
                Box::new(fields.values())
            }
            ValueKind::List(items) => Box::new(items.iter()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, ValueKind::Text(_))
    }
}

/// Equality is structural; symbols are ignored.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.kind {
            ValueKind::Text(text) => serializer.serialize_str(text),
            ValueKind::List(items) => serializer.collect_seq(items),
            ValueKind::Object(fields) | ValueKind::ContentObject { fields, .. } => {
                serializer.collect_map(fields)
            }
        }
    }
}

/// One instruction extracted from a document: a tag name and its value.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: String,
    pub value: Value,
}

impl Command {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Command {
            name: name.into(),
            value,
        }
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.value)?;
        map.end()
    }
}
