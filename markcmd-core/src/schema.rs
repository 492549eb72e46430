//! Schema descriptions and the field-kind tables built from them.
//!
//! A [`SchemaDescription`] is plain configuration: named schemas, each a list
//! of field declarations in declaration order, plus the name of the root
//! schema whose fields are the commands a paragraph may contain. It can be
//! written by hand with the builder methods or loaded from YAML/JSON:
//!
//! ```yaml
//! root: commands
//! schemas:
//!   commands:
//!     fields:
//!       - { name: text, type: string }
//!       - { name: message, type: "object:message" }
//!   message:
//!     fields:
//!       - { name: to, type: string }
//!       - { name: text, type: string, kind: content }
//! ```
//!
//! [`SchemaDescription::compile`] resolves every field to a [`FieldKind`] once,
//! producing a [`CommandSchema`] that the command builder queries by name.
//! Nested schema references stay symbolic and are resolved at lookup time.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_xid::UnicodeXID;

use crate::error::SchemaError;

// ============================================================================
// Description (configuration)
// ============================================================================

/// Declared type of a field.
///
/// Written as a string in descriptions: `string`, `number`, `boolean`,
/// `datetime`, `duration`, `object:<schema>` or `list:<type>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    DateTime,
    Duration,
    Object(String),
    List(Box<FieldType>),
}

impl FieldType {
    pub fn object(schema: impl Into<String>) -> Self {
        FieldType::Object(schema.into())
    }

    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    /// Scalar types are the ones that can live in a tag attribute.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldType::Object(_) | FieldType::List(_))
    }

    /// Short name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "datetime",
            FieldType::Duration => "duration",
            FieldType::Object(_) => "object",
            FieldType::List(_) => "list",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Object(schema) => write!(f, "object:{}", schema),
            FieldType::List(item) => write!(f, "list:{}", item),
            scalar => f.write_str(scalar.type_name()),
        }
    }
}

impl FromStr for FieldType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(item) = s.strip_prefix("list:") {
            return Ok(FieldType::List(Box::new(item.parse()?)));
        }
        if let Some(schema) = s.strip_prefix("object:") {
            let schema = schema.trim();
            if schema.is_empty() {
                return Err(SchemaError::Description(format!("missing schema name in '{}'", s)));
            }
            return Ok(FieldType::Object(schema.to_string()));
        }
        match s {
            "string" | "str" => Ok(FieldType::String),
            "number" | "integer" | "float" => Ok(FieldType::Number),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "datetime" => Ok(FieldType::DateTime),
            "duration" => Ok(FieldType::Duration),
            other => Err(SchemaError::Description(format!("unknown field type '{}'", other))),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

/// Explicit placement metadata attached to a field declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindHint {
    Attribute,
    Element,
    Content,
}

/// A single field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<KindHint>,
}

/// The declared fields of one schema, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDecl {
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
}

impl SchemaDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field with no explicit kind.
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.declare(name, ty, None)
    }

    /// Declare a string field that lives in a tag attribute.
    pub fn attribute(self, name: impl Into<String>) -> Self {
        self.declare(name, FieldType::String, Some(KindHint::Attribute))
    }

    /// Declare a field that is always written as a child element.
    pub fn element(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.declare(name, ty, Some(KindHint::Element))
    }

    /// Declare the field holding the element's own text.
    pub fn content(self, name: impl Into<String>) -> Self {
        self.declare(name, FieldType::String, Some(KindHint::Content))
    }

    pub fn declare(mut self, name: impl Into<String>, ty: FieldType, kind: Option<KindHint>) -> Self {
        self.fields.push(FieldDecl {
            name: name.into(),
            ty,
            kind,
        });
        self
    }
}

/// A set of named schemas plus the root (command) schema name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub root: String,
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaDecl>,
}

impl SchemaDescription {
    pub fn new(root: impl Into<String>) -> Self {
        SchemaDescription {
            root: root.into(),
            schemas: BTreeMap::new(),
        }
    }

    pub fn with_schema(mut self, name: impl Into<String>, decl: SchemaDecl) -> Self {
        self.schemas.insert(name.into(), decl);
        self
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(input).map_err(|e| SchemaError::Description(e.to_string()))
    }

    pub fn from_json_str(input: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(input).map_err(|e| SchemaError::Description(e.to_string()))
    }

    /// Resolve every declared field to its [`FieldKind`].
    pub fn compile(&self) -> Result<CommandSchema, SchemaError> {
        if !self.schemas.contains_key(&self.root) {
            return Err(SchemaError::UnknownRoot(self.root.clone()));
        }

        let mut tables = HashMap::with_capacity(self.schemas.len());
        for (name, decl) in &self.schemas {
            tables.insert(name.clone(), FieldTable::build(name, decl)?);
        }

        Ok(CommandSchema {
            root: SchemaRef(self.root.clone()),
            tables,
        })
    }
}

// ============================================================================
// Compiled tables (introspection)
// ============================================================================

/// Name of a schema inside a [`CommandSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaRef(String);

impl SchemaRef {
    pub fn new(name: impl Into<String>) -> Self {
        SchemaRef(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Structural role of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Populated from a tag attribute.
    Attribute,
    /// A child element holding text.
    ScalarElement,
    /// A child element holding a nested object.
    ObjectElement,
    /// A repeated child element; each occurrence is one list item.
    ListElement,
    /// The element's own text.
    ContentElement,
}

impl FieldKind {
    pub fn is_element(self) -> bool {
        matches!(
            self,
            FieldKind::ScalarElement | FieldKind::ObjectElement | FieldKind::ListElement
        )
    }

    fn resolve(field: &FieldDecl) -> Result<FieldKind, SchemaError> {
        let not_scalar = || SchemaError::NotScalar(field.name.clone());
        let kind = match (field.kind, &field.ty) {
            (Some(KindHint::Attribute), ty) if !ty.is_scalar() => return Err(not_scalar()),
            (Some(KindHint::Content), ty) if !ty.is_scalar() => return Err(not_scalar()),
            (Some(KindHint::Attribute), _) => FieldKind::Attribute,
            (Some(KindHint::Content), _) => FieldKind::ContentElement,
            (_, FieldType::Object(_)) => FieldKind::ObjectElement,
            (_, FieldType::List(_)) => FieldKind::ListElement,
            (Some(KindHint::Element), _) => FieldKind::ScalarElement,
            (None, _) => FieldKind::Attribute,
        };
        Ok(kind)
    }
}

/// Resolved description of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub ty: FieldType,
}

impl FieldDescriptor {
    /// Schema of the nested object, or of the list item when it is an object.
    pub fn nested_schema(&self) -> Option<SchemaRef> {
        match &self.ty {
            FieldType::Object(name) => Some(SchemaRef::new(name.as_str())),
            FieldType::List(item) => match item.as_ref() {
                FieldType::Object(name) => Some(SchemaRef::new(name.as_str())),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Precomputed name → [`FieldDescriptor`] table for one schema.
#[derive(Debug, Clone)]
pub struct FieldTable {
    name: SchemaRef,
    fields: Vec<(String, FieldDescriptor)>,
    index: HashMap<String, usize>,
    content: Option<usize>,
}

impl FieldTable {
    fn build(name: &str, decl: &SchemaDecl) -> Result<FieldTable, SchemaError> {
        let mut fields = Vec::with_capacity(decl.fields.len());
        let mut index = HashMap::with_capacity(decl.fields.len());
        let mut content = Vec::new();

        for field in &decl.fields {
            if !is_tag_name(&field.name) {
                return Err(SchemaError::InvalidFieldName {
                    schema: name.to_string(),
                    field: field.name.clone(),
                });
            }
            if index.contains_key(&field.name) {
                return Err(SchemaError::DuplicateField {
                    schema: name.to_string(),
                    field: field.name.clone(),
                });
            }

            let kind = FieldKind::resolve(field)?;
            if kind == FieldKind::ContentElement {
                content.push(fields.len());
            }
            index.insert(field.name.clone(), fields.len());
            fields.push((
                field.name.clone(),
                FieldDescriptor {
                    kind,
                    ty: field.ty.clone(),
                },
            ));
        }

        if content.len() > 1 {
            let names = content.iter().map(|&i| fields[i].0.clone()).collect();
            return Err(SchemaError::MultipleContentFields(names));
        }

        Ok(FieldTable {
            name: SchemaRef::new(name),
            fields,
            index,
            content: content.first().copied(),
        })
    }

    pub fn name(&self) -> &SchemaRef {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&FieldDescriptor> {
        self.index.get(field).map(|&i| &self.fields[i].1)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// The field marked as the element's own text, if any.
    pub fn content_field(&self) -> Option<&str> {
        self.content.map(|i| self.fields[i].0.as_str())
    }

    /// Fields that are written as child elements, in declaration order.
    pub fn element_fields(&self) -> impl Iterator<Item = &str> {
        self.fields()
            .filter(|(_, field)| field.kind.is_element())
            .map(|(name, _)| name)
    }

    /// Field that receives free prose: the content field, else the first
    /// attribute field.
    pub fn text_field(&self) -> Option<&str> {
        self.content_field().or_else(|| {
            self.fields()
                .find(|(_, field)| field.kind == FieldKind::Attribute)
                .map(|(name, _)| name)
        })
    }
}

/// Compiled schema set; the introspector queried by the command builder.
#[derive(Debug, Clone)]
pub struct CommandSchema {
    root: SchemaRef,
    tables: HashMap<String, FieldTable>,
}

impl CommandSchema {
    pub fn root(&self) -> &FieldTable {
        // compile() refuses descriptions without the root table
        &self.tables[self.root.name()]
    }

    pub fn table(&self, schema: &SchemaRef) -> Option<&FieldTable> {
        self.tables.get(schema.name())
    }

    /// Descriptor of a command, i.e. a field of the root schema.
    pub fn command(&self, name: &str) -> Option<&FieldDescriptor> {
        self.root().get(name)
    }

    pub fn field_kind(&self, schema: &SchemaRef, name: &str) -> Option<&FieldDescriptor> {
        self.table(schema)?.get(name)
    }
}

fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || UnicodeXID::is_xid_start(c) => {}
        _ => return false,
    }
    chars.all(|c| c == '-' || c == '.' || UnicodeXID::is_xid_continue(c))
}
