//! Schema-driven command building from tag/text events.
//!
//! [`CommandBuilder`] consumes the events of one paragraph, keeping a stack
//! with one frame per open tag. Each frame holds a [`Handler`] variant chosen
//! from the schema when the tag opened:
//!
//! ```text
//! <p>                       Paragraph   prose harvester + emitted commands
//!   <carousel>              Object      fields from the `carousel` schema
//!     <item>                List        wraps the item's Object handler
//!       <title>             Scalar      text segments
//!   <message to="x">        ContentObject  attributes + content text
//! ```
//!
//! Values are frozen when their frame is popped and folded into the parent
//! frame; the paragraph frame turns its folded values into [`Command`]s.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use phf::phf_map;

use crate::diagnostics::Diagnostics;
use crate::error::ParseError;
use crate::markup::{IMAGE_TAG, LINE_BREAK_TAG, PARAGRAPH_TAG};
use crate::schema::{CommandSchema, FieldDescriptor, FieldKind, FieldTable, FieldType};
use crate::text::Segments;
use crate::value::{Command, Value, ValueKind};

/// Attributes of a start tag, in source order.
pub type Attributes = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    Image,
    LineBreak,
}

/// Tags the paragraph understands without consulting the schema.
static MARKUP_TAGS: phf::Map<&'static str, Markup> = phf_map! {
    "image" => Markup::Image,
    "br" => Markup::LineBreak,
};

// ============================================================================
// Handlers
// ============================================================================

/// Accumulates text between line breaks.
#[derive(Debug, Default)]
struct ScalarHandler {
    segments: Segments,
    first_line: Option<usize>,
}

impl ScalarHandler {
    fn text(&mut self, text: &str, line: usize) {
        if self.first_line.is_none() {
            if let Some(pos) = text.find(|c: char| !c.is_whitespace()) {
                self.first_line = Some(line + text[..pos].matches('\n').count());
            }
        }
        self.segments.push_str(text);
    }

    fn line_break(&mut self) {
        self.segments.line_break();
    }

    fn is_blank(&self) -> bool {
        self.segments.is_blank()
    }

    /// Freeze at the line of the first non-blank text, or `fallback`.
    fn freeze(self, fallback: usize, diagnostics: &mut Diagnostics) -> Value {
        let line = self.first_line.unwrap_or(fallback);
        self.freeze_at(line, diagnostics)
    }

    fn freeze_at(self, line: usize, diagnostics: &mut Diagnostics) -> Value {
        Value::text(self.segments.finish(), diagnostics.register(line))
    }
}

/// Root frame: harvests prose runs and collects finished commands.
#[derive(Debug, Default)]
struct ParagraphHandler {
    harvester: Option<ScalarHandler>,
    commands: Vec<Command>,
}

impl ParagraphHandler {
    fn open_child<'s>(
        &mut self,
        schema: &'s CommandSchema,
        name: &str,
        attrs: Attributes,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<Handler<'s>, ParseError> {
        match MARKUP_TAGS.get(name) {
            Some(Markup::LineBreak) => {
                self.harvester.get_or_insert_with(ScalarHandler::default).line_break();
                return Ok(Handler::Inline(Markup::LineBreak));
            }
            Some(Markup::Image) => {
                self.flush(schema, diagnostics)?;
                let value = image_value(attrs, line, diagnostics);
                self.commands.push(Command::new(IMAGE_TAG, value));
                return Ok(Handler::Inline(Markup::Image));
            }
            None => {}
        }

        let Some(field) = schema.command(name) else {
            // an unknown tag is part of the prose run, which cannot hold tags
            let harvester = schema.root().text_field().unwrap_or(PARAGRAPH_TAG);
            return Err(undescribed_child(harvester, name, line));
        };
        self.flush(schema, diagnostics)?;
        open_command(schema, name, field, attrs, line, diagnostics)
    }

    fn text(&mut self, text: &str, line: usize) {
        self.harvester.get_or_insert_with(ScalarHandler::default).text(text, line);
    }

    /// Turn the current prose run, if any, into a command.
    fn flush(&mut self, schema: &CommandSchema, diagnostics: &mut Diagnostics) -> Result<(), ParseError> {
        let Some(harvester) = self.harvester.take() else {
            return Ok(());
        };
        if harvester.is_blank() {
            return Ok(());
        }
        let line = harvester.first_line.unwrap_or_default();
        let Some(field) = schema.root().text_field() else {
            return Err(ParseError::new(
                format!("Element '{}' has undescribed text", PARAGRAPH_TAG),
                line,
            ));
        };
        let value = harvester.freeze(line, diagnostics);
        self.commands.push(Command::new(field, value));
        Ok(())
    }
}

/// Fields of one object; attributes are converted on construction.
#[derive(Debug)]
struct ObjectHandler<'s> {
    table: &'s FieldTable,
    fields: BTreeMap<String, Value>,
}

impl<'s> ObjectHandler<'s> {
    fn new(
        table: &'s FieldTable,
        attrs: Attributes,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ParseError> {
        Ok(ObjectHandler {
            table,
            fields: attribute_fields(table, attrs, line, diagnostics)?,
        })
    }

    fn open_child(
        &self,
        schema: &'s CommandSchema,
        name: &str,
        attrs: Attributes,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<Handler<'s>, ParseError> {
        let Some(field) = self.table.get(name) else {
            return Err(not_in_schema(name, line));
        };
        let repeatable = field.kind == FieldKind::ListElement;
        if field.kind.is_element() && !repeatable && self.fields.contains_key(name) {
            return Err(ParseError::new(format!("Value '{}' already defined", name), line));
        }
        open_field(schema, name, field, attrs, line, diagnostics)
    }

    fn accept(&mut self, name: String, value: Value, item: bool, line: usize, diagnostics: &mut Diagnostics) {
        if !item {
            self.fields.insert(name, value);
            return;
        }
        match self.fields.entry(name) {
            Entry::Occupied(mut entry) => {
                if let ValueKind::List(items) = entry.get_mut().kind_mut() {
                    items.push(value);
                }
            }
            Entry::Vacant(entry) => {
                let list = Value::new(ValueKind::List(vec![value]), diagnostics.register(line));
                entry.insert(list);
            }
        }
    }

    fn freeze(self, line: usize, diagnostics: &mut Diagnostics) -> Value {
        Value::new(ValueKind::Object(self.fields), diagnostics.register(line))
    }
}

/// Attribute fields plus the element's own text.
#[derive(Debug)]
struct ContentHandler<'s> {
    table: &'s FieldTable,
    content_field: &'s str,
    fields: BTreeMap<String, Value>,
    content: ScalarHandler,
}

impl<'s> ContentHandler<'s> {
    fn open_child(&mut self, name: &str, line: usize) -> Result<Handler<'s>, ParseError> {
        if name == LINE_BREAK_TAG {
            self.content.line_break();
            return Ok(Handler::Inline(Markup::LineBreak));
        }
        match self.table.get(name) {
            None => Err(not_in_schema(name, line)),
            Some(_) => Err(not_an_element(name, line)),
        }
    }

    fn freeze(mut self, line: usize, diagnostics: &mut Diagnostics) -> Value {
        let text = self.content.freeze(line, diagnostics);
        self.fields.insert(self.content_field.to_string(), text);
        let kind = ValueKind::ContentObject {
            fields: self.fields,
            content_field: self.content_field.to_string(),
        };
        Value::new(kind, diagnostics.register(line))
    }
}

/// One occurrence of a repeated field; the item handler does the work.
#[derive(Debug)]
struct ListHandler<'s> {
    item: Box<Handler<'s>>,
}

#[derive(Debug)]
enum Handler<'s> {
    Paragraph(ParagraphHandler),
    Scalar(ScalarHandler),
    Object(ObjectHandler<'s>),
    ContentObject(ContentHandler<'s>),
    List(ListHandler<'s>),
    /// Open `br` or `image` tag; its effect was applied when it opened.
    Inline(Markup),
}

impl Handler<'_> {
    /// `br` frames are transparent: their events go to the frame below.
    fn is_line_break(&self) -> bool {
        matches!(self, Handler::Inline(Markup::LineBreak))
    }
}

/// What a popped frame leaves behind.
enum Closed {
    Value { value: Value, item: bool },
    Paragraph(Vec<Command>),
    Nothing,
}

impl<'s> Handler<'s> {
    fn open_child(
        &mut self,
        schema: &'s CommandSchema,
        tag: &str,
        name: &str,
        attrs: Attributes,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<Handler<'s>, ParseError> {
        match self {
            Handler::Paragraph(paragraph) => paragraph.open_child(schema, name, attrs, line, diagnostics),
            Handler::Scalar(scalar) if name == LINE_BREAK_TAG => {
                scalar.line_break();
                Ok(Handler::Inline(Markup::LineBreak))
            }
            Handler::Scalar(_) | Handler::Inline(_) => Err(undescribed_child(tag, name, line)),
            Handler::Object(object) => object.open_child(schema, name, attrs, line, diagnostics),
            Handler::ContentObject(content) => content.open_child(name, line),
            Handler::List(list) => list.item.open_child(schema, tag, name, attrs, line, diagnostics),
        }
    }

    fn text(&mut self, tag: &str, text: &str, line: usize) -> Result<(), ParseError> {
        match self {
            Handler::Paragraph(paragraph) => {
                paragraph.text(text, line);
                Ok(())
            }
            Handler::Scalar(scalar) => {
                scalar.text(text, line);
                Ok(())
            }
            Handler::Object(_) | Handler::Inline(_) => reject_text(tag, text, line),
            Handler::ContentObject(content) => {
                content.content.text(text, line);
                Ok(())
            }
            Handler::List(list) => list.item.text(tag, text, line),
        }
    }

    /// Fold a finished child value into this handler.
    fn accept(
        &mut self,
        tag: &str,
        child: String,
        value: Value,
        item: bool,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ParseError> {
        match self {
            Handler::Paragraph(paragraph) => {
                paragraph.commands.push(Command::new(child, value));
                Ok(())
            }
            Handler::Object(object) => {
                object.accept(child, value, item, line, diagnostics);
                Ok(())
            }
            Handler::List(list) => list.item.accept(tag, child, value, item, line, diagnostics),
            // these never open child frames
            Handler::Scalar(_) | Handler::ContentObject(_) | Handler::Inline(_) => {
                Err(undescribed_child(tag, &child, line))
            }
        }
    }

    fn close(
        self,
        schema: &CommandSchema,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Result<Closed, ParseError> {
        let closed = match self {
            Handler::Paragraph(mut paragraph) => {
                paragraph.flush(schema, diagnostics)?;
                Closed::Paragraph(paragraph.commands)
            }
            Handler::Scalar(scalar) => Closed::Value {
                value: scalar.freeze_at(line, diagnostics),
                item: false,
            },
            Handler::Object(object) => Closed::Value {
                value: object.freeze(line, diagnostics),
                item: false,
            },
            Handler::ContentObject(content) => Closed::Value {
                value: content.freeze(line, diagnostics),
                item: false,
            },
            Handler::List(list) => match list.item.close(schema, line, diagnostics)? {
                Closed::Value { value, .. } => Closed::Value { value, item: true },
                other => other,
            },
            Handler::Inline(_) => Closed::Nothing,
        };
        Ok(closed)
    }
}

// ============================================================================
// Handler construction
// ============================================================================

fn open_command<'s>(
    schema: &'s CommandSchema,
    name: &str,
    field: &FieldDescriptor,
    attrs: Attributes,
    line: usize,
    diagnostics: &mut Diagnostics,
) -> Result<Handler<'s>, ParseError> {
    match field.kind {
        FieldKind::Attribute => Err(ParseError::new(
            format!("Command '{}' is not described as an element", name),
            line,
        )),
        FieldKind::ListElement => Err(ParseError::new(
            format!("The list ('{}') should be a dictionary field", name),
            line,
        )),
        FieldKind::ContentElement | FieldKind::ScalarElement => {
            reject_attributes(name, &attrs, line)?;
            Ok(Handler::Scalar(ScalarHandler::default()))
        }
        FieldKind::ObjectElement => open_object(schema, name, field, attrs, line, diagnostics, true),
    }
}

fn open_field<'s>(
    schema: &'s CommandSchema,
    name: &str,
    field: &FieldDescriptor,
    attrs: Attributes,
    line: usize,
    diagnostics: &mut Diagnostics,
) -> Result<Handler<'s>, ParseError> {
    match field.kind {
        FieldKind::Attribute | FieldKind::ContentElement => Err(not_an_element(name, line)),
        FieldKind::ScalarElement => {
            reject_attributes(name, &attrs, line)?;
            Ok(Handler::Scalar(ScalarHandler::default()))
        }
        FieldKind::ObjectElement => open_object(schema, name, field, attrs, line, diagnostics, false),
        FieldKind::ListElement => {
            let item = open_object(schema, name, field, attrs, line, diagnostics, false)?;
            Ok(Handler::List(ListHandler { item: Box::new(item) }))
        }
    }
}

/// Object or content-object handler for the nested schema of `field`.
fn open_object<'s>(
    schema: &'s CommandSchema,
    name: &str,
    field: &FieldDescriptor,
    attrs: Attributes,
    line: usize,
    diagnostics: &mut Diagnostics,
    command: bool,
) -> Result<Handler<'s>, ParseError> {
    let unexpected = |what: &str| {
        ParseError::new(format!("Unexpected schema ({}) for element '{}'", what, name), line)
    };

    let schema_ref = match &field.ty {
        FieldType::Object(_) | FieldType::List(_) => field.nested_schema(),
        other => return Err(unexpected(other.type_name())),
    };
    let Some(schema_ref) = schema_ref else {
        // list of scalars or of lists
        let item = match &field.ty {
            FieldType::List(item) => item.type_name(),
            other => other.type_name(),
        };
        return Err(unexpected(item));
    };
    let Some(table) = schema.table(&schema_ref) else {
        if command {
            return Err(ParseError::new(format!("'{}' command not found", name), line));
        }
        return Err(unexpected(schema_ref.name()));
    };

    let Some(content_field) = table.content_field() else {
        let object = ObjectHandler::new(table, attrs, line, diagnostics)?;
        return Ok(Handler::Object(object));
    };

    let elements: Vec<&str> = table.element_fields().collect();
    if !elements.is_empty() {
        return Err(ParseError::new(
            format!(
                "An '{}' element with a '{}' content field cannot contain child elements: {}",
                name,
                content_field,
                elements.join(", ")
            ),
            line,
        ));
    }

    Ok(Handler::ContentObject(ContentHandler {
        table,
        content_field,
        fields: attribute_fields(table, attrs, line, diagnostics)?,
        content: ScalarHandler::default(),
    }))
}

fn attribute_fields(
    table: &FieldTable,
    attrs: Attributes,
    line: usize,
    diagnostics: &mut Diagnostics,
) -> Result<BTreeMap<String, Value>, ParseError> {
    let mut fields = BTreeMap::new();
    for (name, value) in attrs {
        match table.get(&name).map(|field| field.kind) {
            None => return Err(not_in_schema(&name, line)),
            Some(FieldKind::Attribute) => {
                let value = Value::text(value, diagnostics.register(line));
                fields.insert(name, value);
            }
            Some(_) => {
                return Err(ParseError::new(
                    format!("Field '{}' is not described as an attribute", name),
                    line,
                ))
            }
        }
    }
    Ok(fields)
}

/// `image` commands take their attributes as-is.
fn image_value(attrs: Attributes, line: usize, diagnostics: &mut Diagnostics) -> Value {
    let fields = attrs
        .into_iter()
        .map(|(name, value)| (name, Value::text(value, diagnostics.register(line))))
        .collect();
    Value::new(ValueKind::Object(fields), diagnostics.register(line))
}

fn reject_attributes(tag: &str, attrs: &Attributes, line: usize) -> Result<(), ParseError> {
    if attrs.is_empty() {
        return Ok(());
    }
    let map = attrs
        .iter()
        .map(|(name, value)| format!("{:?}: {:?}", name, value))
        .collect::<Vec<_>>()
        .join(", ");
    Err(ParseError::new(
        format!("Element '{}' has undescribed attributes {{{}}}", tag, map),
        line,
    ))
}

fn reject_text(tag: &str, text: &str, line: usize) -> Result<(), ParseError> {
    match text.find(|c: char| !c.is_whitespace()) {
        None => Ok(()),
        Some(pos) => Err(ParseError::new(
            format!("Element '{}' has undescribed text", tag),
            line + text[..pos].matches('\n').count(),
        )),
    }
}

fn undescribed_child(tag: &str, child: &str, line: usize) -> ParseError {
    ParseError::new(
        format!("Element '{}' has undescribed child element '{}'", tag, child),
        line,
    )
}

fn not_in_schema(name: &str, line: usize) -> ParseError {
    ParseError::new(format!("Field '{}' is not described in the schema", name), line)
}

fn not_an_element(name: &str, line: usize) -> ParseError {
    ParseError::new(format!("Field '{}' is not described as an element", name), line)
}

// ============================================================================
// CommandBuilder
// ============================================================================

struct Frame<'s> {
    tag: String,
    line: usize,
    handler: Handler<'s>,
}

/// The innermost frame that takes events, skipping open `br` tags.
fn target<'a, 's>(stack: &'a mut [Frame<'s>]) -> Option<&'a mut Frame<'s>> {
    stack.iter_mut().rev().find(|frame| !frame.handler.is_line_break())
}

/// Builds the commands of one paragraph from its tag/text events.
///
/// Lines passed in are paragraph-local; every frozen value is registered in
/// the borrowed [`Diagnostics`].
pub struct CommandBuilder<'s, 'd> {
    schema: &'s CommandSchema,
    diagnostics: &'d mut Diagnostics,
    stack: Vec<Frame<'s>>,
    commands: Vec<Command>,
    closed: bool,
}

impl<'s, 'd> CommandBuilder<'s, 'd> {
    pub fn new(schema: &'s CommandSchema, diagnostics: &'d mut Diagnostics) -> Self {
        CommandBuilder {
            schema,
            diagnostics,
            stack: Vec::new(),
            commands: Vec::new(),
            closed: false,
        }
    }

    pub fn start(&mut self, name: &str, attrs: Attributes, line: usize) -> Result<(), ParseError> {
        let schema = self.schema;
        let Some(frame) = target(&mut self.stack) else {
            if self.closed || name != PARAGRAPH_TAG {
                return Err(ParseError::new(format!("Unexpected root element: '{}'", name), line));
            }
            self.stack.push(Frame {
                tag: name.to_string(),
                line,
                handler: Handler::Paragraph(ParagraphHandler::default()),
            });
            return Ok(());
        };

        let handler = frame
            .handler
            .open_child(schema, &frame.tag, name, attrs, line, self.diagnostics)?;
        self.stack.push(Frame {
            tag: name.to_string(),
            line,
            handler,
        });
        Ok(())
    }

    pub fn text(&mut self, text: &str, line: usize) -> Result<(), ParseError> {
        match target(&mut self.stack) {
            Some(frame) => frame.handler.text(&frame.tag, text, line),
            None => reject_text(PARAGRAPH_TAG, text, line),
        }
    }

    pub fn end(&mut self, name: &str, line: usize) -> Result<(), ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Err(ParseError::new(format!("Unexpected closing tag '</{}>'", name), line));
        };
        let Frame {
            tag,
            line: start_line,
            handler,
        } = frame;

        match handler.close(self.schema, start_line, self.diagnostics)? {
            Closed::Paragraph(commands) => {
                self.commands.extend(commands);
                self.closed = true;
                Ok(())
            }
            Closed::Nothing => Ok(()),
            Closed::Value { value, item } => match target(&mut self.stack) {
                Some(parent) => parent.handler.accept(
                    &parent.tag,
                    tag,
                    value,
                    item,
                    start_line,
                    self.diagnostics,
                ),
                None => Err(ParseError::new(format!("Unexpected closing tag '</{}>'", name), line)),
            },
        }
    }

    /// The commands of the paragraph, once its root tag has closed.
    pub fn finish(self, line: usize) -> Result<Vec<Command>, ParseError> {
        if !self.closed {
            let open = self.stack.last().map_or(PARAGRAPH_TAG, |frame| frame.tag.as_str());
            return Err(ParseError::new(format!("Element '{}' is not closed", open), line));
        }
        Ok(self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaDecl, SchemaDescription};
    use serde_json::json;

    fn schema() -> CommandSchema {
        SchemaDescription::new("commands")
            .with_schema(
                "commands",
                SchemaDecl::new()
                    .field("text", FieldType::String)
                    .field("card", FieldType::object("card")),
            )
            .with_schema(
                "card",
                SchemaDecl::new()
                    .attribute("id")
                    .element("title", FieldType::String),
            )
            .compile()
            .unwrap()
    }

    #[test]
    fn test_events_to_commands() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);

        builder.start("p", vec![], 0).unwrap();
        builder.text("Hello\n  there ", 0).unwrap();
        builder.start("card", vec![("id".into(), "c1".into())], 1).unwrap();
        builder.start("title", vec![], 1).unwrap();
        builder.text("A", 1).unwrap();
        builder.start("br", vec![], 1).unwrap();
        builder.end("br", 1).unwrap();
        builder.text("B", 2).unwrap();
        builder.end("title", 2).unwrap();
        builder.end("card", 2).unwrap();
        builder.end("p", 2).unwrap();
        let commands = builder.finish(2).unwrap();

        assert_eq!(
            serde_json::to_value(&commands).unwrap(),
            json!([
                {"text": "Hello there"},
                {"card": {"id": "c1", "title": "A\nB"}}
            ])
        );
        // text, id, title, card
        assert_eq!(diagnostics.len(), 4);
    }

    #[test]
    fn test_open_line_break_passes_events_down() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);

        builder.start("p", vec![], 0).unwrap();
        builder.start("br", vec![], 0).unwrap();
        builder.start("card", vec![("id".into(), "c".into())], 0).unwrap();
        builder.end("card", 0).unwrap();
        builder.text("after", 0).unwrap();
        builder.end("br", 0).unwrap();
        builder.end("p", 0).unwrap();
        let commands = builder.finish(0).unwrap();

        assert_eq!(
            serde_json::to_value(&commands).unwrap(),
            json!([{"card": {"id": "c"}}, {"text": "after"}])
        );
    }

    #[test]
    fn test_image_closes_its_own_frame() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);

        builder.start("p", vec![], 0).unwrap();
        builder.start("image", vec![("url".into(), "/a.png".into())], 0).unwrap();
        builder.text("  ", 0).unwrap();
        builder.end("image", 0).unwrap();
        builder.start("card", vec![], 1).unwrap();
        builder.end("card", 1).unwrap();
        builder.end("p", 1).unwrap();
        let commands = builder.finish(1).unwrap();

        assert_eq!(
            serde_json::to_value(&commands).unwrap(),
            json!([{"image": {"url": "/a.png"}}, {"card": {}}])
        );
    }

    #[test]
    fn test_image_rejects_children_under_line_break() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);

        builder.start("p", vec![], 0).unwrap();
        builder.start("br", vec![], 0).unwrap();
        builder.start("image", vec![("url".into(), "u".into())], 0).unwrap();
        let err = builder.start("card", vec![], 0).unwrap_err();
        assert_eq!(err.message, "Element 'image' has undescribed child element 'card'");
    }

    #[test]
    fn test_unknown_tag_in_prose() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);

        builder.start("p", vec![], 0).unwrap();
        builder.text("hello ", 0).unwrap();
        let err = builder.start("b", vec![], 0).unwrap_err();
        assert_eq!(err, ParseError::new("Element 'text' has undescribed child element 'b'", 0));
    }

    #[test]
    fn test_root_must_be_paragraph() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);
        let err = builder.start("card", vec![], 0).unwrap_err();
        assert_eq!(err.message, "Unexpected root element: 'card'");
    }

    #[test]
    fn test_unclosed_paragraph() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);
        builder.start("p", vec![], 0).unwrap();
        builder.start("card", vec![], 0).unwrap();
        let err = builder.finish(3).unwrap_err();
        assert_eq!(err, ParseError::new("Element 'card' is not closed", 3));
    }

    #[test]
    fn test_undescribed_attributes_on_scalar() {
        let schema = schema();
        let mut diagnostics = Diagnostics::new();
        let mut builder = CommandBuilder::new(&schema, &mut diagnostics);
        builder.start("p", vec![], 0).unwrap();
        builder.start("card", vec![], 0).unwrap();
        let err = builder
            .start("title", vec![("lang".into(), "en".into())], 0)
            .unwrap_err();
        assert_eq!(
            err.message,
            r#"Element 'title' has undescribed attributes {"lang": "en"}"#
        );
    }
}
