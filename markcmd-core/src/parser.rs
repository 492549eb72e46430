//! XML event driver for [`CommandBuilder`].

use std::borrow::Cow;

use quick_xml::errors::IllFormedError;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;

use crate::builder::{Attributes, CommandBuilder};
use crate::diagnostics::{Diagnostics, LineIndex};
use crate::error::ParseError;
use crate::schema::CommandSchema;
use crate::value::Command;

/// Parses one rendered paragraph (`<p>…</p>`) into commands.
///
/// Lines in errors and in the recorded diagnostics are relative to the start
/// of `xml`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralParser<'s> {
    schema: &'s CommandSchema,
}

impl<'s> StructuralParser<'s> {
    pub fn new(schema: &'s CommandSchema) -> Self {
        StructuralParser { schema }
    }

    pub fn schema(&self) -> &'s CommandSchema {
        self.schema
    }

    pub fn parse(&self, xml: &str, diagnostics: &mut Diagnostics) -> Result<Vec<Command>, ParseError> {
        let lines = LineIndex::new(xml);
        let mut reader = Reader::from_str(xml);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = true;

        let mut builder = CommandBuilder::new(self.schema, diagnostics);
        loop {
            let line = lines.line_at(position(reader.buffer_position()));
            let event = reader
                .read_event()
                .map_err(|e| reader_error(e, lines.line_at(position(reader.error_position()))))?;

            match event {
                Event::Start(tag) => {
                    let (name, attrs) = open_tag(&tag, line)?;
                    builder.start(&name, attrs, line)?;
                }
                Event::Empty(tag) => {
                    let (name, attrs) = open_tag(&tag, line)?;
                    builder.start(&name, attrs, line)?;
                    builder.end(&name, line)?;
                }
                Event::End(tag) => builder.end(&tag_name(tag.name()), line)?,
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| reader_error(e, line))?;
                    builder.text(&text, line)?;
                }
                Event::CData(data) => builder.text(&String::from_utf8_lossy(&data), line)?,
                Event::Eof => break,
                _ => log::warn!("ignoring comment or declaration at line {}", line),
            }
        }

        builder.finish(lines.line_count() - 1)
    }
}

fn position(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}

fn tag_name(name: QName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn open_tag(tag: &BytesStart<'_>, line: usize) -> Result<(String, Attributes), ParseError> {
    let name = tag_name(tag.name());
    let mut attrs = Attributes::new();
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| malformed(&name, attr_reason(e), line))?;
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(&name, Cow::Owned(e.to_string()), line))?;
        attrs.push((tag_name(attr.key), value.into_owned()));
    }
    Ok((name, attrs))
}

fn attr_reason(err: AttrError) -> Cow<'static, str> {
    match err {
        AttrError::Duplicated(..) => Cow::Borrowed("duplicate attribute"),
        AttrError::UnquotedValue(_) => Cow::Borrowed("unquoted attribute value"),
        other => Cow::Owned(other.to_string()),
    }
}

fn malformed(name: &str, reason: Cow<'_, str>, line: usize) -> ParseError {
    ParseError::new(format!("Malformed tag '{}': {}", name, reason), line)
}

fn reader_error(err: quick_xml::Error, line: usize) -> ParseError {
    match err {
        quick_xml::Error::IllFormed(IllFormedError::MismatchedEndTag { expected, found }) => {
            ParseError::new(
                format!(
                    "Mismatched closing tag: expected '</{}>', found '</{}>'",
                    expected, found
                ),
                line,
            )
        }
        other => ParseError::new(format!("Syntax error: {}", other), line),
    }
}
