//! Document segmentation.
//!
//! [`DocumentParser`] splits a document into paragraphs, parses each one on
//! its own and shifts paragraph-local lines (in errors and in the symbol
//! registry) by the paragraph's starting line.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostics, Symbol, SymbolRegistry, SymbolSink};
use crate::error::ParseError;
use crate::inline::TagRecognizer;
use crate::markup::{MarkupEngine, Paragraph};
use crate::parser::StructuralParser;
use crate::schema::CommandSchema;
use crate::value::{Command, Value};

/// Result of parsing one paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphOutcome {
    /// Zero-based line where the paragraph starts.
    pub start_line: usize,
    /// Commands of the paragraph, or its first error with a document line.
    pub result: Result<Vec<Command>, ParseError>,
}

/// Turns documents into command lists.
///
/// ```ignore
/// let schema = SchemaDescription::from_yaml_str(SCHEMA)?.compile()?;
/// let (commands, registry) = DocumentParser::new().parse_with_registry(doc, &schema)?;
/// let line = registry.line_of(&commands[0].value);
/// ```
pub struct DocumentParser {
    engine: MarkupEngine,
}

impl DocumentParser {
    /// Parser with the default markup engine and the inline tag recognizer.
    pub fn new() -> Self {
        let mut engine = MarkupEngine::new();
        engine.register_inline_rule(TagRecognizer::new());
        Self::with_engine(engine)
    }

    pub fn with_engine(engine: MarkupEngine) -> Self {
        DocumentParser { engine }
    }

    pub fn engine(&self) -> &MarkupEngine {
        &self.engine
    }

    pub fn parse(&self, document: &str, schema: &CommandSchema) -> Result<Vec<Command>, ParseError> {
        self.parse_with_symbols(document, schema, &mut |_: &Value, _: usize| {})
    }

    /// Parse the whole document, stopping at the first failing paragraph.
    ///
    /// `sink` sees every value of every successful paragraph, children before
    /// parents, with its document line.
    pub fn parse_with_symbols(
        &self,
        document: &str,
        schema: &CommandSchema,
        sink: &mut dyn SymbolSink,
    ) -> Result<Vec<Command>, ParseError> {
        let parser = StructuralParser::new(schema);
        let mut diagnostics = Diagnostics::new();
        let mut commands = Vec::new();

        for paragraph in self.engine.paragraphs(document) {
            commands.extend(self.parse_paragraph(&parser, &paragraph, &mut diagnostics, sink)?);
        }
        Ok(commands)
    }

    pub fn parse_with_registry(
        &self,
        document: &str,
        schema: &CommandSchema,
    ) -> Result<(Vec<Command>, SymbolRegistry), ParseError> {
        let mut registry = SymbolRegistry::new();
        let commands = self.parse_with_symbols(document, schema, &mut registry)?;
        Ok((commands, registry))
    }

    /// Parse every paragraph independently, so one bad paragraph does not
    /// hide the commands of the others.
    pub fn parse_paragraphs(
        &self,
        document: &str,
        schema: &CommandSchema,
        sink: &mut dyn SymbolSink,
    ) -> Vec<ParagraphOutcome> {
        let parser = StructuralParser::new(schema);
        let mut diagnostics = Diagnostics::new();

        self.engine
            .paragraphs(document)
            .iter()
            .map(|paragraph| ParagraphOutcome {
                start_line: paragraph.start_line,
                result: self.parse_paragraph(&parser, paragraph, &mut diagnostics, sink),
            })
            .collect()
    }

    fn parse_paragraph(
        &self,
        parser: &StructuralParser<'_>,
        paragraph: &Paragraph<'_>,
        diagnostics: &mut Diagnostics,
        sink: &mut dyn SymbolSink,
    ) -> Result<Vec<Command>, ParseError> {
        let xml = self.engine.render(paragraph);
        match parser.parse(&xml, diagnostics) {
            Ok(commands) => {
                let lines = diagnostics.drain_rebased(paragraph.start_line);
                for command in &commands {
                    report(&command.value, &lines, sink);
                }
                log::debug!(
                    "paragraph at line {}: {} command(s)",
                    paragraph.start_line,
                    commands.len()
                );
                Ok(commands)
            }
            Err(err) => {
                diagnostics.discard();
                let err = err.rebase(paragraph.start_line);
                log::debug!("paragraph at line {} failed: {}", paragraph.start_line, err);
                Err(err)
            }
        }
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Post-order walk: children are reported before their parent.
fn report(value: &Value, lines: &HashMap<Symbol, usize>, sink: &mut dyn SymbolSink) {
    for child in value.children() {
        report(child, lines, sink);
    }
    if let Some(&line) = lines.get(&value.symbol()) {
        sink.register(value, line);
    }
}
