//! markcmd Core Parser
//!
//! Turns lightweight-markup documents with embedded tags into lists of typed
//! commands, validated against a declarative schema, with the source line of
//! every produced value.
//!
//! # Architecture
//!
//! - **schema.rs** - Schema descriptions and the compiled field tables
//! - **inline.rs** - Inline rules, including the tag recognizer
//! - **markup.rs** - Paragraph splitting and rendering to an XML event stream
//! - **parser.rs** - quick-xml driver feeding the command builder
//! - **builder.rs** - Handler stack that builds values from events
//! - **diagnostics.rs** - Symbols, line records and the symbol registry
//! - **document.rs** - Segmenter: per-paragraph parsing and line rebasing
//! - **value.rs** - Values and commands

pub mod builder;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod inline;
pub mod markup;
pub mod parser;
pub mod schema;
pub mod text;
pub mod value;

pub use builder::{Attributes, CommandBuilder};
pub use diagnostics::{Diagnostics, LineIndex, Symbol, SymbolRegistry, SymbolSink};
pub use document::{DocumentParser, ParagraphOutcome};
pub use error::{ParseError, SchemaError};
pub use inline::{InlineLexer, InlineRule, TagRecognizer, Token};
pub use markup::{MarkupEngine, Paragraph};
pub use parser::StructuralParser;
pub use schema::{
    CommandSchema, FieldDecl, FieldDescriptor, FieldKind, FieldTable, FieldType, KindHint,
    SchemaDecl, SchemaDescription, SchemaRef,
};
pub use value::{Command, Value, ValueKind};
