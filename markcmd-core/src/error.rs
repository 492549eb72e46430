//! Error types.
//!
//! Everything that can go wrong while turning a document into commands is a
//! [`ParseError`]: schema/nesting violations found by the command builder and
//! syntax errors reported by the XML reader end up in the same shape, a
//! message plus a zero-based line.
//!
//! [`SchemaError`] is separate because it happens before any document is seen,
//! when a schema description is compiled into lookup tables.

use thiserror::Error;

/// Error returned when parsing a document fails.
///
/// `line` is zero-based. Errors returned by [`crate::DocumentParser`] are
/// relative to the whole document; errors returned by
/// [`crate::StructuralParser`] are relative to the paragraph it was given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
        }
    }

    /// Shift the line by the starting line of the enclosing paragraph.
    pub fn rebase(mut self, offset: usize) -> Self {
        self.line += offset;
        self
    }
}

/// Error returned when a schema description cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("There can be no more than one field marked 'content': {}", .0.join(", "))]
    MultipleContentFields(Vec<String>),

    #[error("Field '{0}' must be a scalar")]
    NotScalar(String),

    #[error("Root schema '{0}' is not declared")]
    UnknownRoot(String),

    #[error("Field '{field}' is declared twice in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    #[error("Field '{field}' in schema '{schema}' is not a valid tag name")]
    InvalidFieldName { schema: String, field: String },

    #[error("Invalid schema description: {0}")]
    Description(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_shifts_line() {
        let err = ParseError::new("Value 'title' already defined", 2).rebase(10);
        assert_eq!(err.line, 12);
        assert_eq!(err.to_string(), "Value 'title' already defined at line 12");
    }

    #[test]
    fn test_multiple_content_message() {
        let err = SchemaError::MultipleContentFields(vec!["text".into(), "body".into()]);
        assert_eq!(
            err.to_string(),
            "There can be no more than one field marked 'content': text, body"
        );
    }
}
