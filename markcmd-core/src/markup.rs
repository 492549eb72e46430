//! Markup-to-event conversion.
//!
//! [`MarkupEngine`] splits a document into [`Paragraph`]s and renders each one
//! as a flat XML event stream (`<p>…</p>`) for the structural parser. The
//! rendering keeps every source newline where it was, so an offset in the
//! rendered text maps back to the same paragraph-local line.
//!
//! # Block rules
//!
//! - Paragraphs are runs of non-blank lines.
//! - A run whose first line opens a tag keeps going across blank lines until
//!   that tag is closed, then continues up to the next blank line.

use crate::inline::{self, InlineLexer, InlineRule, Token};
use crate::text::{escape_attribute, escape_text};

/// Root tag wrapped around every rendered paragraph.
pub const PARAGRAPH_TAG: &str = "p";
/// Tag produced for markdown images.
pub const IMAGE_TAG: &str = "image";
/// Tag produced for hard line breaks.
pub const LINE_BREAK_TAG: &str = "br";

/// One block of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paragraph<'a> {
    /// Zero-based line of the first line of the block.
    pub start_line: usize,
    /// Source text, without the trailing newline.
    pub source: &'a str,
}

/// Block splitter plus inline renderer.
pub struct MarkupEngine {
    inline: InlineLexer,
}

impl MarkupEngine {
    pub fn new() -> Self {
        MarkupEngine {
            inline: InlineLexer::new(),
        }
    }

    /// Register an inline rule ahead of the built-in prose and line-break
    /// rules.
    pub fn register_inline_rule(&mut self, rule: impl InlineRule + 'static) {
        self.inline.register_front(rule);
    }

    pub fn inline(&self) -> &InlineLexer {
        &self.inline
    }

    pub fn paragraphs<'a>(&self, document: &'a str) -> Vec<Paragraph<'a>> {
        let lines = split_lines(document);
        let mut paragraphs = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            if is_blank(lines[i].1) {
                i += 1;
                continue;
            }

            let start = i;
            let mut open = inline::leading_open_tag(lines[i].1).map(|name| (name, 0isize));
            loop {
                if let Some((name, depth)) = open.as_mut() {
                    *depth += tag_balance(name, lines[i].1);
                    if *depth <= 0 {
                        open = None;
                    }
                }
                i += 1;
                if i >= lines.len() || (open.is_none() && is_blank(lines[i].1)) {
                    break;
                }
            }

            let (first_offset, _) = lines[start];
            let (last_offset, last_line) = lines[i - 1];
            paragraphs.push(Paragraph {
                start_line: start,
                source: &document[first_offset..last_offset + last_line.len()],
            });
        }

        paragraphs
    }

    /// Render the inline content of `paragraph` as an XML event stream.
    pub fn render(&self, paragraph: &Paragraph<'_>) -> String {
        let mut out = String::with_capacity(paragraph.source.len() + 16);
        out.push('<');
        out.push_str(PARAGRAPH_TAG);
        out.push('>');
        for token in self.inline.tokenize(paragraph.source) {
            render_token(&mut out, &token);
        }
        out.push_str("</");
        out.push_str(PARAGRAPH_TAG);
        out.push('>');
        out
    }
}

impl Default for MarkupEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn render_token(out: &mut String, token: &Token) {
    match token {
        Token::Text(text) => out.push_str(&escape_text(text)),
        Token::Passthrough(raw) => out.push_str(raw),
        Token::Image { url, alt, title } => {
            out.push('<');
            out.push_str(IMAGE_TAG);
            push_attribute(out, "url", url);
            if !alt.is_empty() {
                push_attribute(out, "alt", alt);
            }
            if let Some(title) = title.as_deref().filter(|t| !t.is_empty()) {
                push_attribute(out, "title", title);
            }
            out.push_str("/>");
        }
        Token::LineBreak => {
            out.push('<');
            out.push_str(LINE_BREAK_TAG);
            out.push_str("/>\n");
        }
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

/// Lines with their starting byte offsets, newline (and `\r`) stripped.
fn split_lines(document: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in document.split('\n') {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        lines.push((offset, line));
        offset += raw.len() + 1;
    }
    lines
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Opens minus closes of tag `name` on `line`.
fn tag_balance(name: &str, line: &str) -> isize {
    inline::scan_tags(line)
        .filter(|span| span.name == name && !span.self_closing)
        .map(|span| if span.closing { -1 } else { 1 })
        .sum()
}
