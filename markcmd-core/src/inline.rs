//! Inline tokenization.
//!
//! Paragraph text is cut into [`Token`]s by an ordered list of
//! [`InlineRule`]s: at each position the first rule that matches wins and the
//! scan advances past what it consumed. The default list handles escapes,
//! markdown images, hard line breaks and prose. [`TagRecognizer`] is meant to
//! be registered in front of those so tag-shaped spans pass through verbatim
//! instead of being escaped as prose.

use once_cell::sync::Lazy;
use regex::Regex;

/// Grammar of an open (`<tag a="1">`, `<tag/>`) or close (`</tag>`) tag.
///
/// Unquoted attribute values are accepted here on purpose so the XML reader
/// gets to report them.
const TAG_PATTERN: &str = concat!(
    r#"<(?P<close>/)?(?P<name>[A-Za-z_][\w:.\-]*)"#,
    r#"(?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*"#,
    r#"\s*(?P<empty>/)?>"#,
);

static TAG_AT_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^(?:{})", TAG_PATTERN)).expect("valid tag regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(TAG_PATTERN).expect("valid tag regex"));
static IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^!\[([^\]\n]*)\]\([ \t]*([^\s)]+)(?:[ \t]+"([^"\n]*)")?[ \t]*\)"#)
        .expect("valid image regex")
});
static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?: {2,}|\\)\r?\n").expect("valid line break regex"));
static ESCAPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"^\\([!"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~])"##).expect("valid escape regex")
});

/// A piece of inline content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Prose, escaped on render.
    Text(String),
    /// Markup copied verbatim into the event stream.
    Passthrough(String),
    /// `![alt](url "title")`
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },
    /// Hard line break; the consumed newline is kept on render.
    LineBreak,
}

/// One inline recognition rule.
pub trait InlineRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Try to recognize a token at the start of `rest`, returning it with the
    /// number of bytes consumed (always > 0 on a match).
    fn scan(&self, rest: &str) -> Option<(Token, usize)>;
}

/// Recognizes `<tag ...>`, `<tag .../>` and `</tag>` spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagRecognizer;

impl TagRecognizer {
    pub fn new() -> Self {
        TagRecognizer
    }
}

impl InlineRule for TagRecognizer {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn scan(&self, rest: &str) -> Option<(Token, usize)> {
        let m = TAG_AT_START_RE.find(rest)?;
        Some((Token::Passthrough(m.as_str().to_string()), m.end()))
    }
}

/// Backslash escape of an ASCII punctuation character.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscapeRule;

impl InlineRule for EscapeRule {
    fn name(&self) -> &'static str {
        "escape"
    }

    fn scan(&self, rest: &str) -> Option<(Token, usize)> {
        let caps = ESCAPE_RE.captures(rest)?;
        let whole = caps.get(0)?;
        Some((Token::Text(caps[1].to_string()), whole.end()))
    }
}

/// Markdown image syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageRule;

impl InlineRule for ImageRule {
    fn name(&self) -> &'static str {
        "image"
    }

    fn scan(&self, rest: &str) -> Option<(Token, usize)> {
        let caps = IMAGE_RE.captures(rest)?;
        let whole = caps.get(0)?;
        let token = Token::Image {
            alt: caps[1].to_string(),
            url: caps[2].to_string(),
            title: caps.get(3).map(|m| m.as_str().to_string()),
        };
        Some((token, whole.end()))
    }
}

/// Two or more spaces, or a backslash, right before a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBreakRule;

impl InlineRule for LineBreakRule {
    fn name(&self) -> &'static str {
        "line_break"
    }

    fn scan(&self, rest: &str) -> Option<(Token, usize)> {
        let m = LINE_BREAK_RE.find(rest)?;
        Some((Token::LineBreak, m.end()))
    }
}

/// Default prose rule: always consumes at least one character, then stops in
/// front of anything another rule could start on.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRule;

impl InlineRule for TextRule {
    fn name(&self) -> &'static str {
        "text"
    }

    fn scan(&self, rest: &str) -> Option<(Token, usize)> {
        let first = rest.chars().next()?;
        let end = prose_end(rest, first.len_utf8());
        Some((Token::Text(rest[..end].to_string()), end))
    }
}

fn prose_end(rest: &str, start: usize) -> usize {
    let bytes = rest.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'!' | b'\\' => return i,
            b' ' => {
                let run = bytes[i..].iter().take_while(|&&b| b == b' ').count();
                let after = &bytes[i + run..];
                if run >= 2 && (after.starts_with(b"\n") || after.starts_with(b"\r\n")) {
                    return i;
                }
                i += run;
            }
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Ordered rule list.
pub struct InlineLexer {
    rules: Vec<Box<dyn InlineRule>>,
}

impl InlineLexer {
    /// Escapes, images, hard line breaks, prose.
    pub fn new() -> Self {
        InlineLexer {
            rules: vec![
                Box::new(EscapeRule),
                Box::new(ImageRule),
                Box::new(LineBreakRule),
                Box::new(TextRule),
            ],
        }
    }

    /// Insert `rule` ahead of every rule registered so far.
    pub fn register_front(&mut self, rule: impl InlineRule + 'static) {
        self.rules.insert(0, Box::new(rule));
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let matched = self
                .rules
                .iter()
                .find_map(|rule| rule.scan(rest).filter(|(_, len)| *len > 0));
            let (token, len) = match matched {
                Some(found) => found,
                None => {
                    // nothing registered a prose rule; take one char as text
                    let len = rest.chars().next().map_or(1, char::len_utf8);
                    (Token::Text(rest[..len].to_string()), len)
                }
            };
            push_token(&mut tokens, token);
            pos += len;
        }
        tokens
    }
}

impl Default for InlineLexer {
    fn default() -> Self {
        Self::new()
    }
}

fn push_token(tokens: &mut Vec<Token>, token: Token) {
    if let (Some(Token::Text(prev)), Token::Text(next)) = (tokens.last_mut(), &token) {
        prev.push_str(next);
        return;
    }
    tokens.push(token);
}

/// A tag found by [`scan_tags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TagSpan<'a> {
    pub name: &'a str,
    pub closing: bool,
    pub self_closing: bool,
}

/// Every tag-shaped span in `line`, left to right.
pub(crate) fn scan_tags(line: &str) -> impl Iterator<Item = TagSpan<'_>> {
    TAG_RE.captures_iter(line).filter_map(|caps| {
        Some(TagSpan {
            name: caps.name("name")?.as_str(),
            closing: caps.name("close").is_some(),
            self_closing: caps.name("empty").is_some(),
        })
    })
}

/// The tag `line` opens with, when it starts (after indentation) with an
/// open tag that is not self-closing.
pub(crate) fn leading_open_tag(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let caps = TAG_AT_START_RE.captures(trimmed)?;
    if caps.name("close").is_some() || caps.name("empty").is_some() {
        return None;
    }
    caps.name("name").map(|m| m.as_str())
}
