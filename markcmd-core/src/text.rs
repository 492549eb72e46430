//! Text normalization and escaping.

use phf::phf_set;

/// Entities the XML reader understands; any other `&` is escaped.
static XML_ENTITIES: phf::Set<&'static str> = phf_set! {
    "lt", "gt", "amp", "quot", "apos",
};

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Text accumulated between line breaks.
///
/// Each segment is normalized on its own; segments are joined with `\n`, so a
/// line break always contributes exactly one newline.
#[derive(Debug, Clone)]
pub struct Segments {
    segments: Vec<String>,
}

impl Segments {
    pub fn new() -> Self {
        Segments {
            segments: vec![String::new()],
        }
    }

    pub fn push_str(&mut self, text: &str) {
        if let Some(last) = self.segments.last_mut() {
            last.push_str(text);
        }
    }

    pub fn line_break(&mut self) {
        self.segments.push(String::new());
    }

    /// True when no segment holds anything but whitespace.
    pub fn is_blank(&self) -> bool {
        self.segments.iter().all(|s| s.trim().is_empty())
    }

    pub fn finish(&self) -> String {
        self.segments
            .iter()
            .map(|s| normalize_whitespace(s))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Segments {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape prose for the XML event stream.
///
/// Already-escaped input is left alone: `escape_text(escape_text(s)) ==
/// escape_text(s)`.
pub fn escape_text(text: &str) -> String {
    escape(text, false)
}

/// Like [`escape_text`], also escaping double quotes.
pub fn escape_attribute(text: &str) -> String {
    escape(text, true)
}

fn escape(text: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '&' if starts_with_reference(&text[i + 1..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            c => out.push(c),
        }
    }
    out
}

/// Whether `rest` (the text after an `&`) begins with a reference the XML
/// reader will decode: one of [`XML_ENTITIES`] or a numeric reference.
fn starts_with_reference(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let name = &rest[..end];
    if let Some(digits) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(digits) = name.strip_prefix('#') {
        return !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit());
    }
    XML_ENTITIES.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  line\n1 \t and   more  "), "line 1 and more");
        assert_eq!(normalize_whitespace("\n\n"), "");
    }

    #[test]
    fn test_segments_join() {
        let mut segments = Segments::new();
        segments.push_str("  first\n line ");
        segments.line_break();
        segments.push_str(" second ");
        assert_eq!(segments.finish(), "first line\nsecond");
        assert!(!segments.is_blank());
    }

    #[test]
    fn test_segments_blank() {
        let mut segments = Segments::new();
        segments.push_str("\n   ");
        segments.line_break();
        assert!(segments.is_blank());
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_text("&lt;kept&gt; &#60; &#x3C;"), "&lt;kept&gt; &#60; &#x3C;");
        assert_eq!(escape_text("&copy; &;"), "&amp;copy; &amp;;");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
        assert_eq!(escape_text("say \"hi\""), "say \"hi\"");
    }

    #[test]
    fn test_escape_is_idempotent() {
        for input in ["a < b", "&amp;", "x & y", "\"q\" & <t>", "&#12;&#xZZ;"] {
            let once = escape_attribute(input);
            assert_eq!(escape_attribute(&once), once, "input: {:?}", input);
        }
    }
}
