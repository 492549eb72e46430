//! Property-based tests for the markcmd parser
//!
//! These check invariants that must hold for any input: normalization and
//! escaping are stable, lines survive any paragraph layout, and no document
//! makes the parser panic.

mod common;

use common::chat_schema;
use markcmd_core::text::{escape_attribute, escape_text, normalize_whitespace};
use markcmd_core::DocumentParser;
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Property: Text Helpers Are Stable
// =============================================================================

proptest! {
    #![proptest_config(config())]

    #[test]
    fn normalize_is_idempotent(input in "[a-z \\t\\n]{0,60}") {
        let once = normalize_whitespace(&input);
        prop_assert_eq!(normalize_whitespace(&once), once.clone());
        prop_assert!(!once.contains("  "));
        prop_assert!(!once.contains('\n'));
        prop_assert_eq!(once.trim(), once.as_str());
    }

    #[test]
    fn escape_is_idempotent(input in "[a-z&;#<>\"x0-9 ]{0,40}") {
        let text = escape_text(&input);
        prop_assert_eq!(escape_text(&text), text);
        let attr = escape_attribute(&input);
        prop_assert_eq!(escape_attribute(&attr), attr);
    }
}

// =============================================================================
// Property: Lines Follow Paragraph Layout
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Each paragraph of plain words becomes one text command whose line is
    /// the paragraph's first line, however many blank lines separate them.
    #[test]
    fn prose_lines_are_rebased(
        paragraphs in prop::collection::vec(
            (prop::collection::vec("[a-z]{1,8}", 1..4), 1usize..4),
            1..6,
        )
    ) {
        let mut doc = String::new();
        let mut expected = Vec::new();
        let mut line = 0;
        for (words, gap) in &paragraphs {
            expected.push((words.join(" "), line));
            doc.push_str(&words.join("\n"));
            doc.push_str(&"\n".repeat(gap + 1));
            line += words.len() + gap;
        }

        let (commands, registry) = DocumentParser::new()
            .parse_with_registry(&doc, &chat_schema())
            .unwrap();
        let actual: Vec<(String, usize)> = commands
            .iter()
            .map(|c| {
                let text = c.value.as_text().unwrap_or_default().to_string();
                (text, registry.line_of(&c.value).unwrap_or(usize::MAX))
            })
            .collect();
        prop_assert_eq!(actual, expected);
    }

    /// Errors are reported at the line of the offending tag's paragraph.
    #[test]
    fn error_lines_are_rebased(lead in 0usize..5, gap in 1usize..4) {
        let mut doc = String::new();
        for _ in 0..lead {
            doc.push_str("prose\n\n");
        }
        doc.push_str(&"\n".repeat(gap));
        doc.push_str("<delay>1s</delay>");

        let err = DocumentParser::new().parse(&doc, &chat_schema()).unwrap_err();
        prop_assert_eq!(err.line, lead * 2 + gap);
    }

    /// Reader errors inside a later paragraph keep their line within it.
    #[test]
    fn malformed_tag_lines_are_rebased(
        lead in 0usize..5,
        gap in 1usize..4,
        malformed in prop::sample::select(vec![
            ("<card>\n<title>x</button>\n</card>", 1usize),
            ("<message to=\"a\" to=\"b\">x</message>", 0),
            ("text\n<message to=a>x</message>", 1),
        ]),
    ) {
        let (block, offset) = malformed;
        let mut doc = String::new();
        for _ in 0..lead {
            doc.push_str("prose\n\n");
        }
        doc.push_str(&"\n".repeat(gap));
        doc.push_str(block);

        let err = DocumentParser::new().parse(&doc, &chat_schema()).unwrap_err();
        prop_assert_eq!(err.line, lead * 2 + gap + offset);
    }
}

// =============================================================================
// Property: Parser Never Panics
// =============================================================================

proptest! {
    #![proptest_config(config())]

    #[test]
    fn parser_never_panics(input in "[a-z <>/=\"'!\\[\\]()&;\\\\\\n]{0,120}") {
        let _ = DocumentParser::new().parse(&input, &chat_schema());
    }

    #[test]
    fn parser_never_panics_on_tags(
        parts in prop::collection::vec(
            prop_oneof![
                prop::sample::select(vec![
                    "<card>", "</card>", "<title>", "</title>", "<carousel>",
                    "<item id=\"x\">", "</item>", "<message to=\"y\">", "</message>",
                    "<br/>", "\n\n",
                ])
                .prop_map(String::from),
                "[a-z ]{1,6}",
            ],
            0..20,
        )
    ) {
        let _ = DocumentParser::new().parse(&parts.concat(), &chat_schema());
    }
}
