//! Cross-parser comparison benchmarks.
//!
//! Compares paragraph segmentation and full command parsing against
//! pulldown-cmark walking the same prose-heavy document.
//!
//! Run with: cargo bench --bench compare

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use markcmd_core::{CommandSchema, DocumentParser, SchemaDescription};
use pulldown_cmark::{Event, Parser as MdParser, Tag};

const SCHEMA: &str = include_str!("../tests/fixtures/chat.yaml");

/// Prose paragraphs with an occasional image, valid as both markdown and
/// markcmd input.
fn generate_prose(count: usize) -> String {
    let mut doc = String::new();
    for i in 0..count {
        doc.push_str(&format!("Paragraph {} starts here\nand wraps onto a second line.\n", i));
        if i % 5 == 0 {
            doc.push_str(&format!("![figure {}](/img/{}.png)\n", i, i));
        }
        doc.push('\n');
    }
    doc
}

/// Count paragraphs the way pulldown-cmark sees them.
fn markdown_paragraphs(input: &str) -> usize {
    MdParser::new(input)
        .filter(|event| matches!(event, Event::Start(Tag::Paragraph)))
        .count()
}

fn bench_segmentation(c: &mut Criterion) {
    let schema: CommandSchema = SchemaDescription::from_yaml_str(SCHEMA)
        .and_then(|description| description.compile())
        .expect("chat schema compiles");
    let parser = DocumentParser::new();

    for count in [50, 500] {
        let doc = generate_prose(count);
        assert_eq!(parser.engine().paragraphs(&doc).len(), markdown_paragraphs(&doc));

        let mut group = c.benchmark_group(format!("compare_{}para", count));
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("markcmd-paragraphs", ""), &doc, |b, doc| {
            b.iter(|| parser.engine().paragraphs(black_box(doc)).len())
        });

        group.bench_with_input(BenchmarkId::new("markcmd-commands", ""), &doc, |b, doc| {
            b.iter(|| parser.parse(black_box(doc), &schema).map(|commands| commands.len()))
        });

        group.bench_with_input(BenchmarkId::new("pulldown-cmark", ""), &doc, |b, doc| {
            b.iter(|| markdown_paragraphs(black_box(doc)))
        });

        group.finish();
    }
}

criterion_group!(benches, bench_segmentation);
criterion_main!(benches);
