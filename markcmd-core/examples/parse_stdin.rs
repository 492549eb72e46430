//! Parse a document from stdin and print its commands as JSON.
//!
//! Usage: cargo run --example parse_stdin -- schema.yaml < document.txt
//!
//! Each command is printed with the document line it came from.

use std::io::Read;

use markcmd_core::{DocumentParser, SchemaDescription, SymbolRegistry};

fn main() {
    let Some(schema_path) = std::env::args().nth(1) else {
        eprintln!("usage: parse_stdin <schema.yaml>");
        std::process::exit(2);
    };

    let description = std::fs::read_to_string(&schema_path).expect("Failed to read schema");
    let schema = SchemaDescription::from_yaml_str(&description)
        .and_then(|description| description.compile())
        .unwrap_or_else(|e| {
            eprintln!("{}: {}", schema_path, e);
            std::process::exit(2);
        });

    let mut document = String::new();
    std::io::stdin()
        .read_to_string(&mut document)
        .expect("Failed to read stdin");

    let parser = DocumentParser::new();
    let mut failed = false;
    let mut registry = SymbolRegistry::new();
    let outcomes = parser.parse_paragraphs(&document, &schema, &mut registry);
    for outcome in outcomes {
        match outcome.result {
            Ok(commands) => {
                for command in commands {
                    let json = serde_json::to_string(&command).expect("commands serialize");
                    let line = registry.line_of(&command.value).unwrap_or(outcome.start_line);
                    println!("{:>4}  {}", line + 1, json);
                }
            }
            Err(err) => {
                failed = true;
                eprintln!("error: {}", err);
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
