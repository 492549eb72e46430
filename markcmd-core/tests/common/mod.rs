//! Test infrastructure for the markcmd parser
//!
//! Provides the shared chat schema, fixture loading, and assertion helpers.

#![allow(dead_code)]

mod loader;

pub use loader::{load_fixtures_by_name, ErrorCase, ParseCase};

use markcmd_core::{Command, CommandSchema, SchemaDescription};
use std::path::Path;

/// Path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The chat-bot schema from `tests/fixtures/chat.yaml`, compiled.
pub fn chat_schema() -> CommandSchema {
    let path = fixture_path("chat.yaml");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read schema {:?}: {}", path, e));
    SchemaDescription::from_yaml_str(&content)
        .and_then(|description| description.compile())
        .unwrap_or_else(|e| panic!("Failed to compile schema {:?}: {}", path, e))
}

/// Commands as JSON, for comparison against `json!` or fixture values.
pub fn to_json(commands: &[Command]) -> serde_json::Value {
    serde_json::to_value(commands).expect("commands serialize")
}
