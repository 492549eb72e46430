//! Fixture loading from YAML files

use serde::Deserialize;
use std::path::Path;

/// A document that parses, with the commands it produces
#[derive(Debug, Clone, Deserialize)]
pub struct ParseCase {
    pub id: String,
    #[serde(default)]
    pub desc: String,
    pub doc: String,
    /// Kept as YAML and compared through JSON so key order does not matter
    pub commands: serde_yaml::Value,
}

impl ParseCase {
    pub fn expected(&self) -> serde_json::Value {
        serde_json::to_value(&self.commands)
            .unwrap_or_else(|e| panic!("[{}] expected commands are not JSON: {}", self.id, e))
    }
}

/// A document that fails, with the message and document line of the error
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorCase {
    pub id: String,
    #[serde(default)]
    pub desc: String,
    pub doc: String,
    pub message: String,
    pub line: usize,
}

/// Load all cases from a YAML fixture file
pub fn load_fixtures<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name<T: serde::de::DeserializeOwned>(name: &str) -> Vec<T> {
    load_fixtures(&super::fixture_path(&format!("{}.yaml", name)))
}
