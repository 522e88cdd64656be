use crate::errors::SourceError;
use crate::local::source::{GateSource, LocalGate};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum GateEntry {
    Value(bool),
    Detailed(LocalGate),
}

impl From<GateEntry> for LocalGate {
    fn from(entry: GateEntry) -> Self {
        match entry {
            GateEntry::Value(value) => value.into(),
            GateEntry::Detailed(gate) => gate,
        }
    }
}

#[derive(Deserialize)]
struct GateDocument {
    gates: HashMap<String, GateEntry>,
}

/// Gate source that reads gate values from a JSON file.
///
/// Each entry of `gates` may use either of two layouts, a simple one mapping the gate name to its value:
///
/// ```json
/// { "gates": { "new_checkout": true, "dark_mode": false } }
/// ```
///
/// and a detailed one that also carries the reported rule and ID type:
///
/// ```json
/// { "gates": { "new_checkout": { "value": true, "rule_id": "beta_users", "id_type": "userID" } } }
/// ```
///
/// The two layouts can be mixed within one file.
pub struct FileGateSource {
    gates: HashMap<String, LocalGate>,
}

impl FileGateSource {
    /// Creates a new [`FileGateSource`].
    ///
    /// # Errors
    ///
    /// This method fails in the following cases:
    /// - The given file can't be read.
    /// - An entry of the given file matches neither of the accepted layouts.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sigstat::FileGateSource;
    ///
    /// let source = FileGateSource::new("path/to/gates.json").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(file_path: P) -> Result<Self, SourceError> {
        let content = fs::read_to_string(file_path)?;
        Self::from_json(content.as_str())
    }

    /// Parses a gate document, see [`FileGateSource`] for the accepted layouts.
    pub fn from_json(content: &str) -> Result<Self, SourceError> {
        let document = serde_json::from_str::<GateDocument>(content)?;
        Ok(Self {
            gates: document
                .gates
                .into_iter()
                .map(|(k, v)| (k, v.into()))
                .collect(),
        })
    }
}

impl GateSource for FileGateSource {
    fn gates(&self) -> &HashMap<String, LocalGate> {
        &self.gates
    }
}
