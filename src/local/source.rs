use crate::constants::{LOCAL_RULE_ID, USER_ID_TYPE};
use serde::Deserialize;
use std::collections::HashMap;

/// A gate served by a [`GateSource`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalGate {
    /// The value of the gate.
    pub value: bool,
    /// Rule ID reported with the value.
    #[serde(default = "default_rule_id")]
    pub rule_id: String,
    /// ID type reported with the value.
    #[serde(default = "default_id_type")]
    pub id_type: String,
}

fn default_rule_id() -> String {
    LOCAL_RULE_ID.to_owned()
}

fn default_id_type() -> String {
    USER_ID_TYPE.to_owned()
}

impl From<bool> for LocalGate {
    fn from(value: bool) -> Self {
        Self {
            value,
            rule_id: default_rule_id(),
            id_type: default_id_type(),
        }
    }
}

/// Data source that provides gate values for the [`crate::LocalEvaluator`].
pub trait GateSource: Sync + Send {
    /// Gets the gates, keyed by name.
    fn gates(&self) -> &HashMap<String, LocalGate>;
}
