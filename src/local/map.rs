use crate::local::source::{GateSource, LocalGate};
use std::collections::HashMap;

/// Gate source backed by an in-memory map of gate names and values.
pub struct MapGateSource {
    gates: HashMap<String, LocalGate>,
}

impl GateSource for MapGateSource {
    fn gates(&self) -> &HashMap<String, LocalGate> {
        &self.gates
    }
}

impl From<HashMap<&str, bool>> for MapGateSource {
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use sigstat::MapGateSource;
    ///
    /// let source = MapGateSource::from(HashMap::from([("new_checkout", true)]));
    /// ```
    fn from(value: HashMap<&str, bool>) -> Self {
        Self {
            gates: value
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, bool>> for MapGateSource {
    fn from(value: HashMap<String, bool>) -> Self {
        Self {
            gates: value.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl From<HashMap<String, LocalGate>> for MapGateSource {
    fn from(gates: HashMap<String, LocalGate>) -> Self {
        Self { gates }
    }
}

impl<const N: usize> From<[(&str, bool); N]> for MapGateSource {
    /// # Examples
    ///
    /// ```rust
    /// use sigstat::MapGateSource;
    ///
    /// let source = MapGateSource::from([("new_checkout", true), ("dark_mode", false)]);
    /// ```
    fn from(arr: [(&str, bool); N]) -> Self {
        Self {
            gates: arr
                .into_iter()
                .map(|(k, v)| (k.to_owned(), v.into()))
                .collect(),
        }
    }
}
