use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;

use crate::constants::GATE_EXPOSURE_EVENT;
use crate::{FeatureGate, User};

const GATE_KEY: &str = "gate";
const GATE_VALUE_KEY: &str = "gateValue";
const RULE_ID_KEY: &str = "ruleID";

/// Value attached to a custom [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventValue {
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

value_from!(EventValue, String: String, &str);
value_from!(EventValue, Number: f64, f32, i32, u32);

/// An event delivered through an [`crate::EventLoggingAdapter`], either a gate exposure
/// or a custom event logged with [`crate::Client::log_event`].
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use sigstat::{Event, User};
///
/// let event = Event::new(&User::new("user-id"), "purchase")
///     .with_value(19.99)
///     .with_metadata(HashMap::from([("sku".to_owned(), "abc-1".to_owned())]));
///
/// assert_eq!(event.metadata["sku"], "abc-1");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Name of the event, `statsig::gate_exposure` for gate exposures.
    #[serde(rename = "eventName")]
    pub event_name: String,
    /// The user the event belongs to, without private attributes.
    pub user: User,
    /// Optional value of the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<EventValue>,
    /// Unix timestamp of the event in milliseconds.
    pub time: i64,
    /// Details of the event. Gate exposures carry `gate`, `gateValue` and `ruleID`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Event {
    /// Creates an event named `event_name` for `user`, stamped with the current time.
    pub fn new(user: &User, event_name: &str) -> Self {
        Self {
            event_name: event_name.to_owned(),
            user: user.without_private_attributes(),
            value: None,
            time: Utc::now().timestamp_millis(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the value of the event.
    pub fn with_value<V: Into<EventValue>>(mut self, value: V) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Adds `metadata` to the metadata of the event.
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub(crate) fn gate_exposure(user: &User, gate: &FeatureGate) -> Self {
        let mut event = Self::new(user, GATE_EXPOSURE_EVENT);
        event.metadata = BTreeMap::from([
            (GATE_KEY.to_owned(), gate.name.clone()),
            (GATE_VALUE_KEY.to_owned(), gate.value.to_string()),
            (RULE_ID_KEY.to_owned(), gate.rule_id.clone()),
        ]);
        event
    }

    /// Identical gate exposures share the same key.
    pub(crate) fn dedupe_key(&self) -> String {
        let mut custom_ids: Vec<String> = self
            .user
            .custom_ids()
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect();
        custom_ids.sort();
        format!(
            "{}|{}|{}|{}|{}",
            self.meta(GATE_KEY),
            self.meta(GATE_VALUE_KEY),
            self.meta(RULE_ID_KEY),
            self.user.user_id().unwrap_or_default(),
            custom_ids.join(",")
        )
    }

    fn meta(&self, key: &str) -> &str {
        self.metadata.get(key).map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod event_tests {
    use std::collections::HashMap;

    use crate::event_logging::event::{Event, EventValue};
    use crate::{EvaluationReason, FeatureGate, User};

    fn gate(value: bool) -> FeatureGate {
        FeatureGate::new("g", value, "rule_1", "userID", EvaluationReason::Local)
    }

    #[test]
    fn serialize_gate_exposure() {
        let user = User::new("u1").private_attribute("secret", "s");
        let event = Event::gate_exposure(&user, &gate(true));
        let mut json = serde_json::to_value(&event).unwrap();
        assert!(json["time"].as_i64().unwrap() > 0);
        json.as_object_mut().unwrap().remove("time");

        assert_eq!(
            json,
            serde_json::json!({
                "eventName": "statsig::gate_exposure",
                "user": {"userID": "u1"},
                "metadata": {"gate": "g", "gateValue": "true", "ruleID": "rule_1"}
            })
        );
    }

    #[test]
    fn serialize_custom_event() {
        let event = Event::new(&User::new("u1"), "purchase")
            .with_value(2)
            .with_metadata(HashMap::from([("sku".to_owned(), "abc".to_owned())]));
        let mut json = serde_json::to_value(&event).unwrap();
        json.as_object_mut().unwrap().remove("time");

        assert_eq!(
            json,
            serde_json::json!({
                "eventName": "purchase",
                "user": {"userID": "u1"},
                "value": 2.0,
                "metadata": {"sku": "abc"}
            })
        );

        let bare = serde_json::to_value(Event::new(&User::new("u1"), "visit")).unwrap();
        assert!(bare.get("value").is_none());
        assert!(bare.get("metadata").is_none());
    }

    #[test]
    fn event_values() {
        assert_eq!(EventValue::from("gold"), EventValue::String("gold".to_owned()));
        assert_eq!(EventValue::from(3), EventValue::Number(3.0));
        assert_eq!(serde_json::to_string(&EventValue::from("gold")).unwrap(), r#""gold""#);
    }

    #[test]
    fn dedupe_key() {
        let user = User::new("u1").custom_id("b", "2").custom_id("a", "1");
        let key = Event::gate_exposure(&user, &gate(true)).dedupe_key();
        assert_eq!(key, "g|true|rule_1|u1|a:1,b:2");

        let other = Event::gate_exposure(&user, &gate(false)).dedupe_key();
        assert_ne!(key, other);
    }
}
