use crate::constants::USER_ID_TYPE;
use crate::errors::{ErrorKind, EvaluatorError};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

const TIER_KEY: &str = "tier";

/// Supported custom user attribute value types.
#[derive(Debug, Clone, PartialEq)]
pub enum UserValue {
    /// String user attribute value.
    String(String),
    /// Boolean user attribute value.
    Bool(bool),
    /// Signed integer user attribute value.
    Int(i64),
    /// Unsigned integer user attribute value.
    UInt(u64),
    /// Float user attribute value.
    Float(f64),
    /// String vector user attribute value.
    StringVec(Vec<String>),
}

impl Display for UserValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserValue::String(val) => f.write_str(val),
            UserValue::Bool(val) => write!(f, "{val}"),
            UserValue::Int(val) => write!(f, "{val}"),
            UserValue::UInt(val) => write!(f, "{val}"),
            UserValue::Float(val) => write!(f, "{val}"),
            UserValue::StringVec(val) => f.write_str(val.join(",").as_str()),
        }
    }
}

impl Serialize for UserValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            UserValue::String(val) => serializer.serialize_str(val),
            UserValue::Bool(val) => serializer.serialize_bool(*val),
            UserValue::Int(val) => serializer.serialize_i64(*val),
            UserValue::UInt(val) => serializer.serialize_u64(*val),
            UserValue::Float(val) => serializer.serialize_f64(*val),
            UserValue::StringVec(val) => {
                let mut seq = serializer.serialize_seq(Some(val.len()))?;
                for element in val {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
        }
    }
}

impl From<Vec<&str>> for UserValue {
    fn from(value: Vec<&str>) -> Self {
        Self::StringVec(value.iter().map(|x| x.to_string()).collect())
    }
}

value_from!(UserValue, String: String, &str);
value_from!(UserValue, Bool: bool);
value_from!(UserValue, StringVec: Vec<String>);
value_from!(UserValue, Float: f64, f32);
value_from!(UserValue, UInt: u8, u16, u32, u64);
value_from!(UserValue, Int: i8, i16, i32, i64);

/// Describes the user a gate is checked for.
///
/// A user must carry either a user ID or at least one custom ID (e.g. `companyID`),
/// otherwise gate checks fail with [`ErrorKind::InvalidContext`].
///
/// Private attributes are sent to the evaluator but never included in exposure events.
///
/// # Examples:
///
/// ```rust
/// use sigstat::User;
///
/// let user = User::new("user-id")
///     .email("jane@example.com")
///     .country("HU")
///     .custom_id("companyID", "company-1")
///     .custom("plan", "enterprise")
///     .custom("seats", 25)
///     .private_attribute("ssn_hash", "abc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct User {
    #[serde(rename = "userID", skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(rename = "customIDs", skip_serializing_if = "HashMap::is_empty")]
    custom_ids: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<String>,
    #[serde(rename = "userAgent", skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    #[serde(rename = "appVersion", skip_serializing_if = "Option::is_none")]
    app_version: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    custom: HashMap<String, UserValue>,
    #[serde(rename = "privateAttributes", skip_serializing_if = "HashMap::is_empty")]
    private_attributes: HashMap<String, UserValue>,
    #[serde(rename = "statsigEnvironment", skip_serializing_if = "Option::is_none")]
    environment: Option<HashMap<String, String>>,
}

impl User {
    /// Initializes a new [`User`] identified by `user_id`.
    ///
    /// # Examples:
    ///
    /// ```rust
    /// use sigstat::User;
    ///
    /// let user = User::new("user-id");
    /// ```
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_owned()),
            ..User::default()
        }
    }

    /// Initializes a new [`User`] identified only by custom IDs.
    ///
    /// # Examples:
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use sigstat::User;
    ///
    /// let user = User::with_custom_ids(HashMap::from([
    ///     ("companyID".to_owned(), "company-1".to_owned())
    /// ]));
    /// ```
    pub fn with_custom_ids(custom_ids: HashMap<String, String>) -> Self {
        Self {
            custom_ids,
            ..User::default()
        }
    }

    /// Adds a custom ID of the given `id_type`.
    pub fn custom_id(mut self, id_type: &str, id: &str) -> Self {
        self.custom_ids.insert(id_type.to_owned(), id.to_owned());
        self
    }

    /// Email address of the user.
    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    /// IP address of the user.
    pub fn ip(mut self, ip: &str) -> Self {
        self.ip = Some(ip.to_owned());
        self
    }

    /// User agent of the user's client.
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_owned());
        self
    }

    /// Country of the user.
    pub fn country(mut self, country: &str) -> Self {
        self.country = Some(country.to_owned());
        self
    }

    /// Locale of the user.
    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_owned());
        self
    }

    /// Version of the application the user runs.
    pub fn app_version(mut self, app_version: &str) -> Self {
        self.app_version = Some(app_version.to_owned());
        self
    }

    /// Custom attribute of the user (e.g. plan, role, etc.)
    ///
    /// # Examples:
    ///
    /// ```rust
    /// use sigstat::User;
    ///
    /// let user = User::new("user-id")
    ///     .custom("rating", 4.5)
    ///     .custom("roles", vec!["admin", "editor"]);
    /// ```
    pub fn custom<T: Into<UserValue>>(mut self, key: &str, value: T) -> Self {
        self.custom.insert(key.to_owned(), value.into());
        self
    }

    /// Attribute sent for evaluation only, it never leaves the SDK in exposure events.
    pub fn private_attribute<T: Into<UserValue>>(mut self, key: &str, value: T) -> Self {
        self.private_attributes.insert(key.to_owned(), value.into());
        self
    }

    /// Environment tier the user belongs to (e.g. `production`, `staging`).
    ///
    /// When not set, the tier configured with [`crate::ClientBuilder::environment`] is used.
    pub fn environment(mut self, tier: &str) -> Self {
        self.environment = Some(HashMap::from([(TIER_KEY.to_owned(), tier.to_owned())]));
        self
    }

    /// The environment tier of the user, if any.
    pub fn environment_tier(&self) -> Option<&str> {
        self.environment
            .as_ref()
            .and_then(|env| env.get(TIER_KEY))
            .map(String::as_str)
    }

    /// The user ID, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The custom IDs of the user.
    pub fn custom_ids(&self) -> &HashMap<String, String> {
        &self.custom_ids
    }

    /// Returns the ID used for the given `id_type`.
    ///
    /// `userID` (case-insensitive) resolves to the user ID, anything else is looked up
    /// among the custom IDs.
    pub fn unit_id(&self, id_type: &str) -> Option<&str> {
        if id_type.eq_ignore_ascii_case(USER_ID_TYPE) {
            return self.user_id();
        }
        self.custom_ids
            .get(id_type)
            .or_else(|| {
                self.custom_ids
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(id_type))
                    .map(|(_, v)| v)
            })
            .map(String::as_str)
    }

    /// Checks that the user can be evaluated.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidContext`] when the user has neither a non-empty user ID
    /// nor any custom ID.
    pub fn validate(&self) -> Result<(), EvaluatorError> {
        let has_user_id = self.user_id.as_ref().is_some_and(|id| !id.is_empty());
        if has_user_id || !self.custom_ids.is_empty() {
            return Ok(());
        }
        Err(EvaluatorError::new(
            ErrorKind::InvalidContext,
            "A user with a non-empty user ID or at least one custom ID is required to check a gate.".to_owned(),
        ))
    }

    pub(crate) fn without_private_attributes(&self) -> Self {
        Self {
            private_attributes: HashMap::new(),
            ..self.clone()
        }
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(str) => write!(f, "{str}"),
            Err(_) => f.write_str("<invalid user>"),
        }
    }
}
