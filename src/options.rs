use serde::{Deserialize, Serialize};

/// Per-call options of a gate check.
///
/// The value is immutable once constructed: build a new one for every call that needs
/// different options. The serialized form uses the field name `disable_exposure_logging`,
/// which evaluators on the other side of the wire expect verbatim.
///
/// # Examples
///
/// ```rust
/// use sigstat::CheckGateOptions;
///
/// let options = CheckGateOptions::new(true);
/// assert!(options.disable_exposure_logging());
///
/// let json = serde_json::to_string(&options).unwrap();
/// assert_eq!(json, r#"{"disable_exposure_logging":true}"#);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckGateOptions {
    #[serde(default)]
    disable_exposure_logging: bool,
}

impl CheckGateOptions {
    /// Creates options with an explicit exposure logging setting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sigstat::CheckGateOptions;
    ///
    /// let options = CheckGateOptions::new(false);
    /// assert!(!options.disable_exposure_logging());
    /// ```
    pub const fn new(disable_exposure_logging: bool) -> Self {
        Self {
            disable_exposure_logging,
        }
    }

    /// True when the evaluator must not emit an exposure event for this check.
    pub const fn disable_exposure_logging(&self) -> bool {
        self.disable_exposure_logging
    }

    pub(crate) fn or_disabled(self, disabled: bool) -> Self {
        Self::new(self.disable_exposure_logging || disabled)
    }
}

impl From<Option<bool>> for CheckGateOptions {
    /// `None` falls back to the default (`false`).
    fn from(value: Option<bool>) -> Self {
        Self::new(value.unwrap_or_default())
    }
}

impl From<bool> for CheckGateOptions {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod options_tests {
    use crate::CheckGateOptions;

    #[test]
    fn default_keeps_exposures() {
        assert!(!CheckGateOptions::default().disable_exposure_logging());
        assert!(!CheckGateOptions::from(None).disable_exposure_logging());
    }

    #[test]
    fn explicit_value() {
        for b in [true, false] {
            assert_eq!(CheckGateOptions::new(b).disable_exposure_logging(), b);
            assert_eq!(CheckGateOptions::from(Some(b)).disable_exposure_logging(), b);
        }
    }

    #[test]
    fn serialize_field_name() {
        let json = serde_json::to_value(CheckGateOptions::new(true)).unwrap();
        assert_eq!(json, serde_json::json!({"disable_exposure_logging": true}));

        let json = serde_json::to_value(CheckGateOptions::new(false)).unwrap();
        assert_eq!(json, serde_json::json!({"disable_exposure_logging": false}));
    }

    #[test]
    fn deserialize() {
        let options: CheckGateOptions =
            serde_json::from_str(r#"{"disable_exposure_logging": true}"#).unwrap();
        assert!(options.disable_exposure_logging());

        let options: CheckGateOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CheckGateOptions::default());
    }

    #[test]
    fn round_trip() {
        for b in [true, false] {
            let options = CheckGateOptions::new(b);
            let json = serde_json::to_string(&options).unwrap();
            assert_eq!(serde_json::from_str::<CheckGateOptions>(&json).unwrap(), options);
        }
    }

    #[test]
    fn global_disable_wins() {
        assert!(CheckGateOptions::new(false).or_disabled(true).disable_exposure_logging());
        assert!(CheckGateOptions::new(true).or_disabled(false).disable_exposure_logging());
        assert!(!CheckGateOptions::new(false).or_disabled(false).disable_exposure_logging());
    }
}
