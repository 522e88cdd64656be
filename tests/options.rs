use serde_json::json;
use sigstat::CheckGateOptions;

#[test]
fn default_options_log_exposures() {
    let options = CheckGateOptions::default();

    assert!(!options.disable_exposure_logging());
    assert_eq!(options, CheckGateOptions::from(None));
}

#[test]
fn explicit_value_is_kept() {
    assert!(CheckGateOptions::new(true).disable_exposure_logging());
    assert!(!CheckGateOptions::new(false).disable_exposure_logging());
    assert!(CheckGateOptions::from(Some(true)).disable_exposure_logging());
}

#[test]
fn serializes_disabled_logging() {
    let json = serde_json::to_string(&CheckGateOptions::new(true)).unwrap();

    assert_eq!(json, r#"{"disable_exposure_logging":true}"#);
}

#[test]
fn serializes_enabled_logging() {
    let value = serde_json::to_value(CheckGateOptions::new(false)).unwrap();

    assert_eq!(value, json!({"disable_exposure_logging": false}));
}

#[test]
fn deserializes_wire_format() {
    let options: CheckGateOptions =
        serde_json::from_str(r#"{"disable_exposure_logging": true}"#).unwrap();

    assert!(options.disable_exposure_logging());
}

#[test]
fn missing_field_deserializes_to_default() {
    let options: CheckGateOptions = serde_json::from_str("{}").unwrap();

    assert_eq!(options, CheckGateOptions::default());
}

#[test]
fn survives_serialization() {
    for disabled in [true, false] {
        let options = CheckGateOptions::new(disabled);
        let json = serde_json::to_string(&options).unwrap();

        assert_eq!(serde_json::from_str::<CheckGateOptions>(&json).unwrap(), options);
    }
}
