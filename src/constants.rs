pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const SDK_TYPE: &str = "sigstat-rust";
pub const DEFAULT_API_URL: &str = "https://api.statsig.com/v1";
pub const CHECK_GATE_PATH: &str = "check_gate";
pub const LOG_EVENT_PATH: &str = "log_event";

pub const GATE_EXPOSURE_EVENT: &str = "statsig::gate_exposure";

pub const DEFAULT_RULE_ID: &str = "default";
pub const OVERRIDE_RULE_ID: &str = "override";
pub const LOCAL_RULE_ID: &str = "local";
pub const USER_ID_TYPE: &str = "userID";
