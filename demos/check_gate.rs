use log::kv::Key;
use log::{Level, LevelFilter, Log, Metadata, Record};
use sigstat::*;
use std::time::Duration;

#[tokio::main]
async fn main() {
    // Info level logging shows failed checks and dropped events.
    log::set_max_level(LevelFilter::Info);
    log::set_logger(&PrintLog {}).unwrap();

    let client = Client::builder("")
        .local_gates(Box::new(MapGateSource::from([
            ("new_checkout", true),
            ("dark_mode", false),
        ])))
        .event_logging_adapter(Box::new(LocalFileEventLoggingAdapter::new("exposures.jsonl")))
        .event_logging_flush_interval(Duration::from_secs(5))
        .build()
        .unwrap();

    let user = User::new("#SOME-USER-ID#").email("someone@example.com");

    let new_checkout = client.check_gate("new_checkout", &user).await;
    println!("new_checkout: {new_checkout}");

    // Internal check, no exposure is written.
    let dark_mode = client
        .check_gate_with_options("dark_mode", &user, CheckGateOptions::new(true))
        .await;
    println!("dark_mode: {dark_mode}");

    // Users without any ID can't be checked, the failure is logged.
    let anonymous = client.check_gate("new_checkout", &User::default()).await;
    println!("new_checkout for anonymous user: {anonymous}");

    // Custom events land in the same file as the exposures.
    client.log_event(&user, "purchase", Some(29.99.into()), None);

    client.shutdown().await;
}

// Example log implementation.
pub struct PrintLog {}

impl Log for PrintLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().contains("sigstat")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        match record.key_values().get(Key::from("event_id")) {
            Some(event_id) => println!("{level} [{event_id}] {}", record.args()),
            None => println!("{level} {}", record.args()),
        }
    }

    fn flush(&self) {}
}
