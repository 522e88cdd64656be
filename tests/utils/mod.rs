#![allow(dead_code)]

use async_trait::async_trait;
use log::kv::Key;
use log::{set_max_level, Level, Log, Metadata, Record};
use rand::distr::{Alphanumeric, SampleString};
use sigstat::{EvaluatorError, Event, EventLoggingAdapter};
use std::cell::RefCell;
use std::sync::{Arc, Mutex};

pub fn rand_sdk_key() -> String {
    format!("secret-{}", rand_str(22))
}

pub fn rand_user_id() -> String {
    format!("user-{}", rand_str(8))
}

pub fn gate_response(name: &str, value: bool, rule_id: &str) -> String {
    format!(r#"{{"name": "{name}", "value": {value}, "rule_id": "{rule_id}", "id_type": "userID"}}"#)
}

fn rand_str(len: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), len)
}

#[derive(Clone, Default)]
pub struct RecordingAdapter {
    batches: Arc<Mutex<Vec<Vec<Event>>>>,
}

impl RecordingAdapter {
    pub fn events(&self) -> Vec<Event> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

#[async_trait]
impl EventLoggingAdapter for RecordingAdapter {
    async fn log_events(&self, events: &[Event]) -> Result<(), EvaluatorError> {
        self.batches.lock().unwrap().push(events.to_vec());
        Ok(())
    }
}

pub struct RecordingLogger {}

impl RecordingLogger {
    thread_local!(pub static LOGS: RefCell<String> = RefCell::new(String::default()));
}

impl Log for RecordingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && metadata.target().contains("sigstat")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let event_id = record
            .key_values()
            .get(Key::from("event_id"))
            .and_then(|v| v.to_i64())
            .unwrap_or_default();
        Self::LOGS.with_borrow_mut(|l| l.push_str(format!("{level} [{event_id}] {}\n", record.args()).as_str()));
    }

    fn flush(&self) {}
}

pub fn log_record_init() {
    set_max_level(log::LevelFilter::Info);
    _ = log::set_logger(&RecordingLogger {});
}
