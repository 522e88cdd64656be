use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Once, PoisonError};
use std::time::Duration;

use log::{debug, error};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::event_logging::adapter::EventLoggingAdapter;
use crate::event_logging::event::Event;
use crate::event_logging::ttl_set::TtlSet;
use crate::{FeatureGate, User};

pub(crate) const MIN_QUEUE_SIZE: usize = 10;
pub(crate) const MAX_QUEUE_SIZE: usize = 10_000;

struct LoggerState {
    adapter: Box<dyn EventLoggingAdapter>,
    queue: Mutex<Vec<Event>>,
    flush_lock: tokio::sync::Mutex<()>,
    flush_scheduled: AtomicBool,
    max_queue_size: usize,
}

impl LoggerState {
    fn queue(&self) -> MutexGuard<'_, Vec<Event>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Buffers gate exposures and custom events and delivers them in batches through an
/// [`EventLoggingAdapter`].
///
/// Identical gate exposures are logged once per dedupe interval. Batches are delivered when
/// the queue is full, periodically on a background task, and on [`EventLogger::flush`] or
/// [`EventLogger::shutdown`]. Must be created inside a Tokio runtime.
pub struct EventLogger {
    state: Arc<LoggerState>,
    dedupe: Option<TtlSet>,
    shut_down: AtomicBool,
    cancellation_token: CancellationToken,
    close: Once,
}

impl EventLogger {
    /// `max_queue_size` is clamped between 10 and 10 000. A zero `flush_interval` disables
    /// the periodic flush and a zero `dedupe_interval` disables the deduplication of exposures.
    pub fn new(
        adapter: Box<dyn EventLoggingAdapter>,
        max_queue_size: usize,
        flush_interval: Duration,
        dedupe_interval: Duration,
    ) -> Self {
        let logger = Self {
            state: Arc::new(LoggerState {
                adapter,
                queue: Mutex::new(Vec::new()),
                flush_lock: tokio::sync::Mutex::new(()),
                flush_scheduled: AtomicBool::new(false),
                max_queue_size: max_queue_size.clamp(MIN_QUEUE_SIZE, MAX_QUEUE_SIZE),
            }),
            dedupe: (!dedupe_interval.is_zero()).then(|| TtlSet::new(dedupe_interval)),
            shut_down: AtomicBool::new(false),
            cancellation_token: CancellationToken::new(),
            close: Once::new(),
        };
        if !flush_interval.is_zero() {
            logger.start_flush(flush_interval);
        }
        logger
    }

    /// Enqueues the exposure of `gate` for `user`.
    pub fn log_gate_exposure(&self, user: &User, gate: &FeatureGate) {
        let event = Event::gate_exposure(user, gate);
        if let Some(dedupe) = &self.dedupe {
            if !dedupe.add(event.dedupe_key()) {
                return;
            }
        }
        self.enqueue(event);
    }

    /// Enqueues a custom event.
    pub fn log_event(&self, event: Event) {
        self.enqueue(event);
    }

    fn enqueue(&self, event: Event) {
        if self.shut_down.load(Ordering::SeqCst) {
            debug!("Logger is shut down, dropping event '{}'", event.event_name);
            return;
        }
        let full = {
            let mut queue = self.state.queue();
            queue.push(event);
            queue.len() >= self.state.max_queue_size
        };
        if full && !self.state.flush_scheduled.swap(true, Ordering::SeqCst) {
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                flush(&state).await;
                state.flush_scheduled.store(false, Ordering::SeqCst);
            });
        }
    }

    /// Number of events waiting for delivery.
    pub fn queued_event_count(&self) -> usize {
        self.state.queue().len()
    }

    /// Delivers every queued event.
    pub async fn flush(&self) {
        flush(&self.state).await;
    }

    /// Stops the background tasks and delivers the remaining events.
    /// Events enqueued afterwards are dropped.
    pub async fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.close();
        flush(&self.state).await;
    }

    fn close(&self) {
        self.close.call_once(|| {
            self.cancellation_token.cancel();
            if let Some(dedupe) = &self.dedupe {
                dedupe.shutdown();
            }
        });
    }

    fn start_flush(&self, interval: Duration) {
        let state = Arc::clone(&self.state);
        let token = self.cancellation_token.clone();

        tokio::spawn(async move {
            let mut int = interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = int.tick() => flush(&state).await,
                    _ = token.cancelled() => break
                }
            }
        });
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        self.close();
    }
}

async fn flush(state: &Arc<LoggerState>) {
    let _guard = state.flush_lock.lock().await;
    loop {
        let batch: Vec<Event> = {
            let mut queue = state.queue();
            let size = queue.len().min(state.max_queue_size);
            queue.drain(..size).collect()
        };
        if batch.is_empty() {
            return;
        }
        match state.adapter.log_events(&batch).await {
            Ok(()) => debug!("Flushed {} event(s)", batch.len()),
            Err(err) => {
                error!(event_id = err.kind.as_u16(); "Failed to log {} event(s), dropping them. {}", batch.len(), err)
            }
        }
    }
}
