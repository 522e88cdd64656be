//! Feature gate checks against local or remote evaluators.
//!
//! A gate check takes a gate name, a [`User`] and per-call [`CheckGateOptions`], and is
//! resolved by a [`GateEvaluator`]. The crate ships an HTTP evaluator that talks to a
//! Statsig-compatible evaluation service and an in-process [`LocalEvaluator`] fed by a
//! [`GateSource`]. Exposures of local checks and custom events are batched by an
//! [`EventLogger`] and delivered through an [`EventLoggingAdapter`].

#![warn(missing_docs)]

#[macro_use]
mod macros;
mod builder;
mod client;
mod constants;
mod errors;
mod evaluator;
mod event_logging;
mod gate;
mod http;
mod local;
mod options;
mod user;

pub use builder::ClientBuilder;
pub use client::Client;
pub use constants::PKG_VERSION;
pub use errors::{ErrorKind, EvaluatorError, SourceError};
pub use evaluator::GateEvaluator;
pub use gate::{EvaluationDetails, EvaluationReason, FeatureGate};
pub use options::CheckGateOptions;
pub use user::{User, UserValue};

pub use event_logging::{
    adapter::EventLoggingAdapter, adapter::HttpEventLoggingAdapter,
    adapter::LocalFileEventLoggingAdapter, event::Event, event::EventValue, logger::EventLogger,
};

pub use http::evaluator::HttpEvaluator;

pub use local::{
    evaluator::LocalEvaluator, file::FileGateSource, map::MapGateSource, source::GateSource,
    source::LocalGate,
};
