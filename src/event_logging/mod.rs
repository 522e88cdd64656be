pub mod adapter;
pub mod event;
pub mod logger;
pub mod ttl_set;
