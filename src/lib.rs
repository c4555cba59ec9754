pub mod alerting;
pub mod config;
pub mod monitor;
pub mod notifications;
pub mod status_store;
pub mod version;
