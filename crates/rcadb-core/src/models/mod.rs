//! Data models: configuration and extraction records.

pub mod config;
pub mod record;

pub use config::RcadbConfig;
pub use record::{sort_by_client_name, Record, RecordStatus, RCA_TYPE};
