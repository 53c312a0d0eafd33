
pub mod constants;
pub mod error;
pub mod config;
pub mod validate;
pub mod store;
pub mod ingest;
pub mod staleness;
pub mod output;
pub mod nmea;
pub mod gps;
pub mod coordinator;
