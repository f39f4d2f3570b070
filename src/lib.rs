//! figo-exporter - Prometheus exporter for the figo banking aggregation API.
//!
//! Periodically polls accounts and transactions through one API credential
//! and republishes them as labeled gauges on a local `/metrics` endpoint.

pub mod config;
pub mod error;
pub mod figo;
pub mod mapper;
pub mod metrics;
pub mod scraper;
pub mod server;

// Re-export commonly used types
pub use config::{Config, Mode};
pub use error::FigoError;
pub use metrics::Metrics;
pub use scraper::{Credentials, Scraper};
