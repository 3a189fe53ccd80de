//! Records HTTP request observations into labeled Prometheus instruments.
//!
//! Build a [`config::Config`], hand it to [`metrics::PrometheusRecorder::new`],
//! and share the recorder with the middleware that observes each request.

pub mod config;
pub mod error;
pub mod metrics;
pub mod utils;

pub use error::{Error, Result};
