//! HTTP request metrics.
//!
//! [`Recorder`] is what middleware calls on every request;
//! [`PrometheusRecorder`] records into Prometheus histograms and gauges.

mod custom_labels;
mod noop;
mod prometheus;
mod recorder;

pub use self::prometheus::PrometheusRecorder;
pub use custom_labels::{CustomLabels, FnCustomLabels};
pub use noop::NoopRecorder;
pub use recorder::{HttpProperties, HttpReqProperties, Recorder};
