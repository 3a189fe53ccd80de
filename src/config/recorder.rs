use std::fmt;
use std::sync::Arc;

use prometheus::Registry;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics::CustomLabels;

pub const DEFAULT_HANDLER_ID_LABEL: &str = "handler";
pub const DEFAULT_STATUS_CODE_LABEL: &str = "code";
pub const DEFAULT_METHOD_LABEL: &str = "method";
pub const DEFAULT_SERVICE_LABEL: &str = "service";

/// Request latency buckets, from 5ms to 10s.
pub const DEFAULT_DURATION_BUCKETS: &[f64] = prometheus::DEFAULT_BUCKETS;

/// Response size buckets, exponential from 100B to 1GB.
pub const DEFAULT_SIZE_BUCKETS: &[f64] = &[
    1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9,
];

/// Names of the labels attached to the HTTP metrics.
#[derive(Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Labels {
    /// Name of the handler ID label, `handler` when empty.
    pub handler_id_label: String,
    /// Name of the status code label, `code` when empty.
    pub status_code_label: String,
    /// Name of the method label, `method` when empty.
    pub method_label: String,
    /// Name of the service label, `service` when empty.
    pub service_label: String,
    /// Extra per-request labels for the request histograms.
    #[serde(skip)]
    pub custom_labels: Option<Arc<dyn CustomLabels>>,
}

/// Settings of the Prometheus recorder.
///
/// Every field may be left empty; [`Config::defaults`] fills the gaps
/// before any instrument is created.
#[derive(Clone, Default, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    #[serde(flatten)]
    pub labels: Labels,
    /// Namespace prepended to every metric name. Empty by default.
    pub prefix: String,
    /// Buckets for the request duration histogram, in seconds.
    pub duration_buckets: Vec<f64>,
    /// Buckets for the response size histogram, in bytes.
    pub size_buckets: Vec<f64>,
    /// Registry the instruments are registered with.
    #[serde(skip)]
    pub registry: Option<Registry>,
}

impl Config {
    /// Fills every empty field with its default.
    ///
    /// `fallback_registry` is used when no registry was set, normally
    /// `prometheus::default_registry()`. Running this more than once is a no-op.
    pub fn defaults(&mut self, fallback_registry: &Registry) {
        self.duration_buckets = normalize_buckets(
            "duration_buckets",
            &self.duration_buckets,
            DEFAULT_DURATION_BUCKETS,
        );
        self.size_buckets =
            normalize_buckets("size_buckets", &self.size_buckets, DEFAULT_SIZE_BUCKETS);

        if self.registry.is_none() {
            self.registry = Some(fallback_registry.clone());
        }

        let labels = &mut self.labels;
        default_if_empty(&mut labels.handler_id_label, DEFAULT_HANDLER_ID_LABEL);
        default_if_empty(&mut labels.status_code_label, DEFAULT_STATUS_CODE_LABEL);
        default_if_empty(&mut labels.method_label, DEFAULT_METHOD_LABEL);
        default_if_empty(&mut labels.service_label, DEFAULT_SERVICE_LABEL);

        debug!(
            prefix = %self.prefix,
            custom_labels = labels.custom_labels.is_some(),
            "applied HTTP metrics config defaults"
        );
    }
}

fn default_if_empty(value: &mut String, default: &str) {
    if value.is_empty() {
        *value = default.to_string();
    }
}

/// Keeps the finite positive boundaries, sorted and without duplicates.
fn normalize_buckets(field: &str, buckets: &[f64], fallback: &[f64]) -> Vec<f64> {
    let mut normalized: Vec<f64> = buckets
        .iter()
        .copied()
        .filter(|b| b.is_finite() && *b > 0.0)
        .collect();
    normalized.sort_by(f64::total_cmp);
    normalized.dedup();

    if normalized.is_empty() {
        if !buckets.is_empty() {
            warn!(field, ?buckets, "no usable bucket boundaries, using defaults");
        }
        return fallback.to_vec();
    }
    if normalized != buckets {
        warn!(field, ?buckets, ?normalized, "bucket boundaries were rewritten");
    }
    normalized
}

impl fmt::Debug for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Labels")
            .field("handler_id_label", &self.handler_id_label)
            .field("status_code_label", &self.status_code_label)
            .field("method_label", &self.method_label)
            .field("service_label", &self.service_label)
            .field(
                "custom_labels",
                &self.custom_labels.as_ref().map(|c| c.labels()),
            )
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("labels", &self.labels)
            .field("prefix", &self.prefix)
            .field("duration_buckets", &self.duration_buckets)
            .field("size_buckets", &self.size_buckets)
            .field("registry", &self.registry.as_ref().map(|_| "Registry"))
            .finish()
    }
}
