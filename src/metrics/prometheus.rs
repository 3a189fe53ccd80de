//! HTTP metrics recording implementation using Prometheus.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, HistogramOpts, HistogramVec, Opts, Registry};
use tracing::info;

use super::custom_labels::CustomLabels;
use super::recorder::{HttpProperties, HttpReqProperties, Recorder};
use crate::config::{Config, Labels};
use crate::error::{Error, Result};

const SUBSYSTEM: &str = "http";

/// Prometheus-backed [`Recorder`].
///
/// Owns the request duration histogram, the response size histogram and the
/// inflight requests gauge. Cloning shares the same instruments.
#[derive(Clone)]
pub struct PrometheusRecorder {
    http_request_duration: HistogramVec,
    http_response_size: HistogramVec,
    http_requests_inflight: GaugeVec,
    labels: Labels,
    /// Custom label names, captured once from the provider.
    custom_label_names: Arc<[String]>,
    request_label_names: Arc<[String]>,
    inflight_label_names: Arc<[String]>,
}

impl PrometheusRecorder {
    /// Builds the recorder, falling back to the process-wide default
    /// registry when `cfg.registry` is unset.
    pub fn new(cfg: Config) -> Result<Self> {
        Self::with_default_registry(cfg, prometheus::default_registry())
    }

    /// Builds the recorder and registers its instruments.
    ///
    /// `default_registry` is only used when `cfg.registry` is unset. Fails if
    /// an instrument is invalid or its name is already registered; in that
    /// case nothing stays registered.
    pub fn with_default_registry(mut cfg: Config, default_registry: &Registry) -> Result<Self> {
        cfg.defaults(default_registry);
        let registry = cfg.registry.clone().unwrap_or_else(|| default_registry.clone());

        let custom_label_names: Vec<String> = cfg
            .labels
            .custom_labels
            .as_ref()
            .map(|c| c.labels())
            .unwrap_or_default();

        let mut request_label_names = vec![
            cfg.labels.service_label.clone(),
            cfg.labels.handler_id_label.clone(),
            cfg.labels.method_label.clone(),
            cfg.labels.status_code_label.clone(),
        ];
        request_label_names.extend(custom_label_names.iter().cloned());
        let inflight_label_names = vec![
            cfg.labels.service_label.clone(),
            cfg.labels.handler_id_label.clone(),
        ];

        let http_request_duration = histogram_vec(
            &cfg.prefix,
            "request_duration_seconds",
            "The latency of the HTTP requests.",
            &cfg.duration_buckets,
            &request_label_names,
        )?;
        let http_response_size = histogram_vec(
            &cfg.prefix,
            "response_size_bytes",
            "The size of the HTTP responses.",
            &cfg.size_buckets,
            &request_label_names,
        )?;
        let http_requests_inflight = {
            let opts = Opts::new(
                "requests_inflight",
                "The number of inflight requests being handled at the same time.",
            )
            .namespace(cfg.prefix.clone())
            .subsystem(SUBSYSTEM);
            let names: Vec<&str> = inflight_label_names.iter().map(String::as_str).collect();
            GaugeVec::new(opts, &names).map_err(|source| Error::Instrument {
                metric: fq_name(&cfg.prefix, "requests_inflight"),
                source,
            })?
        };

        let collectors: Vec<(String, Box<dyn Collector>)> = vec![
            (
                fq_name(&cfg.prefix, "request_duration_seconds"),
                Box::new(http_request_duration.clone()) as Box<dyn Collector>,
            ),
            (
                fq_name(&cfg.prefix, "response_size_bytes"),
                Box::new(http_response_size.clone()) as Box<dyn Collector>,
            ),
            (
                fq_name(&cfg.prefix, "requests_inflight"),
                Box::new(http_requests_inflight.clone()) as Box<dyn Collector>,
            ),
        ];
        register_all(&registry, collectors)?;

        info!(
            prefix = %cfg.prefix,
            labels = ?request_label_names,
            "registered HTTP metrics"
        );

        Ok(PrometheusRecorder {
            http_request_duration,
            http_response_size,
            http_requests_inflight,
            labels: cfg.labels,
            custom_label_names: custom_label_names.into(),
            request_label_names: request_label_names.into(),
            inflight_label_names: inflight_label_names.into(),
        })
    }

    /// Label names of the duration and size histograms, in addressing order.
    pub fn request_label_names(&self) -> &[String] {
        &self.request_label_names
    }

    /// Label names of the inflight gauge.
    pub fn inflight_label_names(&self) -> &[String] {
        &self.inflight_label_names
    }

    fn observe(&self, histogram: &HistogramVec, props: &HttpReqProperties<'_>, value: f64) {
        // Without custom labels, positional values avoid building a map per observation.
        let Some(custom) = self.labels.custom_labels.as_deref() else {
            histogram
                .with_label_values(&[props.service, props.id, props.method, props.code])
                .observe(value);
            return;
        };

        let reported = custom.reporter(props.id, props.method, props.body);
        let labels = self.label_map(props, &reported);
        histogram.with(&labels).observe(value);
    }

    /// Builds the full name to value mapping for the slow path.
    ///
    /// Panics if `reported` does not hold exactly the declared custom label names.
    fn label_map<'a>(
        &'a self,
        props: &HttpReqProperties<'a>,
        reported: &'a HashMap<String, String>,
    ) -> HashMap<&'a str, &'a str> {
        let mut labels = HashMap::with_capacity(4 + self.custom_label_names.len());
        labels.insert(self.labels.service_label.as_str(), props.service);
        labels.insert(self.labels.handler_id_label.as_str(), props.id);
        labels.insert(self.labels.method_label.as_str(), props.method);
        labels.insert(self.labels.status_code_label.as_str(), props.code);

        for name in self.custom_label_names.iter() {
            match reported.get(name) {
                Some(value) => {
                    labels.insert(name.as_str(), value.as_str());
                }
                None => panic!(
                    "custom label reporter produced no value for declared label `{}`",
                    name
                ),
            }
        }
        if reported.len() != self.custom_label_names.len() {
            let mut undeclared: Vec<&String> = reported
                .keys()
                .filter(|k| !self.custom_label_names.contains(*k))
                .collect();
            undeclared.sort();
            panic!(
                "custom label reporter produced undeclared labels {:?}",
                undeclared
            );
        }
        labels
    }
}

impl Recorder for PrometheusRecorder {
    fn observe_http_request_duration(&self, props: &HttpReqProperties<'_>, duration: Duration) {
        self.observe(&self.http_request_duration, props, duration.as_secs_f64());
    }

    fn observe_http_response_size(&self, props: &HttpReqProperties<'_>, size_bytes: u64) {
        self.observe(&self.http_response_size, props, size_bytes as f64);
    }

    fn add_inflight_requests(&self, props: &HttpProperties<'_>, quantity: i64) {
        self.http_requests_inflight
            .with_label_values(&[props.service, props.id])
            .add(quantity as f64);
    }
}

/// Fully-qualified metric name, as Prometheus builds it from the options.
fn fq_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        format!("{}_{}", SUBSYSTEM, name)
    } else {
        format!("{}_{}_{}", prefix, SUBSYSTEM, name)
    }
}

fn histogram_vec(
    prefix: &str,
    name: &str,
    help: &str,
    buckets: &[f64],
    label_names: &[String],
) -> Result<HistogramVec> {
    let opts = HistogramOpts::new(name, help)
        .namespace(prefix)
        .subsystem(SUBSYSTEM)
        .buckets(buckets.to_vec());
    let names: Vec<&str> = label_names.iter().map(String::as_str).collect();
    HistogramVec::new(opts, &names).map_err(|source| Error::Instrument {
        metric: fq_name(prefix, name),
        source,
    })
}

/// Registers every collector, or none of them.
fn register_all(registry: &Registry, collectors: Vec<(String, Box<dyn Collector>)>) -> Result<()> {
    let mut registered = Vec::with_capacity(collectors.len());
    for (metric, collector) in collectors {
        let handle = DescHandle::of(collector.as_ref());
        if let Err(source) = registry.register(collector) {
            for done in registered {
                let _ = registry.unregister(Box::new(done));
            }
            return Err(Error::Registration { metric, source });
        }
        registered.push(handle);
    }
    Ok(())
}

/// Descriptors of a registered collector. `Registry::unregister` matches on
/// descriptor ids, so this is enough to take the collector back out.
struct DescHandle(Vec<Desc>);

impl DescHandle {
    fn of(collector: &dyn Collector) -> Self {
        DescHandle(collector.desc().into_iter().cloned().collect())
    }
}

impl Collector for DescHandle {
    fn desc(&self) -> Vec<&Desc> {
        self.0.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        Vec::new()
    }
}
