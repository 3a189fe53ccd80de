#![allow(dead_code)]

use std::collections::HashMap;

use prometheus::proto::{Metric, MetricFamily};
use prometheus::{Encoder, Registry, TextEncoder};

pub fn family(registry: &Registry, name: &str) -> MetricFamily {
    registry
        .gather()
        .into_iter()
        .find(|mf| mf.get_name() == name)
        .unwrap_or_else(|| panic!("metric family {} not gathered", name))
}

pub fn labels_of(metric: &Metric) -> HashMap<String, String> {
    metric
        .get_label()
        .iter()
        .map(|lp| (lp.get_name().to_string(), lp.get_value().to_string()))
        .collect()
}

/// The single series of `name` whose labels equal `expected`.
pub fn series(registry: &Registry, name: &str, expected: &[(&str, &str)]) -> Metric {
    let expected: HashMap<String, String> = expected
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    family(registry, name)
        .get_metric()
        .iter()
        .find(|m| labels_of(m) == expected)
        .cloned()
        .unwrap_or_else(|| panic!("no {} series with labels {:?}", name, expected))
}

/// Cumulative bucket counts keyed by upper bound.
pub fn buckets(metric: &Metric) -> Vec<(f64, u64)> {
    metric
        .get_histogram()
        .get_bucket()
        .iter()
        .map(|b| (b.get_upper_bound(), b.get_cumulative_count()))
        .collect()
}

pub fn render(registry: &Registry) -> String {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
}
