//! Per-request label dimensions supplied by the caller.

use std::collections::HashMap;
use std::fmt;

/// A source of extra label dimensions for the request histograms.
///
/// `labels` is read once when the recorder is built and must keep returning
/// the same names in the same order. Every map produced by `reporter` must
/// hold exactly those names as keys; the recorder panics on the first
/// observation that breaks this.
///
/// The reporter is called concurrently from every request being observed,
/// once per histogram (duration and size are separate calls).
pub trait CustomLabels: Send + Sync {
    /// Computes the label values for one observation.
    fn reporter(&self, handler_id: &str, method: &str, body: &[u8]) -> HashMap<String, String>;

    /// The label names this provider contributes, in declaration order.
    fn labels(&self) -> Vec<String>;
}

/// [`CustomLabels`] built from a fixed name list and a closure.
pub struct FnCustomLabels<F> {
    labels: Vec<String>,
    reporter: F,
}

impl<F> FnCustomLabels<F>
where
    F: Fn(&str, &str, &[u8]) -> HashMap<String, String> + Send + Sync,
{
    pub fn new<I, S>(labels: I, reporter: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FnCustomLabels {
            labels: labels.into_iter().map(Into::into).collect(),
            reporter,
        }
    }
}

impl<F> CustomLabels for FnCustomLabels<F>
where
    F: Fn(&str, &str, &[u8]) -> HashMap<String, String> + Send + Sync,
{
    fn reporter(&self, handler_id: &str, method: &str, body: &[u8]) -> HashMap<String, String> {
        (self.reporter)(handler_id, method, body)
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

impl<F> fmt::Debug for FnCustomLabels<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCustomLabels")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_keep_declaration_order() {
        let provider = FnCustomLabels::new(["tenant", "api_version"], |_, _, _| HashMap::new());
        assert_eq!(provider.labels(), vec!["tenant", "api_version"]);
        assert_eq!(provider.labels(), provider.labels());
    }

    #[test]
    fn test_reporter_receives_request_arguments() {
        let provider = FnCustomLabels::new(["tenant"], |id: &str, method: &str, body: &[u8]| {
            let tenant = format!("{}-{}-{}", id, method, body.len());
            HashMap::from([("tenant".to_string(), tenant)])
        });

        let values = provider.reporter("create", "POST", b"{}");
        assert_eq!(values.get("tenant").map(String::as_str), Some("create-POST-2"));
    }
}
