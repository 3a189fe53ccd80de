//! The recording interface consumed by HTTP middleware.

use std::time::Duration;

/// Properties of a completed HTTP request.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpReqProperties<'a> {
    /// Service the request belongs to.
    pub service: &'a str,
    /// Handler identifier, usually the route pattern.
    pub id: &'a str,
    pub method: &'a str,
    /// Response status code, as text.
    pub code: &'a str,
    /// Raw request body, handed to custom label providers.
    pub body: &'a [u8],
}

/// Properties of a request that is still being served.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpProperties<'a> {
    pub service: &'a str,
    pub id: &'a str,
}

/// Trait for recording HTTP request metrics.
///
/// Implementations are shared by every in-flight request and must be cheap
/// to call concurrently. None of the operations fail: a recorder that cannot
/// record an observation panics rather than dropping it.
pub trait Recorder: Send + Sync {
    /// Records how long a request took to be served.
    fn observe_http_request_duration(&self, props: &HttpReqProperties<'_>, duration: Duration);

    /// Records the size of a response body.
    fn observe_http_response_size(&self, props: &HttpReqProperties<'_>, size_bytes: u64);

    /// Adds `quantity` to the number of requests being served. Negative
    /// values are how a finished request is taken off the count.
    fn add_inflight_requests(&self, props: &HttpProperties<'_>, quantity: i64);
}
