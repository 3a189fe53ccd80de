use std::time::Duration;

use super::recorder::{HttpProperties, HttpReqProperties, Recorder};

/// A recorder that discards every observation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {
    fn observe_http_request_duration(&self, _props: &HttpReqProperties<'_>, _duration: Duration) {}

    fn observe_http_response_size(&self, _props: &HttpReqProperties<'_>, _size_bytes: u64) {}

    fn add_inflight_requests(&self, _props: &HttpProperties<'_>, _quantity: i64) {}
}
