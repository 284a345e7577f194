//! Response capture.

use bytes::Bytes;
use daedalus_core::Response;
use http::response::Parts;
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, Full};

/// A fully buffered response.
///
/// Recording collects the payload once; [`ResponseRecorder::into_response`]
/// rebuilds a response identical to the original, and
/// [`ResponseRecorder::detached`] produces an independent copy that can be
/// handed to code which must not affect what the client receives.
#[derive(Debug)]
pub struct ResponseRecorder {
    parts: Parts,
    payload: Bytes,
}

impl ResponseRecorder {
    /// Buffers `response`.
    pub async fn record(response: Response) -> Self {
        let (parts, body) = response.into_parts();
        let payload = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self { parts, payload }
    }

    /// Recorded status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.parts.status
    }

    /// Recorded headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Recorded payload.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// A copy of the status, version, headers and payload.
    ///
    /// Extensions are not copied.
    #[must_use]
    pub fn detached(&self) -> Response {
        let mut copy = Response::new(Full::new(self.payload.clone()));
        *copy.status_mut() = self.parts.status;
        *copy.version_mut() = self.parts.version;
        *copy.headers_mut() = self.parts.headers.clone();
        copy
    }

    /// Rebuilds the original response.
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::from_parts(self.parts, Full::new(self.payload))
    }
}
