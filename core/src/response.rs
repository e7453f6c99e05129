//! Response capture and rendering.
//!
//! # Design
//! Handlers write their response through the `ResponseWriter` trait the same
//! way they would write to a live connection: touch the headers, set a status,
//! write a body. `CaptureSink` is the in-memory implementation that records
//! those writes so the adapter can turn them into one `OutboundEvent` after the
//! handler returns.
//!
//! The sink is not a stream. A second `write` replaces the body
//! instead of appending to it, and nothing is flushed until `render`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::{HeaderMap, StatusCode};

use crate::error::RenderError;
use crate::event::OutboundEvent;

/// Write target handed to a handler for the duration of one invocation.
pub trait ResponseWriter {
    /// Mutable response headers. Use `append` to register repeated values.
    fn headers(&mut self) -> &mut HeaderMap;

    /// Store `body` as the response body, replacing any earlier write.
    /// Returns the number of bytes taken.
    fn write(&mut self, body: &[u8]) -> usize;

    /// Set the response status. The last call before rendering wins.
    fn write_header(&mut self, status: u16);
}

/// Records what a handler wrote so it can be rendered as a gateway response.
#[derive(Debug, Clone)]
pub struct CaptureSink {
    headers: HeaderMap,
    status: u16,
    body: Vec<u8>,
}

impl CaptureSink {
    /// An empty sink: no headers, status 200, no body.
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            status: StatusCode::OK.as_u16(),
            body: Vec::new(),
        }
    }

    /// Status set by the last `write_header`, or 200.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Body from the last `write`.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Headers as written, repeated values included.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Finalize the captured state into the gateway's response shape.
    ///
    /// A body that is valid UTF-8 is sent as text; anything else is sent as
    /// standard base64 with `is_base64_encoded` set. Repeated headers keep
    /// only their first value, under the canonical `Header-Name` spelling.
    ///
    /// Fails with `RenderError::NoHeaders` when the handler never set a
    /// header, whatever the status and body are.
    pub fn render(&self) -> Result<OutboundEvent, RenderError> {
        if self.headers.is_empty() {
            return Err(RenderError::NoHeaders);
        }
        if StatusCode::from_u16(self.status).is_err() {
            return Err(RenderError::InvalidStatus(self.status));
        }

        let (body, is_base64_encoded) = match std::str::from_utf8(&self.body) {
            Ok(text) => (text.to_string(), false),
            Err(_) => (STANDARD.encode(&self.body), true),
        };

        let headers = self
            .headers
            .keys()
            .filter_map(|name| {
                let first = self.headers.get(name)?;
                Some((
                    canonical_header_name(name.as_str()),
                    String::from_utf8_lossy(first.as_bytes()).into_owned(),
                ))
            })
            .collect();

        Ok(OutboundEvent {
            status_code: self.status,
            headers,
            body,
            is_base64_encoded,
        })
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for CaptureSink {
    fn headers(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, body: &[u8]) -> usize {
        self.body = body.to_vec();
        body.len()
    }

    fn write_header(&mut self, status: u16) {
        self.status = status;
    }
}

/// `content-type` -> `Content-Type`: upper-case the first letter and every
/// letter after a hyphen, lower-case the rest.
fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}
