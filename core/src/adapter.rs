//! Invocation coordinator.
//!
//! # Design
//! One invocation is strictly sequential: translate the event, run the
//! handler once against a fresh `CaptureSink`, render the sink. A translation
//! failure returns before the handler is called, so a bad event never has
//! side effects. Nothing is retried and nothing is shared between
//! invocations; the runtime that feeds events in owns timeouts and retry
//! policy.

use tracing::{info, warn};

use crate::error::AdapterError;
use crate::event::{InboundEvent, OutboundEvent};
use crate::request::{translate, CanonicalRequest};
use crate::response::{CaptureSink, ResponseWriter};

/// Something that serves one HTTP request by writing into a `ResponseWriter`.
///
/// Any `Fn(&mut dyn ResponseWriter, CanonicalRequest)` closure is a handler.
pub trait Handler {
    fn serve(&self, writer: &mut dyn ResponseWriter, request: CanonicalRequest);
}

impl<F> Handler for F
where
    F: Fn(&mut dyn ResponseWriter, CanonicalRequest),
{
    fn serve(&self, writer: &mut dyn ResponseWriter, request: CanonicalRequest) {
        self(writer, request)
    }
}

/// Run one event through `handler` and return the gateway response.
pub fn handle<H>(event: &InboundEvent, handler: &H) -> Result<OutboundEvent, AdapterError>
where
    H: Handler + ?Sized,
{
    let request = translate(event)?;
    let mut sink = CaptureSink::new();
    handler.serve(&mut sink, request);
    Ok(sink.render()?)
}

/// Bridge between the gateway and an application handler.
///
/// Built once at startup and reused for every event the process receives.
/// Holds no per-invocation state, so it can be shared freely when `H` is
/// `Sync`.
#[derive(Debug, Clone)]
pub struct Adapter<H> {
    handler: H,
}

impl<H: Handler> Adapter<H> {
    /// Wrap `handler`. Called once at startup.
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    /// The wrapped application handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Translate, serve and render a single event.
    pub fn handle(&self, event: &InboundEvent) -> Result<OutboundEvent, AdapterError> {
        match handle(event, &self.handler) {
            Ok(response) => {
                info!(
                    method = %event.http_method,
                    path = %event.path,
                    status = response.status_code,
                    base64 = response.is_base64_encoded,
                    "event handled"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(
                    method = %event.http_method,
                    path = %event.path,
                    error = %e,
                    "event failed"
                );
                Err(e)
            }
        }
    }

    /// Same as `handle`, but takes and returns the gateway's JSON encoding.
    pub fn handle_json(&self, payload: &[u8]) -> Result<Vec<u8>, AdapterError> {
        let event: InboundEvent = serde_json::from_slice(payload)?;
        let response = self.handle(&event)?;
        Ok(serde_json::to_vec(&response)?)
    }
}
