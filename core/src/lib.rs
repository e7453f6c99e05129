//! Bridge between a serverless gateway's event contract and a synchronous
//! HTTP handler.
//!
//! # Overview
//! The gateway hands a function a structured event (method, path, query
//! parameters, headers, body, base64 flag) and expects a structured event back.
//! This crate turns the inbound event into an ordinary `http::Request`, lets an
//! application handler write its response into an in-memory sink, and renders
//! that sink into the gateway's response shape.
//!
//! # Design
//! - `request::translate` is a pure event-to-request conversion.
//! - `response::CaptureSink` implements `ResponseWriter` and records the
//!   handler's writes; `render` is a separate, side-effect free step.
//! - `adapter::Adapter` is built once at startup around a `Handler` and runs
//!   each event through translate, serve, render.
//! - The crate does no I/O. Reading events off the runtime and writing
//!   responses back is the caller's job.

pub mod adapter;
pub mod error;
pub mod event;
pub mod request;
pub mod response;

pub use adapter::{handle, Adapter, Handler};
pub use error::{AdapterError, RenderError, TranslationError};
pub use event::{InboundEvent, OutboundEvent};
pub use request::{translate, CanonicalRequest, RequestBody};
pub use response::{CaptureSink, ResponseWriter};
