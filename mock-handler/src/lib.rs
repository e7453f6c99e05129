//! Fixture handler for exercising the gateway bridge end to end.
//!
//! `Greeter` answers every request with a JSON greeting built from a `name`
//! form field or query parameter. It exists so tests and the stdin driver have
//! a realistic handler to push events through.

use std::io::{Read, Write};

use anyhow::Context;
use gateway_bridge::{Adapter, CanonicalRequest, Handler, ResponseWriter};
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use tracing::debug;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Replies `"Hello, <name>!"` as a JSON string with status 200.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greeter;

impl Handler for Greeter {
    fn serve(&self, writer: &mut dyn ResponseWriter, mut request: CanonicalRequest) {
        let mut body = String::new();
        if request.body_mut().read_to_string(&mut body).is_err() {
            writer
                .headers()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            writer.write_header(400);
            writer.write(b"request body is not valid UTF-8");
            return;
        }

        let is_form = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));
        let from_form = if is_form { form_value(&body, "name") } else { None };
        let name = from_form
            .or_else(|| form_value(request.uri().query().unwrap_or_default(), "name"))
            .unwrap_or_default();
        debug!(%name, "greeting");

        let greeting = serde_json::Value::String(format!("Hello, {name}!"));
        writer
            .headers()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        writer.write_header(200);
        writer.write(greeting.to_string().as_bytes());
    }
}

/// The adapter the driver binary runs.
pub fn app() -> Adapter<Greeter> {
    Adapter::new(Greeter)
}

/// Read one gateway event from `input`, handle it, write the response to
/// `output`.
pub fn run(mut input: impl Read, mut output: impl Write) -> anyhow::Result<()> {
    let mut payload = Vec::new();
    input
        .read_to_end(&mut payload)
        .context("failed to read event")?;
    let response = app().handle_json(&payload)?;
    output
        .write_all(&response)
        .context("failed to write response")?;
    output.flush()?;
    Ok(())
}

/// First value of `key` in an `application/x-www-form-urlencoded` string.
fn form_value(encoded: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(encoded.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_finds_key() {
        assert_eq!(form_value("name=Bob&x=1", "name").as_deref(), Some("Bob"));
        assert_eq!(form_value("x=1&name=Bob", "name").as_deref(), Some("Bob"));
    }

    #[test]
    fn form_value_decodes_plus_and_percent() {
        assert_eq!(
            form_value("name=Bob+Smith%21", "name").as_deref(),
            Some("Bob Smith!")
        );
        assert_eq!(form_value("na%6De=Al", "name").as_deref(), Some("Al"));
    }

    #[test]
    fn form_value_repeated_key_keeps_first() {
        assert_eq!(form_value("name=A&name=B", "name").as_deref(), Some("A"));
    }

    #[test]
    fn form_value_missing_key() {
        assert_eq!(form_value("x=1", "name"), None);
        assert_eq!(form_value("", "name"), None);
    }

    #[test]
    fn form_value_key_without_value_is_empty() {
        assert_eq!(form_value("name", "name").as_deref(), Some(""));
    }
}
