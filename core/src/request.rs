//! Inbound event to canonical HTTP request.
//!
//! # Design
//! Translation is a pure function of the event: nothing here touches the
//! network or keeps state between calls. The resulting `http::Request` owns
//! its body as an in-memory reader, so a handler can consume it with the usual
//! `std::io::Read` calls.
//!
//! Two quirks of the gateway contract are preserved as-is:
//! headers are appended without merging differently-cased names, and the
//! query string is glued onto the path verbatim even if the path already
//! contains a `?`.

use std::collections::HashMap;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::{Method, Request};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use tracing::{debug, warn};

use crate::error::TranslationError;
use crate::event::InboundEvent;

/// Request body handed to the handler.
pub type RequestBody = Cursor<Vec<u8>>;

/// The request a handler receives for one event.
pub type CanonicalRequest = Request<RequestBody>;

/// Everything but the unreserved characters of RFC 3986. Space becomes `%20`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Bytes `http::Uri` rejects in a path. The gateway hands over a decoded
/// path, so these are escaped instead of failing the request. `%` and `?`
/// pass through untouched.
const PATH_ILLEGAL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Build the canonical request for `event`.
///
/// Fails with `TranslationError::Decode` when a base64 body is malformed and
/// with `TranslationError::MalformedRequest` when the method, path or a header
/// cannot be expressed as an HTTP request.
pub fn translate(event: &InboundEvent) -> Result<CanonicalRequest, TranslationError> {
    let body = decode_body(event)?;
    let method = canonical_method(&event.http_method);
    let uri = format!(
        "{}{}",
        utf8_percent_encode(&event.path, PATH_ILLEGAL),
        query_string(&event.query_string_parameters)
    );

    let mut builder = Request::builder().method(method.as_str()).uri(uri.as_str());
    for (name, value) in &event.headers {
        // `Builder::header` appends, so `Foo` and `foo` both survive.
        builder = builder.header(name.as_str(), value.as_str());
    }

    let request = builder.body(Cursor::new(body)).map_err(|e| {
        warn!(
            method = %event.http_method,
            path = %event.path,
            error = %e,
            "could not convert event to http request"
        );
        TranslationError::MalformedRequest(e)
    })?;

    debug!(
        method = %request.method(),
        uri = %request.uri(),
        body_len = request.body().get_ref().len(),
        "translated inbound event"
    );
    Ok(request)
}

fn decode_body(event: &InboundEvent) -> Result<Vec<u8>, TranslationError> {
    if event.is_base64_encoded {
        Ok(STANDARD.decode(event.body.as_bytes())?)
    } else {
        Ok(event.body.as_bytes().to_vec())
    }
}

/// An empty method means GET.
fn canonical_method(method: &str) -> String {
    if method.is_empty() {
        Method::GET.as_str().to_string()
    } else {
        method.to_uppercase()
    }
}

/// `?k1=v1&k2=v2` in map iteration order, or an empty string.
fn query_string(params: &HashMap<String, String>) -> String {
    if params.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect();
    format!("?{}", pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn event(method: &str, path: &str) -> InboundEvent {
        InboundEvent {
            http_method: method.to_string(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    fn sorted_query(req: &CanonicalRequest) -> Vec<String> {
        let mut pairs: Vec<String> = req
            .uri()
            .query()
            .unwrap_or_default()
            .split('&')
            .map(str::to_string)
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn plain_body_is_passed_through() {
        let mut ev = event("POST", "/hello");
        ev.body = "name=Bob".to_string();
        let mut req = translate(&ev).unwrap();

        let mut body = String::new();
        req.body_mut().read_to_string(&mut body).unwrap();
        assert_eq!(body, "name=Bob");
    }

    #[test]
    fn base64_body_is_decoded() {
        let mut ev = event("POST", "/upload");
        ev.body = "AP+AQQ==".to_string();
        ev.is_base64_encoded = true;
        let req = translate(&ev).unwrap();
        assert_eq!(req.body().get_ref(), &vec![0x00, 0xff, 0x80, 0x41]);
    }

    #[test]
    fn malformed_base64_is_a_decode_error() {
        let mut ev = event("POST", "/upload");
        ev.body = "not base64!!".to_string();
        ev.is_base64_encoded = true;
        let err = translate(&ev).unwrap_err();
        assert!(matches!(err, TranslationError::Decode(_)));
    }

    #[test]
    fn base64_flag_off_keeps_base64_looking_text() {
        let mut ev = event("POST", "/hello");
        ev.body = "AP+AQQ==".to_string();
        let req = translate(&ev).unwrap();
        assert_eq!(req.body().get_ref().as_slice(), b"AP+AQQ==");
    }

    #[test]
    fn method_is_uppercased() {
        let req = translate(&event("patch", "/items")).unwrap();
        assert_eq!(req.method(), Method::PATCH);
    }

    #[test]
    fn empty_method_defaults_to_get() {
        let req = translate(&event("", "/items")).unwrap();
        assert_eq!(req.method(), Method::GET);
    }

    #[test]
    fn no_parameters_means_no_question_mark() {
        let req = translate(&event("GET", "/hello")).unwrap();
        assert_eq!(req.uri().to_string(), "/hello");
        assert!(req.uri().query().is_none());
    }

    #[test]
    fn parameters_are_percent_encoded_and_joined() {
        let mut ev = event("GET", "/search");
        ev.query_string_parameters = HashMap::from([
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2 x".to_string()),
        ]);
        let req = translate(&ev).unwrap();

        assert_eq!(req.uri().path(), "/search");
        assert!(req.uri().to_string().starts_with("/search?"));
        assert_eq!(sorted_query(&req), vec!["a=1", "b=2%20x"]);
    }

    #[test]
    fn keys_and_values_are_encoded_independently() {
        let mut ev = event("GET", "/search");
        ev.query_string_parameters =
            HashMap::from([("q&x".to_string(), "a=b/c é".to_string())]);
        let req = translate(&ev).unwrap();
        assert_eq!(req.uri().query(), Some("q%26x=a%3Db%2Fc%20%C3%A9"));
    }

    #[test]
    fn unreserved_characters_are_left_alone() {
        let mut ev = event("GET", "/search");
        ev.query_string_parameters =
            HashMap::from([("k-_.~".to_string(), "AZaz09-_.~".to_string())]);
        let req = translate(&ev).unwrap();
        assert_eq!(req.uri().query(), Some("k-_.~=AZaz09-_.~"));
    }

    #[test]
    fn existing_question_mark_in_path_is_not_repaired() {
        let mut ev = event("GET", "/a?x=1");
        ev.query_string_parameters = HashMap::from([("y".to_string(), "2".to_string())]);
        let req = translate(&ev).unwrap();
        assert_eq!(req.uri().to_string(), "/a?x=1?y=2");
    }

    #[test]
    fn headers_are_added_to_the_request() {
        let mut ev = event("GET", "/hello");
        ev.headers = HashMap::from([("X-Test".to_string(), "v1".to_string())]);
        let req = translate(&ev).unwrap();
        assert_eq!(req.headers().get("X-Test").unwrap(), "v1");
    }

    #[test]
    fn differently_cased_headers_are_not_merged() {
        let mut ev = event("GET", "/hello");
        ev.headers = HashMap::from([
            ("Foo".to_string(), "a".to_string()),
            ("foo".to_string(), "b".to_string()),
        ]);
        let req = translate(&ev).unwrap();

        let mut values: Vec<&str> = req
            .headers()
            .get_all("foo")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        values.sort();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn invalid_method_is_malformed() {
        let err = translate(&event("GE T", "/hello")).unwrap_err();
        assert!(matches!(err, TranslationError::MalformedRequest(_)));
    }

    #[test]
    fn invalid_header_name_is_malformed() {
        let mut ev = event("GET", "/hello");
        ev.headers = HashMap::from([("bad header".to_string(), "v".to_string())]);
        let err = translate(&ev).unwrap_err();
        assert!(matches!(err, TranslationError::MalformedRequest(_)));
    }

    #[test]
    fn decoded_path_characters_are_escaped() {
        let req = translate(&event("GET", "/files/my file.txt")).unwrap();
        assert_eq!(req.uri().path(), "/files/my%20file.txt");

        let req = translate(&event("GET", "/café/{id}")).unwrap();
        assert_eq!(req.uri().path(), "/caf%C3%A9/%7Bid%7D");
    }

    #[test]
    fn already_escaped_path_is_left_alone() {
        let req = translate(&event("GET", "/a%20b")).unwrap();
        assert_eq!(req.uri().path(), "/a%20b");
    }

    #[test]
    fn empty_path_is_malformed() {
        let err = translate(&event("GET", "")).unwrap_err();
        assert!(matches!(err, TranslationError::MalformedRequest(_)));
    }
}
