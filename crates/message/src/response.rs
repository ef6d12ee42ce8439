//! HTTP response value object.

use crate::message::{DEFAULT_PROTOCOL_VERSION, HeaderBag, HeaderInput, HttpMessage, Message};
use crate::stream::Body;
use crate::utils::ensure;
use crate::{MessageError, Result};

/// Highest status code [`Response::with_status`] accepts.
pub const MAX_STATUS: u16 = 599;

#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: u16,
    reason: String,
}

impl Response {
    /// Creates a response with protocol version 1.1, no headers, an empty body
    /// and the recommended reason phrase of `status`.
    ///
    /// The status code is taken as is; only [`Response::with_status`] range checks it.
    pub fn new(status: u16) -> Self {
        Self { message: Message::default(), status, reason: default_reason(status, "") }
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    /// Returns a copy with another status.
    ///
    /// An empty `reason` selects the recommended phrase for `code`, or an empty
    /// phrase for codes without one.
    ///
    /// # Errors
    ///
    /// Returns a validation error for codes above 599.
    pub fn with_status(&self, code: u16, reason: &str) -> Result<Self> {
        ensure!(code <= MAX_STATUS, MessageError::validation(format!("{code} is not a valid status code")));
        Ok(Self { message: self.message.clone(), status: code, reason: default_reason(code, reason) })
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self { message, status: self.status, reason: self.reason.clone() }
    }
}

#[derive(Debug)]
pub struct ResponseBuilder {
    status: u16,
    reason: String,
    version: String,
    headers: Vec<(String, HeaderInput)>,
    body: Option<Body>,
}

impl ResponseBuilder {
    fn new() -> Self {
        Self {
            status: 200,
            reason: String::new(),
            version: DEFAULT_PROTOCOL_VERSION.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.reason = reason.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<HeaderInput>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// # Errors
    ///
    /// Fails on an invalid protocol version or header.
    pub fn build(self) -> Result<Response> {
        let mut headers = HeaderBag::new();
        for (name, value) in self.headers {
            headers = headers.with(&name, value)?;
        }
        let message = Message::new(&self.version, headers, self.body.unwrap_or_default())?;
        Ok(Response { message, status: self.status, reason: default_reason(self.status, &self.reason) })
    }
}

fn default_reason(code: u16, reason: &str) -> String {
    if reason.is_empty() { recommended_reason_phrase(code).unwrap_or_default().to_string() } else { reason.to_string() }
}

/// The reason phrase sent for `code` when none is given.
pub fn recommended_reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        305 => "Use Proxy",
        306 => "Unused",
        307 => "Temporary Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        417 => "Expectation failed",
        418 => "I'm a Teapot",
        426 => "Upgrade Required",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    };
    Some(phrase)
}

#[cfg(test)]
mod tests {
    use crate::stream::Stream;

    use super::*;

    #[test]
    fn default_reason_phrase() {
        let response = Response::new(404);
        assert_eq!(response.status(), 404);
        assert_eq!(response.reason_phrase(), "Not Found");
        assert_eq!(response.protocol_version(), "1.1");

        assert_eq!(Response::new(418).reason_phrase(), "I'm a Teapot");
        assert_eq!(Response::new(417).reason_phrase(), "Expectation failed");
        assert_eq!(Response::default().reason_phrase(), "OK");
    }

    #[test]
    fn unknown_code_has_empty_phrase() {
        assert_eq!(Response::new(299).reason_phrase(), "");
        assert_eq!(Response::new(402).reason_phrase(), "");
    }

    #[test]
    fn unchecked_on_construction() {
        assert_eq!(Response::new(700).status(), 700);
    }

    #[test]
    fn with_status() {
        let original = Response::new(200);
        let response = original.with_status(404, "").unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.reason_phrase(), "Not Found");
        assert_eq!(original.status(), 200);
        assert_eq!(original.reason_phrase(), "OK");

        let response = original.with_status(404, "Nothing Here").unwrap();
        assert_eq!(response.reason_phrase(), "Nothing Here");
    }

    #[test]
    fn with_status_range() {
        assert!(Response::new(200).with_status(600, "").unwrap_err().is_validation());
        assert!(Response::new(200).with_status(599, "").is_ok());
    }

    #[test]
    fn builder() {
        let response = Response::builder()
            .status(201)
            .header("Location", "/books/15")
            .body(Stream::from_text("{\"id\":15}"))
            .build()
            .unwrap();
        assert_eq!(response.reason_phrase(), "Created");
        assert_eq!(response.header_line("location"), "/books/15");
        assert_eq!(response.body().to_string(), "{\"id\":15}");

        let response = Response::builder().status(500).reason("Oops").version("HTTP/1.0").build().unwrap();
        assert_eq!(response.reason_phrase(), "Oops");
        assert_eq!(response.protocol_version(), "1.0");
    }

    #[test]
    fn message_mutators_keep_status() {
        let response = Response::new(503).with_header("Retry-After", "120").unwrap();
        assert_eq!(response.status(), 503);
        assert_eq!(response.reason_phrase(), "Service Unavailable");
        assert_eq!(response.header("Retry-After"), ["120"]);
    }
}
