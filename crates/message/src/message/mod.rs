//! The parts shared by requests and responses.
//!
//! A [`Message`] carries the protocol version, a [`HeaderBag`] and a shared
//! [`Body`]. The [`HttpMessage`] trait exposes them on every message type and
//! provides the copy-producing mutators: each `with_*` method builds a new
//! value from the previous one with a single part replaced. The body stream is
//! shared between the copies until it is replaced with [`HttpMessage::with_body`].

mod header;

pub use header::HeaderBag;
pub use header::HeaderInput;
pub use header::split_header_value;

use crate::stream::Body;
use crate::utils::ensure;
use crate::{MessageError, Result};

/// Protocol version used when none is given.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

#[derive(Debug, Clone)]
pub struct Message {
    version: String,
    headers: HeaderBag,
    body: Body,
}

impl Message {
    /// Builds a message from its parts.
    ///
    /// # Errors
    ///
    /// Fails when the version has no `<digit>.<digit>` number or the body is not seekable.
    pub fn new(version: &str, headers: HeaderBag, body: Body) -> Result<Self> {
        let version = normalize_version(version)?;
        ensure!(body.is_seekable(), MessageError::validation("the body is not seekable"));
        Ok(Self { version, headers, body })
    }

    fn with_version_string(&self, version: String) -> Self {
        Self { version, headers: self.headers.clone(), body: self.body.clone() }
    }

    fn with_header_bag(&self, headers: HeaderBag) -> Self {
        Self { version: self.version.clone(), headers, body: self.body.clone() }
    }

    fn with_body_handle(&self, body: Body) -> Self {
        Self { version: self.version.clone(), headers: self.headers.clone(), body }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self { version: DEFAULT_PROTOCOL_VERSION.to_string(), headers: HeaderBag::new(), body: Body::empty() }
    }
}

/// Read access and copy-on-write mutators shared by all message types.
pub trait HttpMessage: Sized {
    fn message(&self) -> &Message;

    /// Builds a copy of `self` carrying `message` instead of the current one.
    fn with_message(&self, message: Message) -> Self;

    /// The protocol version, digits and dot only, e.g. `1.1`.
    fn protocol_version(&self) -> &str {
        &self.message().version
    }

    fn headers(&self) -> &HeaderBag {
        &self.message().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains(name)
    }

    /// The values of a header, empty if the header is absent.
    fn header(&self, name: &str) -> &[String] {
        self.headers().find(name).unwrap_or_default()
    }

    /// The values of a header joined by `,`, empty if the header is absent.
    fn header_line(&self, name: &str) -> String {
        self.headers().line(name)
    }

    fn body(&self) -> &Body {
        &self.message().body
    }

    /// # Errors
    ///
    /// Fails when `version` has no `<digit>.<digit>` number.
    fn with_protocol_version(&self, version: &str) -> Result<Self> {
        let version = normalize_version(version)?;
        Ok(self.with_message(self.message().with_version_string(version)))
    }

    /// Replaces the values of a header, see [`HeaderBag::with`].
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    fn with_header(&self, name: &str, value: impl Into<HeaderInput>) -> Result<Self> {
        let headers = self.headers().with(name, value)?;
        Ok(self.with_message(self.message().with_header_bag(headers)))
    }

    /// Appends to the values of a header, see [`HeaderBag::with_added`].
    ///
    /// # Errors
    ///
    /// Fails on an invalid header name or value.
    fn with_added_header(&self, name: &str, value: impl Into<HeaderInput>) -> Result<Self> {
        let headers = self.headers().with_added(name, value)?;
        Ok(self.with_message(self.message().with_header_bag(headers)))
    }

    fn without_header(&self, name: &str) -> Self {
        let headers = self.headers().without(name);
        self.with_message(self.message().with_header_bag(headers))
    }

    /// # Errors
    ///
    /// Fails when the new body is not seekable.
    fn with_body(&self, body: impl Into<Body>) -> Result<Self> {
        let body = body.into();
        ensure!(body.is_seekable(), MessageError::validation("the body is not seekable"));
        Ok(self.with_message(self.message().with_body_handle(body)))
    }
}

impl HttpMessage for Message {
    fn message(&self) -> &Message {
        self
    }

    fn with_message(&self, message: Message) -> Self {
        message
    }
}

/// Checks that `version` holds a `<digit>.<digit>` number and keeps only digits and dots.
///
/// # Errors
///
/// Returns a validation error for anything else.
pub fn normalize_version(version: &str) -> Result<String> {
    let has_number = version
        .as_bytes()
        .windows(3)
        .any(|w| w[0].is_ascii_digit() && w[1] == b'.' && w[2].is_ascii_digit());
    ensure!(has_number, MessageError::validation(format!("{version} is missing the protocol version number")));

    Ok(version.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect())
}

#[cfg(test)]
mod tests {
    use crate::stream::{Resource, Stream};

    use super::*;

    #[test]
    fn normalize() {
        assert_eq!(normalize_version("HTTP/1.1").unwrap(), "1.1");
        assert_eq!(normalize_version("HTTP/2.0").unwrap(), "2.0");
        assert_eq!(normalize_version("1.0").unwrap(), "1.0");
        assert!(normalize_version("HTTP/2").unwrap_err().is_validation());
        assert!(normalize_version("one.one").unwrap_err().is_validation());
    }

    #[test]
    fn default_message() {
        let message = Message::default();
        assert_eq!(message.protocol_version(), "1.1");
        assert!(message.headers().is_empty());
        assert_eq!(message.body().size(), Some(0));
    }

    #[test]
    fn with_protocol_version() {
        let message = Message::default();
        let next = message.with_protocol_version("HTTP/2.0").unwrap();
        assert_eq!(next.protocol_version(), "2.0");
        assert_eq!(message.protocol_version(), "1.1");
        assert!(message.with_protocol_version("HTTP").unwrap_err().is_validation());
    }

    #[test]
    fn copies_share_body() {
        let message = Message::default().with_body(Stream::from_text("payload")).unwrap();
        let next = message.with_header("X-Id", "1").unwrap();
        assert!(Body::ptr_eq(message.body(), next.body()));
        assert!(!next.has_header("Content-Type"));
        assert_eq!(next.header("X-Id"), ["1"]);
        assert!(message.header("X-Id").is_empty());
    }

    #[test]
    fn with_body_requires_seekable() {
        let mut stream = Stream::from_text("gone");
        let _resource: Option<Resource> = stream.detach();
        let error = Message::default().with_body(stream).unwrap_err();
        assert!(error.is_validation());
    }

    #[test]
    fn new_validates() {
        assert!(Message::new("HTTP/1.0", HeaderBag::new(), Body::empty()).is_ok());
        assert!(Message::new("HTTP/x", HeaderBag::new(), Body::empty()).unwrap_err().is_validation());
    }
}
