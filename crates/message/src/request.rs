//! HTTP request value object.
//!
//! A [`Request`] is a [`Message`] plus a method, a [`Uri`] and a request
//! target. The target is derived from the method and the URI unless it was
//! set explicitly with [`HttpRequest::with_request_target`]:
//!
//! - `CONNECT` targets the authority (`proxy:8080`);
//! - every other method targets the path, `/` when the path is empty;
//! - `GET` additionally carries `?query` when the URI has a query.
//!
//! The `Host` header is always initialized from the URI host.

use http::Method;

use crate::message::{DEFAULT_PROTOCOL_VERSION, HeaderBag, HeaderInput, HttpMessage, Message};
use crate::stream::Body;
use crate::uri::{IntoUri, Uri};
use crate::{MessageError, Result};

/// Methods a request may carry.
const VALID_METHODS: [Method; 8] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::TRACE,
    Method::CONNECT,
    Method::OPTIONS,
];

pub(crate) const HOST: &str = "Host";

#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Uri,
    target: Option<String>,
}

impl Request {
    /// Creates a request with protocol version 1.1 and an empty body.
    ///
    /// # Errors
    ///
    /// Fails when the method is not one of GET, HEAD, POST, PUT, DELETE, TRACE,
    /// CONNECT, OPTIONS or when the URI cannot be parsed.
    pub fn new(method: &str, uri: impl IntoUri) -> Result<Self> {
        Self::builder().method(method).uri(uri).build()
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }
}

/// Read access and copy-on-write mutators shared by all request types.
pub trait HttpRequest: HttpMessage {
    fn request(&self) -> &Request;

    /// Builds a copy of `self` carrying `request` instead of the current one.
    fn with_request(&self, request: Request) -> Self;

    fn method(&self) -> &Method {
        &self.request().method
    }

    fn uri(&self) -> &Uri {
        &self.request().uri
    }

    fn request_target(&self) -> String {
        let request = self.request();
        match &request.target {
            Some(target) => target.clone(),
            None => derive_target(&request.method, &request.uri),
        }
    }

    /// Returns a copy with an explicit request target, e.g. `*` or an absolute URI.
    fn with_request_target(&self, target: &str) -> Self {
        let request = self.request();
        self.with_request(Request {
            message: request.message.clone(),
            method: request.method.clone(),
            uri: request.uri.clone(),
            target: Some(target.to_string()),
        })
    }

    /// # Errors
    ///
    /// Fails when the method is not in the accepted set.
    fn with_method(&self, method: &str) -> Result<Self> {
        let method = parse_method(method)?;
        let request = self.request();
        Ok(self.with_request(Request {
            message: request.message.clone(),
            method,
            uri: request.uri.clone(),
            target: request.target.clone(),
        }))
    }

    /// Returns a copy targeting `uri`.
    ///
    /// The `Host` header follows the new URI host, except that it is left alone
    /// when the new URI has no host, or when `preserve_host` is set and the
    /// request already has a non-empty `Host` header.
    ///
    /// # Errors
    ///
    /// Fails when the new host is not a valid `Host` header value.
    fn with_uri(&self, uri: Uri, preserve_host: bool) -> Result<Self> {
        let request = self.request();
        let host = uri.host().into_owned();
        let keep_host = host.is_empty() || (preserve_host && !request.header_line(HOST).is_empty());

        let message = if keep_host {
            request.message.clone()
        } else {
            request.message.with_header(HOST, HeaderInput::List(vec![host]))?
        };

        Ok(self.with_request(Request { message, method: request.method.clone(), uri, target: request.target.clone() }))
    }
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self { message, method: self.method.clone(), uri: self.uri.clone(), target: self.target.clone() }
    }
}

impl HttpRequest for Request {
    fn request(&self) -> &Request {
        self
    }

    fn with_request(&self, request: Request) -> Self {
        request
    }
}

/// Builder for [`Request`], validation is deferred to [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: String,
    uri: Result<Uri>,
    version: String,
    headers: Vec<(String, HeaderInput)>,
    body: Option<Body>,
}

impl RequestBuilder {
    fn new() -> Self {
        Self {
            method: Method::GET.to_string(),
            uri: Ok(Uri::default()),
            version: DEFAULT_PROTOCOL_VERSION.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_string();
        self
    }

    pub fn uri(mut self, uri: impl IntoUri) -> Self {
        self.uri = uri.into_uri();
        self
    }

    /// Sets the protocol version, `HTTP/1.0` and `1.0` are both accepted.
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
    /// Fails on an unknown method, an unparsable URI, an invalid protocol version or header.
    pub fn build(self) -> Result<Request> {
        let method = parse_method(&self.method)?;
        let uri = self.uri?;

        let mut headers = HeaderBag::new();
        for (name, value) in self.headers {
            headers = headers.with(&name, value)?;
        }
        let headers = headers.with(HOST, HeaderInput::List(vec![uri.host().into_owned()]))?;

        let message = Message::new(&self.version, headers, self.body.unwrap_or_default())?;
        Ok(Request { message, method, uri, target: None })
    }
}

/// Matches a method case-insensitively against the accepted set.
///
/// # Errors
///
/// Returns a validation error for methods outside the accepted set.
pub fn parse_method(method: &str) -> Result<Method> {
    let upper = method.to_ascii_uppercase();
    VALID_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or_else(|| MessageError::validation(format!("[{upper}] is not a valid http method")))
}

fn derive_target(method: &Method, uri: &Uri) -> String {
    if *method == Method::CONNECT {
        let authority = uri.authority();
        if !authority.is_empty() {
            return authority;
        }
    }

    let path = uri.path();
    let mut target = match path.as_str() {
        "" => "/".to_string(),
        p if p.starts_with('/') => path,
        p => format!("/{p}"),
    };

    if *method == Method::GET {
        let query = uri.query();
        if !query.is_empty() {
            target.push('?');
            target.push_str(&query);
        }
    }
    target
}
