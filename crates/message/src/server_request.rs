//! Server-side view of an incoming request.
//!
//! On top of a [`Request`], a [`ServerRequest`] carries what a server derives
//! from its environment: server parameters, cookies, the query parameters,
//! the parsed body, uploaded files and free-form attributes set by the
//! application while routing.

use std::collections::HashMap;

use serde_json::Value;

use crate::message::{HeaderInput, HttpMessage, Message};
use crate::request::{HttpRequest, Request, RequestBuilder};
use crate::stream::Body;
use crate::uploaded_file::UploadedFile;
use crate::uri::{IntoUri, QueryParams};
use crate::utils::ensure;
use crate::{MessageError, Result};

/// Plain string parameters such as server variables or cookies.
pub type Params = HashMap<String, String>;

#[derive(Debug, Clone)]
pub struct ServerRequest {
    request: Request,
    server_params: Params,
    cookie_params: Params,
    query_params: QueryParams,
    parsed_body: Option<Value>,
    attributes: HashMap<String, Value>,
    uploaded_files: HashMap<String, UploadedFile>,
}

impl ServerRequest {
    /// Creates a server request; the query parameters are parsed from the URI.
    ///
    /// # Errors
    ///
    /// Fails on an unknown method or a URI that cannot be parsed.
    pub fn new(method: &str, uri: impl IntoUri, server_params: Params) -> Result<Self> {
        Self::builder().method(method).uri(uri).server_params(server_params).build()
    }

    pub fn builder() -> ServerRequestBuilder {
        ServerRequestBuilder::new()
    }

    pub fn server_params(&self) -> &Params {
        &self.server_params
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    pub fn with_cookie_params(&self, cookies: Params) -> Self {
        Self { cookie_params: cookies, ..self.clone() }
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// Replaces the query parameters; the URI is left untouched.
    pub fn with_query_params(&self, query: QueryParams) -> Self {
        Self { query_params: query, ..self.clone() }
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    /// # Errors
    ///
    /// Returns a validation error when `data` is neither an object nor an array.
    pub fn with_parsed_body(&self, data: Option<Value>) -> Result<Self> {
        check_parsed_body(data.as_ref())?;
        Ok(Self { parsed_body: data, ..self.clone() })
    }

    pub fn uploaded_files(&self) -> &HashMap<String, UploadedFile> {
        &self.uploaded_files
    }

    pub fn with_uploaded_files(&self, files: HashMap<String, UploadedFile>) -> Self {
        Self { uploaded_files: files, ..self.clone() }
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn attribute_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.attribute(name).unwrap_or(default)
    }

    pub fn with_attribute(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.insert(name.to_string(), value.into());
        Self { attributes, ..self.clone() }
    }

    /// Returns a copy without `name`; removing an absent attribute is not an error.
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.remove(name);
        Self { attributes, ..self.clone() }
    }
}

impl HttpMessage for ServerRequest {
    fn message(&self) -> &Message {
        self.request.message()
    }

    fn with_message(&self, message: Message) -> Self {
        Self { request: self.request.with_message(message), ..self.clone() }
    }
}

impl HttpRequest for ServerRequest {
    fn request(&self) -> &Request {
        &self.request
    }

    fn with_request(&self, request: Request) -> Self {
        Self { request, ..self.clone() }
    }
}

fn check_parsed_body(data: Option<&Value>) -> Result<()> {
    ensure!(
        matches!(data, None | Some(Value::Object(_) | Value::Array(_))),
        MessageError::validation("the parsed body must be an object, an array or nothing")
    );
    Ok(())
}

/// Builder for [`ServerRequest`], wrapping a [`RequestBuilder`].
#[derive(Debug)]
pub struct ServerRequestBuilder {
    request: RequestBuilder,
    server_params: Params,
    cookie_params: Params,
    query_params: Option<QueryParams>,
    parsed_body: Option<Value>,
    attributes: HashMap<String, Value>,
    uploaded_files: HashMap<String, UploadedFile>,
}

impl ServerRequestBuilder {
    fn new() -> Self {
        Self {
            request: Request::builder(),
            server_params: Params::new(),
            cookie_params: Params::new(),
            query_params: None,
            parsed_body: None,
            attributes: HashMap::new(),
            uploaded_files: HashMap::new(),
        }
    }

    pub fn method(mut self, method: &str) -> Self {
        self.request = self.request.method(method);
        self
    }

    pub fn uri(mut self, uri: impl IntoUri) -> Self {
        self.request = self.request.uri(uri);
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.request = self.request.version(version);
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<HeaderInput>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.request = self.request.body(body);
        self
    }

    pub fn server_params(mut self, params: Params) -> Self {
        self.server_params = params;
        self
    }

    pub fn cookie_params(mut self, cookies: Params) -> Self {
        self.cookie_params = cookies;
        self
    }

    /// Overrides the query parameters otherwise parsed from the URI.
    pub fn query_params(mut self, query: QueryParams) -> Self {
        self.query_params = Some(query);
        self
    }

    pub fn parsed_body(mut self, data: Option<Value>) -> Self {
        self.parsed_body = data;
        self
    }

    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn uploaded_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.uploaded_files.insert(name.to_string(), file);
        self
    }

    /// # Errors
    ///
    /// Fails when the underlying request cannot be built, see [`RequestBuilder::build`].
    pub fn build(self) -> Result<ServerRequest> {
        let request = self.request.build()?;
        check_parsed_body(self.parsed_body.as_ref())?;
        let query_params = self.query_params.unwrap_or_else(|| request.uri().query_params().clone());

        Ok(ServerRequest {
            request,
            server_params: self.server_params,
            cookie_params: self.cookie_params,
            query_params,
            parsed_body: self.parsed_body,
            attributes: self.attributes,
            uploaded_files: self.uploaded_files,
        })
    }
}
