//! Process state a server request is built from.
//!
//! A [`ServerEnvironment`] holds, as plain values, everything a CGI-style
//! server hands to a request: the server variables, cookies, posted form
//! fields, uploaded file descriptors and the raw request body. Nothing here
//! reads process state on its own except [`ServerEnvironmentBuilder::from_process`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::trace;

/// Name of the server variable holding the raw `Cookie` header.
pub const HTTP_COOKIE: &str = "HTTP_COOKIE";

/// Metadata of an uploaded file as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileDescriptor {
    /// Temporary location of the file, `None` when no file was sent.
    pub path: Option<PathBuf>,
    pub size: u64,
    /// Standard upload error code, 0 on success.
    pub error: i64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerEnvironment {
    server: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
    fields: BTreeMap<String, String>,
    files: BTreeMap<String, FileDescriptor>,
    body: String,
}

impl ServerEnvironment {
    pub fn builder() -> ServerEnvironmentBuilder {
        ServerEnvironmentBuilder::new()
    }

    /// Captures the environment variables of the current process.
    ///
    /// See [`ServerEnvironmentBuilder::from_process`].
    pub fn from_process() -> Self {
        ServerEnvironmentBuilder::from_process().build()
    }

    /// Reads an environment from JSON with the optional keys `server`,
    /// `cookies`, `fields`, `files` and `body`.
    ///
    /// # Errors
    ///
    /// Fails when `json` is not a valid environment document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn server(&self) -> &BTreeMap<String, String> {
        &self.server
    }

    pub fn server_var(&self, name: &str) -> Option<&str> {
        self.server.get(name).map(String::as_str)
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// The posted form fields.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn files(&self) -> &BTreeMap<String, FileDescriptor> {
        &self.files
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

#[derive(Debug, Default)]
pub struct ServerEnvironmentBuilder {
    environment: ServerEnvironment,
}

impl ServerEnvironmentBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Starts from the environment variables of the current process.
    ///
    /// Every unicode variable becomes a server variable and cookies are parsed
    /// from `HTTP_COOKIE`. The request body is not read.
    pub fn from_process() -> Self {
        let mut builder = Self::new();
        for (name, value) in std::env::vars_os() {
            if let (Some(name), Some(value)) = (name.to_str(), value.to_str()) {
                builder = builder.server_var(name, value);
            }
        }
        if let Some(cookie) = builder.environment.server.get(HTTP_COOKIE) {
            builder.environment.cookies = parse_cookies(cookie);
        }
        trace!(
            variables = builder.environment.server.len(),
            cookies = builder.environment.cookies.len(),
            "captured process environment"
        );
        builder
    }

    pub fn server_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.server.insert(name.into(), value.into());
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.cookies.insert(name.into(), value.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.fields.insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, name: impl Into<String>, descriptor: FileDescriptor) -> Self {
        self.environment.files.insert(name.into(), descriptor);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.environment.body = body.into();
        self
    }

    pub fn build(self) -> ServerEnvironment {
        self.environment
    }
}

/// Parses a `Cookie` header value: `;`-separated `name=value` pairs.
pub fn parse_cookies(header: &str) -> BTreeMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| !name.is_empty())
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}
