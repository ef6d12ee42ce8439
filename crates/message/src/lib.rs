//! Immutable HTTP message value objects
//!
//! This crate models HTTP requests, responses and their building blocks as
//! immutable values. Every mutator is a `with_*` method that returns a new
//! value with one part replaced; the value it was called on is left as is.
//!
//! # Features
//!
//! - [`Uri`] with component-level validation and normalized rendering
//! - case-insensitive, ordered, multi-value headers ([`HeaderBag`])
//! - seekable body streams over memory or files ([`Stream`]), shared between
//!   message copies ([`Body`])
//! - [`Request`], [`Response`] and [`ServerRequest`], with the server-side
//!   extras: cookies, query parameters, parsed body, attributes and
//!   [`UploadedFile`]s
//!
//! The shared behaviour lives in two traits, [`HttpMessage`] for version,
//! headers and body, and [`HttpRequest`] for method, URI and request target.
//! Import them through the [`prelude`].
//!
//! # Example
//!
//! ```
//! use micro_message::prelude::*;
//! use micro_message::{Request, Response, Stream};
//!
//! let request = Request::new("GET", "http://localhost:8000/register?x=1").unwrap();
//! assert_eq!(request.request_target(), "/register?x=1");
//! assert_eq!(request.header_line("Host"), "localhost");
//!
//! let login = request.with_uri(request.uri().with_path("/login"), false).unwrap();
//! assert_eq!(login.uri().to_string(), "http://localhost:8000/login?x=1");
//! assert_eq!(request.uri().path(), "/register");
//!
//! let response = Response::new(201).with_body(Stream::from_text("created")).unwrap();
//! assert_eq!(response.reason_phrase(), "Created");
//! assert_eq!(response.body().to_string(), "created");
//! ```
//!
//! # Errors
//!
//! Every fallible operation returns [`Result`], whose error [`MessageError`]
//! tells validation failures, URI parse failures and I/O failures apart.

mod error;
pub mod message;
pub mod request;
pub mod response;
pub mod server_request;
pub mod stream;
pub mod uploaded_file;
pub mod uri;
mod utils;

pub use error::{MessageError, Result};
pub use message::{HeaderBag, HeaderInput, HttpMessage, Message};
pub use request::{HttpRequest, Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};
pub use server_request::{Params, ServerRequest, ServerRequestBuilder};
pub use stream::{AccessMode, Body, Resource, Stream, StreamSource};
pub use uploaded_file::{UploadError, UploadedFile};
pub use uri::{IntoUri, QueryParams, Uri};

/// The message traits, for glob import.
pub mod prelude {
    pub use crate::message::HttpMessage;
    pub use crate::request::HttpRequest;
}
