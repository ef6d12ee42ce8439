//! Factories for micro-message types and server environment ingestion
//!
//! [`Factory`] implements one factory trait per message type, so code can
//! depend on a trait such as [`StreamFactory`] rather than on concrete
//! constructors.
//!
//! [`ServerRequestFactory::create_from_environment`] builds a fully populated
//! [`ServerRequest`](micro_message::ServerRequest) out of a
//! [`ServerEnvironment`]: method, URI and headers from the CGI-style server
//! variables, query parameters, cookies, the body parsed according to its
//! media type and the uploaded files.
//!
//! # Example
//!
//! ```
//! use micro_message::prelude::*;
//! use micro_message_factory::{Factory, ServerEnvironment, ServerRequestFactory};
//!
//! let environment = ServerEnvironment::builder()
//!     .server_var("REQUEST_METHOD", "POST")
//!     .server_var("HTTP_HOST", "localhost:8080")
//!     .server_var("REQUEST_URI", "/login")
//!     .server_var("CONTENT_TYPE", "application/json")
//!     .body(r#"{"user": "yvan"}"#)
//!     .build();
//!
//! let request = Factory.create_from_environment(&environment).unwrap();
//! assert_eq!(request.request_target(), "/login");
//! assert_eq!(request.parsed_body().unwrap()["user"], "yvan");
//! ```

mod environment;
mod error;
mod factory;
mod ingest;

pub use environment::{FileDescriptor, HTTP_COOKIE, ServerEnvironment, ServerEnvironmentBuilder, parse_cookies};
pub use error::{FactoryError, Result};
pub use factory::{
    Factory, RequestFactory, ResponseFactory, ServerRequestFactory, StreamFactory, UploadedFileFactory, UriFactory,
};
pub use ingest::{PUT_UPLOAD_NAME, header_name, parse_body};
