//! Factory traits for every message type and the [`Factory`] implementing them all.

use std::path::PathBuf;

use micro_message::{
    AccessMode, Body, IntoUri, MessageError, Params, Request, Resource, Response, ServerRequest, Stream, UploadError,
    UploadedFile, Uri,
};

use crate::environment::ServerEnvironment;
use crate::ingest;

pub trait RequestFactory {
    /// # Errors
    ///
    /// Fails on an unknown method or an unparsable URI.
    fn create_request(&self, method: &str, uri: impl IntoUri) -> micro_message::Result<Request>;
}

pub trait ResponseFactory {
    /// Creates a response; an empty `reason` selects the recommended phrase of `code`.
    ///
    /// # Errors
    ///
    /// Fails when `code` is above 599.
    fn create_response(&self, code: u16, reason: &str) -> micro_message::Result<Response>;
}

pub trait ServerRequestFactory {
    /// # Errors
    ///
    /// Fails on an unknown method or an unparsable URI.
    fn create_server_request(
        &self,
        method: &str,
        uri: impl IntoUri,
        server_params: Params,
    ) -> micro_message::Result<ServerRequest>;

    /// Builds the server request described by `environment`.
    ///
    /// # Errors
    ///
    /// Fails when the environment describes an invalid method, URI or header, or an upload file cannot be opened.
    fn create_from_environment(&self, environment: &ServerEnvironment) -> crate::Result<ServerRequest>;
}

pub trait StreamFactory {
    fn create_stream(&self, content: &str) -> Stream;

    /// Opens `path` with an fopen-style `mode` such as `r` or `w+`.
    ///
    /// # Errors
    ///
    /// Fails on an unknown mode or when the file cannot be opened.
    fn create_stream_from_file(&self, path: impl Into<PathBuf>, mode: &str) -> micro_message::Result<Stream>;

    /// Wraps an open resource, which has to be readable.
    ///
    /// # Errors
    ///
    /// Fails when the resource is not readable.
    fn create_stream_from_resource(&self, resource: Resource) -> micro_message::Result<Stream>;
}

pub trait UploadedFileFactory {
    fn create_uploaded_file(
        &self,
        stream: impl Into<Body>,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> UploadedFile;
}

pub trait UriFactory {
    /// # Errors
    ///
    /// Fails when `uri` cannot be parsed.
    fn create_uri(&self, uri: &str) -> micro_message::Result<Uri>;
}

/// Stateless factory for all message types.
#[derive(Debug, Clone, Copy, Default)]
pub struct Factory;

impl RequestFactory for Factory {
    fn create_request(&self, method: &str, uri: impl IntoUri) -> micro_message::Result<Request> {
        Request::new(method, uri)
    }
}

impl ResponseFactory for Factory {
    fn create_response(&self, code: u16, reason: &str) -> micro_message::Result<Response> {
        Response::builder().status(code).reason(reason).build()
    }
}

impl ServerRequestFactory for Factory {
    fn create_server_request(
        &self,
        method: &str,
        uri: impl IntoUri,
        server_params: Params,
    ) -> micro_message::Result<ServerRequest> {
        ServerRequest::new(method, uri, server_params)
    }

    fn create_from_environment(&self, environment: &ServerEnvironment) -> crate::Result<ServerRequest> {
        ingest::server_request(environment)
    }
}

impl StreamFactory for Factory {
    fn create_stream(&self, content: &str) -> Stream {
        Stream::from_text(content)
    }

    fn create_stream_from_file(&self, path: impl Into<PathBuf>, mode: &str) -> micro_message::Result<Stream> {
        let mode: AccessMode = mode.parse()?;
        Stream::open(path, mode)
    }

    fn create_stream_from_resource(&self, resource: Resource) -> micro_message::Result<Stream> {
        if !resource.mode().is_readable() {
            return Err(MessageError::unsupported("readable"));
        }
        Stream::from_resource(resource)
    }
}

impl UploadedFileFactory for Factory {
    fn create_uploaded_file(
        &self,
        stream: impl Into<Body>,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> UploadedFile {
        UploadedFile::new(stream, size, error, client_filename, client_media_type)
    }
}

impl UriFactory for Factory {
    fn create_uri(&self, uri: &str) -> micro_message::Result<Uri> {
        Uri::parse(uri)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use micro_message::prelude::*;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn create_request() {
        let request = Factory.create_request("post", "http://localhost:8000/register").unwrap();
        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.request_target(), "/register");

        let uri = Factory.create_uri("http://localhost/login").unwrap();
        let request = Factory.create_request("GET", &uri).unwrap();
        assert_eq!(request.uri(), &uri);

        assert!(Factory.create_request("FETCH", "/").unwrap_err().is_validation());
    }

    #[test]
    fn create_response() {
        let response = Factory.create_response(404, "").unwrap();
        assert_eq!(response.reason_phrase(), "Not Found");

        let response = Factory.create_response(200, "Fine").unwrap();
        assert_eq!(response.reason_phrase(), "Fine");
    }

    #[test]
    fn create_server_request() {
        let params = Params::from([("REMOTE_ADDR".to_string(), "127.0.0.1".to_string())]);
        let request = Factory.create_server_request("GET", "http://localhost/?page=2", params).unwrap();
        assert_eq!(request.server_params()["REMOTE_ADDR"], "127.0.0.1");
        assert_eq!(request.query_params().get("page"), Some(Some("2")));
    }

    #[test]
    fn create_streams() {
        let mut stream = Factory.create_stream("hello");
        assert_eq!(stream.contents().unwrap(), "hello");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.txt");
        fs::write(&path, "file content").unwrap();

        let mut stream = Factory.create_stream_from_file(&path, "r").unwrap();
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert_eq!(stream.contents().unwrap(), "file content");

        assert!(Factory.create_stream_from_file(&path, "q").unwrap_err().is_validation());
        assert!(Factory.create_stream_from_file(dir.path().join("missing"), "r").unwrap_err().is_io());
    }

    #[test]
    fn create_stream_from_resource() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let resource = Resource::open(&path, "w".parse().unwrap()).unwrap();
        assert!(Factory.create_stream_from_resource(resource).unwrap_err().is_io());

        let resource = Resource::open(&path, "w+".parse().unwrap()).unwrap();
        let stream = Factory.create_stream_from_resource(resource).unwrap();
        assert!(stream.is_readable());

        let stream = Factory.create_stream_from_resource(Resource::memory("abc")).unwrap();
        assert_eq!(stream.size(), Some(3));
    }

    #[test]
    fn create_uploaded_file() {
        let file = Factory.create_uploaded_file(
            Factory.create_stream("avatar"),
            None,
            UploadError::Ok,
            Some("avatar.png".to_string()),
            Some("image/png".to_string()),
        );
        assert_eq!(file.size(), Some(6));
        assert_eq!(file.client_media_type(), Some("image/png"));
    }
}
