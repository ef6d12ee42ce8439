//! Turns a [`ServerEnvironment`] into a [`ServerRequest`].

use std::collections::HashMap;

use http::Method;
use micro_message::{HeaderInput, HttpMessage, Params, QueryParams, ServerRequest, Stream, UploadError, UploadedFile};
use mime::Mime;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::environment::{FileDescriptor, ServerEnvironment};

/// Upload name given to the raw body of a `PUT` request.
pub const PUT_UPLOAD_NAME: &str = "upload_put";

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

pub(crate) fn server_request(environment: &ServerEnvironment) -> crate::Result<ServerRequest> {
    let method = environment.server_var("REQUEST_METHOD").unwrap_or("GET").to_ascii_uppercase();
    let content_type = environment.server_var("CONTENT_TYPE").unwrap_or(DEFAULT_MEDIA_TYPE);

    let mut builder = ServerRequest::builder()
        .method(&method)
        .uri(request_uri(environment))
        .body(Stream::from_text(environment.body()))
        .server_params(environment.server().iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Params>())
        .cookie_params(environment.cookies().iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Params>())
        .query_params(QueryParams::parse(environment.server_var("QUERY_STRING").unwrap_or_default()))
        .parsed_body(parsed_body(content_type, environment));

    let headers = request_headers(environment);
    for (name, value) in &headers {
        builder = builder.header(name, value.clone());
    }

    for (name, file) in uploaded_files(&method, content_type, environment)? {
        builder = builder.uploaded_file(&name, file);
    }

    let request = builder.build()?;
    // the builder derives Host from the uri, which drops any port HTTP_HOST carried
    match headers.into_iter().find(|(name, _)| name == "Host") {
        Some((name, value)) => Ok(request.with_header(&name, value)?),
        None => Ok(request),
    }
}

/// `REQUEST_SCHEME://HTTP_HOST REQUEST_URI`.
fn request_uri(environment: &ServerEnvironment) -> String {
    let scheme = environment.server_var("REQUEST_SCHEME").unwrap_or("http");
    let host = environment.server_var("HTTP_HOST").unwrap_or("localhost");
    let uri = environment.server_var("REQUEST_URI").unwrap_or("/");
    format!("{scheme}://{host}{uri}")
}

/// Headers from every `HTTP_*` and `CONTENT_*` server variable, values split on `,` and `;`.
fn request_headers(environment: &ServerEnvironment) -> Vec<(String, HeaderInput)> {
    environment
        .server()
        .iter()
        .filter_map(|(key, value)| {
            let name = match key.strip_prefix("HTTP_") {
                Some(name) => name,
                None if key.starts_with("CONTENT_") => key.as_str(),
                None => return None,
            };
            let values = value.split([',', ';']).map(str::to_string).collect();
            Some((header_name(name), HeaderInput::List(values)))
        })
        .collect()
}

/// `ACCEPT_ENCODING` to `Accept-Encoding`.
pub fn header_name(variable: &str) -> String {
    variable
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let word = word.to_ascii_lowercase();
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn parsed_body(content_type: &str, environment: &ServerEnvironment) -> Option<Value> {
    let media_type = match content_type.parse::<Mime>() {
        Ok(media_type) => media_type,
        Err(e) => {
            warn!(cause = %e, content_type, "unparsable content type, body left unparsed");
            return None;
        }
    };

    match parse_body(&media_type, environment) {
        Ok(Some(value @ (Value::Object(_) | Value::Array(_)))) => {
            debug!(media_type = %media_type, "request body parsed");
            Some(value)
        }
        Ok(Some(value)) => {
            warn!(media_type = %media_type, kind = json_kind(&value), "request body is not structured data");
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!(cause = %e, media_type = %media_type, "undecodable request body");
            None
        }
    }
}

/// Decodes the body according to its media type.
///
/// Form posts yield the posted fields, or the urlencoded body when no field was
/// posted. JSON media types (`application/json`, `application/*+json`) yield
/// the decoded document. Any other media type, and an empty JSON body, yield `None`.
///
/// # Errors
///
/// Fails when the body cannot be decoded as the media type says.
pub fn parse_body(media_type: &Mime, environment: &ServerEnvironment) -> crate::Result<Option<Value>> {
    let (type_, subtype) = (media_type.type_(), media_type.subtype());
    let is_form = (type_ == mime::APPLICATION && subtype == mime::WWW_FORM_URLENCODED)
        || (type_ == mime::MULTIPART && subtype == mime::FORM_DATA);

    if is_form {
        let fields: Map<String, Value> = if environment.fields().is_empty() {
            serde_urlencoded::from_str::<Vec<(String, String)>>(environment.body())?
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect()
        } else {
            environment.fields().iter().map(|(name, value)| (name.clone(), Value::String(value.clone()))).collect()
        };
        return Ok(Some(Value::Object(fields)));
    }

    let is_json = type_ == mime::APPLICATION && (subtype == mime::JSON || media_type.suffix() == Some(mime::JSON));
    if is_json {
        if environment.body().trim().is_empty() {
            return Ok(None);
        }
        return Ok(Some(serde_json::from_str(environment.body())?));
    }

    Ok(None)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn uploaded_files(
    method: &str,
    content_type: &str,
    environment: &ServerEnvironment,
) -> micro_message::Result<HashMap<String, UploadedFile>> {
    let mut files = HashMap::new();
    for (name, descriptor) in environment.files() {
        files.insert(name.clone(), uploaded_file(descriptor)?);
    }

    if files.is_empty() && method == Method::PUT.as_str() {
        let file = UploadedFile::new(
            Stream::from_text(environment.body()),
            None,
            UploadError::Ok,
            None,
            Some(content_type.to_string()),
        );
        files.insert(PUT_UPLOAD_NAME.to_string(), file);
    }

    debug!(count = files.len(), "uploaded files collected");
    Ok(files)
}

fn uploaded_file(descriptor: &FileDescriptor) -> micro_message::Result<UploadedFile> {
    let error = UploadError::try_from(descriptor.error)?;
    let name = descriptor.name.clone().filter(|name| !name.is_empty());
    let media_type = descriptor.media_type.clone().filter(|media_type| !media_type.is_empty());

    match descriptor.path.as_ref().filter(|path| !path.as_os_str().is_empty()) {
        Some(path) if error.is_ok() => UploadedFile::from_path(path, Some(descriptor.size), error, name, media_type),
        _ => Ok(UploadedFile::new(Stream::from_text(""), Some(descriptor.size), error, name, media_type)),
    }
}
