//! A CGI program echoing the request it received.
//!
//! Run it behind a CGI-capable web server, or by hand:
//!
//! ```sh
//! echo '{"user":"yvan"}' | REQUEST_METHOD=POST CONTENT_TYPE=application/json \
//!     REQUEST_URI=/login HTTP_HOST=localhost cargo run --example cgi
//! ```

use std::io::{self, Read};

use micro_message::prelude::*;
use micro_message::{Response, Stream};
use micro_message_factory::{Factory, ServerEnvironmentBuilder, ServerRequestFactory};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).with_writer(io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut body = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut body) {
        error!(cause = %e, "failed to read the request body");
        return;
    }

    let environment = ServerEnvironmentBuilder::from_process().body(body).build();
    let request = match Factory.create_from_environment(&environment) {
        Ok(request) => request,
        Err(e) => {
            error!(cause = %e, "failed to build the server request");
            print!("Status: 400 Bad Request\r\n\r\n");
            return;
        }
    };
    info!(method = %request.method(), request_target = %request.request_target(), "request received");

    let summary = format!(
        "method: {}\nuri: {}\nquery: {}\nparsed body: {}\nuploaded files: {}\n",
        request.method(),
        request.uri(),
        request.uri().query(),
        request.parsed_body().map(ToString::to_string).unwrap_or_default(),
        request.uploaded_files().len(),
    );

    let response = Response::builder()
        .status(200)
        .header("Content-Type", ["text/plain; charset=utf-8"])
        .body(Stream::from_text(summary))
        .build()
        .expect("valid response");

    print!("Status: {} {}\r\n", response.status(), response.reason_phrase());
    for (name, values) in response.headers().iter() {
        print!("{name}: {}\r\n", values.join(","));
    }
    print!("\r\n{}", response.body());
}
