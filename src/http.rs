pub mod connection;
pub mod encoding;
pub mod handler;
pub mod headers;
pub mod method;
pub mod middleware;
pub mod parse;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod status;

use bytes::Bytes;
use headers::Headers;
use response::Response;
use status::Status;

pub(crate) const BUFFER_SIZE: usize = 1024;

pub fn ok() -> Response {
    Response::from_parts(Status::Ok, Headers::new(), Bytes::new())
}

pub fn created() -> Response {
    Response::from_parts(Status::Created, Headers::new(), Bytes::new())
}

pub fn not_found() -> Response {
    Response::from_parts(Status::NotFound, Headers::new(), Bytes::new())
}
