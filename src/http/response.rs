use crate::http::encoding::Encoding;
use crate::http::headers::Headers;
use crate::http::status::Status;
use bytes::Bytes;

pub const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Plain(Bytes),
    Encoded { encoding: Encoding, bytes: Bytes },
}

impl Body {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Plain(bytes) | Body::Encoded { bytes, .. } => &bytes[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub version: String,
    pub status: Status,
    pub headers: Headers,
    pub body: Body,
}

impl Response {
    /// Fills in `Content-Type: text/plain` and `Content-Length` unless already set.
    pub fn from_parts(status: Status, mut headers: Headers, content: impl Into<Bytes>) -> Response {
        let content = content.into();
        headers.set_default("Content-Type", "text/plain");
        headers.set_default("Content-Length", content.len().to_string());

        Response {
            version: HTTP_VERSION.to_string(),
            status,
            headers,
            body: Body::Plain(content),
        }
    }

    pub fn text(content: impl Into<Bytes>) -> Response {
        Response::from_parts(Status::Ok, Headers::new(), content)
    }
}

pub fn serialize_response(response: &Response) -> Vec<u8> {
    let body = response.body.as_bytes();
    let mut resp_bytes = Vec::with_capacity(body.len() + response.headers.len() * 32);

    resp_bytes.extend(
        format!(
            "{} {} {}\r\n",
            response.version,
            response.status.code(),
            response.status.reason()
        )
        .as_bytes(),
    );

    for (key, value) in response.headers.iter() {
        resp_bytes.extend(format!("{}: {}\r\n", key, value).as_bytes());
    }

    resp_bytes.extend(b"\r\n");
    resp_bytes.extend(body);

    resp_bytes
}
