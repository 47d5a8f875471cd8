use crate::http::headers::Headers;
use crate::http::method::Method;
use crate::http::request::Request;
use crate::http::response::{Body, Response};
use crate::http::status::Status;
use bytes::Bytes;
use thiserror::Error;

pub(crate) const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("message is incomplete")]
    Incomplete,
    #[error("malformed request line: {0:?}")]
    InvalidRequestLine(String),
    #[error("malformed status line: {0:?}")]
    InvalidStatusLine(String),
    #[error("malformed header line: {0:?}")]
    InvalidHeader(String),
    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),
    #[error("message head is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown status code {0}")]
    UnknownStatus(u16),
}

#[derive(Debug)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: Headers,
}

impl RequestHead {
    pub fn content_length(&self) -> Result<usize, ParseError> {
        content_length(&self.headers)
    }

    pub fn with_body(self, body: Bytes) -> Request {
        Request {
            method: self.method,
            path: self.path,
            version: self.version,
            headers: self.headers,
            body,
        }
    }
}

pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_DELIMITER.len())
        .position(|w| w == HEAD_DELIMITER)
}

pub fn parse_request_head(head: &[u8]) -> Result<RequestHead, ParseError> {
    let (first_line, headers) = split_head(head)?;

    let parts: Vec<&str> = first_line.split_whitespace().collect();
    let [method, path, version] = parts[..] else {
        return Err(ParseError::InvalidRequestLine(first_line.to_string()));
    };

    Ok(RequestHead {
        // EnumString with a default variant never fails
        method: method.parse().unwrap_or(Method::Other(method.to_string())),
        path: path.to_string(),
        version: version.to_string(),
        headers,
    })
}

/// Parses one request out of `buf`. Without `Content-Length` the body is empty.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    let head_end = find_head_end(buf).ok_or(ParseError::Incomplete)?;
    let head = parse_request_head(&buf[..head_end])?;

    let len = head.content_length()?;
    let body = buf[head_end + HEAD_DELIMITER.len()..]
        .get(..len)
        .ok_or(ParseError::Incomplete)?;

    Ok(head.with_body(Bytes::copy_from_slice(body)))
}

/// Returns the response and the number of bytes it took up.
pub fn parse_response(buf: &[u8]) -> Result<(Response, usize), ParseError> {
    let head_end = find_head_end(buf).ok_or(ParseError::Incomplete)?;
    let (status_line, headers) = split_head(&buf[..head_end])?;

    let invalid = || ParseError::InvalidStatusLine(status_line.to_string());
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().ok_or_else(invalid)?;
    let code: u16 = parts
        .next()
        .and_then(|c| c.parse().ok())
        .ok_or_else(invalid)?;
    let status = Status::from_repr(code).ok_or(ParseError::UnknownStatus(code))?;

    let body_start = head_end + HEAD_DELIMITER.len();
    let body_len = content_length(&headers)?;
    let body_end = body_start
        .checked_add(body_len)
        .ok_or_else(|| ParseError::InvalidContentLength(body_len.to_string()))?;
    let bytes = buf
        .get(body_start..body_end)
        .ok_or(ParseError::Incomplete)?;
    let bytes = Bytes::copy_from_slice(bytes);

    let encoding = headers
        .get("Content-Encoding")
        .and_then(|e| e.parse().ok());
    let body = match encoding {
        Some(encoding) => Body::Encoded { encoding, bytes },
        None => Body::Plain(bytes),
    };

    let response = Response {
        version: version.to_string(),
        status,
        headers,
        body,
    };
    Ok((response, body_end))
}

fn split_head(head: &[u8]) -> Result<(&str, Headers), ParseError> {
    let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidUtf8)?;
    let mut lines = head.split("\r\n");
    let first_line = lines.next().unwrap_or_default();

    let mut headers = Headers::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let (k, v) = line
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
        headers.insert(k.trim(), v.trim());
    }

    Ok((first_line, headers))
}

fn content_length(headers: &Headers) -> Result<usize, ParseError> {
    headers
        .get("Content-Length")
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength(v.to_string()))
        })
        .transpose()
        .map(|len| len.unwrap_or(0))
}
