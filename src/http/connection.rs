use crate::http::BUFFER_SIZE;
use crate::http::parse::{
    HEAD_DELIMITER, ParseError, RequestHead, find_head_end, parse_request_head,
};
use crate::http::request::Request;
use crate::http::response::serialize_response;
use crate::http::router::Router;
use anyhow::Context;
use bytes::BytesMut;
use std::io::{ErrorKind, Read, Write};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("peer closed the connection inside a request head ({0} bytes buffered)")]
    ClosedInHead(usize),
    #[error("peer closed the connection after {received} of {expected} body bytes")]
    ClosedInBody { received: usize, expected: usize },
}

enum State {
    AwaitingHeaders,
    AwaitingBody {
        head: RequestHead,
        body_start: usize,
        body_end: usize,
    },
    Ready(Request),
    Dispatched {
        close: bool,
    },
    Closed,
}

/// One client socket. Bytes past the end of a request stay buffered for the next one.
pub struct Connection<'r, S> {
    stream: S,
    router: &'r Router,
    buffer: BytesMut,
    state: State,
}

impl<'r, S: Read + Write> Connection<'r, S> {
    pub fn new(stream: S, router: &'r Router) -> Self {
        Self {
            stream,
            router,
            buffer: BytesMut::with_capacity(BUFFER_SIZE * 4),
            state: State::AwaitingHeaders,
        }
    }

    /// Serves requests until the peer hangs up or sends `Connection: close`.
    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, State::Closed) {
                State::AwaitingHeaders => match find_head_end(&self.buffer) {
                    Some(head_end) => {
                        let head = parse_request_head(&self.buffer[..head_end])?;
                        let content_length = head.content_length()?;
                        let body_start = head_end + HEAD_DELIMITER.len();
                        let body_end = body_start.checked_add(content_length).ok_or_else(|| {
                            ParseError::InvalidContentLength(content_length.to_string())
                        })?;
                        State::AwaitingBody {
                            head,
                            body_start,
                            body_end,
                        }
                    }
                    None if self.fill()? > 0 => State::AwaitingHeaders,
                    None if self.buffer.is_empty() => {
                        debug!("peer closed the connection");
                        State::Closed
                    }
                    None => return Err(ConnectionError::ClosedInHead(self.buffer.len()).into()),
                },

                State::AwaitingBody {
                    head,
                    body_start,
                    body_end,
                } => {
                    if self.buffer.len() >= body_end {
                        let mut message = self.buffer.split_to(body_end);
                        let body = message.split_off(body_start).freeze();
                        State::Ready(head.with_body(body))
                    } else if self.fill()? > 0 {
                        State::AwaitingBody {
                            head,
                            body_start,
                            body_end,
                        }
                    } else {
                        return Err(ConnectionError::ClosedInBody {
                            received: self.buffer.len() - body_start,
                            expected: body_end - body_start,
                        }
                        .into());
                    }
                }

                State::Ready(req) => {
                    let close = req.wants_close();
                    let mut resp = self.router.dispatch(&req)?;
                    if close {
                        resp.headers.insert("Connection", "close");
                    }
                    info!(
                        method = %req.method,
                        path = %req.path,
                        status = resp.status.code(),
                        "handled request"
                    );

                    self.stream
                        .write_all(&serialize_response(&resp))
                        .context("Failed to write response")?;
                    self.stream.flush().context("Failed to flush response")?;
                    State::Dispatched { close }
                }

                State::Dispatched { close: true } => {
                    debug!("closing connection on client request");
                    State::Closed
                }
                State::Dispatched { close: false } => State::AwaitingHeaders,

                State::Closed => return Ok(()),
            };
        }
    }

    fn fill(&mut self) -> anyhow::Result<usize> {
        let mut chunk = [0u8; BUFFER_SIZE];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(n) => {
                    self.buffer.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("Error while reading from socket"),
            }
        }
    }
}
