use crate::http::encoding::{self, Encoding};
use crate::http::middleware::{Middleware, Next};
use crate::http::request::RequestContext;
use crate::http::response::{Body, Response};
use anyhow::Context;
use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use tracing::debug;

pub struct CompressionMw {}

impl Middleware for CompressionMw {
    fn handle(&self, ctx: &RequestContext, next: Next) -> anyhow::Result<Response> {
        let negotiated = ctx.get_header("Accept-Encoding").and_then(encoding::negotiate);

        let mut resp = next.run(ctx)?;
        if let Some(encoding) = negotiated {
            encode(&mut resp, encoding)?;
        }
        Ok(resp)
    }
}

/// Encodes a plain body and fixes up the framing headers. Encoded bodies are left alone.
pub fn encode(resp: &mut Response, encoding: Encoding) -> anyhow::Result<()> {
    let Body::Plain(plain) = &resp.body else {
        return Ok(());
    };

    let bytes = match encoding {
        Encoding::Gzip => gzip(plain).context("Failed to gzip response body")?,
    };
    debug!(
        encoding = %encoding,
        plain = plain.len(),
        encoded = bytes.len(),
        "encoded response body"
    );

    resp.headers
        .insert("Content-Encoding", encoding.to_string());
    resp.headers
        .insert("Content-Length", bytes.len().to_string());
    resp.body = Body::Encoded {
        encoding,
        bytes: Bytes::from(bytes),
    };
    Ok(())
}

fn gzip(content: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    encoder.finish()
}
