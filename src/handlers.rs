//! Endpoints served by the binary.
//!
//! File paths come straight from the URL and are joined onto the target directory
//! without any sanitizing, so `..` segments can reach outside of it.

use crate::http::handler::handler;
use crate::http::headers::Headers;
use crate::http::method::Method;
use crate::http::request::RequestContext;
use crate::http::response::Response;
use crate::http::router::Router;
use crate::http::status::Status;
use crate::http::{created, not_found, ok};
use anyhow::{Context, anyhow};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub fn routes(dir: PathBuf) -> anyhow::Result<Router> {
    let dir = Arc::new(dir);
    let mut router = Router::new();

    router.register(Method::GET, r"^/$", handler(index))?;
    router.register(Method::GET, r"^/echo/(?<text>.*)$", handler(echo))?;
    router.register(Method::GET, r"^/user-agent$", handler(user_agent))?;

    let dir_clone = Arc::clone(&dir);
    router.register(
        Method::GET,
        r"^/files/(?<file>.*)",
        handler(move |r| get_file(r, &dir_clone)),
    )?;

    let dir_clone = Arc::clone(&dir);
    router.register(
        Method::POST,
        r"^/files/(?<file>.*)",
        handler(move |r| post_file(r, &dir_clone)),
    )?;

    Ok(router)
}

fn index(_r: &RequestContext) -> anyhow::Result<Response> {
    Ok(ok())
}

fn echo(r: &RequestContext) -> anyhow::Result<Response> {
    let s = r.get_var("text").unwrap_or_default();
    Ok(Response::text(s.to_string()))
}

fn user_agent(r: &RequestContext) -> anyhow::Result<Response> {
    let agent = r.get_header("User-Agent").unwrap_or_default();
    Ok(Response::text(agent.to_string()))
}

fn file_path(r: &RequestContext, dir: &Path) -> anyhow::Result<PathBuf> {
    let file_name = r
        .get_var("file")
        .ok_or(anyhow!("Route did not capture a file name"))?;
    Ok(dir.join(file_name))
}

fn get_file(r: &RequestContext, dir: &Path) -> anyhow::Result<Response> {
    let path = file_path(r, dir)?;

    let size = match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => return Ok(not_found()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no such file");
            return Ok(not_found());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Can't stat {}", path.display()));
        }
    };

    // the declared length is the size seen here, even if the file changes before the read
    let content = fs::read(&path).with_context(|| format!("Can't read {}", path.display()))?;
    let headers: Headers = [
        ("Content-Type", "application/octet-stream".to_string()),
        ("Content-Length", size.to_string()),
    ]
    .into_iter()
    .collect();

    Ok(Response::from_parts(Status::Ok, headers, content))
}

fn post_file(r: &RequestContext, dir: &Path) -> anyhow::Result<Response> {
    let path = file_path(r, dir)?;

    fs::write(&path, &r.request().body)
        .with_context(|| format!("Can't write {}", path.display()))?;
    debug!(path = %path.display(), bytes = r.request().body.len(), "stored file");

    Ok(created())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::parse::parse_request;
    use crate::http::response::Body;

    fn call(router: &Router, raw: &[u8]) -> Response {
        router.dispatch(&parse_request(raw).unwrap()).unwrap()
    }

    #[test]
    fn index_is_empty_ok() {
        let dir = tempfile::tempdir().unwrap();
        let router = routes(dir.path().to_path_buf()).unwrap();

        let resp = call(&router, b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(resp.status, Status::Ok);
        assert!(resp.body.is_empty());
        assert_eq!(resp.headers.get("Content-Length"), Some("0"));
    }

    #[test]
    fn echo_and_user_agent() {
        let dir = tempfile::tempdir().unwrap();
        let router = routes(dir.path().to_path_buf()).unwrap();

        let resp = call(&router, b"GET /echo/abc HTTP/1.1\r\n\r\n");
        assert_eq!(resp.body, Body::Plain("abc".into()));
        assert_eq!(resp.headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(resp.headers.get("Content-Length"), Some("3"));

        let resp = call(
            &router,
            b"GET /user-agent HTTP/1.1\r\nUser-Agent: foobar/1.2.3\r\n\r\n",
        );
        assert_eq!(resp.body.as_bytes(), b"foobar/1.2.3");
        assert_eq!(resp.headers.get("Content-Length"), Some("12"));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let router = routes(dir.path().to_path_buf()).unwrap();

        let resp = call(
            &router,
            b"POST /files/note.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
        );
        assert_eq!(resp.status, Status::Created);
        assert_eq!(fs::read(dir.path().join("note.txt")).unwrap(), b"hello");

        let resp = call(&router, b"GET /files/note.txt HTTP/1.1\r\n\r\n");
        assert_eq!(resp.status, Status::Ok);
        assert_eq!(resp.body.as_bytes(), b"hello");
        assert_eq!(
            resp.headers.get("Content-Type"),
            Some("application/octet-stream")
        );
        assert_eq!(resp.headers.get("Content-Length"), Some("5"));
    }

    #[test]
    fn post_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "previous content").unwrap();
        let router = routes(dir.path().to_path_buf()).unwrap();

        call(&router, b"POST /files/a HTTP/1.1\r\nContent-Length: 3\r\n\r\nnew");
        assert_eq!(fs::read(dir.path().join("a")).unwrap(), b"new");
    }

    #[test]
    fn missing_file_or_directory_is_404() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let router = routes(dir.path().to_path_buf()).unwrap();

        let resp = call(&router, b"GET /files/missing.txt HTTP/1.1\r\n\r\n");
        assert_eq!(resp.status, Status::NotFound);

        let resp = call(&router, b"GET /files/sub HTTP/1.1\r\n\r\n");
        assert_eq!(resp.status, Status::NotFound);
    }

    #[test]
    fn write_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let router = routes(dir.path().to_path_buf()).unwrap();

        let req = parse_request(b"POST /files/no/such/dir.txt HTTP/1.1\r\n\r\n").unwrap();
        assert!(router.dispatch(&req).is_err());
    }
}
