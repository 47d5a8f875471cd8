use crate::http;
use crate::http::handler::{Handler, HandlerFunc};
use crate::http::method::Method;
use crate::http::middleware::compression::CompressionMw;
use crate::http::middleware::{Middleware, Next};
use crate::http::request::{Request, RequestContext};
use crate::http::response::Response;
use anyhow::Context;
use regex::{Captures, Regex};
use std::collections::HashMap;

pub struct Route {
    method: Method,
    regex: Regex,
    pub f: HandlerFunc,
}

pub struct Resolved<'a> {
    pub handler: &'a dyn Handler,
    pub url_vars: HashMap<String, String>,
}

pub struct Router {
    routes: Vec<Route>,
    middlewares: Vec<Box<dyn Middleware>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Router {
        let mut r = Router {
            routes: Vec::new(),
            middlewares: Vec::new(),
        };

        r.add_middleware(Box::new(CompressionMw {}));
        r
    }

    /// Patterns match at the start of the path only.
    pub fn register(&mut self, m: Method, pattern: &str, f: HandlerFunc) -> anyhow::Result<()> {
        let compiled =
            Regex::new(pattern).with_context(|| format!("Invalid route pattern: {}", pattern))?;

        self.routes.push(Route {
            method: m,
            regex: compiled,
            f,
        });
        Ok(())
    }

    pub fn add_middleware(&mut self, m: Box<dyn Middleware>) {
        self.middlewares.push(m);
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Option<Resolved<'_>> {
        self.routes
            .iter()
            .filter(|r| &r.method == method)
            .find_map(|r| {
                r.regex
                    .captures(path)
                    .filter(|c| c.get(0).is_some_and(|m| m.start() == 0))
                    .map(|capt| Resolved {
                        handler: r.f.as_ref(),
                        url_vars: Self::get_url_vars(r, capt),
                    })
            })
    }

    pub fn dispatch(&self, req: &Request) -> anyhow::Result<Response> {
        let resolved = self.resolve(&req.method, &req.path);
        let (handler, vars): (&dyn Handler, _) = match resolved {
            Some(r) => (r.handler, r.url_vars),
            None => (&NotFound as &dyn Handler, HashMap::new()),
        };

        let ctx = RequestContext::from(req, vars);
        let next = Next {
            middlewares: self.middlewares.as_ref(),
            handler,
        };

        next.run(&ctx)
    }

    fn get_url_vars(route: &Route, capt: Captures) -> HashMap<String, String> {
        route
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                capt.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect()
    }
}

struct NotFound;

impl Handler for NotFound {
    fn call(&self, _ctx: &RequestContext) -> anyhow::Result<Response> {
        Ok(http::not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::handler::handler;
    use crate::http::parse::parse_request;
    use crate::http::response::Body;

    fn named(name: &'static str) -> HandlerFunc {
        handler(move |_| Ok(Response::text(name)))
    }

    fn table() -> Router {
        let mut r = Router::new();
        r.register(Method::GET, r"^/$", named("root")).unwrap();
        r.register(Method::GET, r"^/echo/(?<text>.*)$", named("echo")).unwrap();
        r.register(Method::GET, r"/user-agent", named("ua")).unwrap();
        r.register(Method::GET, r"^/files/(?<file>.*)", named("get-file")).unwrap();
        r.register(Method::POST, r"^/files/(?<file>.*)", named("post-file")).unwrap();
        r
    }

    fn body_of(router: &Router, raw: &[u8]) -> Vec<u8> {
        let req = parse_request(raw).unwrap();
        router.dispatch(&req).unwrap().body.as_bytes().to_vec()
    }

    #[test]
    fn resolves_by_method_and_pattern() {
        let r = table();
        assert!(r.resolve(&Method::GET, "/").is_some());
        assert!(r.resolve(&Method::POST, "/").is_none());
        assert!(r.resolve(&Method::GET, "/user-agent").is_some());
        assert!(r.resolve(&Method::GET, "/nope").is_none());
        assert!(r.resolve(&Method::Other("PUT".into()), "/files/a").is_none());
    }

    #[test]
    fn match_must_start_at_path_start() {
        let r = table();
        assert!(r.resolve(&Method::GET, "/x/user-agent").is_none());
        assert!(r.resolve(&Method::GET, "/prefix/echo/abc").is_none());
    }

    #[test]
    fn captures_named_groups() {
        let r = table();
        let resolved = r.resolve(&Method::GET, "/echo/a/b c").unwrap();
        assert_eq!(resolved.url_vars.get("text").map(String::as_str), Some("a/b c"));

        let resolved = r.resolve(&Method::POST, "/files/note.txt").unwrap();
        assert_eq!(resolved.url_vars.get("file").map(String::as_str), Some("note.txt"));
    }

    #[test]
    fn first_registered_wins() {
        let mut r = Router::new();
        r.register(Method::GET, r"^/echo/special$", named("special")).unwrap();
        r.register(Method::GET, r"^/echo/.*$", named("general")).unwrap();

        assert_eq!(body_of(&r, b"GET /echo/special HTTP/1.1\r\n\r\n"), b"special");
        assert_eq!(body_of(&r, b"GET /echo/other HTTP/1.1\r\n\r\n"), b"general");
    }

    #[test]
    fn unmatched_dispatch_is_404() {
        let r = table();
        let req = parse_request(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
        let resp = r.dispatch(&req).unwrap();
        assert_eq!(resp.status, http::status::Status::NotFound);
    }

    #[test]
    fn dispatch_encodes_exactly_once() {
        let r = table();
        let req = parse_request(b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: gzip\r\n\r\n").unwrap();
        let resp = r.dispatch(&req).unwrap();

        let Body::Encoded { bytes, .. } = &resp.body else {
            panic!("body was not encoded");
        };
        let mut decoder = flate2::read::GzDecoder::new(&bytes[..]);
        let mut plain = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut plain).unwrap();
        // a second pass would leave gzip bytes here instead of the handler output
        assert_eq!(plain, b"echo");
    }

    #[test]
    fn rejects_invalid_pattern() {
        let mut r = Router::new();
        assert!(r.register(Method::GET, r"^/(", named("bad")).is_err());
    }
}
