use crate::http::request::RequestContext;
use crate::http::response::Response;

/// Errors abort the connection that carried the request.
pub trait Handler: Send + Sync {
    fn call(&self, ctx: &RequestContext) -> anyhow::Result<Response>;
}

impl<F> Handler for F
where
    F: Fn(&RequestContext) -> anyhow::Result<Response> + Send + Sync,
{
    fn call(&self, ctx: &RequestContext) -> anyhow::Result<Response> {
        self(ctx)
    }
}

pub type HandlerFunc = Box<dyn Handler>;

pub fn handler<F>(f: F) -> HandlerFunc
where
    F: Fn(&RequestContext) -> anyhow::Result<Response> + Send + Sync + 'static,
{
    Box::new(f)
}
