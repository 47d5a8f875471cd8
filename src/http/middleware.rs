use crate::http::handler::Handler;
use crate::http::request::RequestContext;
use crate::http::response::Response;

pub mod compression;

pub trait Middleware: Send + Sync {
    fn handle(&self, ctx: &RequestContext, next: Next) -> anyhow::Result<Response>;
}

pub struct Next<'a> {
    pub(crate) middlewares: &'a [Box<dyn Middleware>],
    pub(crate) handler: &'a dyn Handler,
}

impl Next<'_> {
    pub fn run(self, ctx: &RequestContext) -> anyhow::Result<Response> {
        if let Some((first, rest)) = self.middlewares.split_first() {
            let next = Next {
                middlewares: rest,
                handler: self.handler,
            };
            first.handle(ctx, next)
        } else {
            self.handler.call(ctx)
        }
    }
}
