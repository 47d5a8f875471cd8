use crate::concurrency::{Spawner, ThreadPerConnection};
use crate::http::connection::Connection;
use crate::http::router::Router;
use anyhow::Context;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use tracing::{debug, error, info, info_span};

pub struct Server<S: Spawner = ThreadPerConnection> {
    listener: TcpListener,
    router: Arc<Router>,
    spawner: S,
}

impl Server {
    // std sets SO_REUSEADDR on Unix listeners
    pub fn bind(addr: &str, router: Router) -> anyhow::Result<Server> {
        Self::bind_with(addr, router, ThreadPerConnection)
    }
}

impl<S: Spawner> Server<S> {
    pub fn bind_with(addr: &str, router: Router, spawner: S) -> anyhow::Result<Server<S>> {
        let listener =
            TcpListener::bind(addr).with_context(|| format!("Can't bind address {}", addr))?;
        Ok(Server {
            listener,
            router: Arc::new(router),
            spawner,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Listener has no local address")
    }

    pub fn run(self) -> anyhow::Result<()> {
        info!(addr = %self.local_addr()?, "listening");

        for stream in self.listener.incoming() {
            let stream = stream.context("Error accepting connection")?;
            let router = Arc::clone(&self.router);
            self.spawner
                .spawn(move || process_incoming(stream, &router))?;
        }
        Ok(())
    }
}

fn process_incoming(stream: TcpStream, router: &Router) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let span = info_span!("connection", %peer);
    let _guard = span.enter();

    debug!("accepted new connection");
    match Connection::new(stream, router).run() {
        Ok(()) => debug!("connection finished"),
        Err(e) => error!("connection aborted: {:#}", e),
    }
}
