//! Test server harness for integration tests.
//!
//! Spins up a real plotd server on a random port so tests can exercise the
//! HTTP surface with a plain `reqwest` client while seeding the store
//! directly through its handle.

use std::net::SocketAddr;

use plotd_core::{PageStyle, PlotStore};
use plotd_renderer::SvgRenderer;
use plotd_server::{PlotServer, ServerConfig};

/// A running test server with control handles.
pub struct TestServer {
    addr: SocketAddr,
    store: PlotStore,
    server: Option<PlotServer>,
}

impl TestServer {
    /// Start a server with default configuration and a roomy history.
    ///
    /// # Panics
    ///
    /// Panics if no port is available or the server fails to bind.
    #[allow(dead_code)]
    pub async fn start() -> Self {
        Self::start_with(ServerConfig::default(), 16).await
    }

    /// Start a server with the given configuration and history limit.
    pub async fn start_with(mut config: ServerConfig, history_limit: usize) -> Self {
        if config.port == 0 {
            config.port = portpicker::pick_unused_port().expect("no available port");
        }
        config.silent = true;

        let store = PlotStore::new(history_limit);
        let server = PlotServer::bind(config, store.clone(), SvgRenderer::default())
            .await
            .expect("failed to bind test server");
        let addr = server.addr();

        Self {
            addr,
            store,
            server: Some(server),
        }
    }

    /// The server's socket address.
    #[allow(dead_code)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Absolute URL for a request path.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The store backing the server, for seeding and assertions.
    pub fn store(&self) -> &PlotStore {
        &self.store
    }

    /// Record `n` fresh pages, returning nothing; callers inspect ids via
    /// the store.
    #[allow(dead_code)]
    pub fn seed_pages(&self, n: usize) {
        for _ in 0..n {
            self.store.new_page(PageStyle::default());
        }
    }

    /// Gracefully shut down the server.
    pub async fn shutdown(mut self) {
        if let Some(server) = self.server.take() {
            server.shutdown().await;
        }
    }
}
