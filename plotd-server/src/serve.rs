//! Router assembly and server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use plotd_core::PlotStore;
use plotd_renderer::SvgRenderer;

use crate::{auth, routes, AppState, ServerConfig};

/// How long shutdown waits for in-flight requests before force-closing.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Errors that can occur starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The requested listen address could not be acquired. The device
    /// itself remains usable for in-process recording.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Build the full route tree for one device.
///
/// Layer order matters: authentication wraps the routes, CORS wraps
/// authentication (so even a `401` carries cross-origin headers when CORS
/// is enabled), and request tracing wraps everything.
pub fn build_router(app: AppState) -> Router {
    let router = Router::new()
        .route("/state", get(routes::state))
        .route("/plot", delete(routes::clear_plots))
        .route(
            "/plot/{selector}",
            get(routes::plot_svg).delete(routes::delete_plot),
        );

    let router = match &app.config.www_root {
        Some(root) => router.fallback_service(ServeDir::new(root)),
        None => router.route("/", get(routes::index)),
    };

    let router = router.layer(middleware::from_fn_with_state(
        app.clone(),
        auth::require_bearer,
    ));
    let router = if app.config.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(app)
}

/// A running HTTP server for one device.
///
/// The server owns no long-lived background work beyond its accept loop;
/// dropping the device shuts it down through [`PlotServer::shutdown`].
pub struct PlotServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl PlotServer {
    /// Bind the configured address and start serving the given store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the host/port cannot be acquired.
    pub async fn bind(
        config: ServerConfig,
        store: PlotStore,
        renderer: SvgRenderer,
    ) -> Result<Self, ServerError> {
        let requested = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&requested)
            .await
            .map_err(|source| ServerError::Bind {
                addr: requested.clone(),
                source,
            })?;
        let addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind {
                addr: requested,
                source,
            })?;

        let app = AppState {
            store,
            renderer: Arc::new(renderer),
            config: Arc::new(config),
            port: addr.port(),
        };
        let silent = app.config.silent;
        let router = build_router(app);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!("server error: {e}");
            }
        });

        if !silent {
            tracing::info!("plotd server listening on http://{addr}");
        }

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle,
        })
    }

    /// The address the server is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The bound port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Drain in-flight requests up to a bounded grace period, then
    /// force-close.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle)
            .await
            .is_err()
        {
            tracing::warn!("shutdown grace period elapsed, aborting server task");
            self.handle.abort();
        }
    }
}
