//! # plotd Server Library
//!
//! The concurrent serving layer over the plot-history engine: an axum HTTP
//! surface for state polling, on-demand SVG rendering, page removal, and
//! static asset delivery, plus the explicit device registry the host
//! runtime drives.
//!
//! Shared by the `plotd` binary and the integration tests.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::sync::Arc;

use plotd_core::PlotStore;
use plotd_renderer::SvgRenderer;

pub mod auth;
pub mod config;
pub mod device;
pub mod routes;
pub mod serve;
pub mod token;

pub use config::ServerConfig;
pub use device::{DeviceId, DeviceRegistry, PlotDevice};
pub use serve::{PlotServer, ServerError};
pub use token::random_token;

/// Shared per-request application state.
#[derive(Clone)]
pub struct AppState {
    /// The device's page history.
    pub store: PlotStore,
    /// Renderer shared by all render requests.
    pub renderer: Arc<SvgRenderer>,
    /// Immutable server configuration.
    pub config: Arc<ServerConfig>,
    /// Port actually bound, resolved at startup.
    pub port: u16,
}

impl AppState {
    /// Whether requests must present a bearer token.
    #[must_use]
    pub fn token_required(&self) -> bool {
        self.config.token.is_some()
    }
}
