//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Immutable HTTP server configuration, fixed at device creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port; 0 picks a free port.
    pub port: u16,
    /// Attach permissive cross-origin headers to every response.
    pub cors: bool,
    /// Bearer token required on every route, or `None` for open access.
    pub token: Option<String>,
    /// Root directory for the bundled client UI, served as static files.
    /// `None` serves a minimal built-in landing page instead.
    pub www_root: Option<PathBuf>,
    /// Suppress the startup banner.
    pub silent: bool,
    /// Whether to start the HTTP server at all; a disabled device still
    /// records in-process.
    pub enabled: bool,
}

impl ServerConfig {
    /// Normalize the token: an empty string means "no authentication".
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: false,
            token: None,
            www_root: None,
            silent: false,
            enabled: true,
        }
    }
}
