//! Device handles and the process-wide device registry.
//!
//! The host runtime addresses devices through opaque [`DeviceId`]s. The
//! registry is explicit state with a documented lifecycle: an entry is
//! created on device construction, validated on every lookup, and torn
//! down by [`DeviceRegistry::shutdown`]. No API reads ambient globals.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use plotd_core::{PageStyle, PlotStore, Recorder, StateSnapshot};
use plotd_renderer::{RenderConfig, SvgRenderer};

use crate::serve::{PlotServer, ServerError};
use crate::ServerConfig;

/// Opaque identifier of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One plotting device: its page history, recorder, renderer, and the
/// optionally running HTTP server.
pub struct PlotDevice {
    id: DeviceId,
    store: PlotStore,
    recorder: Recorder,
    renderer: SvgRenderer,
    config: Arc<ServerConfig>,
    server: Mutex<Option<PlotServer>>,
}

impl PlotDevice {
    fn new(
        id: DeviceId,
        server_config: ServerConfig,
        render_config: RenderConfig,
        history_limit: usize,
    ) -> Self {
        let base_style = PageStyle {
            fill: render_config.background,
            pointsize: render_config.pointsize,
        };
        let store = PlotStore::with_base_style(history_limit, base_style);
        Self {
            id,
            recorder: Recorder::new(store.clone()),
            renderer: SvgRenderer::new(render_config),
            store,
            config: Arc::new(server_config),
            server: Mutex::new(None),
        }
    }

    /// This device's registry identifier.
    #[must_use]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// The device's page history.
    #[must_use]
    pub fn store(&self) -> &PlotStore {
        &self.store
    }

    /// The host-facing recorder.
    #[must_use]
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// The device's renderer.
    #[must_use]
    pub fn renderer(&self) -> &SvgRenderer {
        &self.renderer
    }

    /// The immutable server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Current status snapshot.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.store.snapshot()
    }

    /// Start serving this device over HTTP.
    ///
    /// Returns `Ok(None)` when serving is disabled by configuration, and
    /// the already-bound address when the server is running. A bind
    /// failure leaves the device usable for in-process recording.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the configured address cannot be
    /// acquired.
    pub async fn start_server(&self) -> Result<Option<SocketAddr>, ServerError> {
        let mut guard = self.server.lock().await;
        if !self.config.enabled {
            return Ok(None);
        }
        if let Some(server) = guard.as_ref() {
            return Ok(Some(server.addr()));
        }
        let server = PlotServer::bind(
            (*self.config).clone(),
            self.store.clone(),
            self.renderer.clone(),
        )
        .await?;
        let addr = server.addr();
        *guard = Some(server);
        Ok(Some(addr))
    }

    /// The address the device is currently served on, if any.
    pub async fn server_addr(&self) -> Option<SocketAddr> {
        self.server.lock().await.as_ref().map(PlotServer::addr)
    }

    /// Stop serving, draining in-flight requests.
    pub async fn stop_server(&self) {
        if let Some(server) = self.server.lock().await.take() {
            server.shutdown().await;
        }
    }
}

/// Process-wide table of live devices.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: RwLock<HashMap<DeviceId, Arc<PlotDevice>>>,
    next_id: AtomicU64,
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct and register a new device.
    pub fn create(
        &self,
        server_config: ServerConfig,
        render_config: RenderConfig,
        history_limit: usize,
    ) -> Arc<PlotDevice> {
        let id = DeviceId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let device = Arc::new(PlotDevice::new(
            id,
            server_config,
            render_config,
            history_limit,
        ));
        self.write().insert(id, Arc::clone(&device));
        tracing::debug!(device = %id, "registered device");
        device
    }

    /// Look up a device, validating the identifier.
    #[must_use]
    pub fn get(&self, id: DeviceId) -> Option<Arc<PlotDevice>> {
        self.read().get(&id).cloned()
    }

    /// Mark one device as the host's active plotting target and all
    /// others as inactive.
    pub fn set_active(&self, id: DeviceId) {
        for (device_id, device) in self.read().iter() {
            device.store().set_active(*device_id == id);
        }
    }

    /// Stop and deregister a device.
    ///
    /// Returns whether the identifier was registered.
    pub async fn shutdown(&self, id: DeviceId) -> bool {
        let removed = self.write().remove(&id);
        match removed {
            Some(device) => {
                device.store().close();
                device.stop_server().await;
                tracing::debug!(device = %id, "shut down device");
                true
            }
            None => false,
        }
    }

    /// Identifiers of all registered devices.
    #[must_use]
    pub fn ids(&self) -> Vec<DeviceId> {
        let mut ids: Vec<_> = self.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<DeviceId, Arc<PlotDevice>>> {
        self.devices
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<DeviceId, Arc<PlotDevice>>> {
        self.devices
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
