//! Recorder - the host-facing entry point of the engine.
//!
//! Translates the host runtime's drawing callbacks 1:1 into [`PlotStore`]
//! operations. The recorder owns no state of its own beyond the store
//! handle and never touches the network, so the host's single drawing
//! thread is only ever delayed by the store's in-memory critical sections.

use crate::error::PlotResult;
use crate::page::{PageId, PageStyle};
use crate::primitive::DrawingPrimitive;
use crate::store::PlotStore;

/// Translates host draw callbacks into store mutations.
#[derive(Debug, Clone)]
pub struct Recorder {
    store: PlotStore,
}

impl Recorder {
    /// Create a recorder writing into the given store.
    #[must_use]
    pub fn new(store: PlotStore) -> Self {
        Self { store }
    }

    /// Handle the host's "begin new page" signal.
    pub fn page_begin(&self, style: PageStyle) -> PageId {
        let id = self.store.new_page(style);
        tracing::trace!(page = %id, "page begin");
        id
    }

    /// Handle one primitive-drawing signal.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::NoOpenPage`](crate::PlotError::NoOpenPage) if
    /// the device was finalized. The error is fatal only to this draw
    /// operation; a later "begin new page" signal recovers the device.
    pub fn record(&self, primitive: DrawingPrimitive) -> PlotResult<()> {
        self.store.append(primitive)
    }

    /// Handle the host's "device closing" signal.
    ///
    /// Subsequent [`Recorder::record`] calls fail cleanly instead of
    /// corrupting state.
    pub fn device_close(&self) {
        tracing::debug!("device closing, finalizing plot history");
        self.store.close();
    }

    /// Handle the host's "active device changed" signal.
    pub fn set_active(&self, active: bool) {
        self.store.set_active(active);
    }

    /// The store this recorder writes into.
    #[must_use]
    pub fn store(&self) -> &PlotStore {
        &self.store
    }
}
