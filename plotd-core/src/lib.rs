//! # plotd Core
//!
//! The plot-history engine behind the plotd server.
//!
//! A single-threaded host (the plotting runtime) feeds drawing primitives
//! into a [`Recorder`], which appends them to the currently open [`Page`]
//! of a [`PlotStore`]. Any number of concurrent readers (HTTP handlers,
//! renderers) take point-in-time snapshots of pages without ever blocking
//! the host for longer than a structural update.
//!
//! ```text
//! host callbacks ──► Recorder ──► PlotStore ──► snapshots ──► renderer / HTTP
//!     (one thread)     (writer)    (RwLock)       (readers, many threads)
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod page;
pub mod primitive;
pub mod recorder;
pub mod store;

pub use error::{PlotError, PlotResult};
pub use page::{Page, PageId, PageStyle};
pub use primitive::{Color, DrawingPrimitive, LineCap, LineJoin, RasterImage, Style, TextStyle};
pub use recorder::Recorder;
pub use store::{PageSelector, PlotStore, StateSnapshot};

/// Core version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
