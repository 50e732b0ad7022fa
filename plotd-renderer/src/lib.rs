//! # plotd Renderer
//!
//! Replays a recorded [`Page`](plotd_core::Page) into an SVG document.
//!
//! Rendering is a pure function of the page snapshot, the requested
//! geometry, and the immutable [`RenderConfig`]: the same inputs always
//! produce byte-identical output, so clients can cache by page id plus
//! geometry. No shared state, no locks; safe to call from any number of
//! threads at once.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod svg;

pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use svg::SvgRenderer;
