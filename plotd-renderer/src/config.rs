//! Render configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use plotd_core::Color;

/// Immutable render-time configuration, supplied at device creation.
///
/// Individual render requests may override width, height, and point size;
/// the font-alias table is fixed for the device's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Default canvas width in pixels.
    pub width: f64,
    /// Default canvas height in pixels.
    pub height: f64,
    /// Default base point size for text.
    pub pointsize: f64,
    /// Default page background color.
    pub background: Color,
    /// Maps requested font families to families emitted into the SVG.
    /// Families without an entry pass through unchanged.
    pub font_aliases: HashMap<String, String>,
}

impl RenderConfig {
    /// Resolve a requested font family through the alias table.
    ///
    /// An empty family resolves to a generic sans-serif fallback.
    #[must_use]
    pub fn resolve_family<'a>(&'a self, family: &'a str) -> &'a str {
        if family.is_empty() {
            return "sans-serif";
        }
        self.font_aliases.get(family).map_or(family, String::as_str)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 576.0,
            pointsize: 12.0,
            background: Color::WHITE,
            font_aliases: HashMap::new(),
        }
    }
}
