//! Pages - recorded plotting frames.

use serde::{Deserialize, Serialize};

use crate::primitive::{Color, DrawingPrimitive};

/// Identifier of a page, assigned at creation.
///
/// Identifiers are dense and strictly increasing in creation order and are
/// never reused, even after the page is evicted or removed. The first page
/// of a device gets id 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub u64);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Style state active at the start of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStyle {
    /// Background fill color.
    pub fill: Color,
    /// Base point size for text.
    pub pointsize: f64,
}

impl Default for PageStyle {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            pointsize: 12.0,
        }
    }
}

/// One recorded plotting frame.
///
/// A page is open while the host may still append to it and closed once the
/// host begins a new page or the device is finalized. A closed page's
/// primitive sequence never changes, which is what makes it safe to render
/// concurrently from any number of threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Stable identifier assigned at creation.
    pub id: PageId,
    /// Style state at page start.
    pub style: PageStyle,
    /// Recorded primitives, in draw order.
    pub primitives: Vec<DrawingPrimitive>,
    /// Whether the host may still append.
    pub open: bool,
}

impl Page {
    /// Create a fresh open page.
    #[must_use]
    pub fn new(id: PageId, style: PageStyle) -> Self {
        Self {
            id,
            style,
            primitives: Vec::new(),
            open: true,
        }
    }

    /// Number of recorded primitives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}
