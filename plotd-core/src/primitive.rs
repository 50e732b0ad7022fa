//! Drawing primitives - the atomic instructions captured from the host.
//!
//! A primitive is recorded exactly as the host emitted it and never mutated
//! afterwards; replaying the sequence of a closed page must reproduce the
//! plot byte for byte.

use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Create an opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from RGBA channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether this color draws nothing.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// CSS hex representation of the RGB channels (`#rrggbb`).
    ///
    /// Alpha is emitted separately as an opacity attribute so that fully
    /// opaque colors keep the short form.
    #[must_use]
    pub fn css_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0..=1 opacity value, or `None` when opaque.
    #[must_use]
    pub fn opacity(&self) -> Option<f64> {
        if self.a == 255 {
            None
        } else {
            Some(f64::from(self.a) / 255.0)
        }
    }
}

/// Stroke line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    /// Flat end at the endpoint.
    #[default]
    Butt,
    /// Rounded end.
    Round,
    /// Squared-off end extending past the endpoint.
    Square,
}

impl LineCap {
    /// SVG attribute value.
    #[must_use]
    pub fn as_svg(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Stroke line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    /// Sharp corner.
    #[default]
    Miter,
    /// Rounded corner.
    Round,
    /// Beveled corner.
    Bevel,
}

impl LineJoin {
    /// SVG attribute value.
    #[must_use]
    pub fn as_svg(&self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// Stroke and fill state captured with each primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Stroke color, or `None` for no stroke.
    pub stroke: Option<Color>,
    /// Fill color, or `None` for no fill.
    pub fill: Option<Color>,
    /// Stroke width in user units.
    pub line_width: f64,
    /// Dash pattern lengths, empty for a solid stroke.
    pub dash: Vec<u8>,
    /// Line cap style.
    pub cap: LineCap,
    /// Line join style.
    pub join: LineJoin,
    /// Miter limit, relevant when `join` is [`LineJoin::Miter`].
    pub miter_limit: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Some(Color::BLACK),
            fill: None,
            line_width: 1.0,
            dash: Vec::new(),
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 10.0,
        }
    }
}

/// Font state captured with a text primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f64,
    /// Requested font family; resolved through the render-time alias table.
    pub family: String,
    /// Bold face.
    pub bold: bool,
    /// Italic face.
    pub italic: bool,
    /// Text color.
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            family: String::new(),
            bold: false,
            italic: false,
            color: Color::BLACK,
        }
    }
}

/// Raw raster pixels captured from the host.
///
/// Stored as RGBA8 rows, top to bottom. Encoded into an embedded image only
/// at render time, so recording stays cheap on the host thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterImage {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// RGBA8 pixel data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Whether the pixel buffer length matches the declared dimensions.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(4));
        expected == Some(self.pixels.len())
    }
}

/// One atomic drawing instruction captured from the host.
///
/// Coordinates are in device user units with the origin at the top left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawingPrimitive {
    /// A straight line segment.
    Line {
        /// Start point.
        from: (f64, f64),
        /// End point.
        to: (f64, f64),
        /// Stroke state.
        style: Style,
    },

    /// An open sequence of connected line segments.
    Polyline {
        /// Vertices in draw order.
        points: Vec<(f64, f64)>,
        /// Stroke state.
        style: Style,
    },

    /// A closed polygon.
    Polygon {
        /// Vertices in draw order; the shape is implicitly closed.
        points: Vec<(f64, f64)>,
        /// Stroke and fill state.
        style: Style,
    },

    /// An axis-aligned rectangle.
    Rect {
        /// Top-left corner.
        origin: (f64, f64),
        /// Width in user units.
        width: f64,
        /// Height in user units.
        height: f64,
        /// Stroke and fill state.
        style: Style,
    },

    /// A circle.
    Circle {
        /// Center point.
        center: (f64, f64),
        /// Radius in user units.
        radius: f64,
        /// Stroke and fill state.
        style: Style,
    },

    /// A multi-subpath path.
    Path {
        /// Subpaths, each an ordered list of vertices.
        subpaths: Vec<Vec<(f64, f64)>>,
        /// Fill using the nonzero winding rule instead of even-odd.
        winding: bool,
        /// Stroke and fill state.
        style: Style,
    },

    /// A text run.
    Text {
        /// Anchor position.
        pos: (f64, f64),
        /// Text content.
        content: String,
        /// Rotation around the anchor, degrees counter-clockwise.
        rotation: f64,
        /// Horizontal adjustment: 0 = left, 0.5 = center, 1 = right aligned.
        hadj: f64,
        /// Font state.
        font: TextStyle,
    },

    /// A raster image placed into a target rectangle.
    Raster {
        /// Pixel data.
        image: RasterImage,
        /// Top-left corner of the target rectangle.
        origin: (f64, f64),
        /// Target width in user units.
        width: f64,
        /// Target height in user units.
        height: f64,
        /// Rotation around the origin, degrees counter-clockwise.
        rotation: f64,
        /// Smooth scaling requested by the host.
        interpolate: bool,
    },

    /// Set the clipping region for subsequent primitives.
    Clip {
        /// Top-left corner of the clip rectangle.
        origin: (f64, f64),
        /// Clip width in user units.
        width: f64,
        /// Clip height in user units.
        height: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_css_hex() {
        assert_eq!(Color::rgb(255, 0, 128).css_hex(), "#ff0080");
        assert_eq!(Color::BLACK.css_hex(), "#000000");
    }

    #[test]
    fn color_opacity() {
        assert_eq!(Color::BLACK.opacity(), None);
        let half = Color::rgba(0, 0, 0, 128).opacity().expect("translucent");
        assert!((half - 128.0 / 255.0).abs() < 1e-9);
        assert!(Color::TRANSPARENT.is_transparent());
    }

    #[test]
    fn raster_well_formed() {
        let img = RasterImage {
            width: 2,
            height: 2,
            pixels: vec![0; 16],
        };
        assert!(img.is_well_formed());

        let bad = RasterImage {
            width: 2,
            height: 2,
            pixels: vec![0; 15],
        };
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn primitive_serializes_tagged() {
        let prim = DrawingPrimitive::Line {
            from: (0.0, 0.0),
            to: (10.0, 10.0),
            style: Style::default(),
        };
        let json = serde_json::to_string(&prim).expect("serialize");
        assert!(json.contains("\"type\":\"line\""));
    }
}
