//! Page replay into SVG markup.

use std::fmt::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageEncoder;

use plotd_core::{DrawingPrimitive, LineCap, LineJoin, Page, RasterImage, Style, TextStyle};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};

/// Renders recorded pages into SVG documents.
///
/// Holds only the immutable [`RenderConfig`]; a single renderer may be
/// shared freely across request-handling threads.
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    config: RenderConfig,
}

impl SvgRenderer {
    /// Create a renderer with the given configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// The renderer's configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render one page at the given geometry.
    ///
    /// A `width`, `height`, or `pointsize` of zero (or any non-finite
    /// value) falls back to the configured default. Text sizes scale by
    /// `pointsize / page base pointsize`, so a page recorded at 12pt and
    /// rendered at 24pt doubles its text.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Geometry`] if the effective geometry is not
    /// positive, and [`RenderError::Resource`] if a raster primitive cannot
    /// be encoded. Errors never mutate the source page.
    pub fn render(
        &self,
        page: &Page,
        width: f64,
        height: f64,
        pointsize: f64,
    ) -> RenderResult<String> {
        let w = fallback(width, self.config.width);
        let h = fallback(height, self.config.height);
        let ps = fallback(pointsize, self.config.pointsize);
        if w <= 0.0 || h <= 0.0 || ps <= 0.0 {
            return Err(RenderError::Geometry(format!(
                "canvas {w}x{h} at {ps}pt is not renderable"
            )));
        }

        tracing::trace!(
            page = page.id.0,
            primitives = page.len(),
            "rendering page at {w}x{h} {ps}pt"
        );

        let text_scale = if page.style.pointsize > 0.0 {
            ps / page.style.pointsize
        } else {
            1.0
        };

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        );

        let bg = page.style.fill;
        if !bg.is_transparent() {
            let _ = write!(
                svg,
                "<rect width=\"100%\" height=\"100%\" fill=\"{}\"",
                bg.css_hex()
            );
            if let Some(op) = bg.opacity() {
                let _ = write!(svg, " fill-opacity=\"{op}\"");
            }
            svg.push_str("/>");
        }

        // Clip primitives scope everything after them, so the body is a
        // sequence of groups, each opened by the most recent clip rect.
        let mut clip_depth = 0usize;
        for primitive in &page.primitives {
            if let DrawingPrimitive::Clip {
                origin,
                width,
                height,
            } = primitive
            {
                if clip_depth > 0 {
                    svg.push_str("</g>");
                }
                clip_depth += 1;
                let _ = write!(
                    svg,
                    "<clipPath id=\"c{clip_depth}\"><rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\"/></clipPath>",
                    origin.0, origin.1,
                );
                let _ = write!(svg, "<g clip-path=\"url(#c{clip_depth})\">");
            } else {
                render_primitive(&mut svg, primitive, text_scale, &self.config)?;
            }
        }
        if clip_depth > 0 {
            svg.push_str("</g>");
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

/// Substitute a default for zero or non-finite request values.
fn fallback(requested: f64, default: f64) -> f64 {
    if requested.is_finite() && requested != 0.0 {
        requested
    } else {
        default
    }
}

fn render_primitive(
    svg: &mut String,
    primitive: &DrawingPrimitive,
    text_scale: f64,
    config: &RenderConfig,
) -> RenderResult<()> {
    match primitive {
        DrawingPrimitive::Line { from, to, style } => {
            let _ = write!(
                svg,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"",
                from.0, from.1, to.0, to.1,
            );
            write_stroke(svg, style);
            svg.push_str(" fill=\"none\"/>");
        }

        DrawingPrimitive::Polyline { points, style } => {
            svg.push_str("<polyline points=\"");
            write_points(svg, points);
            svg.push('"');
            write_stroke(svg, style);
            svg.push_str(" fill=\"none\"/>");
        }

        DrawingPrimitive::Polygon { points, style } => {
            svg.push_str("<polygon points=\"");
            write_points(svg, points);
            svg.push('"');
            write_stroke(svg, style);
            write_fill(svg, style);
            svg.push_str("/>");
        }

        DrawingPrimitive::Rect {
            origin,
            width,
            height,
            style,
        } => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\"",
                origin.0, origin.1,
            );
            write_stroke(svg, style);
            write_fill(svg, style);
            svg.push_str("/>");
        }

        DrawingPrimitive::Circle {
            center,
            radius,
            style,
        } => {
            let _ = write!(
                svg,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{radius}\"",
                center.0, center.1,
            );
            write_stroke(svg, style);
            write_fill(svg, style);
            svg.push_str("/>");
        }

        DrawingPrimitive::Path {
            subpaths,
            winding,
            style,
        } => {
            svg.push_str("<path d=\"");
            for subpath in subpaths {
                for (i, (x, y)) in subpath.iter().enumerate() {
                    let cmd = if i == 0 { 'M' } else { 'L' };
                    let _ = write!(svg, "{cmd}{x},{y} ");
                }
                if !subpath.is_empty() {
                    svg.push_str("Z ");
                }
            }
            let rule = if *winding { "nonzero" } else { "evenodd" };
            let _ = write!(svg, "\" fill-rule=\"{rule}\"");
            write_stroke(svg, style);
            write_fill(svg, style);
            svg.push_str("/>");
        }

        DrawingPrimitive::Text {
            pos,
            content,
            rotation,
            hadj,
            font,
        } => {
            render_text(svg, *pos, content, *rotation, *hadj, font, text_scale, config);
        }

        DrawingPrimitive::Raster {
            image,
            origin,
            width,
            height,
            rotation,
            interpolate,
        } => {
            let data = encode_raster(image)?;
            let _ = write!(
                svg,
                "<image x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\"",
                origin.0, origin.1,
            );
            if !interpolate {
                svg.push_str(" image-rendering=\"pixelated\"");
            }
            if *rotation != 0.0 {
                let _ = write!(
                    svg,
                    " transform=\"rotate({},{},{})\"",
                    -rotation, origin.0, origin.1,
                );
            }
            let _ = write!(svg, " href=\"data:image/png;base64,{data}\"/>");
        }

        // Handled by the caller; a clip starts a new group.
        DrawingPrimitive::Clip { .. } => {}
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn render_text(
    svg: &mut String,
    pos: (f64, f64),
    content: &str,
    rotation: f64,
    hadj: f64,
    font: &TextStyle,
    text_scale: f64,
    config: &RenderConfig,
) {
    let size = font.size * text_scale;
    let family = config.resolve_family(&font.family);
    let _ = write!(
        svg,
        "<text x=\"{}\" y=\"{}\" font-size=\"{size}\" font-family=\"{}\" fill=\"{}\"",
        pos.0,
        pos.1,
        escape_xml(family),
        font.color.css_hex(),
    );
    if let Some(op) = font.color.opacity() {
        let _ = write!(svg, " fill-opacity=\"{op}\"");
    }
    if font.bold {
        svg.push_str(" font-weight=\"bold\"");
    }
    if font.italic {
        svg.push_str(" font-style=\"italic\"");
    }
    let anchor = if hadj >= 0.75 {
        Some("end")
    } else if hadj >= 0.25 {
        Some("middle")
    } else {
        None
    };
    if let Some(anchor) = anchor {
        let _ = write!(svg, " text-anchor=\"{anchor}\"");
    }
    if rotation != 0.0 {
        let _ = write!(svg, " transform=\"rotate({},{},{})\"", -rotation, pos.0, pos.1);
    }
    let _ = write!(svg, ">{}</text>", escape_xml(content));
}

/// Encode captured RGBA pixels as a base64 PNG for embedding.
fn encode_raster(image: &RasterImage) -> RenderResult<String> {
    if !image.is_well_formed() {
        return Err(RenderError::Resource(format!(
            "raster pixel buffer does not match {}x{} RGBA dimensions",
            image.width, image.height
        )));
    }
    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png);
    encoder
        .write_image(
            &image.pixels,
            image.width,
            image.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Resource(format!("PNG encoding failed: {e}")))?;
    Ok(BASE64.encode(png))
}

fn write_points(svg: &mut String, points: &[(f64, f64)]) {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            svg.push(' ');
        }
        let _ = write!(svg, "{x},{y}");
    }
}

fn write_stroke(svg: &mut String, style: &Style) {
    let Some(stroke) = style.stroke.filter(|c| !c.is_transparent()) else {
        svg.push_str(" stroke=\"none\"");
        return;
    };
    let _ = write!(svg, " stroke=\"{}\"", stroke.css_hex());
    if let Some(op) = stroke.opacity() {
        let _ = write!(svg, " stroke-opacity=\"{op}\"");
    }
    if style.line_width != 1.0 {
        let _ = write!(svg, " stroke-width=\"{}\"", style.line_width);
    }
    if !style.dash.is_empty() {
        svg.push_str(" stroke-dasharray=\"");
        for (i, seg) in style.dash.iter().enumerate() {
            if i > 0 {
                svg.push(',');
            }
            let _ = write!(svg, "{seg}");
        }
        svg.push('"');
    }
    if style.cap != LineCap::Butt {
        let _ = write!(svg, " stroke-linecap=\"{}\"", style.cap.as_svg());
    }
    if style.join != LineJoin::Miter {
        let _ = write!(svg, " stroke-linejoin=\"{}\"", style.join.as_svg());
    } else if style.miter_limit != 10.0 {
        let _ = write!(svg, " stroke-miterlimit=\"{}\"", style.miter_limit);
    }
}

fn write_fill(svg: &mut String, style: &Style) {
    match style.fill.filter(|c| !c.is_transparent()) {
        Some(fill) => {
            let _ = write!(svg, " fill=\"{}\"", fill.css_hex());
            if let Some(op) = fill.opacity() {
                let _ = write!(svg, " fill-opacity=\"{op}\"");
            }
        }
        None => svg.push_str(" fill=\"none\""),
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
