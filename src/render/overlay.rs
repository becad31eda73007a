use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::{Complex, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::RasterFrame;

/// Frame corner the overlay text is anchored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayCorner {
    /// Top-left.
    TopLeft,
    /// Top-right.
    TopRight,
    /// Bottom-left.
    #[default]
    BottomLeft,
    /// Bottom-right.
    BottomRight,
}

/// What the text overlay shows and where.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Show the zoom factor.
    pub show_zoom: bool,
    /// Show the view center.
    pub show_center: bool,
    /// Show `frame N/M`.
    pub show_frame: bool,
    /// Anchor corner.
    pub corner: OverlayCorner,
    /// Font size in pixels; `0` scales with the frame height.
    pub font_size: f32,
    /// Text color, straight-alpha RGBA8.
    pub color: [u8; 4],
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            show_zoom: true,
            show_center: false,
            show_frame: false,
            corner: OverlayCorner::default(),
            font_size: 0.0,
            color: [255, 255, 255, 230],
        }
    }
}

/// Per-frame values the overlay can display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayInfo {
    /// Zoom factor relative to the reference range.
    pub zoom: f64,
    /// View center.
    pub center: Complex,
    /// Current frame.
    pub frame: FrameIndex,
    /// Frames in the export.
    pub total_frames: u64,
}

/// Draws overlay text onto rendered frames.
///
/// Text is laid out as a small SVG document and rasterized with `resvg` against the system
/// font database, which is loaded once per renderer.
pub struct OverlayRenderer {
    settings: OverlaySettings,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl OverlayRenderer {
    /// Create a renderer for `settings`, loading system fonts.
    pub fn new(settings: OverlaySettings) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded overlay fonts");
        Self {
            settings,
            fontdb: Arc::new(db),
        }
    }

    /// Composite the overlay for `info` onto `frame`.
    pub fn compose(&self, frame: &mut RasterFrame, info: &OverlayInfo) -> ReelResult<()> {
        let lines = overlay_lines(&self.settings, info);
        if lines.is_empty() {
            return Ok(());
        }

        let layout = BandLayout::new(&self.settings, frame.height, lines.len());
        let svg = band_svg(&self.settings, &layout, frame.width, &lines);
        let opts = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse overlay svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(frame.width, layout.height)
            .ok_or_else(|| ReelError::render("failed to allocate overlay pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        composite_band(frame, pixmap.data(), layout.y)
    }
}

/// Text lines for `info`, in display order.
pub(crate) fn overlay_lines(settings: &OverlaySettings, info: &OverlayInfo) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if settings.show_zoom {
        lines.push(format!("zoom {}", format_zoom(info.zoom)));
    }
    if settings.show_center {
        lines.push(format!(
            "center {:.10} {} {:.10}i",
            info.center.real,
            if info.center.imag.is_sign_negative() { '-' } else { '+' },
            info.center.imag.abs()
        ));
    }
    if settings.show_frame {
        lines.push(format!(
            "frame {}/{}",
            info.frame.0 + 1,
            info.total_frames
        ));
    }
    lines
}

pub(crate) fn format_zoom(zoom: f64) -> String {
    if zoom < 10_000.0 {
        format!("{zoom:.1}x")
    } else {
        format!("{zoom:.2e}x")
    }
}

/// Horizontal strip of the frame the text is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BandLayout {
    pub(crate) y: u32,
    pub(crate) height: u32,
    font_size: f32,
    line_height: f32,
    pad: f32,
}

impl BandLayout {
    pub(crate) fn new(settings: &OverlaySettings, height: u32, lines: usize) -> Self {
        let font_size = if settings.font_size > 0.0 {
            settings.font_size
        } else {
            (height as f32 / 36.0).max(12.0)
        };
        let line_height = font_size * 1.3;
        let pad = font_size * 0.6;
        let band = (pad * 2.0 + line_height * lines as f32).ceil() as u32;
        let band = band.clamp(1, height.max(1));
        let y = match settings.corner {
            OverlayCorner::TopLeft | OverlayCorner::TopRight => 0,
            OverlayCorner::BottomLeft | OverlayCorner::BottomRight => height - band,
        };
        Self {
            y,
            height: band,
            font_size,
            line_height,
            pad,
        }
    }
}

fn band_svg(
    settings: &OverlaySettings,
    layout: &BandLayout,
    width: u32,
    lines: &[String],
) -> String {
    let (x, anchor) = match settings.corner {
        OverlayCorner::TopLeft | OverlayCorner::BottomLeft => (layout.pad, "start"),
        OverlayCorner::TopRight | OverlayCorner::BottomRight => (width as f32 - layout.pad, "end"),
    };
    let [r, g, b, a] = settings.color;
    let opacity = f32::from(a) / 255.0;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{h}" viewBox="0 0 {width} {h}">"#,
        h = layout.height
    );
    for (i, line) in lines.iter().enumerate() {
        let y = layout.pad + layout.font_size + layout.line_height * i as f32;
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="sans-serif" font-size="{fs}" text-anchor="{anchor}" fill="rgb({r},{g},{b})" fill-opacity="{opacity}" stroke="black" stroke-opacity="{opacity}" stroke-width="{sw}" paint-order="stroke">{text}</text>"#,
            fs = layout.font_size,
            sw = layout.font_size / 8.0,
            text = escape_xml(line),
        );
    }
    svg.push_str("</svg>");
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Premultiplied source-over of an RGBA8 band onto `frame` starting at row `y`.
pub(crate) fn composite_band(frame: &mut RasterFrame, band: &[u8], y: u32) -> ReelResult<()> {
    let row_bytes = frame.width as usize * 4;
    let start = y as usize * row_bytes;
    let dst = frame
        .data
        .get_mut(start..start + band.len())
        .ok_or_else(|| ReelError::render("overlay band exceeds frame bounds"))?;

    for (d, s) in dst.chunks_exact_mut(4).zip(band.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 0 {
            continue;
        }
        let inv = 255 - a;
        for (dc, &sc) in d.iter_mut().zip(s) {
            let v = u16::from(sc) + mul_div255_u16(u16::from(*dc), inv);
            *dc = v.min(255) as u8;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
