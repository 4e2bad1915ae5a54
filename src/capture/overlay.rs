use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;

use crate::capture::step::StepInfo;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;

/// Maximum description lines under the title.
pub const MAX_OVERLAY_LINES: usize = 2;
/// Lines longer than this are cut and end in `...`.
pub const MAX_LINE_CHARS: usize = 80;

const BAND_MARGIN: u32 = 10;
const BAND_BOTTOM: u32 = 100;
const BAND_ALPHA: u8 = 180;
const PREFERRED_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Arial",
    "Helvetica",
    "Liberation Sans",
    "Noto Sans",
];

/// The title and wrapped description lines drawn for `info`.
pub fn overlay_lines(info: &StepInfo) -> (String, Vec<String>) {
    let title = format!("Step {}", info.step_number);
    let lines = info
        .description
        .split(". ")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_OVERLAY_LINES)
        .map(truncate_line)
        .collect();
    (title, lines)
}

fn truncate_line(line: &str) -> String {
    if line.chars().count() <= MAX_LINE_CHARS {
        return line.to_owned();
    }
    let mut out: String = line.chars().take(MAX_LINE_CHARS - 3).collect();
    out.push_str("...");
    out
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Composites the step banner onto captured frames.
///
/// Text is laid out as SVG and rasterized with resvg against the system font database; when no
/// usable font exists only the translucent band is drawn.
pub struct OverlayRenderer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let family = PREFERRED_FAMILIES
            .iter()
            .find(|name| {
                db.faces()
                    .any(|f| f.families.iter().any(|(fam, _)| fam.as_str() == **name))
            })
            .map(|s| (*s).to_owned())
            .or_else(|| {
                db.faces()
                    .next()
                    .and_then(|f| f.families.first().map(|(fam, _)| fam.clone()))
            });
        match family {
            Some(family) => {
                tracing::debug!(%family, faces = db.len(), "overlay font selected");
                db.set_sans_serif_family(family);
            }
            None => tracing::warn!("no system fonts found, overlay text will not render"),
        }

        Self {
            fontdb: Arc::new(db),
        }
    }

    fn svg_for(&self, width: u32, height: u32, info: &StepInfo) -> String {
        let (title, lines) = overlay_lines(info);
        let band_w = width.saturating_sub(2 * BAND_MARGIN);
        let band_h = BAND_BOTTOM.min(height).saturating_sub(BAND_MARGIN);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = write!(
            svg,
            r##"<rect x="{BAND_MARGIN}" y="{BAND_MARGIN}" width="{band_w}" height="{band_h}" fill="#000000" fill-opacity="{:.4}"/>"##,
            f64::from(BAND_ALPHA) / 255.0
        );
        let _ = write!(
            svg,
            r##"<text x="20" y="43" font-family="sans-serif" font-size="28" fill="#ffffff">{}</text>"##,
            xml_escape(&title)
        );
        for (i, line) in lines.iter().enumerate() {
            let _ = write!(
                svg,
                r##"<text x="20" y="{}" font-family="sans-serif" font-size="18" fill="#ffffff">{}</text>"##,
                65 + 25 * i,
                xml_escape(line)
            );
        }
        svg.push_str("</svg>");
        svg
    }

    /// Draw the banner for `info` onto `frame`. Does nothing for step 0.
    pub fn composite(&self, frame: &mut image::RgbaImage, info: &StepInfo) -> ReelResult<()> {
        if info.step_number == 0 {
            return Ok(());
        }
        let (w, h) = frame.dimensions();
        if w == 0 || h == 0 {
            return Ok(());
        }

        let svg = self.svg_for(w, h, info);
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse overlay svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| ReelError::validation("failed to allocate overlay pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        composite_premul_over(&mut **frame, pixmap.data())
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Source-over of premultiplied `src` onto straight-alpha `dst`, in place.
pub(crate) fn composite_premul_over(dst: &mut [u8], src_premul: &[u8]) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "composite_premul_over expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let sa = u16::from(s[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255 - sa;
        let da = u16::from(d[3]);
        let out_a = sa + mul_div255_u16(da, inv);
        for c in 0..3 {
            let d_premul = mul_div255_u16(u16::from(d[c]), da);
            let premul = u16::from(s[c]) + mul_div255_u16(d_premul, inv);
            d[c] = if out_a == 0 {
                0
            } else {
                ((u32::from(premul) * 255 + u32::from(out_a) / 2) / u32::from(out_a)).min(255) as u8
            };
        }
        d[3] = out_a.min(255) as u8;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/capture/overlay.rs"]
mod tests;
