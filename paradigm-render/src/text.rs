use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use anyhow::{Context, Result};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

pub fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    FontArc::try_from_vec(bytes).with_context(|| format!("parsing font {}", path.display()))
}

/// First well-known sans font present on this machine.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

#[derive(Hash, Eq, PartialEq, Clone)]
struct TextKey {
    text: String,
    size_bits: u32,
    wrap_bits: Option<u32>,
    color: [u8; 4],
}

/// Rasterized text keyed by content, size, wrap width and color.
pub struct TextCache {
    font: FontArc,
    map: HashMap<TextKey, Arc<Pixmap>>,
}

impl TextCache {
    pub fn new(font: FontArc) -> Self {
        Self {
            font,
            map: HashMap::new(),
        }
    }

    pub fn get_or_render(
        &mut self,
        text: &str,
        size_px: f32,
        wrap_px: Option<f32>,
        color: [u8; 4],
    ) -> Arc<Pixmap> {
        let key = TextKey {
            text: text.to_string(),
            size_bits: size_px.to_bits(),
            wrap_bits: wrap_px.map(f32::to_bits),
            color,
        };
        if let Some(p) = self.map.get(&key) {
            return Arc::clone(p);
        }
        let [r, g, b, a] = color;
        let pm = Arc::new(render_text_pixmap(
            text,
            size_px,
            &self.font,
            Color::from_rgba8(r, g, b, a),
            wrap_px,
        ));
        self.map.insert(key, Arc::clone(&pm));
        pm
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Splits `text` into lines no wider than `wrap_px`, breaking at spaces and newlines.
fn wrap_lines<F: Font>(text: &str, font: &F, scale: PxScale, wrap_px: Option<f32>) -> Vec<String> {
    let sf = font.as_scaled(scale);
    let width = |s: &str| -> f32 { s.chars().map(|c| sf.h_advance(font.glyph_id(c))).sum() };

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let Some(limit) = wrap_px else {
            lines.push(paragraph.to_string());
            continue;
        };
        let mut line = String::new();
        for word in paragraph.split(' ') {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && width(&candidate) > limit {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

/// Rasterizes centred, optionally wrapped text into a tight transparent pixmap.
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font_size: f32,
    font: &F,
    color: Color,
    wrap_px: Option<f32>,
) -> Pixmap {
    let empty = || Pixmap::new(1, 1).unwrap_or_else(|| unreachable!("1x1 pixmap"));
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);
    let line_height = sf.ascent() - sf.descent() + sf.line_gap();

    // 1) Lay out each line with its baseline at ascent, then centre lines on the widest
    let lines = wrap_lines(text, font, scale, wrap_px);
    let mut laid_out: Vec<(f32, Vec<Glyph>)> = Vec::with_capacity(lines.len());
    for (row, line) in lines.iter().enumerate() {
        let mut pen_x = 0.0f32;
        let baseline = sf.ascent() + row as f32 * line_height;
        let mut glyphs = Vec::<Glyph>::new();
        for ch in line.chars() {
            let id = font.glyph_id(ch);
            if let Some(prev) = glyphs.last() {
                pen_x += sf.kern(prev.id, id);
            }
            glyphs.push(Glyph {
                id,
                scale,
                position: point(pen_x, baseline),
            });
            pen_x += sf.h_advance(id);
        }
        laid_out.push((pen_x, glyphs));
    }
    let widest = laid_out.iter().map(|(w, _)| *w).fold(0.0f32, f32::max);
    let glyphs: Vec<Glyph> = laid_out
        .into_iter()
        .flat_map(|(w, glyphs)| {
            let shift = (widest - w) / 2.0;
            glyphs.into_iter().map(move |mut g| {
                g.position.x += shift;
                g
            })
        })
        .collect();

    // 2) Union pixel bounds from outlined glyphs
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for g in &glyphs {
        if let Some(out) = font.outline_glyph(g.clone()) {
            let b = out.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }
    }
    if min_x == f32::INFINITY {
        return empty();
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let Some(mut pm) = Pixmap::new(w, h) else {
        return empty();
    };

    // 3) Rasterize with premultiplied alpha blending
    let stride = pm.width() as usize;
    let dst = pm.pixels_mut();
    let cu = [
        (color.red() * 255.0) as u8,
        (color.green() * 255.0) as u8,
        (color.blue() * 255.0) as u8,
        (color.alpha() * 255.0) as u8,
    ];

    for g in &glyphs {
        let Some(out) = font.outline_glyph(g.clone()) else {
            continue;
        };
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let i = iy as usize * stride + ix as usize;
            if i >= dst.len() {
                return;
            }

            let a_lin = (cov * cu[3] as f32 / 255.0).clamp(0.0, 1.0);
            let sa = (a_lin * 255.0) as u8;
            let bg = dst[i];

            // Porter-Duff over in premultiplied space: out = src + bg * (1 - src.a)
            let inv = 1.0 - (sa as f32 / 255.0);
            let over = |s: u8, d: u8| ((s as f32 * a_lin) as u8).saturating_add((d as f32 * inv) as u8);
            let a = sa.saturating_add((bg.alpha() as f32 * inv) as u8);
            let px = PremultipliedColorU8::from_rgba(
                over(cu[0], bg.red()).min(a),
                over(cu[1], bg.green()).min(a),
                over(cu[2], bg.blue()).min(a),
                a,
            );
            if let Some(px) = px {
                dst[i] = px;
            }
        });
    }

    pm
}
