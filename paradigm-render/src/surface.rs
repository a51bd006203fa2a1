use ab_glyph::FontArc;
use paradigm_core::{
    Drawable, ImageFrame, MarkerStyle, ParadigmError, Result, Rgba, ScaleView, Surface, TextItem,
};
use paradigm_timing::{Clock, FrameRecorder, FrameStats, HighPrecisionClock};
use tiny_skia::{
    Color, FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, PixmapRef,
    Rect, Transform,
};
use tracing::{debug, info, warn};

use crate::sink::{Frame, FrameSink};
use crate::text::TextCache;

const LABEL_HEIGHT: f32 = 0.05;
const LABEL_OFFSET: f32 = 0.08;
const DESCRIPTION_OFFSET: f32 = 0.2;
const LINE_PX: f32 = 3.0;
const TICK_PX: f32 = 20.0;

/// CPU surface: draws into a tiny-skia canvas and hands each flipped frame to a sink.
pub struct SkiaSurface<K: FrameSink> {
    width: u32,
    height: u32,
    background: Rgba,
    foreground: Rgba,
    canvas: Pixmap,
    text: Option<TextCache>,
    warned_no_font: bool,
    sink: K,
    clock: HighPrecisionClock,
    frames: FrameRecorder,
    closed: bool,
}

impl<K: FrameSink> SkiaSurface<K> {
    pub fn new(
        width: u32,
        height: u32,
        background: Rgba,
        font: Option<FontArc>,
        sink: K,
    ) -> Result<Self> {
        let mut canvas = Pixmap::new(width, height)
            .ok_or_else(|| ParadigmError::Surface(format!("cannot allocate {width}x{height} canvas")))?;
        canvas.fill(color(background));
        Ok(Self {
            width,
            height,
            background,
            foreground: Rgba::white(),
            canvas,
            text: font.map(TextCache::new),
            warned_no_font: false,
            sink,
            clock: HighPrecisionClock::new(),
            frames: FrameRecorder::default(),
            closed: false,
        })
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.frames.stats()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// RGBA8 contents of the frame being drawn.
    pub fn pixels(&self) -> &[u8] {
        self.canvas.data()
    }

    /// Normalized position to pixel coordinates, y flipped.
    fn to_px(&self, (x, y): (f32, f32)) -> (f32, f32) {
        (
            (x + 1.0) * 0.5 * self.width as f32,
            (1.0 - y) * 0.5 * self.height as f32,
        )
    }

    fn to_px_w(&self, w: f32) -> f32 {
        w * 0.5 * self.width as f32
    }

    fn to_px_h(&self, h: f32) -> f32 {
        h * 0.5 * self.height as f32
    }

    fn draw_text(&mut self, item: &TextItem) {
        let size_px = self.to_px_h(item.height);
        let wrap_px = item.wrap_width.map(|w| self.to_px_w(w));
        let (cx, cy) = self.to_px(item.pos);
        let Some(cache) = self.text.as_mut() else {
            if !self.warned_no_font {
                warn!("no font loaded, text will not be rendered");
                self.warned_no_font = true;
            }
            return;
        };
        let pm = cache.get_or_render(&item.text, size_px, wrap_px, item.color.0);
        let x = (cx - pm.width() as f32 * 0.5).round() as i32;
        let y = (cy - pm.height() as f32 * 0.5).round() as i32;
        self.canvas.draw_pixmap(
            x,
            y,
            tiny_skia::Pixmap::as_ref(&pm),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn draw_scale(&mut self, view: &ScaleView<'_>) {
        let (cx, cy) = self.to_px(view.pos);
        let half = self.to_px_w((0.35 * view.stretch).min(0.95));
        let span = (view.high - view.low).max(1) as f32;
        let x_of = |value: i32| cx - half + (value - view.low) as f32 / span * 2.0 * half;
        let fg = self.foreground;

        if let Some(line) = Rect::from_xywh(cx - half, cy - LINE_PX * 0.5, 2.0 * half, LINE_PX) {
            self.canvas
                .fill_rect(line, &paint(fg), Transform::identity(), None);
        }
        for &tick in view.ticks {
            let x = x_of(tick);
            if let Some(r) = Rect::from_xywh(x - 1.0, cy - TICK_PX * 0.5, 2.0, TICK_PX) {
                self.canvas.fill_rect(r, &paint(fg), Transform::identity(), None);
            }
            let label_x = (x / self.width as f32) * 2.0 - 1.0;
            let label = TextItem::new(tick.to_string())
                .at((label_x, view.pos.1 - LABEL_OFFSET))
                .height(LABEL_HEIGHT);
            self.draw_text(&label);
        }

        let mx = x_of(view.marker.clamp(view.low, view.high));
        if let Some(marker) = marker_path(view.marker_style, mx, cy) {
            self.canvas.fill_path(
                &marker,
                &paint(view.marker_color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        if !view.description.is_empty() {
            let description = TextItem::new(view.description)
                .at((view.pos.0, view.pos.1 - DESCRIPTION_OFFSET))
                .height(LABEL_HEIGHT)
                .wrap(2.0 * (0.35 * view.stretch).min(0.95));
            self.draw_text(&description);
        }
    }

    fn draw_image(&mut self, frame: &ImageFrame) -> Result<()> {
        let expected = frame.width as usize * frame.height as usize * 4;
        if frame.rgba.len() != expected {
            return Err(ParadigmError::Surface(format!(
                "image frame is {} bytes, expected {expected} for {}x{}",
                frame.rgba.len(),
                frame.width,
                frame.height
            )));
        }
        let src = PixmapRef::from_bytes(&frame.rgba, frame.width, frame.height)
            .ok_or_else(|| ParadigmError::Surface("empty image frame".into()))?;

        let (cx, cy) = self.to_px(frame.pos);
        let (w, h) = (self.to_px_w(frame.size.0), self.to_px_h(frame.size.1));
        let sx = w / frame.width as f32;
        let sy = h / frame.height as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, cx - w * 0.5, cy - h * 0.5);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.canvas.draw_pixmap(0, 0, src, &paint, transform, None);
        Ok(())
    }
}

impl<K: FrameSink> Surface for SkiaSurface<K> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&mut self, drawable: &Drawable<'_>) -> Result<()> {
        if self.closed {
            return Err(ParadigmError::Surface("draw on a closed surface".into()));
        }
        match drawable {
            Drawable::Text(item) => self.draw_text(item),
            Drawable::RatingScale(view) => self.draw_scale(view),
            Drawable::Image(frame) => self.draw_image(frame)?,
        }
        Ok(())
    }

    fn flip(&mut self) -> Result<()> {
        if self.closed {
            return Err(ParadigmError::Surface("flip on a closed surface".into()));
        }
        self.frames.mark(self.clock.now());
        self.sink.present(Frame {
            width: self.width,
            height: self.height,
            rgba: self.canvas.data(),
        })?;
        self.canvas.fill(color(self.background));
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            debug!("surface already closed");
            return;
        }
        self.closed = true;
        let stats = self.frame_stats();
        info!(
            frames = stats.frames,
            avg_ms = stats.average_frame_time_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            fps = stats.effective_fps,
            "surface closed"
        );
        self.sink.close();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

fn color(c: Rgba) -> Color {
    let [r, g, b, a] = c.0;
    Color::from_rgba8(r, g, b, a)
}

fn paint(c: Rgba) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color(color(c));
    p.anti_alias = true;
    p
}

fn marker_path(style: MarkerStyle, x: f32, y: f32) -> Option<Path> {
    match style {
        MarkerStyle::Triangle => {
            let mut pb = PathBuilder::new();
            pb.move_to(x, y - 4.0);
            pb.line_to(x - 10.0, y - 24.0);
            pb.line_to(x + 10.0, y - 24.0);
            pb.close();
            pb.finish()
        }
        MarkerStyle::Circle => PathBuilder::from_circle(x, y, 10.0),
        MarkerStyle::Slider => Rect::from_xywh(x - 4.0, y - 16.0, 8.0, 32.0).map(PathBuilder::from_rect),
    }
}
