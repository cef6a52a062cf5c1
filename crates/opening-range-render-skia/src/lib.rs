// File: crates/opening-range-render-skia/src/lib.rs
// Summary: Skia renderer: Canvas implementation plus headless raster rendering of candles
//          and opening range figures to RGBA8 buffers and PNG files.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use skia_safe as skia;

use opening_range_core::geometry::{Rect, Segment};
use opening_range_core::scale::TimeScale;
use opening_range_core::style::{Color, LabelStyle, LineStyle, Theme};
use opening_range_core::{BarSeries, Canvas, DrawContext, Instrument, OpeningRangeStudy, Timestamp, Viewport};

/// Default surface width in pixels.
pub const WIDTH: i32 = 1024;
/// Default surface height in pixels.
pub const HEIGHT: i32 = 640;

/// Screen margins, in pixels. The right margin hosts the price markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Insets {
    fn default() -> Self {
        Self { left: 24, right: 72, top: 24, bottom: 32 }
    }
}

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    pub theme: Theme,
    pub draw_candles: bool,
    /// Time window to show; the whole series when None.
    pub visible: Option<(Timestamp, Timestamp)>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            insets: Insets::default(),
            theme: Theme::dark(),
            draw_candles: true,
            visible: None,
        }
    }
}

impl RenderOptions {
    pub fn plot_rect(&self) -> Rect {
        let i = self.insets;
        Rect::from_ltrb(
            i.left as f32,
            i.top as f32,
            (self.width - i.right as i32) as f32,
            (self.height - i.bottom as i32) as f32,
        )
    }
}

#[inline]
pub fn to_skia(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn default_font(size: f32) -> skia::Font {
    match skia::FontMgr::default().legacy_make_typeface(None, skia::FontStyle::default()) {
        Some(tf) => skia::Font::from_typeface(tf, size),
        None => {
            let mut f = skia::Font::default();
            f.set_size(size);
            f
        }
    }
}

/// `Canvas` over a borrowed Skia canvas.
pub struct SkiaCanvas<'a> {
    canvas: &'a skia::Canvas,
    font: skia::Font,
}

impl<'a> SkiaCanvas<'a> {
    pub fn new(canvas: &'a skia::Canvas) -> Self {
        Self { canvas, font: default_font(11.0) }
    }

    fn font_at(&self, size: f32) -> skia::Font {
        let mut f = self.font.clone();
        f.set_size(size.max(1.0));
        f
    }
}

impl Canvas for SkiaCanvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Fill);
        paint.set_color(to_skia(color));
        // rects may come with a negative height when low maps above high
        let r = skia::Rect::from_ltrb(rect.left, rect.top, rect.right, rect.bottom).sorted();
        self.canvas.draw_rect(r, &paint);
    }

    fn stroke_line(&mut self, seg: Segment, style: &LineStyle, width: f32) {
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Stroke);
        paint.set_stroke_width(width);
        paint.set_color(to_skia(style.color));
        if style.dash.len() >= 2 {
            paint.set_path_effect(skia::PathEffect::dash(&style.dash, 0.0));
        }
        self.canvas.draw_line((seg.p1.x, seg.p1.y), (seg.p2.x, seg.p2.y), &paint);
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        let (advance, _) = self.font_at(size).measure_str(text, None);
        advance
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &LabelStyle) {
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_color(to_skia(style.color));
        self.canvas.draw_str(text, (x, y), &self.font_at(style.size), &paint);
    }
}

/// One chart frame: price bars plus the study's figures.
pub struct Frame<'a> {
    pub study: &'a OpeningRangeStudy,
    pub bars: &'a BarSeries,
    pub instrument: &'a Instrument,
}

impl Frame<'_> {
    /// Viewport for the plot rect: the requested window (price autoscaled to it) or the whole series.
    pub fn viewport(&self, opts: &RenderOptions) -> Viewport {
        let plot = opts.plot_rect();
        let mut vp = Viewport::fit(self.bars, plot);
        if let Some((t0, t1)) = opts.visible {
            vp.time = TimeScale::fit(plot.left, plot.right, t0, t1);
            vp.autoscale_visible(self.bars);
        }
        vp
    }

    /// Render to an RGBA8 (unpremultiplied) buffer. Returns (pixels, width, height, row bytes).
    pub fn render_to_rgba8(&self, opts: &RenderOptions) -> Result<(Vec<u8>, i32, i32, usize)> {
        let mut surface = skia::surfaces::raster_n32_premul((opts.width, opts.height))
            .ok_or_else(|| anyhow::anyhow!("failed to create raster surface"))?;
        self.paint(surface.canvas(), opts);

        let info = skia::ImageInfo::new(
            (opts.width, opts.height),
            skia::ColorType::RGBA8888,
            skia::AlphaType::Unpremul,
            None,
        );
        let stride = opts.width as usize * 4;
        let mut pixels = vec![0u8; stride * opts.height as usize];
        if !surface.read_pixels(&info, &mut pixels, stride, (0, 0)) {
            anyhow::bail!("reading back raster pixels failed");
        }
        Ok((pixels, opts.width, opts.height, stride))
    }

    pub fn render_to_png_bytes(&self, opts: &RenderOptions) -> Result<Vec<u8>> {
        let (pixels, w, h, _) = self.render_to_rgba8(opts)?;
        let img = image::RgbaImage::from_raw(w as u32, h as u32, pixels)
            .ok_or_else(|| anyhow::anyhow!("pixel buffer does not match {w}x{h}"))?;
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).context("encode PNG")?;
        Ok(out.into_inner())
    }

    pub fn render_to_png(&self, opts: &RenderOptions, output_png_path: impl AsRef<Path>) -> Result<()> {
        let path = output_png_path.as_ref();
        let bytes = self.render_to_png_bytes(opts)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        debug!("wrote {}", path.display());
        Ok(())
    }

    fn paint(&self, canvas: &skia::Canvas, opts: &RenderOptions) {
        canvas.clear(to_skia(opts.theme.background));
        let vp = self.viewport(opts);
        let plot = opts.plot_rect();

        // layout pass, then paint clipped to the plot
        self.study.layout_figures(&vp);
        canvas.save();
        canvas.clip_rect(skia::Rect::from_ltrb(plot.left, plot.top, plot.right, plot.bottom), skia::ClipOp::Intersect, true);
        if opts.draw_candles {
            draw_candles(canvas, &vp, self.bars, &opts.theme);
        }
        let mut sk = SkiaCanvas::new(canvas);
        self.study.draw_figures(&mut sk, self.instrument);
        canvas.restore();

        self.draw_markers(&mut sk, &vp, plot);
    }

    /// Price-axis markers for the latest opening high/low.
    fn draw_markers(&self, sk: &mut SkiaCanvas<'_>, vp: &Viewport, plot: Rect) {
        for (_, price, style) in self.study.indicator_markers() {
            let y = vp.price_to_y(price);
            if y < plot.top || y > plot.bottom {
                continue;
            }
            let text = self.instrument.format(price);
            let w = sk.measure_text(&text, 11.0);
            sk.fill_rect(Rect::from_ltwh(plot.right, y - 8.0, w + 8.0, 16.0), style.color);
            let label = LabelStyle { enabled: true, color: Color::rgb(255, 255, 255), size: 11.0 };
            sk.draw_text(&text, plot.right + 4.0, y + 4.0, &label);
        }
    }
}

fn draw_candles(canvas: &skia::Canvas, vp: &Viewport, bars: &BarSeries, theme: &Theme) {
    let Some((t0, t1)) = vp.visible_time_range() else { return };
    let visible: Vec<_> = bars.bars().iter().filter(|b| b.end_time >= t0 && b.start_time <= t1).collect();
    if visible.is_empty() { return; }

    let mut wick = skia::Paint::default();
    wick.set_anti_alias(true);
    wick.set_style(skia::paint::Style::Stroke);
    wick.set_stroke_width(1.0);

    let mut body = skia::Paint::default();
    body.set_anti_alias(true);
    body.set_style(skia::paint::Style::Fill);

    for b in visible {
        let x0 = vp.time_to_x(b.start_time);
        let x1 = vp.time_to_x(b.end_time);
        let x = (x0 + x1) * 0.5;
        let half = ((x1 - x0) * 0.35).max(0.5);
        let (y_o, y_h, y_l, y_c) = (vp.price_to_y(b.open), vp.price_to_y(b.high), vp.price_to_y(b.low), vp.price_to_y(b.close));

        let color = if b.close >= b.open { theme.candle_up } else { theme.candle_down };
        wick.set_color(to_skia(color));
        body.set_color(to_skia(color));

        canvas.draw_line((x, y_h), (x, y_l), &wick);
        let top = y_o.min(y_c);
        let bot = y_o.max(y_c);
        canvas.draw_rect(skia::Rect::from_ltrb(x - half, top, x + half, bot.max(top + 1.0)), &body);
    }
}
