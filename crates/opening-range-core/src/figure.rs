// File: crates/opening-range-core/src/figure.rs
// Summary: Range figure: projects one opening range into pixels, paints it and hit-tests it.

use crate::aggregator::RangeRecord;
use crate::calendar::Instrument;
use crate::canvas::Canvas;
use crate::geometry::{clip_segment, Point, Rect, Segment};
use crate::style::{LineStyle, RangeStyle};
use crate::types::{DayKey, HIT_TOLERANCE_PX, LABEL_BASELINE_OFFSET_PX, LABEL_EDGE_GAP_PX};
use crate::view::DrawContext;

/// Drawable capability the host drives: layout on viewport changes, draw on paint,
/// contains on pointer queries.
pub trait Drawable {
    fn layout(&mut self, ctx: &dyn DrawContext);
    fn draw(&self, canvas: &mut dyn Canvas, style: &RangeStyle, instrument: &Instrument);
    fn contains(&self, x: f32, y: f32, style: &RangeStyle) -> bool;
    fn is_visible(&self) -> bool;
}

/// Screen-space result of the last layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub left_x: f32,
    /// Unclipped right edge; labels are anchored here.
    pub right_x: f32,
    pub top_y: f32,
    pub bottom_y: f32,
    /// Clipped to the bounds; None when the line falls outside them.
    pub top_line: Option<Segment>,
    pub bottom_line: Option<Segment>,
    pub fill_rect: Rect,
    pub bounds: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FigureState {
    /// Never laid out.
    Created,
    Visible,
    NotVisible,
}

#[derive(Clone, Debug)]
pub struct RangeFigure {
    record: RangeRecord,
    projection: Option<Projection>,
    laid_out: bool,
    selected: bool,
}

impl RangeFigure {
    pub fn new(record: RangeRecord) -> Self {
        Self { record, projection: None, laid_out: false, selected: false }
    }

    pub fn record(&self) -> &RangeRecord { &self.record }
    pub fn day_key(&self) -> DayKey { self.record.day_key }
    pub fn projection(&self) -> Option<&Projection> { self.projection.as_ref() }

    pub fn extend_lines(&self) -> bool { self.record.extend_to_right }
    pub fn set_extend_lines(&mut self, extend: bool) { self.record.extend_to_right = extend; }

    pub fn is_selected(&self) -> bool { self.selected }
    pub fn set_selected(&mut self, selected: bool) { self.selected = selected; }

    pub fn state(&self) -> FigureState {
        match (self.laid_out, self.projection.is_some()) {
            (false, _) => FigureState::Created,
            (true, true) => FigureState::Visible,
            (true, false) => FigureState::NotVisible,
        }
    }

    fn project(&self, ctx: &dyn DrawContext) -> Option<Projection> {
        let bounds = ctx.bounds()?;
        let (view_start, view_end) = ctx.visible_time_range()?;
        let r = &self.record;
        if view_end < r.day_key.timestamp() || view_start > r.window_end {
            return None;
        }

        let left_x = ctx.time_to_x(r.day_key.timestamp());
        let right_x = if r.extend_to_right { bounds.max_x() } else { ctx.time_to_x(r.window_end) };
        let top_y = ctx.price_to_y(r.high);
        let bottom_y = ctx.price_to_y(r.low);
        if ![left_x, right_x, top_y, bottom_y].iter().all(|v| v.is_finite()) {
            return None;
        }

        let line = |y: f32| clip_segment(Segment::new(Point::new(left_x, y), Point::new(right_x, y)), &bounds);
        Some(Projection {
            left_x,
            right_x,
            top_y,
            bottom_y,
            top_line: line(top_y),
            bottom_line: line(bottom_y),
            fill_rect: Rect::from_ltwh(left_x, top_y, right_x - left_x, bottom_y - top_y),
            bounds,
        })
    }

    fn draw_label(&self, canvas: &mut dyn Canvas, text: &str, line: Segment, p: &Projection, style: &RangeStyle) {
        let w = canvas.measure_text(text, style.labels.size);
        let x = label_x(p.right_x, w, p.bounds.max_x());
        canvas.draw_text(text, x, line.p2.y - LABEL_BASELINE_OFFSET_PX, &style.labels);
    }
}

impl Drawable for RangeFigure {
    fn layout(&mut self, ctx: &dyn DrawContext) {
        self.projection = self.project(ctx);
        self.laid_out = true;
    }

    fn draw(&self, canvas: &mut dyn Canvas, style: &RangeStyle, instrument: &Instrument) {
        let Some(p) = &self.projection else { return };

        if style.fill.enabled {
            canvas.fill_rect(p.fill_rect, style.fill.color);
        }
        let top = p.top_line.filter(|_| style.top_line.enabled);
        let bottom = p.bottom_line.filter(|_| style.bottom_line.enabled);
        if let Some(seg) = top {
            canvas.stroke_line(seg, &style.top_line, style.top_line.stroke_width(self.selected));
        }
        if let Some(seg) = bottom {
            canvas.stroke_line(seg, &style.bottom_line, style.bottom_line.stroke_width(self.selected));
        }

        if !style.labels.enabled { return; }
        if let Some(seg) = top {
            let text = format!("H:{}", instrument.format(self.record.high));
            self.draw_label(canvas, &text, seg, p, style);
        }
        if let Some(seg) = bottom {
            let text = format!("L:{}", instrument.format(self.record.low));
            self.draw_label(canvas, &text, seg, p, style);
        }
    }

    fn contains(&self, x: f32, y: f32, style: &RangeStyle) -> bool {
        let Some(p) = &self.projection else { return false };
        let pt = Point::new(x, y);
        let near = |seg: Option<Segment>, line: &LineStyle| {
            line.enabled && seg.map_or(false, |s| s.distance_to(pt) < HIT_TOLERANCE_PX)
        };
        near(p.top_line, &style.top_line) || near(p.bottom_line, &style.bottom_line)
    }

    fn is_visible(&self) -> bool { self.projection.is_some() }
}

/// Left x for a label right-aligned to `anchor_right`. A label that would cross `max_x`
/// moves left by its overflow plus `LABEL_EDGE_GAP_PX`.
pub fn label_x(anchor_right: f32, width: f32, max_x: f32) -> f32 {
    let x = anchor_right - width;
    let overflow = x + width - max_x;
    if overflow > 0.0 { x - (overflow + LABEL_EDGE_GAP_PX) } else { x }
}
