// File: crates/opening-range-core/src/geometry.rs
// Summary: Lightweight geometry helpers for pixel math (rects, segments, clipping, distance).

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }
    pub fn from_ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }
    pub fn width(&self) -> f32 { self.right - self.left }
    pub fn height(&self) -> f32 { self.bottom - self.top }
    pub fn max_x(&self) -> f32 { self.right.max(self.left) }

    /// True when the rect has positive area and finite edges.
    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.right, self.bottom].iter().all(|v| v.is_finite())
            && self.width() > 0.0
            && self.height() > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
}

impl Segment {
    pub const fn new(p1: Point, p2: Point) -> Self { Self { p1, p2 } }

    /// Perpendicular distance from `p` to the segment (clamped to its endpoints).
    pub fn distance_to(&self, p: Point) -> f32 {
        let dx = self.p2.x - self.p1.x;
        let dy = self.p2.y - self.p1.y;
        let len2 = dx * dx + dy * dy;
        let t = if len2 <= f32::EPSILON {
            0.0
        } else {
            clamp(((p.x - self.p1.x) * dx + (p.y - self.p1.y) * dy) / len2, 0.0, 1.0)
        };
        let cx = self.p1.x + t * dx;
        let cy = self.p1.y + t * dy;
        ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
    }
}

/// Clip the segment to `bounds` (Liang-Barsky). None when it lies entirely outside.
pub fn clip_segment(seg: Segment, bounds: &Rect) -> Option<Segment> {
    let (x0, y0) = (seg.p1.x, seg.p1.y);
    let dx = seg.p2.x - x0;
    let dy = seg.p2.y - y0;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let edges = [
        (-dx, x0 - bounds.left),
        (dx, bounds.right - x0),
        (-dy, y0 - bounds.top),
        (dy, bounds.bottom - y0),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 { return None; }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 { return None; }
            if r > t0 { t0 = r; }
        } else {
            if r < t0 { return None; }
            if r < t1 { t1 = r; }
        }
    }
    Some(Segment::new(
        Point::new(x0 + t0 * dx, y0 + t0 * dy),
        Point::new(x0 + t1 * dx, y0 + t1 * dy),
    ))
}

#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}
