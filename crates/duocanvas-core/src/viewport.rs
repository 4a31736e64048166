//! Shared pan/zoom value for both environments.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Default lower zoom bound.
pub const DEFAULT_MIN_ZOOM: f64 = 0.05;
/// Default upper zoom bound.
pub const DEFAULT_MAX_ZOOM: f64 = 3.0;

/// Allowed zoom interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ZOOM,
            max: DEFAULT_MAX_ZOOM,
        }
    }
}

impl ZoomRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Finite bounds with `0 < min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }

    /// Clamp a zoom value into the range. An invalid range clamps to the
    /// default bounds instead.
    pub fn clamp(&self, zoom: f64) -> f64 {
        if self.is_valid() {
            zoom.clamp(self.min, self.max)
        } else {
            zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
        }
    }
}

/// The authoritative viewport: a screen-space translation plus a zoom factor.
///
/// `x`/`y` are the screen position of the world origin, matching the
/// convention both rendering surfaces report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    /// Translation component as a vector.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// True when every component is finite and zoom is positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.zoom.is_finite() && self.zoom > 0.0
    }

    /// Copy with zoom clamped into `range`.
    pub fn clamped(mut self, range: ZoomRange) -> Self {
        self.zoom = range.clamp(self.zoom);
        self
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.zoom)
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset())
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Zoom by `factor`, keeping `screen_point` fixed on screen.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64, range: ZoomRange) {
        let new_zoom = range.clamp(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;

        let new_screen = self.world_to_screen(world_point);
        self.x += screen_point.x - new_screen.x;
        self.y += screen_point.y - new_screen.y;
    }

    /// Viewport that centers `bounds` inside a screen of size `screen`,
    /// leaving `padding` pixels on every side.
    pub fn fitted(bounds: Rect, screen: Size, padding: f64, range: ZoomRange) -> Self {
        if bounds.is_zero_area() {
            return Self::default().clamped(range);
        }

        let padded = Size::new(
            (screen.width - padding * 2.0).max(1.0),
            (screen.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        let zoom = range.clamp(scale_x.min(scale_y));

        let bounds_center = bounds.center();
        Self {
            x: screen.width / 2.0 - bounds_center.x * zoom,
            y: screen.height / 2.0 - bounds_center.y * zoom,
            zoom,
        }
    }
}
