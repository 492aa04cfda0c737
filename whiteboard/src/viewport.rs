//! Viewport controller: pan/zoom over the fixed-size logical canvas.
//!
//! The viewport only affects how the canvas is drawn on screen and how pointer
//! positions map back into canvas coordinates. It never touches layer data.
//!
//! `pan_x` / `pan_y` are the screen position (CSS pixels) of the canvas origin.
//! `zoom` is the scale from canvas units to CSS pixels.
//!
//! Two bounds hold after every public operation:
//! - `min_zoom() <= zoom <= max(MAX_ZOOM, min_zoom())`
//! - `pan` lies inside [`clamp_pan`]'s range, so the canvas always covers the container.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{BUTTON_ZOOM_STEP, CANVAS_HEIGHT, CANVAS_WIDTH, MAX_ZOOM, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};

/// A point in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height, in either screen or canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Finite and positive on both axes.
    #[must_use]
    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// The fixed logical canvas size.
    #[must_use]
    pub fn canvas() -> Self {
        Self { width: CANVAS_WIDTH, height: CANVAS_HEIGHT }
    }
}

/// Smallest zoom at which the canvas still covers the container on both axes.
#[must_use]
pub fn compute_min_zoom(container: Size) -> f64 {
    (container.width / CANVAS_WIDTH).max(container.height / CANVAS_HEIGHT)
}

/// Clamp a pan offset so the scaled canvas never leaves part of the container uncovered.
///
/// `pan.x ∈ [container.width - CANVAS_WIDTH * zoom, 0]`, likewise for `y`.
#[must_use]
pub fn clamp_pan(pan: Point, zoom: f64, container: Size) -> Point {
    Point {
        x: clamp_axis(pan.x, container.width - CANVAS_WIDTH * zoom),
        y: clamp_axis(pan.y, container.height - CANVAS_HEIGHT * zoom),
    }
}

// `lower` only exceeds zero when zoom sits below the minimum; pin to zero then.
fn clamp_axis(value: f64, lower: f64) -> f64 {
    value.max(lower).min(0.0)
}

/// Pan/zoom state for the on-screen view of the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    container: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0, container: Size::canvas() }
    }
}

impl Viewport {
    /// Create a viewport for a container of the given CSS size, at 1:1 when allowed.
    ///
    /// A container that is not [drawable](Size::is_drawable) falls back to the canvas size.
    #[must_use]
    pub fn new(container: Size) -> Self {
        let container = if container.is_drawable() { container } else { Size::canvas() };
        let mut viewport = Self { container, ..Self::default() };
        viewport.reset();
        viewport
    }

    /// The visible container size in CSS pixels.
    #[must_use]
    pub fn container(&self) -> Size {
        self.container
    }

    /// Current lower zoom bound.
    #[must_use]
    pub fn min_zoom(&self) -> f64 {
        compute_min_zoom(self.container)
    }

    /// Current upper zoom bound. Never below `min_zoom`.
    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        MAX_ZOOM.max(self.min_zoom())
    }

    /// Current pan offset as a point.
    #[must_use]
    pub fn pan(&self) -> Point {
        Point::new(self.pan_x, self.pan_y)
    }

    /// Resize the container and re-establish the zoom/pan bounds.
    ///
    /// Returns `false` and keeps the previous container when `container` is
    /// empty, negative or not finite.
    pub fn set_container(&mut self, container: Size) -> bool {
        if !container.is_drawable() {
            debug!(width = container.width, height = container.height, "ignoring unusable container size");
            return false;
        }
        self.container = container;
        self.zoom = self.zoom.clamp(self.min_zoom(), self.max_zoom());
        self.apply_pan_clamp();
        true
    }

    /// Convert a screen-space point (CSS pixels) to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a canvas-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        Point {
            x: canvas.x * self.zoom + self.pan_x,
            y: canvas.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to a canvas-space distance.
    #[must_use]
    pub fn screen_dist_to_canvas(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Multiply zoom by `factor`, keeping the canvas point under `pointer` fixed on screen.
    pub fn zoom_at(&mut self, pointer: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.screen_to_canvas(pointer);
        self.zoom = (self.zoom * factor).clamp(self.min_zoom(), self.max_zoom());
        self.pan_x = pointer.x - anchor.x * self.zoom;
        self.pan_y = pointer.y - anchor.y * self.zoom;
        self.apply_pan_clamp();
    }

    /// Apply one wheel notch at `pointer`. Negative `dy` (scrolling up) zooms in.
    pub fn wheel(&mut self, pointer: Point, dy: f64) {
        if dy == 0.0 {
            return;
        }
        let factor = if dy < 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
        self.zoom_at(pointer, factor);
    }

    /// Button zoom-in, anchored at the container centre.
    pub fn zoom_in(&mut self) {
        self.zoom_at(self.container_center(), BUTTON_ZOOM_STEP);
    }

    /// Button zoom-out, anchored at the container centre.
    pub fn zoom_out(&mut self) {
        self.zoom_at(self.container_center(), 1.0 / BUTTON_ZOOM_STEP);
    }

    /// Back to 1:1 (or the minimum zoom when the container is larger than the canvas).
    pub fn reset(&mut self) {
        self.zoom = 1.0_f64.clamp(self.min_zoom(), self.max_zoom());
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.apply_pan_clamp();
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
        self.apply_pan_clamp();
    }

    fn container_center(&self) -> Point {
        Point::new(self.container.width * 0.5, self.container.height * 0.5)
    }

    fn apply_pan_clamp(&mut self) {
        let pan = clamp_pan(self.pan(), self.zoom, self.container);
        self.pan_x = pan.x;
        self.pan_y = pan.y;
    }
}
