//! Input model: modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the editor engine. `Modifiers`
//! capture the user's intent at the time of a pointer event. `InputState` is the
//! active gesture being tracked between pointer-down and pointer-up, carrying
//! all context needed to compute incremental updates. Gestures never span an
//! asynchronous boundary: pointer-up always arrives on the same event loop as
//! the moves before it.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::ResizeAnchor;
use crate::viewport::{Point, Size};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is panning the view by dragging empty space.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// The user is moving a layer across the canvas.
    DraggingLayer {
        /// Index of the layer being dragged.
        index: usize,
        /// Pointer position relative to the layer origin at grab time, in canvas units.
        grab_offset: Point,
    },
    /// The user is resizing a layer by one of its eight handles.
    ResizingLayer {
        /// Index of the layer being resized.
        index: usize,
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// Canvas-space pointer position at the start of the resize.
        start_canvas: Point,
        /// Layer origin at the start of the resize.
        orig_origin: Point,
        /// Layer size at the start of the resize.
        orig_size: Size,
    },
}
