//! Image compositing editor for the godparent platform's self-introduction whiteboard.
//!
//! This crate is compiled to WebAssembly and runs in the browser, and natively
//! for tests and the command-line host. Users import raster images, move and
//! resize them on a fixed 1500×800 canvas, undo/redo with a bounded history,
//! pan and zoom the view, and flatten the result into one JPEG data URL stored
//! on their profile. The host layer wires DOM events to the engine and acts on
//! the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EditorCore`] |
//! | [`shell`] | Editor bound to a session and profile store |
//! | [`layers`] | Placed images and the ordered layer stack |
//! | [`transform`] | Transform-node capability and resize geometry |
//! | [`history`] | Bounded undo/redo snapshots with dirty coalescing |
//! | [`viewport`] | Pan/zoom state, clamping, and coordinate conversions |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against layers and resize handles |
//! | [`import`] | File filtering and concurrent image decoding |
//! | [`export`] | Flattening and data-URL encoding |
//! | [`persist`] | Session, profile record, and the profile store trait |
//! | [`render`] | Scene rendering onto a 2D canvas context |
//! | [`consts`] | Shared numeric constants (canvas size, zoom limits, history depth) |

pub mod consts;
pub mod engine;
pub mod export;
pub mod history;
pub mod hit;
pub mod import;
pub mod input;
pub mod layers;
pub mod persist;
pub mod render;
pub mod shell;
pub mod transform;
pub mod viewport;
