//! Shared numeric constants for the whiteboard crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Logical canvas width. Layer coordinates and exports use this space.
pub const CANVAS_WIDTH: f64 = 1500.0;

/// Logical canvas height.
pub const CANVAS_HEIGHT: f64 = 800.0;

/// Exported raster size; one pixel per canvas unit.
pub const EXPORT_WIDTH_PX: u32 = 1500;
pub const EXPORT_HEIGHT_PX: u32 = 800;

/// Where newly imported images land, in canvas coordinates.
pub const INSERT_X: f64 = 100.0;
pub const INSERT_Y: f64 = 100.0;

/// Smallest width/height a resize may produce.
pub const MIN_LAYER_SIZE: f64 = 1.0;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots retained for undo/redo.
pub const HISTORY_CAPACITY: usize = 8;

// ── Viewport ────────────────────────────────────────────────────

/// Upper zoom bound. The lower bound depends on the container size.
pub const MAX_ZOOM: f64 = 3.0;

/// Multiplicative zoom step for one wheel notch towards the user.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Multiplicative zoom step for one wheel notch away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Zoom step applied by the zoom buttons (and divided out by zoom-out).
pub const BUTTON_ZOOM_STEP: f64 = 1.2;

/// Screen distance moved by one directional pan nudge, in CSS pixels.
pub const PAN_NUDGE_PX: f64 = 50.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

// ── Export ──────────────────────────────────────────────────────

/// Lossy encoder quality for flattened compositions (0-100).
pub const EXPORT_QUALITY: u8 = 80;

/// Media type of flattened compositions.
pub const EXPORT_MEDIA_TYPE: &str = "image/jpeg";
