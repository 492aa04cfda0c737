//! Rendering: draws the editor scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads layer, selection, and viewport state from the [`EditorCore`] and
//! produces pixels. It does not mutate any editor state.
//!
//! Decoded layer pixels are uploaded once into an offscreen canvas per layer
//! and reused on every frame; the cache is keyed by layer id, so undo/redo
//! snapshots that share an image also share its bitmap.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, HANDLE_RADIUS_PX};
use crate::engine::EditorCore;
use crate::hit::ResizeAnchor;
use crate::layers::{Layer, LayerId};

/// Colour of everything outside the canvas rectangle.
const BACKDROP: &str = "#e5e5e5";

/// Selection outline and handle stroke.
const SELECTION_STROKE: &str = "#1E90FF";

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;

/// Offscreen bitmaps for layer images.
#[derive(Default)]
pub struct BitmapCache {
    bitmaps: HashMap<LayerId, HtmlCanvasElement>,
}

impl BitmapCache {
    fn get_or_upload(&mut self, layer: &Layer) -> Result<&HtmlCanvasElement, JsValue> {
        if !self.bitmaps.contains_key(&layer.id) {
            let bitmap = upload(layer)?;
            self.bitmaps.insert(layer.id, bitmap);
        }
        self.bitmaps.get(&layer.id).ok_or_else(|| JsValue::from_str("bitmap cache miss"))
    }

    /// Drop bitmaps for layers that are no longer live.
    fn retain_live<'a>(&mut self, live: impl Iterator<Item = &'a Layer>) {
        retain_ids(&mut self.bitmaps, live);
    }
}

fn retain_ids<'a, V>(entries: &mut HashMap<LayerId, V>, live: impl Iterator<Item = &'a Layer>) {
    let ids: Vec<LayerId> = live.map(|l| l.id).collect();
    entries.retain(|id, _| ids.contains(id));
}

/// Selection handle squares in canvas units as `(x, y, side)`.
///
/// The side is divided by `zoom` so handles keep a constant screen size.
fn handle_squares(layer: &Layer, zoom: f64) -> [(f64, f64, f64); 8] {
    let half = HANDLE_RADIUS_PX / 2.0 / zoom;
    ResizeAnchor::ALL.map(|anchor| {
        let pos = anchor.position_on(layer);
        (pos.x - half, pos.y - half, half * 2.0)
    })
}

fn upload(layer: &Layer) -> Result<HtmlCanvasElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?;
    let (w, h) = layer.image.dimensions();
    canvas.set_width(w);
    canvas.set_height(h);

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(layer.image.as_raw().as_slice()), w, h)?;
    ctx.put_image_data(&data, 0.0, 0.0)?;
    Ok(canvas)
}

/// Draw the full scene: backdrop, canvas, layers, and selection UI.
///
/// `dpr` is the device pixel ratio; all other lengths are CSS pixels.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, cache: &mut BitmapCache, core: &EditorCore, dpr: f64) -> Result<(), JsValue> {
    let container = core.viewport.container();

    // Screen space: clear to the backdrop.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.set_fill_style_str(BACKDROP);
    ctx.fill_rect(0.0, 0.0, container.width, container.height);

    // Canvas space.
    let zoom = core.viewport.zoom;
    ctx.translate(core.viewport.pan_x, core.viewport.pan_y)?;
    ctx.scale(zoom, zoom)?;
    ctx.set_fill_style_str("#fff");
    ctx.fill_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);

    // Layers outside the canvas rectangle are clipped like the export.
    ctx.save();
    ctx.begin_path();
    ctx.rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
    ctx.clip();
    let layers = core.layers();
    cache.retain_live(layers.iter());
    for layer in layers.iter() {
        let bitmap = cache.get_or_upload(layer)?;
        ctx.draw_image_with_html_canvas_element_and_dw_and_dh(bitmap, layer.x, layer.y, layer.width, layer.height)?;
    }
    ctx.restore();

    if let Some(layer) = core.selection().and_then(|i| layers.get(i)) {
        draw_selection(ctx, layer, zoom)?;
    }

    Ok(())
}

fn draw_selection(ctx: &CanvasRenderingContext2d, layer: &Layer, zoom: f64) -> Result<(), JsValue> {
    ctx.save();

    let dash = SELECTION_DASH_PX / zoom;
    ctx.set_stroke_style_str(SELECTION_STROKE);
    ctx.set_line_width(1.0 / zoom);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash.into());
    dash_array.push(&dash.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.stroke_rect(layer.x, layer.y, layer.width, layer.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    ctx.set_fill_style_str("#fff");
    for (x, y, side) in handle_squares(layer, zoom) {
        ctx.fill_rect(x, y, side, side);
        ctx.stroke_rect(x, y, side, side);
    }

    ctx.restore();
    Ok(())
}
