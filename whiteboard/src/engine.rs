//! Editor engine: every piece of whiteboard state and the operations on it.
//!
//! DESIGN
//! ======
//! [`EditorCore`] owns the layer stack, history, selection, viewport, active
//! gesture, and the finalize/clear/persist flags. It has no browser dependency
//! so the whole editor can be driven from tests or a native host. [`Engine`]
//! wraps a core together with an `HtmlCanvasElement` and renders it.
//!
//! Continuous gestures (drag, resize) only mark history dirty. A snapshot is
//! pushed at the next selection boundary: deselect, selecting another layer,
//! delete, undo/redo. Discrete edits (insert, delete, clear) commit directly.
//!
//! Finalizing is an explicit two-step transition: [`EditorCore::request_finalize`]
//! sets a pending flag and deselects; [`EditorCore::deselect`] fulfills a pending
//! request right after its own commit, so the flattened image always includes
//! the last gesture.
//!
//! ERROR HANDLING
//! ==============
//! Structural no-ops (undo at the oldest entry, delete with no selection, an
//! out-of-range index) return `Action::None` or `false`. Export failures become
//! an error notification and never touch layers or history.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::PAN_NUDGE_PX;
use crate::export;
use crate::history::History;
use crate::hit::{self, HitPart};
use crate::input::{Button, InputState, Key, Modifiers, WheelDelta};
use crate::layers::{Layer, LayerId, LayerImage, LayerStack};
use crate::persist::PersistError;
use crate::render::{self, BitmapCache};
use crate::transform::{self, MemoryNode, TransformNode};
use crate::viewport::{Point, Size, Viewport};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Error,
}

/// Actions returned from editor operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    RenderNeeded,
    SetCursor(String),
    /// Selection moved to this layer index, or was cleared.
    SelectionChanged(Option<usize>),
    /// The host must ask the user before [`EditorCore::confirm_clear_all`].
    ConfirmClearRequested,
    /// A flattened composition is ready for the confirmation preview.
    PreviewReady(String),
    Notify { level: NotifyLevel, message: String },
}

/// Core editor state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EditorCore {
    layers: LayerStack,
    history: History,
    selected: Option<usize>,
    node: MemoryNode,
    pub viewport: Viewport,
    pub input: InputState,
    pending_finalize: bool,
    pending_clear: bool,
    preview: Option<String>,
    persist_in_flight: bool,
    torn_down: bool,
}

impl Default for EditorCore {
    fn default() -> Self {
        Self::new(Size::canvas())
    }
}

impl EditorCore {
    /// An empty editor (history `[[]]`, step 0) shown in a container of the given size.
    #[must_use]
    pub fn new(container: Size) -> Self {
        Self {
            layers: LayerStack::new(),
            history: History::default(),
            selected: None,
            node: MemoryNode::default(),
            viewport: Viewport::new(container),
            input: InputState::Idle,
            pending_finalize: false,
            pending_clear: false,
            preview: None,
            persist_in_flight: false,
            torn_down: false,
        }
    }

    // --- Layer model ---

    /// Append a decoded image as a new layer and commit it.
    ///
    /// Returns `None` once the editor has been torn down; late decodes land here.
    pub fn insert_image(&mut self, image: LayerImage) -> Option<LayerId> {
        if self.torn_down {
            debug!("editor torn down; discarding decoded image");
            return None;
        }
        let id = self.layers.insert(image);
        self.history.commit(self.layers.snapshot());
        self.layers_changed();
        debug!(%id, layers = self.layers.len(), "layer inserted");
        Some(id)
    }

    /// Replace everything with a saved composition stretched over the canvas.
    ///
    /// History restarts at `[[layer]]`, step 0.
    pub fn load_composition(&mut self, image: LayerImage) -> Option<LayerId> {
        if self.torn_down {
            debug!("editor torn down; discarding saved composition");
            return None;
        }
        let mut layers = LayerStack::new();
        let id = layers.insert_full_canvas(image);
        self.layers = layers;
        self.history.reset(self.layers.snapshot());
        self.layers_changed();
        self.selected = None;
        self.input = InputState::Idle;
        info!(%id, "saved composition loaded");
        Some(id)
    }

    /// Move a layer during a drag. Marks history dirty.
    pub fn move_layer(&mut self, index: usize, position: Point) -> Action {
        if !self.layers.move_to(index, position) {
            return Action::None;
        }
        self.history.mark_dirty();
        self.layers_changed();
        if self.selected == Some(index) {
            self.node.set_transform(position, 1.0, 1.0);
        }
        Action::RenderNeeded
    }

    /// Scale a layer by the factors its transform node reports and move it to `origin`.
    ///
    /// The node is reset to 1×1 afterwards. Marks history dirty.
    pub fn resize_layer(&mut self, index: usize, scale_x: f64, scale_y: f64, origin: Point) -> Action {
        self.node.set_transform(origin, scale_x, scale_y);
        if !transform::commit_node_transform(&mut self.layers, index, &mut self.node) {
            return Action::None;
        }
        self.history.mark_dirty();
        self.layers_changed();
        Action::RenderNeeded
    }

    /// Remove the selected layer and commit. No-op without a selection.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(index) = self.selected.take() else {
            return vec![Action::None];
        };
        self.input = InputState::Idle;
        if self.layers.remove(index).is_none() {
            return vec![Action::SelectionChanged(None)];
        }
        self.history.commit(self.layers.snapshot());
        self.layers_changed();
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Ask the host to confirm clearing the canvas. No-op when it is already empty.
    pub fn request_clear_all(&mut self) -> Action {
        if self.layers.is_empty() {
            return Action::None;
        }
        self.pending_clear = true;
        Action::ConfirmClearRequested
    }

    /// Apply or discard a pending clear-all request.
    pub fn confirm_clear_all(&mut self, accepted: bool) -> Vec<Action> {
        if !std::mem::take(&mut self.pending_clear) || !accepted {
            return vec![Action::None];
        }
        if !self.layers.clear() {
            return vec![Action::None];
        }
        self.selected = None;
        self.input = InputState::Idle;
        self.history.commit(self.layers.snapshot());
        self.layers_changed();
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    // --- Selection ---

    /// Select layer `index`, committing any pending gesture on the previous selection.
    pub fn select(&mut self, index: usize) -> Vec<Action> {
        let Some(layer) = self.layers.get(index) else {
            return vec![Action::None];
        };
        if self.selected == Some(index) {
            return vec![Action::None];
        }
        self.node = MemoryNode::for_layer(layer);
        self.history.commit_if_dirty(&self.layers);
        self.selected = Some(index);
        vec![Action::SelectionChanged(Some(index)), Action::RenderNeeded]
    }

    /// Clear the selection, committing any pending gesture, then fulfill a
    /// pending finalize request.
    pub fn deselect(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.selected.take().is_some() {
            self.history.commit_if_dirty(&self.layers);
            actions.push(Action::SelectionChanged(None));
            actions.push(Action::RenderNeeded);
        }
        if std::mem::take(&mut self.pending_finalize) {
            actions.push(self.finalize_now());
        }
        if actions.is_empty() {
            actions.push(Action::None);
        }
        actions
    }

    // --- History ---

    pub fn undo(&mut self) -> Vec<Action> {
        self.history.commit_if_dirty(&self.layers);
        let Some(snapshot) = self.history.undo() else {
            return vec![Action::None];
        };
        self.layers.restore(snapshot);
        self.after_history_jump()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.history.commit_if_dirty(&self.layers);
        let Some(snapshot) = self.history.redo() else {
            return vec![Action::None];
        };
        self.layers.restore(snapshot);
        self.after_history_jump()
    }

    fn after_history_jump(&mut self) -> Vec<Action> {
        self.layers_changed();
        self.input = InputState::Idle;
        let mut actions = Vec::new();
        if self.selected.take().is_some() {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    pub fn set_container(&mut self, container: Size) -> Action {
        if self.viewport.set_container(container) { Action::RenderNeeded } else { Action::None }
    }

    pub fn zoom_at(&mut self, pointer: Point, factor: f64) -> Action {
        self.viewport.zoom_at(pointer, factor);
        Action::RenderNeeded
    }

    pub fn zoom_in(&mut self) -> Action {
        self.viewport.zoom_in();
        Action::RenderNeeded
    }

    pub fn zoom_out(&mut self) -> Action {
        self.viewport.zoom_out();
        Action::RenderNeeded
    }

    pub fn reset_view(&mut self) -> Action {
        self.viewport.reset();
        Action::RenderNeeded
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Action {
        self.viewport.pan_by(dx, dy);
        Action::RenderNeeded
    }

    // --- Finalize / persist ---

    /// Flatten the composition for the confirmation preview.
    ///
    /// With a layer selected, the flatten waits for the deselect (and its
    /// history commit) that this call triggers.
    pub fn request_finalize(&mut self) -> Vec<Action> {
        if self.selected.is_some() {
            self.pending_finalize = true;
            return self.deselect();
        }
        vec![self.finalize_now()]
    }

    fn finalize_now(&mut self) -> Action {
        match export::flatten_to_data_url(self.layers.as_slice()) {
            Ok(url) => {
                debug!(bytes = url.len(), layers = self.layers.len(), "composition flattened");
                self.preview = Some(url.clone());
                Action::PreviewReady(url)
            }
            Err(e) => {
                warn!(error = %e, "flatten failed");
                Action::Notify { level: NotifyLevel::Error, message: e.to_string() }
            }
        }
    }

    /// An open preview no longer shows the live layers once they change.
    fn layers_changed(&mut self) {
        if self.preview.take().is_some() {
            debug!("layers changed; preview closed");
        }
    }

    /// Close the preview without saving.
    pub fn dismiss_preview(&mut self) {
        self.preview = None;
    }

    /// Claim the save slot and return the data URL to persist.
    ///
    /// Uses the open preview if there is one, otherwise flattens now.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Busy`] while another save is outstanding, or
    /// [`PersistError::Export`] if the composition cannot be flattened.
    pub fn begin_persist(&mut self) -> Result<String, PersistError> {
        if self.persist_in_flight {
            return Err(PersistError::Busy);
        }
        let url = match &self.preview {
            Some(url) => url.clone(),
            None => export::flatten_to_data_url(self.layers.as_slice())?,
        };
        self.persist_in_flight = true;
        Ok(url)
    }

    /// Release the save slot. Success closes the preview; failure keeps it and
    /// leaves layers and history untouched so the user can retry.
    pub fn finish_persist(&mut self, result: &Result<(), PersistError>) -> Action {
        self.persist_in_flight = false;
        match result {
            Ok(()) => {
                self.preview = None;
                info!(layers = self.layers.len(), "composition saved");
                Action::Notify { level: NotifyLevel::Info, message: "whiteboard saved".into() }
            }
            Err(e) => {
                warn!(error = %e, "saving composition failed");
                Action::Notify { level: NotifyLevel::Error, message: format!("could not save whiteboard: {e}") }
            }
        }
    }

    /// Stop accepting asynchronous results. Decodes that finish later are dropped.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.pending_finalize = false;
        self.pending_clear = false;
        self.input = InputState::Idle;
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        match button {
            Button::Middle => {
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::SetCursor("grabbing".into())]
            }
            Button::Secondary => vec![Action::None],
            Button::Primary => self.primary_down(screen_pt),
        }
    }

    fn primary_down(&mut self, screen_pt: Point) -> Vec<Action> {
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        let Some(hit) = hit::hit_test(canvas_pt, &self.layers, &self.viewport, self.selected) else {
            let mut actions = self.deselect();
            actions.retain(|a| *a != Action::None);
            self.input = InputState::Panning { last_screen: screen_pt };
            actions.push(Action::SetCursor("grabbing".into()));
            return actions;
        };

        let Some(layer) = self.layers.get(hit.index) else {
            return vec![Action::None];
        };
        let (origin, size) = (layer.origin(), layer.size());

        match hit.part {
            HitPart::ResizeHandle(anchor) => {
                self.input = InputState::ResizingLayer {
                    index: hit.index,
                    anchor,
                    start_canvas: canvas_pt,
                    orig_origin: origin,
                    orig_size: size,
                };
                vec![Action::SetCursor(anchor.cursor().into())]
            }
            HitPart::Body => {
                let mut actions = self.select(hit.index);
                actions.retain(|a| *a != Action::None);
                self.input = InputState::DraggingLayer {
                    index: hit.index,
                    grab_offset: Point::new(canvas_pt.x - origin.x, canvas_pt.y - origin.y),
                };
                actions.push(Action::SetCursor("move".into()));
                actions
            }
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        match self.input {
            InputState::Idle => vec![Action::SetCursor(self.hover_cursor(canvas_pt).into())],
            InputState::Panning { last_screen } => {
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![self.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y)]
            }
            InputState::DraggingLayer { index, grab_offset } => {
                let origin = Point::new(canvas_pt.x - grab_offset.x, canvas_pt.y - grab_offset.y);
                vec![self.move_layer(index, origin)]
            }
            InputState::ResizingLayer { index, anchor, start_canvas, orig_origin, orig_size } => {
                let delta = Point::new(canvas_pt.x - start_canvas.x, canvas_pt.y - start_canvas.y);
                let (origin, target) = transform::resized_box(anchor, orig_origin, orig_size, delta);
                let Some(current) = self.layers.get(index).map(Layer::size) else {
                    return vec![Action::None];
                };
                let sx = target.width / current.width;
                let sy = target.height / current.height;
                vec![self.resize_layer(index, sx, sy, origin)]
            }
        }
    }

    fn hover_cursor(&self, canvas_pt: Point) -> &'static str {
        match hit::hit_test(canvas_pt, &self.layers, &self.viewport, self.selected) {
            Some(hit) => match hit.part {
                HitPart::ResizeHandle(anchor) => anchor.cursor(),
                HitPart::Body => "move",
            },
            None => "default",
        }
    }

    /// End the gesture. History stays dirty until the next selection boundary.
    pub fn on_pointer_up(&mut self, screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let previous = std::mem::take(&mut self.input);
        let canvas_pt = self.viewport.screen_to_canvas(screen_pt);
        let cursor = Action::SetCursor(self.hover_cursor(canvas_pt).into());
        match previous {
            InputState::Idle => vec![Action::None],
            InputState::Panning { .. } => vec![cursor],
            InputState::DraggingLayer { .. } | InputState::ResizingLayer { .. } => {
                vec![cursor, Action::RenderNeeded]
            }
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, _modifiers: Modifiers) -> Vec<Action> {
        if delta.dy == 0.0 {
            return vec![Action::None];
        }
        self.viewport.wheel(screen_pt, delta.dy);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            if (key.is("z") && modifiers.shift) || key.is("y") {
                return self.redo();
            }
            if key.is("z") {
                return self.undo();
            }
            return vec![Action::None];
        }

        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => self.deselect(),
            "+" | "=" => vec![self.zoom_in()],
            "-" | "_" => vec![self.zoom_out()],
            "0" => vec![self.reset_view()],
            "ArrowLeft" => vec![self.pan_by(PAN_NUDGE_PX, 0.0)],
            "ArrowRight" => vec![self.pan_by(-PAN_NUDGE_PX, 0.0)],
            "ArrowUp" => vec![self.pan_by(0.0, PAN_NUDGE_PX)],
            "ArrowDown" => vec![self.pan_by(0.0, -PAN_NUDGE_PX)],
            _ => vec![Action::None],
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The currently selected layer index, if any.
    #[must_use]
    pub fn selection(&self) -> Option<usize> {
        self.selected
    }

    /// The current transform node of the selection.
    #[must_use]
    pub fn node(&self) -> &MemoryNode {
        &self.node
    }

    #[must_use]
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    #[must_use]
    pub fn is_finalize_pending(&self) -> bool {
        self.pending_finalize
    }

    #[must_use]
    pub fn is_clear_pending(&self) -> bool {
        self.pending_clear
    }

    /// Whether a save is outstanding. Hosts disable the save control while true.
    #[must_use]
    pub fn is_persisting(&self) -> bool {
        self.persist_in_flight
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

/// The full editor. Wraps `EditorCore` and owns the browser canvas element.
///
/// This is the browser host's entry point: pointer, key and toolbar events,
/// imports, finalize and the save slot all go through it. The host runs the
/// profile write itself between [`Engine::begin_persist`] and
/// [`Engine::finish_persist`].
pub struct Engine {
    canvas: HtmlCanvasElement,
    bitmaps: BitmapCache,
    dpr: f64,
    pub core: EditorCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let container = Size::new(f64::from(canvas.client_width().max(1)), f64::from(canvas.client_height().max(1)));
        Self { canvas, bitmaps: BitmapCache::default(), dpr: 1.0, core: EditorCore::new(container) }
    }

    /// Update container dimensions and device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Action {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.canvas.set_width((width_css.max(1.0) * self.dpr).round() as u32);
        self.canvas.set_height((height_css.max(1.0) * self.dpr).round() as u32);
        self.core.set_container(Size::new(width_css.max(1.0), height_css.max(1.0)))
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Editing ---

    /// Append a decoded import as a layer. `None` after teardown.
    pub fn insert_image(&mut self, image: LayerImage) -> Option<LayerId> {
        self.core.insert_image(image)
    }

    pub fn load_composition(&mut self, image: LayerImage) -> Option<LayerId> {
        self.core.load_composition(image)
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        self.core.delete_selected()
    }

    pub fn request_clear_all(&mut self) -> Action {
        self.core.request_clear_all()
    }

    pub fn confirm_clear_all(&mut self, accepted: bool) -> Vec<Action> {
        self.core.confirm_clear_all(accepted)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        self.core.undo()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.core.redo()
    }

    // --- Toolbar view controls ---

    pub fn zoom_in(&mut self) -> Action {
        self.core.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Action {
        self.core.zoom_out()
    }

    pub fn reset_view(&mut self) -> Action {
        self.core.reset_view()
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> Action {
        self.core.pan_by(dx, dy)
    }

    // --- Finalize / persist ---

    pub fn request_finalize(&mut self) -> Vec<Action> {
        self.core.request_finalize()
    }

    pub fn dismiss_preview(&mut self) {
        self.core.dismiss_preview();
    }

    /// See [`EditorCore::begin_persist`].
    ///
    /// # Errors
    ///
    /// [`PersistError::Busy`] while a save is outstanding, or an export failure.
    pub fn begin_persist(&mut self) -> Result<String, PersistError> {
        self.core.begin_persist()
    }

    pub fn finish_persist(&mut self, result: &Result<(), PersistError>) -> Action {
        self.core.finish_persist(result)
    }

    /// Drop the cached layer bitmaps and ignore later decodes.
    pub fn teardown(&mut self) {
        self.core.teardown();
        self.bitmaps = BitmapCache::default();
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(&ctx, &mut self.bitmaps, &self.core, self.dpr)
    }
}
