//! Transform engine: the capability seam between layer geometry and whatever
//! scene node a rendering backend uses to show resize handles.
//!
//! A backend node reports its position and a scale relative to the layer's
//! committed size. When a resize step ends, [`commit_node_transform`] folds that
//! scale into the layer and resets the node to 1×1 so scales never compound
//! across edits. The engine only talks to [`TransformNode`]; it never sees a
//! concrete rendering library.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_LAYER_SIZE;
use crate::hit::ResizeAnchor;
use crate::layers::{Layer, LayerStack};
use crate::viewport::{Point, Size};

/// Position and scale reported by a transform node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub position: Point,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl NodeTransform {
    /// Unscaled transform at `position`.
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self { position, scale_x: 1.0, scale_y: 1.0 }
    }
}

/// Imperative handle on a backend scene node.
pub trait TransformNode {
    /// Current position and scale of the node.
    fn transform(&self) -> NodeTransform;

    /// Overwrite the node's position and scale.
    fn set_transform(&mut self, position: Point, scale_x: f64, scale_y: f64);
}

/// Backend-free node used by the headless engine and by tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryNode {
    current: NodeTransform,
}

impl MemoryNode {
    /// A node sitting on `layer` at scale 1×1.
    #[must_use]
    pub fn for_layer(layer: &Layer) -> Self {
        Self { current: NodeTransform::at(layer.origin()) }
    }
}

impl Default for MemoryNode {
    fn default() -> Self {
        Self { current: NodeTransform::at(Point::default()) }
    }
}

impl TransformNode for MemoryNode {
    fn transform(&self) -> NodeTransform {
        self.current
    }

    fn set_transform(&mut self, position: Point, scale_x: f64, scale_y: f64) {
        self.current = NodeTransform { position, scale_x, scale_y };
    }
}

/// Fold the node's scale and position into layer `index`, then reset the node's scale.
///
/// Returns false (and re-seats the node on the unchanged layer) when the index is
/// out of range or the reported scale is not strictly positive.
pub fn commit_node_transform<N: TransformNode + ?Sized>(layers: &mut LayerStack, index: usize, node: &mut N) -> bool {
    let t = node.transform();
    if layers.resize(index, t.scale_x, t.scale_y, t.position) {
        node.set_transform(t.position, 1.0, 1.0);
        return true;
    }
    if let Some(layer) = layers.get(index) {
        node.set_transform(layer.origin(), 1.0, 1.0);
    }
    false
}

/// Box produced by dragging `anchor` by `delta` from the box `(origin, size)`.
///
/// The edge opposite the anchor stays put. Width and height never drop below
/// [`MIN_LAYER_SIZE`].
#[must_use]
pub fn resized_box(anchor: ResizeAnchor, origin: Point, size: Size, delta: Point) -> (Point, Size) {
    let (mut x, mut y, mut w, mut h) = (origin.x, origin.y, size.width, size.height);
    let right = origin.x + size.width;
    let bottom = origin.y + size.height;

    if anchor.moves_west() {
        w = (size.width - delta.x).max(MIN_LAYER_SIZE);
        x = right - w;
    } else if anchor.moves_east() {
        w = (size.width + delta.x).max(MIN_LAYER_SIZE);
    }
    if anchor.moves_north() {
        h = (size.height - delta.y).max(MIN_LAYER_SIZE);
        y = bottom - h;
    } else if anchor.moves_south() {
        h = (size.height + delta.y).max(MIN_LAYER_SIZE);
    }

    (Point::new(x, y), Size::new(w, h))
}
