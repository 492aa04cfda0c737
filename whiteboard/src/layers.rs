//! Layer model: placed images, their geometry, and the ordered layer stack.
//!
//! A [`Layer`] is one decoded image placed on the canvas. The [`LayerStack`]
//! owns the live sequence; render order is sequence order, so later layers
//! draw on top. A layer's index in the stack is its render and selection handle.
//!
//! Decoded pixels are shared behind an [`Arc`], so a [`Snapshot`] (a deep copy
//! of the sequence) only copies ids and geometry.

#[cfg(test)]
#[path = "layers_test.rs"]
mod layers_test;

use std::sync::Arc;

use image::RgbaImage;
use uuid::Uuid;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, INSERT_X, INSERT_Y, MIN_LAYER_SIZE};
use crate::viewport::{Point, Size};

/// Unique identifier for a layer.
pub type LayerId = Uuid;

/// Decoded RGBA pixels, immutable once decoded.
pub type LayerImage = Arc<RgbaImage>;

/// The full layer sequence at one point in edit history.
pub type Snapshot = Vec<Layer>;

/// One placed image on the canvas.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique identifier for this layer.
    pub id: LayerId,
    /// Source pixels.
    pub image: LayerImage,
    /// Left edge in canvas coordinates.
    pub x: f64,
    /// Top edge in canvas coordinates.
    pub y: f64,
    /// Drawn width in canvas coordinates. Always positive.
    pub width: f64,
    /// Drawn height in canvas coordinates. Always positive.
    pub height: f64,
}

impl PartialEq for Layer {
    #[allow(clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && Arc::ptr_eq(&self.image, &other.image)
            && self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }
}

impl Layer {
    /// Place `image` at `origin` with its natural pixel size.
    #[must_use]
    pub fn new(image: LayerImage, origin: Point) -> Self {
        let size = natural_size(&image);
        Self::with_size(image, origin, size)
    }

    /// Place `image` at `origin` drawn at `size`.
    #[must_use]
    pub fn with_size(image: LayerImage, origin: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            x: origin.x,
            y: origin.y,
            width: size.width.max(MIN_LAYER_SIZE),
            height: size.height.max(MIN_LAYER_SIZE),
        }
    }

    /// Top-left corner in canvas coordinates.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Drawn size in canvas coordinates.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether a canvas-space point falls inside the layer's box.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.x + self.width && pt.y >= self.y && pt.y <= self.y + self.height
    }
}

/// Natural pixel dimensions of a decoded image.
#[must_use]
pub fn natural_size(image: &RgbaImage) -> Size {
    Size::new(f64::from(image.width()), f64::from(image.height()))
}

/// The live, ordered layer sequence.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append an image at the default insertion point with its natural size.
    pub fn insert(&mut self, image: LayerImage) -> LayerId {
        self.push(Layer::new(image, Point::new(INSERT_X, INSERT_Y)))
    }

    /// Append an image stretched over the whole canvas. Used for saved compositions.
    pub fn insert_full_canvas(&mut self, image: LayerImage) -> LayerId {
        self.push(Layer::with_size(image, Point::new(0.0, 0.0), Size::new(CANVAS_WIDTH, CANVAS_HEIGHT)))
    }

    fn push(&mut self, layer: Layer) -> LayerId {
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Move a layer's origin. Returns false for an out-of-range index.
    pub fn move_to(&mut self, index: usize, origin: Point) -> bool {
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        layer.x = origin.x;
        layer.y = origin.y;
        true
    }

    /// Multiply a layer's size by `(scale_x, scale_y)` and move it to `origin`.
    ///
    /// Non-positive or non-finite scale factors are rejected. The resulting size
    /// is clamped to at least [`MIN_LAYER_SIZE`] on each axis.
    pub fn resize(&mut self, index: usize, scale_x: f64, scale_y: f64, origin: Point) -> bool {
        if !is_valid_scale(scale_x) || !is_valid_scale(scale_y) {
            return false;
        }
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        layer.width = (layer.width * scale_x).max(MIN_LAYER_SIZE);
        layer.height = (layer.height * scale_y).max(MIN_LAYER_SIZE);
        layer.x = origin.x;
        layer.y = origin.y;
        true
    }

    /// Remove a layer, returning it if the index was valid.
    pub fn remove(&mut self, index: usize) -> Option<Layer> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    /// Remove every layer. Returns false if the stack was already empty.
    pub fn clear(&mut self) -> bool {
        if self.layers.is_empty() {
            return false;
        }
        self.layers.clear();
        true
    }

    /// Copy of the current sequence for history.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.layers.clone()
    }

    /// Replace the live sequence with a history snapshot.
    pub fn restore(&mut self, snapshot: &[Layer]) {
        self.layers = snapshot.to_vec();
    }

    /// Layer at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Index of the layer with the given id.
    #[must_use]
    pub fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    /// Layers in render order (bottom first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + ExactSizeIterator {
        self.layers.iter()
    }

    /// Layers in render order, as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if there are no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn is_valid_scale(scale: f64) -> bool {
    scale.is_finite() && scale > 0.0
}
