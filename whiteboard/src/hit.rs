#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::layers::{Layer, LayerStack};
use crate::viewport::{Point, Viewport};

/// Which part of a layer was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All eight anchors, clockwise from north.
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Handle position on `layer`'s box, in canvas coordinates.
    #[must_use]
    pub fn position_on(self, layer: &Layer) -> Point {
        let x = if self.moves_west() {
            layer.x
        } else if self.moves_east() {
            layer.x + layer.width
        } else {
            layer.x + layer.width * 0.5
        };
        let y = if self.moves_north() {
            layer.y
        } else if self.moves_south() {
            layer.y + layer.height
        } else {
            layer.y + layer.height * 0.5
        };
        Point::new(x, y)
    }

    /// CSS cursor name shown while hovering this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub index: usize,
    pub part: HitPart,
}

/// Test which layer (if any) is under `canvas_pt`, checking the selected layer's handles first.
///
/// Handle slop is a fixed screen distance, so it shrinks in canvas units as zoom grows.
/// Layer bodies are tested top-most first.
#[must_use]
pub fn hit_test(canvas_pt: Point, layers: &LayerStack, viewport: &Viewport, selected: Option<usize>) -> Option<Hit> {
    if let Some(index) = selected
        && let Some(layer) = layers.get(index)
    {
        let slop = viewport.screen_dist_to_canvas(HANDLE_RADIUS_PX);
        for anchor in ResizeAnchor::ALL {
            let handle = anchor.position_on(layer);
            if (canvas_pt.x - handle.x).abs() <= slop && (canvas_pt.y - handle.y).abs() <= slop {
                return Some(Hit { index, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    layers
        .iter()
        .enumerate()
        .rev()
        .find(|(_, layer)| layer.contains(canvas_pt))
        .map(|(index, _)| Hit { index, part: HitPart::Body })
}
