#![allow(clippy::float_cmp)]

use std::sync::Arc;

use image::RgbaImage;

use super::*;

fn one_layer(w: u32, h: u32) -> LayerStack {
    let mut layers = LayerStack::new();
    layers.insert(Arc::new(RgbaImage::new(w, h)));
    layers
}

// --- MemoryNode ---

#[test]
fn memory_node_starts_unscaled_on_layer() {
    let layers = one_layer(10, 10);
    let node = MemoryNode::for_layer(&layers.as_slice()[0]);
    assert_eq!(node.transform(), NodeTransform::at(Point::new(100.0, 100.0)));
}

#[test]
fn memory_node_round_trips_set_transform() {
    let mut node = MemoryNode::default();
    node.set_transform(Point::new(3.0, 4.0), 2.0, 0.5);
    let t = node.transform();
    assert_eq!(t.position, Point::new(3.0, 4.0));
    assert_eq!(t.scale_x, 2.0);
    assert_eq!(t.scale_y, 0.5);
}

// --- commit_node_transform ---

#[test]
fn commit_applies_scale_and_resets_node() {
    let mut layers = one_layer(200, 100);
    let mut node = MemoryNode::for_layer(&layers.as_slice()[0]);
    node.set_transform(Point::new(80.0, 90.0), 1.5, 2.0);

    assert!(commit_node_transform(&mut layers, 0, &mut node));

    let layer = &layers.as_slice()[0];
    assert_eq!(layer.size(), Size::new(300.0, 200.0));
    assert_eq!(layer.origin(), Point::new(80.0, 90.0));
    assert_eq!(node.transform(), NodeTransform::at(Point::new(80.0, 90.0)));
}

#[test]
fn repeated_commits_do_not_compound() {
    let mut layers = one_layer(100, 100);
    let mut node = MemoryNode::for_layer(&layers.as_slice()[0]);

    node.set_transform(Point::new(100.0, 100.0), 2.0, 2.0);
    commit_node_transform(&mut layers, 0, &mut node);
    // Node is back at 1x1; committing again changes nothing.
    commit_node_transform(&mut layers, 0, &mut node);

    assert_eq!(layers.as_slice()[0].size(), Size::new(200.0, 200.0));
}

#[test]
fn commit_with_invalid_scale_reseats_node() {
    let mut layers = one_layer(50, 50);
    let mut node = MemoryNode::for_layer(&layers.as_slice()[0]);
    node.set_transform(Point::new(7.0, 7.0), 0.0, 1.0);

    assert!(!commit_node_transform(&mut layers, 0, &mut node));
    assert_eq!(layers.as_slice()[0].size(), Size::new(50.0, 50.0));
    assert_eq!(node.transform(), NodeTransform::at(Point::new(100.0, 100.0)));
}

#[test]
fn commit_out_of_range_is_noop() {
    let mut layers = one_layer(50, 50);
    let mut node = MemoryNode::default();
    node.set_transform(Point::new(1.0, 1.0), 3.0, 3.0);
    assert!(!commit_node_transform(&mut layers, 4, &mut node));
    assert_eq!(node.transform().scale_x, 3.0);
}

// --- resized_box ---

#[test]
fn resized_box_se_grows_right_and_down() {
    let (origin, size) = resized_box(
        ResizeAnchor::Se,
        Point::new(10.0, 10.0),
        Size::new(100.0, 50.0),
        Point::new(20.0, 5.0),
    );
    assert_eq!(origin, Point::new(10.0, 10.0));
    assert_eq!(size, Size::new(120.0, 55.0));
}

#[test]
fn resized_box_nw_keeps_opposite_corner() {
    let (origin, size) = resized_box(
        ResizeAnchor::Nw,
        Point::new(10.0, 10.0),
        Size::new(100.0, 50.0),
        Point::new(-10.0, 20.0),
    );
    assert_eq!(origin, Point::new(0.0, 30.0));
    assert_eq!(size, Size::new(110.0, 30.0));
    assert_eq!(origin.x + size.width, 110.0);
    assert_eq!(origin.y + size.height, 60.0);
}

#[test]
fn resized_box_edge_handle_changes_one_axis() {
    let (origin, size) = resized_box(
        ResizeAnchor::E,
        Point::new(0.0, 0.0),
        Size::new(100.0, 50.0),
        Point::new(30.0, 999.0),
    );
    assert_eq!(origin, Point::new(0.0, 0.0));
    assert_eq!(size, Size::new(130.0, 50.0));
}

#[test]
fn resized_box_never_inverts() {
    let (origin, size) = resized_box(
        ResizeAnchor::W,
        Point::new(0.0, 0.0),
        Size::new(100.0, 50.0),
        Point::new(500.0, 0.0),
    );
    assert_eq!(size.width, MIN_LAYER_SIZE);
    assert_eq!(origin.x, 100.0 - MIN_LAYER_SIZE);
}
