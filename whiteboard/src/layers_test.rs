#![allow(clippy::float_cmp)]

use super::*;

fn image(w: u32, h: u32) -> LayerImage {
    Arc::new(RgbaImage::new(w, h))
}

fn stack_with(n: usize) -> LayerStack {
    let mut stack = LayerStack::new();
    for i in 0..n {
        let side = 10 + u32::try_from(i).unwrap();
        stack.insert(image(side, side));
    }
    stack
}

// --- Layer ---

#[test]
fn layer_new_uses_natural_size() {
    let layer = Layer::new(image(200, 150), Point::new(5.0, 6.0));
    assert_eq!(layer.width, 200.0);
    assert_eq!(layer.height, 150.0);
    assert_eq!(layer.origin(), Point::new(5.0, 6.0));
}

#[test]
fn layer_with_zero_sized_image_still_has_positive_size() {
    let layer = Layer::new(image(0, 0), Point::new(0.0, 0.0));
    assert!(layer.width > 0.0);
    assert!(layer.height > 0.0);
}

#[test]
fn layer_contains_inclusive_edges() {
    let layer = Layer::new(image(100, 50), Point::new(10.0, 20.0));
    assert!(layer.contains(Point::new(10.0, 20.0)));
    assert!(layer.contains(Point::new(110.0, 70.0)));
    assert!(layer.contains(Point::new(60.0, 45.0)));
    assert!(!layer.contains(Point::new(9.9, 45.0)));
    assert!(!layer.contains(Point::new(60.0, 70.1)));
}

#[test]
fn layer_equality_requires_shared_image() {
    let a = Layer::new(image(4, 4), Point::new(0.0, 0.0));
    let mut b = a.clone();
    assert_eq!(a, b);
    b.image = image(4, 4);
    assert_ne!(a, b);
}

#[test]
fn layer_ids_are_unique() {
    let img = image(4, 4);
    let a = Layer::new(img.clone(), Point::new(0.0, 0.0));
    let b = Layer::new(img, Point::new(0.0, 0.0));
    assert_ne!(a.id, b.id);
}

// --- insert ---

#[test]
fn insert_places_at_default_point() {
    let mut stack = LayerStack::new();
    let id = stack.insert(image(200, 150));
    let layer = stack.get(0).expect("inserted layer");
    assert_eq!(layer.id, id);
    assert_eq!(layer.origin(), Point::new(100.0, 100.0));
    assert_eq!(layer.size(), Size::new(200.0, 150.0));
}

#[test]
fn insert_appends_on_top() {
    let mut stack = LayerStack::new();
    let first = stack.insert(image(1, 1));
    let second = stack.insert(image(2, 2));
    assert_eq!(stack.index_of(&first), Some(0));
    assert_eq!(stack.index_of(&second), Some(1));
}

#[test]
fn insert_full_canvas_spans_canvas() {
    let mut stack = LayerStack::new();
    stack.insert_full_canvas(image(300, 160));
    let layer = &stack.as_slice()[0];
    assert_eq!(layer.origin(), Point::new(0.0, 0.0));
    assert_eq!(layer.size(), Size::new(CANVAS_WIDTH, CANVAS_HEIGHT));
}

// --- move ---

#[test]
fn move_to_updates_only_position() {
    let mut stack = stack_with(1);
    assert!(stack.move_to(0, Point::new(-20.0, 400.0)));
    let layer = &stack.as_slice()[0];
    assert_eq!(layer.origin(), Point::new(-20.0, 400.0));
    assert_eq!(layer.size(), Size::new(10.0, 10.0));
}

#[test]
fn move_to_out_of_range_is_noop() {
    let mut stack = stack_with(1);
    assert!(!stack.move_to(3, Point::new(1.0, 1.0)));
    assert_eq!(stack.as_slice()[0].origin(), Point::new(100.0, 100.0));
}

// --- resize ---

#[test]
fn resize_multiplies_size_and_moves_origin() {
    let mut stack = LayerStack::new();
    stack.insert(image(200, 100));
    assert!(stack.resize(0, 1.5, 0.5, Point::new(90.0, 110.0)));
    let layer = &stack.as_slice()[0];
    assert_eq!(layer.size(), Size::new(300.0, 50.0));
    assert_eq!(layer.origin(), Point::new(90.0, 110.0));
}

#[test]
fn resize_rejects_non_positive_scale() {
    let mut stack = stack_with(1);
    assert!(!stack.resize(0, 0.0, 1.0, Point::new(0.0, 0.0)));
    assert!(!stack.resize(0, 1.0, -2.0, Point::new(0.0, 0.0)));
    assert!(!stack.resize(0, f64::INFINITY, 1.0, Point::new(0.0, 0.0)));
    assert_eq!(stack.as_slice()[0].size(), Size::new(10.0, 10.0));
}

#[test]
fn resize_clamps_to_minimum_size() {
    let mut stack = stack_with(1);
    assert!(stack.resize(0, 0.001, 0.001, Point::new(0.0, 0.0)));
    let layer = &stack.as_slice()[0];
    assert_eq!(layer.width, MIN_LAYER_SIZE);
    assert_eq!(layer.height, MIN_LAYER_SIZE);
}

#[test]
fn resize_out_of_range_is_noop() {
    let mut stack = stack_with(1);
    assert!(!stack.resize(1, 2.0, 2.0, Point::new(0.0, 0.0)));
}

// --- remove / clear ---

#[test]
fn remove_returns_layer_and_shifts_indices() {
    let mut stack = stack_with(3);
    let top = stack.as_slice()[2].id;
    let removed = stack.remove(1);
    assert!(removed.is_some());
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.index_of(&top), Some(1));
}

#[test]
fn remove_out_of_range_is_none() {
    let mut stack = stack_with(1);
    assert!(stack.remove(1).is_none());
    assert_eq!(stack.len(), 1);
}

#[test]
fn clear_empties_stack() {
    let mut stack = stack_with(4);
    assert!(stack.clear());
    assert!(stack.is_empty());
}

#[test]
fn clear_on_empty_stack_reports_noop() {
    let mut stack = LayerStack::new();
    assert!(!stack.clear());
}

// --- snapshot / restore ---

#[test]
fn snapshot_is_independent_of_live_edits() {
    let mut stack = stack_with(2);
    let snap = stack.snapshot();
    stack.move_to(0, Point::new(0.0, 0.0));
    stack.remove(1);
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].origin(), Point::new(100.0, 100.0));
}

#[test]
fn snapshot_shares_image_pixels() {
    let stack = stack_with(1);
    let snap = stack.snapshot();
    assert!(Arc::ptr_eq(&snap[0].image, &stack.as_slice()[0].image));
}

#[test]
fn restore_replaces_sequence() {
    let mut stack = stack_with(3);
    let snap = stack.snapshot();
    stack.clear();
    stack.restore(&snap);
    assert_eq!(stack.as_slice(), snap.as_slice());
}

#[test]
fn iter_yields_render_order() {
    let stack = stack_with(3);
    let widths: Vec<f64> = stack.iter().map(|l| l.width).collect();
    assert_eq!(widths, vec![10.0, 11.0, 12.0]);
}

#[test]
fn iter_enumerates_from_the_top() {
    let stack = stack_with(3);
    assert_eq!(stack.iter().len(), 3);
    let top_down: Vec<(usize, f64)> = stack.iter().enumerate().rev().map(|(i, l)| (i, l.width)).collect();
    assert_eq!(top_down, vec![(2, 12.0), (1, 11.0), (0, 10.0)]);
}
