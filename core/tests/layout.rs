use deskfolio_core::grid::{grid_shape, layout_positions, GridMetrics, LayoutMode};

fn overlaps(a: (f32, f32), b: (f32, f32), metrics: &GridMetrics) -> bool {
    a.0 < b.0 + metrics.icon_width
        && b.0 < a.0 + metrics.icon_width
        && a.1 < b.1 + metrics.icon_height
        && b.1 < a.1 + metrics.icon_height
}

fn assert_no_overlap(positions: &[(f32, f32)], metrics: &GridMetrics) {
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            assert!(!overlaps(*a, *b, metrics), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn four_items_form_two_by_two_when_wide() {
    let metrics = GridMetrics::default();
    let positions = layout_positions(4, 1024.0, 768.0, &metrics);
    assert_eq!(positions.len(), 4);
    assert_eq!(positions[0].1, positions[1].1);
    assert_eq!(positions[2].1, positions[3].1);
    assert_eq!(positions[0].0, positions[2].0);
    assert_eq!(positions[1].0, positions[3].0);
    assert!(positions[2].1 > positions[0].1);
    assert_no_overlap(&positions, &metrics);
}

#[test]
fn wide_block_is_centered() {
    let metrics = GridMetrics::default();
    let positions = layout_positions(4, 1024.0, 768.0, &metrics);
    let left = positions.iter().map(|p| p.0).fold(f32::MAX, f32::min);
    let right = positions.iter().map(|p| p.0).fold(f32::MIN, f32::max) + metrics.icon_width;
    let top = positions.iter().map(|p| p.1).fold(f32::MAX, f32::min);
    let bottom = positions.iter().map(|p| p.1).fold(f32::MIN, f32::max) + metrics.icon_height;
    assert_eq!((left + right) * 0.5, 512.0);
    assert_eq!((top + bottom) * 0.5, 384.0);
}

#[test]
fn narrow_layout_stacks_two_columns() {
    let metrics = GridMetrics::default();
    let shape = grid_shape(5, 375.0, &metrics);
    assert_eq!(shape.mode, LayoutMode::Narrow);
    assert_eq!((shape.cols, shape.rows), (2, 3));
    let positions = layout_positions(5, 375.0, 812.0, &metrics);
    assert_eq!(positions[1].0 - positions[0].0, 180.0);
    assert_eq!(positions[2].1 - positions[0].1, 200.0);
    assert_no_overlap(&positions, &metrics);
}

#[test]
fn layout_is_deterministic_and_never_overlaps() {
    let metrics = GridMetrics::default();
    for count in 1..=12 {
        for width in [320.0, 768.0, 769.0, 1024.0, 1920.0] {
            let first = layout_positions(count, width, 900.0, &metrics);
            let second = layout_positions(count, width, 900.0, &metrics);
            assert_eq!(first, second);
            assert_eq!(first.len(), count);
            assert!(first.iter().all(|p| p.0.is_finite() && p.1.is_finite()));
            assert_no_overlap(&first, &metrics);
        }
    }
}

#[test]
fn custom_metrics_move_the_breakpoint() {
    let metrics = GridMetrics {
        breakpoint: 1200.0,
        ..GridMetrics::default()
    };
    assert_eq!(grid_shape(3, 1024.0, &metrics).mode, LayoutMode::Narrow);
}
