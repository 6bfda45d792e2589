use blockpack_core::prelude::*;
use blockpack_core::packer::score;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn single_leaf_sits_at_origin() {
    let blocks = vec![Block::leaf("a", 100.0, 50.0)];
    let out = pack(&blocks, 500.0, true).expect("pack");

    assert_eq!(out.blocks.len(), 1);
    assert_eq!(out.blocks[0].id, "a");
    assert_eq!(out.blocks[0].frame, Rect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(out.root.w, 100.0);
    assert_eq!(out.root.h, 50.0);
    assert_eq!(out.root.fit, 1.0);
    assert_eq!(out.root.filled_area, 5000.0);
}

#[test]
fn two_leaves_prefer_row_over_column() {
    let blocks = vec![
        Block::leaf("A", 200.0, 100.0),
        Block::leaf("B", 150.0, 80.0),
    ];
    let out = pack(&blocks, 400.0, true).expect("pack");

    assert_eq!(out.blocks[0].id, "A");
    assert_eq!(out.blocks[0].frame, Rect::new(0.0, 0.0, 200.0, 100.0));
    assert_eq!(out.blocks[1].id, "B");
    assert_eq!(out.blocks[1].frame, Rect::new(200.0, 0.0, 150.0, 80.0));
    assert_eq!(out.root.w, 350.0);
    assert_eq!(out.root.h, 100.0);
    assert!(approx(out.root.fit, 0.9143), "fit = {}", out.root.fit);
}

#[test]
fn scores_match_hand_computed_values() {
    let root = Root {
        w: 200.0,
        h: 100.0,
        filled_area: 20_000.0,
        fit: 1.0,
    };
    let right = score(&root, 200.0, 0.0, 150.0, 80.0);
    let below = score(&root, 0.0, 100.0, 150.0, 80.0);
    assert!(approx(right, 0.0857), "right = {right}");
    assert!(approx(below, 0.8077), "below = {below}");
    assert!(right < below);
}

#[test]
fn narrow_limit_forces_block_below() {
    let blocks = vec![
        Block::leaf("A", 200.0, 100.0),
        Block::leaf("B", 150.0, 80.0),
    ];
    let out = pack(&blocks, 300.0, true).expect("pack");
    assert_eq!(out.blocks[1].frame, Rect::new(0.0, 100.0, 150.0, 80.0));
    assert_eq!(out.root.w, 200.0);
    assert_eq!(out.root.h, 180.0);
}

#[test]
fn touching_edges_are_not_overlap() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    let b = Rect::new(10.0, 0.0, 10.0, 10.0);
    let c = Rect::new(0.0, 10.0, 10.0, 10.0);
    let d = Rect::new(5.0, 5.0, 10.0, 10.0);
    assert!(!a.overlaps(&b));
    assert!(!a.overlaps(&c));
    assert!(a.overlaps(&d));
    assert!(d.overlaps(&a));
}

#[test]
fn equal_squares_fill_a_row_first() {
    let blocks: Vec<Block> = (0..4)
        .map(|i| Block::leaf(format!("s{i}"), 100.0, 100.0))
        .collect();
    let out = pack(&blocks, 1000.0, true).expect("pack");
    for (i, b) in out.blocks.iter().enumerate() {
        assert_eq!(b.frame, Rect::new(i as f64 * 100.0, 0.0, 100.0, 100.0));
    }
    assert_eq!(out.root.fit, 1.0);
}

#[test]
fn input_is_left_untouched() {
    let blocks = vec![
        Block::leaf("small", 10.0, 10.0),
        Block::leaf("large", 90.0, 40.0),
    ];
    let before = blocks.clone();
    let _ = pack(&blocks, 200.0, true).expect("pack");
    assert_eq!(blocks, before);
}

#[test]
fn unreachable_corner_is_reported_not_panicked() {
    // The only corner free of overlap would widen the level past the limit.
    let blocks = vec![
        Block::leaf("a", 100.0, 10.0),
        Block::leaf("b", 50.0, 200.0),
        Block::leaf("c", 150.0, 10.0),
    ];
    match pack(&blocks, 150.0, false) {
        Err(BlockPackError::NoCandidate { id }) => assert_eq!(id, "c"),
        other => panic!("Expected NoCandidate error, got {other:?}"),
    }
}
