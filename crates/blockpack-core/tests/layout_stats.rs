use blockpack_core::prelude::*;

#[test]
fn test_layout_stats_basic() {
    let blocks: Vec<Block> = (0..4)
        .map(|i| Block::leaf(format!("b{i}"), 64.0, 64.0))
        .collect();
    let out = pack(&blocks, 128.0, true).expect("packing should succeed");
    let stats = out.stats();

    assert_eq!(stats.num_blocks, 4);
    assert_eq!(stats.num_leaves, 4);
    assert_eq!(stats.num_groups, 0);
    assert_eq!(stats.max_depth, 1);
    assert_eq!(stats.width, 128.0);
    assert_eq!(stats.height, 128.0);
    assert_eq!(stats.filled_area, 4.0 * 64.0 * 64.0);
    assert_eq!(stats.fit, 1.0);
    assert_eq!(stats.wasted_area, 0.0);
    assert_eq!(stats.waste_percentage(), 0.0);
}

#[test]
fn test_layout_stats_with_groups() {
    let blocks = vec![
        Block::leaf("a", 100.0, 50.0),
        Block::group(
            "g",
            true,
            vec![
                Block::leaf("b", 30.0, 30.0),
                Block::group("h", true, vec![Block::leaf("c", 10.0, 10.0)]),
            ],
        ),
    ];
    let stats = pack(&blocks, 400.0, true).expect("pack").stats();
    assert_eq!(stats.num_leaves, 3);
    assert_eq!(stats.num_groups, 2);
    assert_eq!(stats.num_blocks, 5);
    assert_eq!(stats.max_depth, 3);
    assert!(stats.fit > 0.0 && stats.fit <= 1.0);
}

#[test]
fn test_layout_stats_summary() {
    let blocks = vec![Block::leaf("a", 100.0, 20.0), Block::leaf("b", 50.0, 50.0)];
    let stats = pack(&blocks, 120.0, true).expect("pack").stats();
    let summary = stats.summary();
    assert!(summary.contains("Blocks: 2"));
    assert!(summary.contains("Fit:"));
    assert!(stats.wasted_area > 0.0);
    assert!(stats.waste_percentage() > 0.0 && stats.waste_percentage() < 100.0);
}
