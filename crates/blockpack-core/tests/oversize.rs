use blockpack_core::prelude::*;

#[test]
fn first_block_wider_than_limit() {
    let blocks = vec![Block::leaf("wide", 600.0, 50.0)];
    let err = pack(&blocks, 400.0, true).unwrap_err();
    match err {
        BlockPackError::Oversize { ref id, max_width } => {
            assert_eq!(id, "wide");
            assert_eq!(max_width, 400.0);
        }
        _ => panic!("Expected Oversize error"),
    }
    assert!(err.is_oversize());
    assert_eq!(err.to_string(), "Element [id = wide] exceeds max_width (400)");
}

#[test]
fn later_block_wider_than_limit() {
    let blocks = vec![
        Block::leaf("ok", 100.0, 100.0),
        Block::leaf("too_wide", 401.0, 10.0),
    ];
    // Unsorted so the wide block is not moved to the front.
    match pack(&blocks, 400.0, false) {
        Err(BlockPackError::Oversize { id, .. }) => assert_eq!(id, "too_wide"),
        other => panic!("Expected Oversize error, got {other:?}"),
    }
}

#[test]
fn last_block_wider_than_limit() {
    let blocks = vec![
        Block::leaf("a", 100.0, 100.0),
        Block::leaf("b", 100.0, 100.0),
        Block::leaf("c", 500.0, 10.0),
    ];
    match pack(&blocks, 400.0, false) {
        Err(BlockPackError::Oversize { id, .. }) => assert_eq!(id, "c"),
        other => panic!("Expected Oversize error, got {other:?}"),
    }
}

#[test]
fn exactly_max_width_fits() {
    let blocks = vec![Block::leaf("edge", 400.0, 10.0)];
    let out = pack(&blocks, 400.0, true).expect("pack");
    assert_eq!(out.root.w, 400.0);
}

#[test]
fn oversize_inside_group_fails_the_whole_call() {
    let blocks = vec![
        Block::leaf("fine", 50.0, 50.0),
        Block::group(
            "outer",
            false,
            vec![Block::group(
                "inner",
                true,
                vec![Block::leaf("x", 10.0, 10.0), Block::leaf("boom", 450.0, 10.0)],
            )],
        ),
    ];
    match pack(&blocks, 400.0, true) {
        Err(BlockPackError::Oversize { id, max_width }) => {
            assert_eq!(id, "boom");
            assert_eq!(max_width, 400.0);
        }
        other => panic!("Expected Oversize error, got {other:?}"),
    }
}
