use blockpack_core::prelude::*;
use blockpack_core::pipeline::blocks_from_json_str;

#[test]
fn hidden_elements_are_skipped() {
    let elements = vec![
        Element::content("a", 10.0, 10.0),
        Element::content("ghost", 500.0, 500.0).hidden(),
        Element::group("g", false, vec![Element::content("b", 5.0, 5.0)]).hidden(),
    ];
    let blocks = elements_to_blocks(&elements);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id(), "a");
}

#[test]
fn groups_without_visible_children_are_skipped() {
    let elements = vec![
        Element::content("a", 10.0, 10.0),
        Element::group("empty", false, vec![]),
        Element::group(
            "all_hidden",
            false,
            vec![Element::content("h", 5.0, 5.0).hidden()],
        ),
        Element::group(
            "nested_empty",
            true,
            vec![Element::group("inner", false, vec![])],
        ),
        Element::group("kept", true, vec![Element::content("k", 5.0, 5.0)]),
    ];
    let blocks = elements_to_blocks(&elements);
    let ids: Vec<&str> = blocks.iter().map(|b| b.id()).collect();
    assert_eq!(ids, vec!["a", "kept"]);
    assert!(blocks[1].is_group());
}

#[test]
fn layout_writes_frames_back() {
    let mut container = Container::new(
        "root",
        vec![
            Element::content("A", 200.0, 100.0),
            Element::group(
                "G",
                false,
                vec![Element::content("g1", 40.0, 40.0), Element::content("g2", 40.0, 40.0)],
            ),
            Element::content("hidden", 10.0, 10.0).hidden(),
        ],
    );
    let cfg = PackerConfig::builder().max_width(400.0).sort(false).build();
    let arr = container.layout(&cfg).expect("layout").expect("something visible");

    let frame = container.frame.expect("container sized");
    assert_eq!((frame.w, frame.h), (arr.root.w, arr.root.h));

    assert_eq!(
        container.children[0].frame,
        Some(Rect::new(0.0, 0.0, 200.0, 100.0))
    );
    let g = &container.children[1];
    assert_eq!(g.frame, Some(Rect::new(200.0, 0.0, 80.0, 40.0)));
    assert_eq!(g.children()[1].frame, Some(Rect::new(40.0, 0.0, 40.0, 40.0)));
    assert_eq!(container.children[2].frame, None);
}

#[test]
fn fit_uses_viewport_fraction() {
    let mut container = Container::new(
        "root",
        vec![
            Element::content("A", 200.0, 100.0),
            Element::content("B", 150.0, 80.0),
        ],
    );
    container.sort = true;
    // 50% of 600 leaves 300: B no longer fits beside A.
    container.max_content_width = 50.0;
    let fit = container.fit(600.0).expect("fit");
    assert_eq!(
        container.children[1].frame,
        Some(Rect::new(0.0, 100.0, 150.0, 80.0))
    );
    assert!((fit - 32_000.0 / 36_000.0).abs() < 1e-9);

    // 100% of 800 lets B sit beside A.
    container.max_content_width = 100.0;
    container.fit(800.0).expect("fit");
    assert_eq!(
        container.children[1].frame,
        Some(Rect::new(200.0, 0.0, 150.0, 80.0))
    );
}

#[test]
fn nothing_visible_fits_to_zero() {
    let mut container = Container::new("root", vec![Element::content("a", 1.0, 1.0).hidden()]);
    assert_eq!(container.fit(1000.0).expect("fit"), 0.0);
    assert_eq!(container.frame, None);

    let mut empty = Container::new("root", vec![]);
    assert_eq!(empty.fit(1000.0).expect("fit"), 0.0);
}

#[test]
fn oversize_reaches_the_caller() {
    let mut container = Container::new("root", vec![Element::content("huge", 900.0, 10.0)]);
    container.max_content_width = 50.0;
    let err = container.fit(1000.0).unwrap_err();
    assert!(err.is_oversize());
    assert!(err.to_string().contains("huge"));
}

#[test]
fn container_json_roundtrip_shape() {
    let json = r#"{
        "id": "main",
        "sort": true,
        "max_content_width": 80,
        "children": [
            {"id": "a", "w": 120, "h": 40},
            {"id": "b", "w": 60.5, "h": 30, "visible": false},
            {"id": "g", "sort": true, "children": [
                {"id": "c", "w": 30, "h": 30},
                {"id": "d", "w": 30, "h": 30}
            ]}
        ]
    }"#;
    let mut container = Container::from_json_str(json).expect("parse");
    assert_eq!(container.max_content_width, 80.0);
    assert!(!container.children[1].visible);
    assert!(matches!(container.children[2].kind, ElementKind::Group { sort: true, .. }));

    let fit = container.fit(1000.0).expect("fit");
    assert!(fit > 0.0 && fit <= 1.0);
    assert!(container.children[2].frame.is_some());
}

#[test]
fn raw_block_list_accepts_group_aliases() {
    let json = r#"[
        {"id": "a", "w": 10, "h": 10},
        {"id": "g", "group": true, "sort": false, "blocks": [{"id": "b", "w": 5, "h": 5}]}
    ]"#;
    let blocks = blocks_from_json_str(json).expect("parse");
    assert!(!blocks[0].is_group());
    match &blocks[1] {
        Block::Group(g) => {
            assert_eq!(g.children.len(), 1);
            assert!(!g.sort);
        }
        _ => panic!("Expected group"),
    }
    assert!(blocks_from_json_str("{not json").is_err());
}

#[test]
fn elements_convert_from_blocks() {
    let block = Block::group("g", true, vec![Block::leaf("x", 3.0, 4.0)]);
    let el = Element::from(block);
    assert_eq!(el.id, "g");
    assert_eq!(el.children().len(), 1);
    assert!(el.visible);
}
