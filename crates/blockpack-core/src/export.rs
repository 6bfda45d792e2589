use crate::model::{Arrangement, PlacedBlock};
use serde_json::{json, Value};

fn meta() -> Value {
    json!({
        "app": "blockpack",
        "version": env!("CARGO_PKG_VERSION"),
        "schema_version": "1",
    })
}

fn root_value(arrangement: &Arrangement) -> Value {
    let r = &arrangement.root;
    json!({"w": r.w, "h": r.h, "filledArea": r.filled_area, "fit": r.fit})
}

fn block_value(b: &PlacedBlock) -> Value {
    let frame = json!({"x": b.frame.x, "y": b.frame.y, "w": b.frame.w, "h": b.frame.h});
    match &b.group {
        Some(inner) => json!({
            "id": b.id,
            "frame": frame,
            "group": {
                "root": root_value(inner),
                "blocks": inner.blocks.iter().map(block_value).collect::<Vec<_>>(),
            }
        }),
        None => json!({"id": b.id, "frame": frame}),
    }
}

/// Serialize the arrangement as nested JSON `{ root, blocks, meta }`.
/// Group children appear under `group.blocks` with frames local to the group.
pub fn to_json_tree(arrangement: &Arrangement) -> Value {
    let blocks: Vec<Value> = arrangement.blocks.iter().map(block_value).collect();
    json!({"root": root_value(arrangement), "blocks": blocks, "meta": meta()})
}

/// Flatten every block keyed by id with absolute and local frames.
/// Shape: `{ blocks: { id: { frame, local, parent, depth, group } }, root, meta }`.
pub fn to_json_flat(arrangement: &Arrangement) -> Value {
    let mut blocks = serde_json::Map::new();
    for fb in arrangement.flatten() {
        let frame = json!({"x": fb.frame.x, "y": fb.frame.y, "w": fb.frame.w, "h": fb.frame.h});
        let local = json!({"x": fb.local.x, "y": fb.local.y, "w": fb.local.w, "h": fb.local.h});
        blocks.insert(
            fb.id,
            json!({
                "frame": frame,
                "local": local,
                "parent": fb.parent,
                "depth": fb.depth,
                "group": fb.group,
            }),
        );
    }
    json!({"blocks": blocks, "root": root_value(arrangement), "meta": meta()})
}
