use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in layout units. `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
    pub fn area(&self) -> f64 {
        self.w * self.h
    }
    /// Strict intersection on both axes; rectangles sharing an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
    /// Returns true if `r` lies fully inside `self` (edges inclusive).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Same rectangle moved by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Content block with a measured, fixed size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Leaf {
    pub id: String,
    pub w: f64,
    pub h: f64,
}

/// Nested set of blocks packed on its own; its size is the size of that packing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: String,
    /// Sort children widest-first before packing them.
    #[serde(default)]
    pub sort: bool,
    #[serde(alias = "blocks")]
    pub children: Vec<Block>,
}

/// A rectangle to be placed.
///
/// Deserializes from either `{ "id", "w", "h" }` (leaf) or
/// `{ "id", "sort"?, "children" | "blocks" }` (group).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Block {
    Group(Group),
    Leaf(Leaf),
}

impl Block {
    pub fn leaf(id: impl Into<String>, w: f64, h: f64) -> Self {
        Block::Leaf(Leaf { id: id.into(), w, h })
    }
    pub fn group(id: impl Into<String>, sort: bool, children: Vec<Block>) -> Self {
        Block::Group(Group {
            id: id.into(),
            sort,
            children,
        })
    }
    pub fn id(&self) -> &str {
        match self {
            Block::Leaf(l) => &l.id,
            Block::Group(g) => &g.id,
        }
    }
    pub fn is_group(&self) -> bool {
        matches!(self, Block::Group(_))
    }
}

/// Bounding box and occupancy of one packed level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Root {
    pub w: f64,
    pub h: f64,
    /// Sum of the placed blocks' own areas (a group counts as one rectangle).
    pub filled_area: f64,
    /// `filled_area / (w * h)`, in `(0, 1]`.
    pub fit: f64,
}

impl Root {
    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

/// A block with its resolved frame in the parent's coordinate space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacedBlock {
    pub id: String,
    pub frame: Rect,
    /// Internal arrangement of a group; child frames are local to this block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Arrangement>,
}

impl PlacedBlock {
    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }
}

/// Result of packing one level: placed blocks (in processing order) and the root summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Arrangement {
    pub blocks: Vec<PlacedBlock>,
    pub root: Root,
}

/// A placed block with its frame resolved to the top-level coordinate space.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatBlock {
    pub id: String,
    /// Frame in top-level coordinates.
    pub frame: Rect,
    /// Frame relative to the enclosing group (equal to `frame` at depth 0).
    pub local: Rect,
    pub parent: Option<String>,
    pub depth: usize,
    pub group: bool,
}

impl Arrangement {
    /// Finds a placed block by id anywhere in the tree.
    pub fn find(&self, id: &str) -> Option<&PlacedBlock> {
        for b in &self.blocks {
            if b.id == id {
                return Some(b);
            }
            if let Some(inner) = b.group.as_ref().and_then(|g| g.find(id)) {
                return Some(inner);
            }
        }
        None
    }

    /// Pre-order walk producing absolute frames for every block.
    pub fn flatten(&self) -> Vec<FlatBlock> {
        let mut out = Vec::new();
        flatten_into(self, 0.0, 0.0, None, 0, &mut out);
        out
    }

    /// Computes layout statistics for this arrangement.
    pub fn stats(&self) -> LayoutStats {
        let mut num_leaves = 0;
        let mut num_groups = 0;
        let mut max_depth = 0;
        count_blocks(self, 1, &mut num_leaves, &mut num_groups, &mut max_depth);

        let area = self.root.area();
        LayoutStats {
            num_blocks: num_leaves + num_groups,
            num_leaves,
            num_groups,
            max_depth,
            width: self.root.w,
            height: self.root.h,
            filled_area: self.root.filled_area,
            fit: self.root.fit,
            wasted_area: (area - self.root.filled_area).max(0.0),
        }
    }
}

fn flatten_into(
    arr: &Arrangement,
    ox: f64,
    oy: f64,
    parent: Option<&str>,
    depth: usize,
    out: &mut Vec<FlatBlock>,
) {
    for b in &arr.blocks {
        let abs = b.frame.translate(ox, oy);
        out.push(FlatBlock {
            id: b.id.clone(),
            frame: abs,
            local: b.frame,
            parent: parent.map(str::to_string),
            depth,
            group: b.is_group(),
        });
        if let Some(inner) = &b.group {
            flatten_into(inner, abs.x, abs.y, Some(&b.id), depth + 1, out);
        }
    }
}

fn count_blocks(
    arr: &Arrangement,
    depth: usize,
    leaves: &mut usize,
    groups: &mut usize,
    max_depth: &mut usize,
) {
    *max_depth = (*max_depth).max(depth);
    for b in &arr.blocks {
        match &b.group {
            Some(inner) => {
                *groups += 1;
                count_blocks(inner, depth + 1, leaves, groups, max_depth);
            }
            None => *leaves += 1,
        }
    }
}

/// Statistics about a packed layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Total number of placed blocks at every level (leaves + groups).
    pub num_blocks: usize,
    pub num_leaves: usize,
    pub num_groups: usize,
    /// Number of nesting levels (1 when there are no groups).
    pub max_depth: usize,
    /// Top-level bounding box.
    pub width: f64,
    pub height: f64,
    /// Area covered by top-level blocks.
    pub filled_area: f64,
    /// Occupancy ratio of the top level (0.0 to 1.0).
    pub fit: f64,
    pub wasted_area: f64,
}

impl LayoutStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Blocks: {} ({} leaves, {} groups), Depth: {}, Size: {:.1}x{:.1}, Fit: {:.2}%, Wasted: {:.1}",
            self.num_blocks,
            self.num_leaves,
            self.num_groups,
            self.max_depth,
            self.width,
            self.height,
            self.fit * 100.0,
            self.wasted_area,
        )
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        let total = self.width * self.height;
        if total > 0.0 {
            (self.wasted_area / total) * 100.0
        } else {
            0.0
        }
    }
}
