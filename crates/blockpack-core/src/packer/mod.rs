use tracing::{debug, instrument};

use crate::config::PackerConfig;
use crate::error::{BlockPackError, Result};
use crate::model::{Arrangement, Block, PlacedBlock, Rect, Root};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod corner;

use corner::CornerPacker;

/// Penalty for placing a `w x h` block at `(x, y)` given the current `root`. Lower is better.
///
/// Combines the relative height growth of the level with the area the new
/// bounding box would leave empty: `sqrt(height_increase^2 + (1 - fit)^2)`.
/// The two terms are not normalized to a common scale.
pub fn score(root: &Root, x: f64, y: f64, w: f64, h: f64) -> f64 {
    let new_w = root.w.max(x + w);
    let new_h = root.h.max(y + h);
    let new_fit = (root.filled_area + w * h) / (new_w * new_h);
    let height_increase = new_h / root.h - 1.0;
    (height_increase.powi(2) + (1.0 - new_fit).powi(2)).sqrt()
}

#[instrument(skip_all, fields(count = blocks.len(), max_width = max_width, sort = sort))]
/// Packs `blocks` into a single arrangement no wider than `max_width`.
///
/// Notes:
/// - Groups are packed first (post-order) and then placed as opaque rectangles.
/// - With `sort`, blocks are ordered widest-first, ties broken tallest-first;
///   sizes are rounded for the comparison only. Otherwise input order is kept.
/// - The input is not modified; identical inputs yield identical layouts.
pub fn pack(blocks: &[Block], max_width: f64, sort: bool) -> Result<Arrangement> {
    validate_blocks(blocks, max_width)?;
    pack_level(blocks, max_width, sort, false)
}

#[instrument(skip_all, fields(count = blocks.len()))]
/// Same as [`pack`], driven by a [`PackerConfig`].
///
/// When the crate is built with the `parallel` feature and `cfg.parallel` is set,
/// sibling groups are resolved concurrently; the resulting layout is unchanged.
pub fn pack_with_config(blocks: &[Block], cfg: &PackerConfig) -> Result<Arrangement> {
    cfg.validate()?;
    validate_blocks(blocks, cfg.max_width)?;
    pack_level(blocks, cfg.max_width, cfg.sort, cfg.parallel)
}

/// Rejects malformed input before any placement happens.
pub fn validate_blocks(blocks: &[Block], max_width: f64) -> Result<()> {
    if !(max_width.is_finite() && max_width > 0.0) {
        return Err(BlockPackError::InvalidMaxWidth(max_width));
    }
    if blocks.is_empty() {
        return Err(BlockPackError::Empty);
    }
    validate_level(blocks)
}

fn validate_level(blocks: &[Block]) -> Result<()> {
    for b in blocks {
        match b {
            Block::Leaf(l) => {
                let valid = |v: f64| v.is_finite() && v > 0.0;
                if !valid(l.w) || !valid(l.h) {
                    return Err(BlockPackError::InvalidDimensions {
                        id: l.id.clone(),
                        w: l.w,
                        h: l.h,
                    });
                }
            }
            Block::Group(g) => {
                if g.children.is_empty() {
                    return Err(BlockPackError::EmptyGroup { id: g.id.clone() });
                }
                validate_level(&g.children)?;
            }
        }
    }
    Ok(())
}

/// A block whose size is known: leaves as given, groups after packing their children.
struct Item {
    id: String,
    w: f64,
    h: f64,
    group: Option<Arrangement>,
}

fn pack_level(blocks: &[Block], max_width: f64, sort: bool, parallel: bool) -> Result<Arrangement> {
    let mut items = resolve(blocks, max_width, parallel)?;
    if sort {
        sort_widest_first(&mut items);
    }

    let mut items = items.into_iter();
    let first = items.next().ok_or(BlockPackError::Empty)?;
    let mut packer = CornerPacker::new(max_width, &first.id, first.w, first.h)?;
    let mut placed = Vec::with_capacity(blocks.len());
    placed.push(PlacedBlock {
        frame: Rect::new(0.0, 0.0, first.w, first.h),
        id: first.id,
        group: first.group,
    });

    for item in items {
        let frame = packer.place(&item.id, item.w, item.h)?;
        placed.push(PlacedBlock {
            id: item.id,
            frame,
            group: item.group,
        });
    }

    let root = packer.root();
    debug!(blocks = placed.len(), w = root.w, h = root.h, fit = root.fit, "level packed");
    Ok(Arrangement {
        blocks: placed,
        root,
    })
}

fn resolve(blocks: &[Block], max_width: f64, parallel: bool) -> Result<Vec<Item>> {
    #[cfg(feature = "parallel")]
    {
        if parallel && blocks.iter().filter(|b| b.is_group()).count() > 1 {
            return blocks
                .par_iter()
                .map(|b| resolve_one(b, max_width, parallel))
                .collect();
        }
    }
    blocks
        .iter()
        .map(|b| resolve_one(b, max_width, parallel))
        .collect()
}

fn resolve_one(block: &Block, max_width: f64, parallel: bool) -> Result<Item> {
    match block {
        Block::Leaf(l) => Ok(Item {
            id: l.id.clone(),
            w: l.w,
            h: l.h,
            group: None,
        }),
        Block::Group(g) => {
            debug!(id = %g.id, children = g.children.len(), "resolving group");
            let inner = pack_level(&g.children, max_width, g.sort, parallel)?;
            Ok(Item {
                id: g.id.clone(),
                w: inner.root.w,
                h: inner.root.h,
                group: Some(inner),
            })
        }
    }
}

fn sort_widest_first(items: &mut [Item]) {
    items.sort_by(|a, b| {
        b.w.round()
            .total_cmp(&a.w.round())
            .then_with(|| b.h.round().total_cmp(&a.h.round()))
    });
}
