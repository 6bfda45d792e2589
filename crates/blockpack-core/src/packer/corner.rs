use tracing::trace;

use super::score;
use crate::error::{BlockPackError, Result};
use crate::model::{Rect, Root};

/// Prospective top-left position for the next block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Corner {
    pub x: f64,
    pub y: f64,
}

/// Placement state for a single level.
///
/// Every placed block contributes its top-right and bottom-left corners as
/// candidates for the blocks after it. Each new block goes to the surviving
/// candidate with the lowest [`score`]; the winning corner is consumed.
pub struct CornerPacker {
    max_width: f64,
    placed: Vec<Rect>,
    candidates: Vec<Corner>,
    root: Root,
}

impl CornerPacker {
    /// Seeds the level with its first block at `(0, 0)`.
    pub fn new(max_width: f64, id: &str, w: f64, h: f64) -> Result<Self> {
        check_width(id, w, max_width)?;
        Ok(Self {
            max_width,
            placed: vec![Rect::new(0.0, 0.0, w, h)],
            candidates: Vec::new(),
            root: Root {
                w,
                h,
                filled_area: w * h,
                fit: 1.0,
            },
        })
    }

    pub fn root(&self) -> Root {
        self.root
    }

    pub fn placed(&self) -> &[Rect] {
        &self.placed
    }

    /// Free corners in the order they will be tried next (top-most, then left-most).
    pub fn candidates(&self) -> &[Corner] {
        &self.candidates
    }

    /// Places the next block and returns its frame.
    pub fn place(&mut self, id: &str, w: f64, h: f64) -> Result<Rect> {
        check_width(id, w, self.max_width)?;

        if let Some(last) = self.placed.last().copied() {
            self.candidates.push(Corner {
                x: last.right(),
                y: last.y,
            });
            self.candidates.push(Corner {
                x: last.x,
                y: last.bottom(),
            });
        }
        self.candidates
            .sort_by(|a, b| a.y.total_cmp(&b.y).then_with(|| a.x.total_cmp(&b.x)));

        let (idx, best_score) = self
            .find_best(w, h)
            .ok_or_else(|| BlockPackError::NoCandidate { id: id.to_string() })?;
        let pos = self.candidates.remove(idx);
        let frame = Rect::new(pos.x, pos.y, w, h);
        trace!(id, x = pos.x, y = pos.y, score = best_score, "placed block");

        self.root.w = self.root.w.max(frame.right());
        self.root.h = self.root.h.max(frame.bottom());
        self.root.filled_area += frame.area();
        self.root.fit = self.root.filled_area / self.root.area();
        self.placed.push(frame);
        Ok(frame)
    }

    fn find_best(&self, w: f64, h: f64) -> Option<(usize, f64)> {
        let mut best_score = f64::INFINITY;
        let mut best_index: Option<usize> = None;
        for (i, c) in self.candidates.iter().enumerate() {
            let r = Rect::new(c.x, c.y, w, h);
            if self.placed.iter().any(|p| p.overlaps(&r)) {
                continue;
            }
            if self.root.w.max(r.right()) > self.max_width {
                continue;
            }
            let s = score(&self.root, c.x, c.y, w, h);
            if s < best_score {
                best_score = s;
                best_index = Some(i);
            }
        }
        best_index.map(|i| (i, best_score))
    }
}

fn check_width(id: &str, w: f64, max_width: f64) -> Result<()> {
    if w > max_width {
        return Err(BlockPackError::Oversize {
            id: id.to_string(),
            max_width,
        });
    }
    Ok(())
}
