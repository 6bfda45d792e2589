use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::config::PackerConfig;
use crate::error::Result;
use crate::model::{Arrangement, Block, Rect};
use crate::packer::pack_with_config;

/// Node of the render tree being laid out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Element {
    pub id: String,
    /// Hidden elements are neither packed nor repositioned.
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Position (and size) written back after packing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Rect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ElementKind {
    Group {
        #[serde(default)]
        sort: bool,
        children: Vec<Element>,
    },
    /// Measured content box.
    Content { w: f64, h: f64 },
}

impl Element {
    pub fn content(id: impl Into<String>, w: f64, h: f64) -> Self {
        Self {
            id: id.into(),
            visible: true,
            kind: ElementKind::Content { w, h },
            frame: None,
        }
    }

    pub fn group(id: impl Into<String>, sort: bool, children: Vec<Element>) -> Self {
        Self {
            id: id.into(),
            visible: true,
            kind: ElementKind::Group { sort, children },
            frame: None,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn children(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Group { children, .. } => children,
            ElementKind::Content { .. } => &[],
        }
    }
}

impl From<Block> for Element {
    fn from(block: Block) -> Self {
        match block {
            Block::Leaf(l) => Element::content(l.id, l.w, l.h),
            Block::Group(g) => Element::group(
                g.id,
                g.sort,
                g.children.into_iter().map(Element::from).collect(),
            ),
        }
    }
}

fn default_visible() -> bool {
    true
}

fn default_max_content_width() -> f64 {
    100.0
}

/// Top-level element whose children are packed together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Container {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sort: bool,
    /// Width limit as a percentage of the viewport width.
    #[serde(default = "default_max_content_width")]
    pub max_content_width: f64,
    pub children: Vec<Element>,
    /// Own size after packing (`root.w x root.h` at the origin).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Rect>,
}

impl Container {
    pub fn new(id: impl Into<String>, children: Vec<Element>) -> Self {
        Self {
            id: id.into(),
            sort: false,
            max_content_width: default_max_content_width(),
            children,
            frame: None,
        }
    }

    /// Parses a container from JSON.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Config derived from this container: width from the viewport, sort flag from the container.
    pub fn config_for_viewport(&self, viewport_width: f64) -> PackerConfig {
        PackerConfig {
            sort: self.sort,
            ..PackerConfig::from_viewport(viewport_width, self.max_content_width)
        }
    }

    /// Packs the visible children for the given viewport, writes positions back and
    /// returns the resulting fit. Returns `0.0` when nothing is visible.
    pub fn fit(&mut self, viewport_width: f64) -> Result<f64> {
        let cfg = self.config_for_viewport(viewport_width);
        Ok(self.layout(&cfg)?.map(|a| a.root.fit).unwrap_or(0.0))
    }

    #[instrument(skip_all, fields(id = %self.id))]
    /// Packs the visible children with `cfg` and writes positions back.
    /// Returns `None` when there is nothing visible to pack.
    pub fn layout(&mut self, cfg: &PackerConfig) -> Result<Option<Arrangement>> {
        let blocks = elements_to_blocks(&self.children);
        if blocks.is_empty() {
            return Ok(None);
        }
        let arrangement = pack_with_config(&blocks, cfg)?;
        self.frame = Some(Rect::new(
            0.0,
            0.0,
            arrangement.root.w,
            arrangement.root.h,
        ));
        place_blocks(&mut self.children, &arrangement);
        Ok(Some(arrangement))
    }
}

/// Parses a bare block list from JSON.
pub fn blocks_from_json_str(s: &str) -> Result<Vec<Block>> {
    Ok(serde_json::from_str(s)?)
}

/// Converts visible elements into blocks. Hidden elements are skipped, and so
/// are groups left without any visible descendant content.
pub fn elements_to_blocks(elements: &[Element]) -> Vec<Block> {
    let mut out = Vec::with_capacity(elements.len());
    for el in elements {
        if !el.visible {
            continue;
        }
        match &el.kind {
            ElementKind::Content { w, h } => out.push(Block::leaf(el.id.clone(), *w, *h)),
            ElementKind::Group { sort, children } => {
                let inner = elements_to_blocks(children);
                if inner.is_empty() {
                    continue;
                }
                out.push(Block::group(el.id.clone(), *sort, inner));
            }
        }
    }
    out
}

/// Writes packed frames onto the matching elements, recursing into groups.
/// Returns the number of elements updated.
pub fn place_blocks(elements: &mut [Element], arrangement: &Arrangement) -> usize {
    let index: HashMap<String, usize> = elements
        .iter()
        .enumerate()
        .map(|(i, el)| (el.id.clone(), i))
        .collect();

    let mut updated = 0;
    for placed in &arrangement.blocks {
        let Some(&i) = index.get(&placed.id) else {
            warn!(id = %placed.id, "no element for placed block");
            continue;
        };
        let el = &mut elements[i];
        el.frame = Some(placed.frame);
        updated += 1;
        if let (Some(inner), ElementKind::Group { children, .. }) = (&placed.group, &mut el.kind) {
            updated += place_blocks(children, inner);
        }
    }
    updated
}
