//! Core library for packing content blocks into compact, width-bounded layouts.
//!
//! - Engine: greedy corner-candidate placement with a joint height-growth / fill score
//! - Groups: nested block lists are packed first and then placed as one opaque rectangle
//! - Pipeline: `Container::layout` turns an element tree into blocks, packs it and writes frames back
//! - Data model is serde-serializable; JSON exporters are provided in `export`.
//!
//! Quick example:
//! ```
//! use blockpack_core::{Block, pack};
//! # fn main() -> blockpack_core::Result<()> {
//! let blocks = vec![
//!     Block::leaf("a", 200.0, 100.0),
//!     Block::leaf("b", 150.0, 80.0),
//!     Block::group("g", true, vec![Block::leaf("c", 60.0, 40.0), Block::leaf("d", 60.0, 40.0)]),
//! ];
//! let out = pack(&blocks, 400.0, true)?;
//! assert!(out.root.w <= 400.0);
//! println!("fit: {:.3}", out.root.fit);
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `blockpack_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{PackerConfig, PackerConfigBuilder};
    pub use crate::error::{BlockPackError, Result};
    pub use crate::export::{to_json_flat, to_json_tree};
    pub use crate::model::{
        Arrangement, Block, FlatBlock, Group, LayoutStats, Leaf, PlacedBlock, Rect, Root,
    };
    pub use crate::packer::{pack, pack_with_config, validate_blocks};
    pub use crate::pipeline::{Container, Element, ElementKind, elements_to_blocks, place_blocks};
}
