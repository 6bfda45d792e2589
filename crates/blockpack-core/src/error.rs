use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockPackError {
    #[error("Element [id = {id}] exceeds max_width ({max_width})")]
    Oversize { id: String, max_width: f64 },
    #[error("Nothing to pack")]
    Empty,
    #[error("Group [id = {id}] has no blocks to pack")]
    EmptyGroup { id: String },
    #[error("Invalid max_width: {0} (must be positive and finite)")]
    InvalidMaxWidth(f64),
    #[error("Invalid dimensions for [id = {id}]: {w}x{h}")]
    InvalidDimensions { id: String, w: f64, h: f64 },
    #[error("No free corner left for [id = {id}]")]
    NoCandidate { id: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BlockPackError {
    /// True for the layout failure callers are expected to surface to users,
    /// as opposed to malformed input.
    pub fn is_oversize(&self) -> bool {
        matches!(self, Self::Oversize { .. })
    }
}

pub type Result<T> = std::result::Result<T, BlockPackError>;
