use serde::{Deserialize, Serialize};

/// Packing configuration.
/// Key notes:
///   - `max_width` bounds the width of every packed level, nested groups included
///   - `sort` applies to the top level only; groups carry their own flag
///   - `parallel` resolves sibling groups concurrently when the `parallel` feature is on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackerConfig {
    /// Maximum layout width in layout units.
    pub max_width: f64,
    /// Sort top-level blocks widest-first (ties: tallest first).
    #[serde(default = "default_sort")]
    pub sort: bool,
    /// Enable parallel group resolution when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: 1024.0,
            sort: default_sort(),
            parallel: default_parallel(),
        }
    }
}

impl PackerConfig {
    /// Derives the width limit as `max_content_width_pct` percent of the viewport width.
    pub fn from_viewport(viewport_width: f64, max_content_width_pct: f64) -> Self {
        Self {
            max_width: viewport_width * (max_content_width_pct / 100.0),
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if `max_width` is zero, negative, NaN or infinite.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::BlockPackError;

        if !(self.max_width.is_finite() && self.max_width > 0.0) {
            return Err(BlockPackError::InvalidMaxWidth(self.max_width));
        }
        Ok(())
    }
}

fn default_sort() -> bool {
    true
}
fn default_parallel() -> bool {
    false
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn max_width(mut self, v: f64) -> Self {
        self.cfg.max_width = v;
        self
    }
    pub fn sort(mut self, v: bool) -> Self {
        self.cfg.sort = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
