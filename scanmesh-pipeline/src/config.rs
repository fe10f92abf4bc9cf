//! Assembly configuration
//!
//! Every field has a default, so a TOML file only needs the keys it changes:
//!
//! ```toml
//! strategy = "uniform"
//! reduction_factor = 0.25
//!
//! [expand]
//! alignment = "triangles_only"
//! ```

use scanmesh_core::{Error, ExpandOptions, Result};
use scanmesh_simplification::Simplification;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reduction strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReductionMode {
    /// Keep every triangle
    None,
    /// Keep every Nth triangle
    Uniform,
    /// Merge vertices on a voxel grid
    #[default]
    Voxel,
}

/// Configuration for [`MeshAssembler`](crate::MeshAssembler)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Master switch for reduction
    pub reduce: bool,
    pub strategy: ReductionMode,
    /// Share of triangles to keep, in (0, 1]
    pub reduction_factor: f32,
    /// Absolute triangle budget; takes precedence over `reduction_factor` when non-zero
    pub target_triangle_count: Option<usize>,
    pub expand: ExpandOptions,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            reduce: true,
            strategy: ReductionMode::Voxel,
            reduction_factor: 0.5,
            target_triangle_count: None,
            expand: ExpandOptions::default(),
        }
    }
}

impl AssemblerConfig {
    /// Configuration that skips reduction entirely
    pub fn unreduced() -> Self {
        Self {
            reduce: false,
            ..Self::default()
        }
    }

    /// Parse a TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AssemblerConfig = toml::from_str(content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        let f = self.reduction_factor;
        if !(f > 0.0 && f <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "reduction_factor must be in (0, 1], got {}",
                f
            )));
        }
        Ok(())
    }

    /// Triangle budget for a mesh with `total_triangles`, clamped to `[1, total]`
    pub fn resolve_target(&self, total_triangles: usize) -> usize {
        let upper = total_triangles.max(1);
        match self.target_triangle_count {
            Some(n) if n > 0 => n.clamp(1, upper),
            _ => {
                let scaled = (total_triangles as f64 * self.reduction_factor as f64).round_ties_even();
                (scaled as usize).clamp(1, upper)
            }
        }
    }

    /// The reduction to run for a mesh with `total_triangles`
    pub fn simplification(&self, total_triangles: usize) -> Simplification {
        if !self.reduce {
            return Simplification::None;
        }
        let target = self.resolve_target(total_triangles);
        if target >= total_triangles {
            return Simplification::None;
        }
        match self.strategy {
            ReductionMode::None => Simplification::None,
            ReductionMode::Uniform => Simplification::Uniform(target),
            ReductionMode::Voxel => Simplification::Voxel(target),
        }
    }
}
