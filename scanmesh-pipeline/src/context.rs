//! Regeneration state for a host that displays the mesh

use crate::assembler::{AssemblyReport, MeshAssembler};
use crate::config::AssemblerConfig;
use scanmesh_core::{FinalMesh, Result};
use std::path::PathBuf;

/// A scan source, its settings and the most recently built mesh.
///
/// `regenerate` can be called any number of times, for example after the
/// user changes the reduction settings. A failed regeneration leaves the
/// previous mesh in place.
#[derive(Debug, Clone)]
pub struct MeshContext {
    pub config: AssemblerConfig,
    pub source_path: PathBuf,
    /// Texture image to apply once a mesh exists; loading it is up to the host
    pub texture_path: Option<PathBuf>,
    current: Option<FinalMesh>,
    last_report: Option<AssemblyReport>,
}

impl MeshContext {
    pub fn new(source_path: impl Into<PathBuf>, config: AssemblerConfig) -> Self {
        Self {
            config,
            source_path: source_path.into(),
            texture_path: None,
            current: None,
            last_report: None,
        }
    }

    pub fn with_texture(mut self, texture_path: impl Into<PathBuf>) -> Self {
        self.texture_path = Some(texture_path.into());
        self
    }

    /// Rebuild the mesh from the source with the current configuration
    pub fn regenerate(&mut self) -> Result<&FinalMesh> {
        let assembly = MeshAssembler::new(self.config)
            .and_then(|assembler| assembler.assemble_path(&self.source_path));
        let assembly = match assembly {
            Ok(assembly) => assembly,
            Err(e) => {
                tracing::error!(
                    path = %self.source_path.display(),
                    error = %e,
                    kept_previous = self.current.is_some(),
                    "mesh regeneration failed"
                );
                return Err(e);
            }
        };

        self.last_report = Some(assembly.report);
        Ok(self.current.insert(assembly.mesh))
    }

    /// The last successfully built mesh
    pub fn current(&self) -> Option<&FinalMesh> {
        self.current.as_ref()
    }

    pub fn last_report(&self) -> Option<&AssemblyReport> {
        self.last_report.as_ref()
    }

    /// Hand the current mesh to the caller, leaving the context empty
    pub fn take_current(&mut self) -> Option<FinalMesh> {
        self.last_report = None;
        self.current.take()
    }
}
