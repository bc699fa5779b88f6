// crates/forge-export/src/exporter.rs

use std::fs;
use std::path::PathBuf;
use log::{debug, info};
use tempfile::TempDir;
use thiserror::Error;
use forge_core::error::PipelineError;
use forge_core::pipeline::{MeshDecoder, PipelineOutput};
use crate::bounding_box::BoundingBox;
use crate::container::{AssetBackend, ContainerRequest, RemeshPolicy, WriteOptions};
use crate::glb;

pub const OUTPUT_FILE_NAME: &str = "output.glb";
const WORKSPACE_PREFIX: &str = "forge-export-";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to create export workspace: {0}")]
    Workspace(std::io::Error),
    #[error(transparent)]
    Decode(#[from] PipelineError),
    #[error("asset export failed: {0}")]
    Container(String),
    #[error("failed to write asset: {0}")]
    Write(String),
    #[error("failed to read back asset: {0}")]
    ReadBack(std::io::Error),
    #[error("exported asset is not a GLB container")]
    MalformedAsset,
}

/// Turns pipeline latents into GLB bytes.
///
/// Each call works inside its own temporary directory which is removed when
/// the call returns, fails or unwinds.
pub struct AssetExporter {
    backend: Box<dyn AssetBackend>,
    workspace_root: Option<PathBuf>,
    write_options: WriteOptions,
}

impl AssetExporter {
    pub fn new(backend: Box<dyn AssetBackend>) -> Self {
        Self {
            backend,
            workspace_root: None,
            write_options: WriteOptions::default(),
        }
    }

    /// Create workspaces under `root` instead of the system temp dir.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn export<D: MeshDecoder + ?Sized>(
        &self,
        decoder: &D,
        output: PipelineOutput,
        decimation_target: u32,
        texture_size: u32,
    ) -> Result<Vec<u8>, ExportError> {
        let workspace = self.workspace()?;
        debug!("Export workspace at {}", workspace.path().display());

        let mesh = decoder.decode_latent(output)?;

        let request = ContainerRequest {
            mesh: &mesh,
            attr_layout: decoder.attribute_layout(),
            grid_size: mesh.grid_resolution,
            aabb: BoundingBox::UNIT,
            decimation_target,
            texture_size,
            remesh: RemeshPolicy::DEFAULT,
            use_tqdm: false,
        };
        let container = self
            .backend
            .to_asset_container(&request)
            .map_err(ExportError::Container)?;

        let glb_path = workspace.path().join(OUTPUT_FILE_NAME);
        container
            .write_to_file(&glb_path, &self.write_options)
            .map_err(ExportError::Write)?;

        let bytes = fs::read(&glb_path).map_err(ExportError::ReadBack)?;
        let header = match glb::parse_header(&bytes) {
            Some(header) if header.length as usize == bytes.len() => header,
            _ => return Err(ExportError::MalformedAsset),
        };

        info!(
            "Exported GLB v{} ({} bytes, grid {})",
            header.version,
            bytes.len(),
            mesh.grid_resolution
        );
        Ok(bytes)
    }

    fn workspace(&self) -> Result<TempDir, ExportError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let workspace = match &self.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        workspace.map_err(ExportError::Workspace)
    }
}
