//! Seams to the mesh post-processing and GLB export collaborator.

use std::path::Path;
use serde::Serialize;
use forge_core::pipeline::{AttributeLayout, DecodedMesh};
use crate::bounding_box::BoundingBox;

/// Remeshing applied before decimation. Fixed for every job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemeshPolicy {
    pub remesh: bool,
    /// Narrow band width, in voxels.
    pub remesh_band: f32,
    pub remesh_project: f32,
}

impl RemeshPolicy {
    pub const DEFAULT: Self = Self {
        remesh: true,
        remesh_band: 1.0,
        remesh_project: 0.0,
    };
}

/// Everything the export collaborator needs to build one asset container.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerRequest<'a> {
    #[serde(flatten)]
    pub mesh: &'a DecodedMesh,
    pub attr_layout: &'a AttributeLayout,
    pub grid_size: u32,
    pub aabb: BoundingBox,
    pub decimation_target: u32,
    pub texture_size: u32,
    #[serde(flatten)]
    pub remesh: RemeshPolicy,
    pub use_tqdm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteOptions {
    /// Store textures as WebP inside the GLB.
    pub extension_webp: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { extension_webp: true }
    }
}

/// A built asset that can only be persisted through a file.
pub trait AssetContainer {
    fn write_to_file(&self, path: &Path, options: &WriteOptions) -> Result<(), String>;
}

pub trait AssetBackend: Send {
    fn to_asset_container(&self, request: &ContainerRequest<'_>) -> Result<Box<dyn AssetContainer>, String>;
}
