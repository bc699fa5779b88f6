//! Seams to the generative pipeline collaborator.
//!
//! Latents and decoded meshes live on the accelerator side; this layer only
//! ever holds [`TensorRef`] handles to them.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::stage::PipelineCallSpec;

/// Opaque handle to a tensor owned by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorRef {
    pub id: String,
    #[serde(default)]
    pub shape: Vec<usize>,
}

/// Latents returned by a full pipeline run. Consumed exactly once by the exporter.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOutput {
    #[serde(rename = "shape_slat")]
    pub shape_latent: TensorRef,
    #[serde(rename = "tex_slat")]
    pub texture_latent: TensorRef,
    #[serde(rename = "resolution")]
    pub grid_resolution: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedMesh {
    pub vertices: TensorRef,
    pub faces: TensorRef,
    /// Per-voxel attribute volume.
    #[serde(rename = "attrs")]
    pub attributes: TensorRef,
    pub coords: TensorRef,
    pub grid_resolution: u32,
}

/// Channel layout of the attribute volume, e.g. `base_color -> 0..3`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeLayout(pub Vec<AttributeSlice>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSlice {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

pub trait MeshDecoder {
    fn decode_latent(&self, output: PipelineOutput) -> Result<DecodedMesh>;

    fn attribute_layout(&self) -> &AttributeLayout;
}

/// A loaded image-to-3D pipeline bound to one compute device.
pub trait GenerativePipeline: MeshDecoder + Send {
    /// The pipeline's own normalization (background removal, crop, resize).
    fn preprocess(&self, image: &DynamicImage) -> Result<DynamicImage>;

    /// Run sparse-structure, shape-latent and texture-latent sampling in order
    /// on an already preprocessed image.
    fn run(&self, image: &DynamicImage, seed: i64, spec: &PipelineCallSpec) -> Result<PipelineOutput>;

    /// Drop cached accelerator allocations left over from the last job.
    fn release_cache(&self) -> Result<()>;
}

pub trait PipelineLoader {
    /// Load weights and move the model onto its device.
    fn load(&self) -> Result<Box<dyn GenerativePipeline>>;
}
