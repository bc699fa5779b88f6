use serde::Serialize;
use crate::model_types::PipelineVariant;
use crate::request::{GenerationRequest, SamplerConfig};

/// Per-stage sampler settings and variant for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineCallSpec {
    #[serde(rename = "sparse_structure_sampler_params")]
    pub sparse_structure: SamplerConfig,
    #[serde(rename = "shape_slat_sampler_params")]
    pub shape_latent: SamplerConfig,
    #[serde(rename = "tex_slat_sampler_params")]
    pub texture_latent: SamplerConfig,
    #[serde(rename = "pipeline_type")]
    pub variant: PipelineVariant,
}

pub fn build(request: &GenerationRequest) -> PipelineCallSpec {
    PipelineCallSpec {
        sparse_structure: request.sparse_structure,
        shape_latent: request.shape_latent,
        texture_latent: request.texture_latent,
        variant: request.resolution_tier.variant(),
    }
}
