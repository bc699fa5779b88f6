//! Validation of raw job inputs into a typed [`GenerationRequest`].
//!
//! Validation is pure: it never touches the model session, the accelerator
//! or the filesystem, so a rejected job costs nothing but the image decode.

use image::DynamicImage;
use serde::Serialize;
use serde_json::{Map, Value};
use crate::codec;
use crate::error::ValidationError;
use crate::model_types::ResolutionTier;

pub const DEFAULT_SEED: i64 = 0;
pub const DEFAULT_DECIMATION_TARGET: u32 = 500_000;
pub const DEFAULT_TEXTURE_SIZE: u32 = 2048;

/// Sampler parameters for one pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplerConfig {
    pub steps: u32,
    pub guidance_strength: f64,
    pub guidance_rescale: f64,
    pub rescale_t: f64,
}

impl SamplerConfig {
    pub const SPARSE_STRUCTURE: Self = Self {
        steps: 12,
        guidance_strength: 7.5,
        guidance_rescale: 0.7,
        rescale_t: 5.0,
    };

    pub const SHAPE_LATENT: Self = Self {
        steps: 12,
        guidance_strength: 7.5,
        guidance_rescale: 0.5,
        rescale_t: 3.0,
    };

    pub const TEXTURE_LATENT: Self = Self {
        steps: 12,
        guidance_strength: 1.0,
        guidance_rescale: 0.0,
        rescale_t: 3.0,
    };
}

/// Job input keys for one stage's sampler parameters.
struct StageFields {
    steps: &'static str,
    guidance_strength: &'static str,
    guidance_rescale: &'static str,
    rescale_t: &'static str,
}

const SPARSE_STRUCTURE_FIELDS: StageFields = StageFields {
    steps: "ss_sampling_steps",
    guidance_strength: "ss_guidance_strength",
    guidance_rescale: "ss_guidance_rescale",
    rescale_t: "ss_rescale_t",
};

const SHAPE_LATENT_FIELDS: StageFields = StageFields {
    steps: "shape_slat_sampling_steps",
    guidance_strength: "shape_slat_guidance_strength",
    guidance_rescale: "shape_slat_guidance_rescale",
    rescale_t: "shape_slat_rescale_t",
};

const TEXTURE_LATENT_FIELDS: StageFields = StageFields {
    steps: "tex_slat_sampling_steps",
    guidance_strength: "tex_slat_guidance_strength",
    guidance_rescale: "tex_slat_guidance_rescale",
    rescale_t: "tex_slat_rescale_t",
};

/// A validated job.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source_image: DynamicImage,
    pub seed: i64,
    pub resolution_tier: ResolutionTier,
    pub sparse_structure: SamplerConfig,
    pub shape_latent: SamplerConfig,
    pub texture_latent: SamplerConfig,
    pub decimation_target: u32,
    pub texture_size: u32,
}

/// Validate a raw job input, filling every optional field with its default.
///
/// The image is checked first so a job without one is rejected before any
/// other field is looked at.
pub fn validate(raw: &Value) -> Result<GenerationRequest, ValidationError> {
    let input = raw.as_object().ok_or(ValidationError::NotAnObject)?;

    let image_text = match input.get("image") {
        Some(Value::String(text)) if !text.is_empty() => text,
        _ => return Err(ValidationError::MissingImage),
    };
    let source_image = codec::decode_image(image_text)?;

    let resolution_tier = match input.get("resolution") {
        None | Some(Value::Null) => ResolutionTier::default(),
        Some(Value::String(value)) => ResolutionTier::parse(value)
            .ok_or_else(|| ValidationError::UnsupportedResolution(value.clone()))?,
        Some(other) => return Err(ValidationError::UnsupportedResolution(other.to_string())),
    };

    let seed = integer_field(input, "seed")?.unwrap_or(DEFAULT_SEED);

    Ok(GenerationRequest {
        source_image,
        seed,
        resolution_tier,
        sparse_structure: sampler(input, &SPARSE_STRUCTURE_FIELDS, SamplerConfig::SPARSE_STRUCTURE)?,
        shape_latent: sampler(input, &SHAPE_LATENT_FIELDS, SamplerConfig::SHAPE_LATENT)?,
        texture_latent: sampler(input, &TEXTURE_LATENT_FIELDS, SamplerConfig::TEXTURE_LATENT)?,
        decimation_target: count_field(input, "decimation_target", DEFAULT_DECIMATION_TARGET, 0)?,
        texture_size: count_field(input, "texture_size", DEFAULT_TEXTURE_SIZE, 0)?,
    })
}

fn sampler(
    input: &Map<String, Value>,
    fields: &StageFields,
    defaults: SamplerConfig,
) -> Result<SamplerConfig, ValidationError> {
    Ok(SamplerConfig {
        steps: count_field(input, fields.steps, defaults.steps, 1)?,
        guidance_strength: float_field(input, fields.guidance_strength, defaults.guidance_strength)?,
        guidance_rescale: float_field(input, fields.guidance_rescale, defaults.guidance_rescale)?,
        rescale_t: float_field(input, fields.rescale_t, defaults.rescale_t)?,
    })
}

/// 2^63, the first float outside the `i64` range.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Integers may arrive as `12` or `12.0`; anything with a fraction is rejected.
/// Values outside the `i64` range are an error, never clamped.
fn integer_field(input: &Map<String, Value>, field: &'static str) -> Result<Option<i64>, ValidationError> {
    let invalid = ValidationError::InvalidField { field, expected: "an integer" };

    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            if n.is_u64() {
                return Err(ValidationError::OutOfRange { field });
            }
            match n.as_f64() {
                Some(f) if f.fract() != 0.0 => Err(invalid),
                Some(f) if (-I64_LIMIT..I64_LIMIT).contains(&f) => Ok(Some(f as i64)),
                Some(_) => Err(ValidationError::OutOfRange { field }),
                None => Err(invalid),
            }
        }
        Some(_) => Err(invalid),
    }
}

fn count_field(
    input: &Map<String, Value>,
    field: &'static str,
    default: u32,
    min: u32,
) -> Result<u32, ValidationError> {
    let expected = if min > 0 { "a positive integer" } else { "a non-negative integer" };

    match integer_field(input, field).map_err(|_| ValidationError::InvalidField { field, expected })? {
        None => Ok(default),
        Some(value) => u32::try_from(value)
            .ok()
            .filter(|v| *v >= min)
            .ok_or(ValidationError::InvalidField { field, expected }),
    }
}

fn float_field(input: &Map<String, Value>, field: &'static str, default: f64) -> Result<f64, ValidationError> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or(ValidationError::InvalidField { field, expected: "a number" }),
        Some(_) => Err(ValidationError::InvalidField { field, expected: "a number" }),
    }
}
