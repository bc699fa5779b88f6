use thiserror::Error;

/// Message reported for every job while the model session is unavailable.
pub const MODEL_UNAVAILABLE: &str = "Model failed to load.";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
}

/// Rejection of a raw job input. Raised before any model or filesystem
/// resource is touched.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("job input must be a JSON object")]
    NotAnObject,
    #[error("No image provided in input.")]
    MissingImage,
    #[error("invalid image: {0}")]
    InvalidImage(#[from] DecodeError),
    #[error("unsupported resolution: {0}")]
    UnsupportedResolution(String),
    #[error("invalid value for `{field}`: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("value for `{field}` is out of range")]
    OutOfRange { field: &'static str },
}

/// Failure surfaced by the generative pipeline collaborator.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("model load failed: {0}")]
    Load(String),
    #[error("preprocess failed: {0}")]
    Preprocess(String),
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("latent decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    Image(#[from] DecodeError),
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{}", MODEL_UNAVAILABLE)]
    NotReady,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_message() {
        assert_eq!(SessionError::NotReady.to_string(), MODEL_UNAVAILABLE);
    }

    #[test]
    fn test_field_error_names_field() {
        let err = ValidationError::InvalidField { field: "seed", expected: "an integer" };
        assert_eq!(err.to_string(), "invalid value for `seed`: expected an integer");
    }
}
