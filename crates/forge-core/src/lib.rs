pub mod codec;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod session;
pub mod stage;
mod model_types;

pub use model_types::{PipelineVariant, ResolutionTier};
pub use pipeline::{DecodedMesh, GenerativePipeline, MeshDecoder, PipelineLoader, PipelineOutput, TensorRef};
pub use request::{GenerationRequest, SamplerConfig};
pub use result::JobResult;
pub use session::{ModelSession, SessionState};
pub use stage::PipelineCallSpec;
