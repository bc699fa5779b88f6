use serde::Serialize;

/// Output resolution tier requested by a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    R512,
    R1024,
    R1536,
}

impl ResolutionTier {
    /// Parse the literal tier string from a job input
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "512" => Some(Self::R512),
            "1024" => Some(Self::R1024),
            "1536" => Some(Self::R1536),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::R512 => "512",
            Self::R1024 => "1024",
            Self::R1536 => "1536",
        }
    }

    /// Pipeline variant that generates this tier
    pub fn variant(&self) -> PipelineVariant {
        match self {
            Self::R512 => PipelineVariant::Direct512,
            Self::R1024 => PipelineVariant::Cascade1024,
            Self::R1536 => PipelineVariant::Cascade1536,
        }
    }

    /// All supported tiers
    pub fn all() -> [ResolutionTier; 3] {
        [Self::R512, Self::R1024, Self::R1536]
    }
}

impl Default for ResolutionTier {
    fn default() -> Self {
        Self::R1024
    }
}

/// Pipeline variant identifier understood by the generative pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineVariant {
    #[serde(rename = "512")]
    Direct512,
    #[serde(rename = "1024_cascade")]
    Cascade1024,
    #[serde(rename = "1536_cascade")]
    Cascade1536,
}

impl PipelineVariant {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Direct512 => "512",
            Self::Cascade1024 => "1024_cascade",
            Self::Cascade1536 => "1536_cascade",
        }
    }
}
