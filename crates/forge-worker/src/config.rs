use std::env;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::Context;

pub const DEFAULT_MODEL_ID: &str = "microsoft/TRELLIS.2-4B";
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Port of the job intake server.
    pub port: u16,
    /// Largest `/run` body accepted; base64 photos easily exceed a few MB.
    pub max_request_bytes: usize,
    pub model_service_url: String,
    pub model_id: String,
    pub model_device: String,
    /// Transport guard for model service calls; generation itself is not timed out.
    pub service_timeout: Duration,
    /// Parent of per-job export workspaces. System temp dir when unset.
    pub workspace_dir: Option<PathBuf>,
}

impl WorkerConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port: u16 = lookup("PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .context("PORT must be a number")?;

        let timeout_secs: u64 = lookup("SERVICE_TIMEOUT_SECS")
            .unwrap_or_else(|| "1800".to_string())
            .parse()
            .context("SERVICE_TIMEOUT_SECS must be a number of seconds")?;

        let max_request_bytes = match lookup("MAX_REQUEST_BYTES") {
            Some(value) => value.parse().context("MAX_REQUEST_BYTES must be a number of bytes")?,
            None => DEFAULT_MAX_REQUEST_BYTES,
        };

        Ok(Self {
            port,
            max_request_bytes,
            model_service_url: lookup("MODEL_SERVICE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:5000".to_string()),
            model_id: lookup("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            model_device: lookup("MODEL_DEVICE").unwrap_or_else(|| "cuda".to_string()),
            service_timeout: Duration::from_secs(timeout_secs),
            workspace_dir: lookup("EXPORT_WORKSPACE_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        })
    }
}
