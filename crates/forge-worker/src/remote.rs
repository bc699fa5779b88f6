// crates/forge-worker/src/remote.rs

//! Blocking client for the model service that owns the accelerator.
//!
//! The service holds the loaded pipeline; latents and meshes stay on its side
//! and only their handles cross the wire.

use std::fs;
use std::path::Path;
use image::DynamicImage;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use forge_core::codec;
use forge_core::error::{PipelineError, Result};
use forge_core::pipeline::{
    AttributeLayout, DecodedMesh, GenerativePipeline, MeshDecoder, PipelineLoader, PipelineOutput,
};
use forge_core::stage::PipelineCallSpec;
use forge_export::{AssetBackend, AssetContainer, ContainerRequest, WriteOptions};
use crate::config::WorkerConfig;
use crate::error::ServiceError;

#[derive(Serialize)]
struct LoadRequest<'a> {
    model: &'a str,
    device: &'a str,
}

#[derive(Deserialize)]
struct LoadResponse {
    #[serde(default)]
    attribute_layout: AttributeLayout,
}

#[derive(Serialize, Deserialize)]
struct ImagePayload {
    image: String,
}

#[derive(Serialize)]
struct RunRequest<'a> {
    image: String,
    seed: i64,
    preprocess_image: bool,
    return_latent: bool,
    #[serde(flatten)]
    spec: &'a PipelineCallSpec,
}

#[derive(Deserialize)]
struct ContainerCreated {
    id: String,
}

#[derive(Clone)]
pub struct RemoteModelService {
    client: Client,
    base_url: String,
    model_id: String,
    device: String,
}

impl RemoteModelService {
    pub fn new(config: &WorkerConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.service_timeout).build()?;

        Ok(Self {
            client,
            base_url: config.model_service_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            device: config.model_device.clone(),
        })
    }

    pub fn asset_backend(&self) -> RemoteAssetBackend {
        RemoteAssetBackend { service: self.clone() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post<B: Serialize + ?Sized, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ServiceError> {
        let response = self.client.post(self.url(path)).json(body).send()?;
        Ok(check_status(response)?.json()?)
    }

    fn post_unit(&self, path: &str) -> Result<(), ServiceError> {
        let response = self.client.post(self.url(path)).send()?;
        check_status(response)?;
        Ok(())
    }

    fn get_bytes(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ServiceError> {
        let response = self.client.get(self.url(path)).query(query).send()?;
        Ok(check_status(response)?.bytes()?.to_vec())
    }
}

fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(ServiceError::Status { status: status.as_u16(), body });
    }
    Ok(response)
}

impl PipelineLoader for RemoteModelService {
    fn load(&self) -> Result<Box<dyn GenerativePipeline>> {
        info!("Loading {} on {} via {}", self.model_id, self.device, self.base_url);

        let loaded: LoadResponse = self
            .post("/v1/load", &LoadRequest { model: &self.model_id, device: &self.device })
            .map_err(|e| PipelineError::Load(e.to_string()))?;

        Ok(Box::new(RemotePipeline {
            service: self.clone(),
            layout: loaded.attribute_layout,
        }))
    }
}

pub struct RemotePipeline {
    service: RemoteModelService,
    layout: AttributeLayout,
}

impl MeshDecoder for RemotePipeline {
    fn decode_latent(&self, output: PipelineOutput) -> Result<DecodedMesh> {
        self.service
            .post("/v1/decode", &output)
            .map_err(|e| PipelineError::Decode(e.to_string()))
    }

    fn attribute_layout(&self) -> &AttributeLayout {
        &self.layout
    }
}

impl GenerativePipeline for RemotePipeline {
    fn preprocess(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let payload = ImagePayload { image: codec::encode_image_png(image)? };
        let processed: ImagePayload = self
            .service
            .post("/v1/preprocess", &payload)
            .map_err(|e| PipelineError::Preprocess(e.to_string()))?;

        Ok(codec::decode_image(&processed.image)?)
    }

    fn run(&self, image: &DynamicImage, seed: i64, spec: &PipelineCallSpec) -> Result<PipelineOutput> {
        debug!("Running pipeline {} with seed {}", spec.variant.id(), seed);

        let request = RunRequest {
            image: codec::encode_image_png(image)?,
            seed,
            preprocess_image: false,
            return_latent: true,
            spec,
        };
        self.service
            .post("/v1/run", &request)
            .map_err(|e| PipelineError::Generation(e.to_string()))
    }

    fn release_cache(&self) -> Result<()> {
        self.service
            .post_unit("/v1/empty_cache")
            .map_err(|e| PipelineError::Other(e.to_string()))
    }
}

pub struct RemoteAssetBackend {
    service: RemoteModelService,
}

impl AssetBackend for RemoteAssetBackend {
    fn to_asset_container(&self, request: &ContainerRequest<'_>) -> std::result::Result<Box<dyn AssetContainer>, String> {
        let created: ContainerCreated = self
            .service
            .post("/v1/containers", request)
            .map_err(|e| e.to_string())?;

        Ok(Box::new(RemoteContainer {
            service: self.service.clone(),
            id: created.id,
        }))
    }
}

pub struct RemoteContainer {
    service: RemoteModelService,
    id: String,
}

impl AssetContainer for RemoteContainer {
    fn write_to_file(&self, path: &Path, options: &WriteOptions) -> std::result::Result<(), String> {
        let webp = if options.extension_webp { "true" } else { "false" };
        let bytes = self
            .service
            .get_bytes(&format!("/v1/containers/{}", self.id), &[("extension_webp", webp)])
            .map_err(|e| e.to_string())?;

        fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }
}
