//! Test doubles for the pipeline and export collaborators.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use image::{DynamicImage, Rgba, RgbaImage};
use forge_core::codec;
use forge_core::error::{PipelineError, Result};
use forge_core::pipeline::{
    AttributeLayout, DecodedMesh, GenerativePipeline, MeshDecoder, PipelineLoader, PipelineOutput, TensorRef,
};
use forge_core::stage::PipelineCallSpec;
use forge_core::{PipelineVariant, SamplerConfig};
use forge_export::{AssetBackend, AssetContainer, ContainerRequest, WriteOptions};

pub fn tiny_image() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([200, 120, 40, 255])))
}

pub fn encoded_png() -> String {
    codec::encode_image_png(&tiny_image()).unwrap()
}

pub fn default_spec() -> PipelineCallSpec {
    PipelineCallSpec {
        sparse_structure: SamplerConfig::SPARSE_STRUCTURE,
        shape_latent: SamplerConfig::SHAPE_LATENT,
        texture_latent: SamplerConfig::TEXTURE_LATENT,
        variant: PipelineVariant::Cascade1024,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    Succeed,
    FailLoad,
    FailRun,
    FailRelease,
    PanicOnSeed(i64),
}

#[derive(Default)]
pub struct Counters {
    pub preprocessed: AtomicUsize,
    pub runs: AtomicUsize,
    pub released: AtomicUsize,
    pub variants: Mutex<Vec<String>>,
    pub seeds: Mutex<Vec<i64>>,
}

pub struct FakeLoader {
    pub behaviour: Behaviour,
    pub counters: Arc<Counters>,
}

impl FakeLoader {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            counters: Arc::new(Counters::default()),
        }
    }
}

impl PipelineLoader for FakeLoader {
    fn load(&self) -> Result<Box<dyn GenerativePipeline>> {
        if let Behaviour::FailLoad = self.behaviour {
            return Err(PipelineError::Load("no CUDA device".into()));
        }
        Ok(Box::new(FakePipeline {
            behaviour: self.behaviour,
            counters: self.counters.clone(),
            layout: AttributeLayout::default(),
        }))
    }
}

struct FakePipeline {
    behaviour: Behaviour,
    counters: Arc<Counters>,
    layout: AttributeLayout,
}

fn handle(id: &str) -> TensorRef {
    TensorRef { id: id.to_string(), shape: vec![] }
}

impl MeshDecoder for FakePipeline {
    fn decode_latent(&self, output: PipelineOutput) -> Result<DecodedMesh> {
        Ok(DecodedMesh {
            vertices: handle("vertices"),
            faces: handle("faces"),
            attributes: handle("attrs"),
            coords: handle("coords"),
            grid_resolution: output.grid_resolution,
        })
    }

    fn attribute_layout(&self) -> &AttributeLayout {
        &self.layout
    }
}

impl GenerativePipeline for FakePipeline {
    fn preprocess(&self, image: &DynamicImage) -> Result<DynamicImage> {
        self.counters.preprocessed.fetch_add(1, Ordering::SeqCst);
        Ok(image.clone())
    }

    fn run(&self, _image: &DynamicImage, seed: i64, spec: &PipelineCallSpec) -> Result<PipelineOutput> {
        self.counters.runs.fetch_add(1, Ordering::SeqCst);
        self.counters.seeds.lock().unwrap().push(seed);
        self.counters.variants.lock().unwrap().push(spec.variant.id().to_string());

        match self.behaviour {
            Behaviour::FailRun => return Err(PipelineError::Generation("sampler diverged".into())),
            Behaviour::PanicOnSeed(s) if s == seed => panic!("kernel launch failed"),
            _ => {}
        }

        Ok(PipelineOutput {
            shape_latent: handle("shape"),
            texture_latent: handle("tex"),
            grid_resolution: 512,
        })
    }

    fn release_cache(&self) -> Result<()> {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        if let Behaviour::FailRelease = self.behaviour {
            return Err(PipelineError::Other("allocator busy".into()));
        }
        Ok(())
    }
}

/// Writes a minimal GLB header, or fails at container build time.
pub struct FakeBackend {
    fail: bool,
}

impl FakeBackend {
    pub fn new(fail: bool) -> Self {
        Self { fail }
    }
}

struct FakeContainer;

impl AssetContainer for FakeContainer {
    fn write_to_file(&self, path: &Path, _options: &WriteOptions) -> std::result::Result<(), String> {
        let mut bytes = b"glTF".to_vec();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&12u32.to_le_bytes());
        fs::write(path, bytes).map_err(|e| e.to_string())
    }
}

impl AssetBackend for FakeBackend {
    fn to_asset_container(&self, _request: &ContainerRequest<'_>) -> std::result::Result<Box<dyn AssetContainer>, String> {
        if self.fail {
            return Err("texture baking failed".into());
        }
        Ok(Box::new(FakeContainer))
    }
}
