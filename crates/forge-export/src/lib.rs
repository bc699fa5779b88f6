mod bounding_box;
pub mod container;
pub mod exporter;
pub mod glb;

pub use bounding_box::BoundingBox;
pub use container::{AssetBackend, AssetContainer, ContainerRequest, RemeshPolicy, WriteOptions};
pub use exporter::{AssetExporter, ExportError};
