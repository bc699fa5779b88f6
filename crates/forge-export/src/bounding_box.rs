use glam::Vec3;
use serde::Serialize;

/// Axis-aligned box the decoded voxel grid is mapped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Unit cube centred on the origin.
    pub const UNIT: Self = Self {
        min: Vec3::splat(-0.5),
        max: Vec3::splat(0.5),
    };

    /// `[[min.x, min.y, min.z], [max.x, max.y, max.z]]`
    pub fn to_array(&self) -> [[f32; 3]; 2] {
        [self.min.to_array(), self.max.to_array()]
    }
}

impl Serialize for BoundingBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}
