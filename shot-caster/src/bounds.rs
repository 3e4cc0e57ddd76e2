/// Axis-aligned bounds tracking and symmetric aggregation around a centre
use crate::scene::SceneNode;
use bevy::math::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box described by its centre and full extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub center: Vec3,
    pub size: Vec3,
}

impl BoundingBox {
    /// Create a box, folding negative extents to their magnitude
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self {
            center,
            size: size.abs(),
        }
    }

    /// Zero-extent box sitting at `center`
    pub fn zero(center: Vec3) -> Self {
        Self {
            center,
            size: Vec3::ZERO,
        }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::new((min + max) * 0.5, max - min)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Length of the full diagonal
    pub fn diagonal(&self) -> f32 {
        self.size.length()
    }

    /// Half the diagonal, the radius of a sphere that encloses the box
    pub fn half_diagonal(&self) -> f32 {
        self.diagonal() / 2.0
    }

    /// Farthest distance from `center` to either face of this box, per axis.
    pub fn reach_from(&self, center: Vec3) -> Vec3 {
        let offset = self.center - center;
        let half = self.size / 2.0;
        (offset - half).abs().max((offset + half).abs())
    }

    /// World-space box enclosing this box after an affine transform.
    /// All eight corners are transformed and re-bounded.
    pub fn transformed(&self, transform: &Affine3A) -> Self {
        let min = self.min();
        let max = self.max();
        let mut world_min = Vec3::INFINITY;
        let mut world_max = Vec3::NEG_INFINITY;

        for corner in 0..8u8 {
            let local = Vec3::new(
                if corner & 1 == 0 { min.x } else { max.x },
                if corner & 2 == 0 { min.y } else { max.y },
                if corner & 4 == 0 { min.z } else { max.z },
            );
            let world = transform.transform_point3(local);
            world_min = world_min.min(world);
            world_max = world_max.max(world);
        }

        Self::from_min_max(world_min, world_max)
    }
}

/// Serialisable form of a bounding box used by settings files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsSetting {
    pub center: [f32; 3],
    pub size: [f32; 3],
}

impl From<BoundsSetting> for BoundingBox {
    fn from(setting: BoundsSetting) -> Self {
        BoundingBox::new(
            Vec3::from_array(setting.center),
            Vec3::from_array(setting.size),
        )
    }
}

impl From<BoundingBox> for BoundsSetting {
    fn from(bounds: BoundingBox) -> Self {
        Self {
            center: bounds.center.to_array(),
            size: bounds.size.to_array(),
        }
    }
}

/// Combines boxes into the smallest box centred on `center` that covers every
/// input's extent along each axis independently.
///
/// Only translation is considered: rotated parts are taken at their
/// axis-aligned extent, so the result can over- or under-shoot a true bound.
pub fn combine<'a>(center: Vec3, boxes: impl IntoIterator<Item = &'a BoundingBox>) -> BoundingBox {
    let reach = boxes
        .into_iter()
        .fold(Vec3::ZERO, |reach, b| reach.max(b.reach_from(center)));

    BoundingBox {
        center,
        size: reach * 2.0,
    }
}

/// Default capture bounds for a target, expressed in the target's local space.
/// Each part's world box has its centre mapped back through the root transform
/// (the extent stays in world units) before combining around the origin.
pub fn seed_bounds(root: &SceneNode) -> BoundingBox {
    let to_local = root.transform.to_affine().inverse();
    let mut parts = Vec::new();

    root.visit_renderers(&mut |renderer, world| {
        let mut part = renderer.mesh.local_bounds().transformed(world);
        part.center = to_local.transform_point3(part.center);
        parts.push(part);
    });

    combine(Vec3::ZERO, &parts)
}
