/// Renderable part hierarchy consumed by the capture
use crate::bounds::{BoundingBox, combine};
use bevy::log::debug;
use bevy::math::{Affine3A, Quat, Vec3};
use constants::shader::{CAPTURE_SHADER, STANDARD_SHADER};

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl NodeTransform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Shading configuration slot of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub shader: String,
    /// Linear RGBA base colour.
    pub base_color: [f32; 4],
    /// Legacy main texture reference.
    pub main_texture: Option<String>,
    /// Texture sampled as the base map by the capture shader.
    pub base_map: Option<String>,
}

impl Material {
    pub fn standard(base_color: [f32; 4]) -> Self {
        Self {
            shader: STANDARD_SHADER.to_string(),
            base_color,
            main_texture: None,
            base_map: None,
        }
    }

    /// Copy of this material switched to the capture shader.
    /// Properties carry over; a main texture is promoted to the base map.
    pub fn for_capture(&self) -> Self {
        let mut material = self.clone();
        material.shader = CAPTURE_SHADER.to_string();
        if let Some(texture) = &self.main_texture {
            material.base_map = Some(texture.clone());
        }
        material
    }

    pub fn is_capture(&self) -> bool {
        self.shader == CAPTURE_SHADER
    }
}

/// Indexed triangle mesh in local space.
/// Each submesh is a triangle list drawn with the material of the same index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub submeshes: Vec<Vec<u32>>,
}

impl Mesh {
    /// Axis-aligned box centred on the origin with one flat-shaded quad per face.
    pub fn cuboid(size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u_axis, v_axis) in faces {
            let base = positions.len() as u32;
            let center = normal * half;
            let u = u_axis * half;
            let v = v_axis * half;

            positions.extend([center - u - v, center + u - v, center + u + v, center - u + v]);
            normals.extend([normal; 4]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            positions,
            normals,
            submeshes: vec![indices],
        }
    }

    /// Latitude/longitude sphere centred on the origin.
    pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);
        let mut positions = Vec::new();
        let mut normals = Vec::new();

        for stack in 0..=stacks {
            let polar = std::f32::consts::PI * stack as f32 / stacks as f32;
            for sector in 0..=sectors {
                let azimuth = std::f32::consts::TAU * sector as f32 / sectors as f32;
                let normal = Vec3::new(
                    polar.sin() * azimuth.cos(),
                    polar.cos(),
                    polar.sin() * azimuth.sin(),
                );
                positions.push(normal * radius);
                normals.push(normal);
            }
        }

        let row = sectors + 1;
        let mut indices = Vec::new();
        for stack in 0..stacks {
            for sector in 0..sectors {
                let a = stack * row + sector;
                let b = a + row;
                indices.extend([a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self {
            positions,
            normals,
            submeshes: vec![indices],
        }
    }

    /// Mesh from raw triangle lists, with smooth normals accumulated from faces.
    pub fn from_triangles(positions: Vec<Vec3>, submeshes: Vec<Vec<u32>>) -> Self {
        let mut normals = vec![Vec3::ZERO; positions.len()];

        for indices in &submeshes {
            for tri in indices.chunks_exact(3) {
                let (Some(&a), Some(&b), Some(&c)) = (
                    positions.get(tri[0] as usize),
                    positions.get(tri[1] as usize),
                    positions.get(tri[2] as usize),
                ) else {
                    continue;
                };
                let face = (b - a).cross(c - a);
                for &i in tri {
                    normals[i as usize] += face;
                }
            }
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }

        Self {
            positions,
            normals,
            submeshes,
        }
    }

    /// Bounds of the vertex positions; an empty mesh has a zero box at the origin
    pub fn local_bounds(&self) -> BoundingBox {
        if self.positions.is_empty() {
            return BoundingBox::zero(Vec3::ZERO);
        }

        let (min, max) = self.positions.iter().fold(
            (Vec3::INFINITY, Vec3::NEG_INFINITY),
            |(min, max), &p| (min.min(p), max.max(p)),
        );
        BoundingBox::from_min_max(min, max)
    }
}

/// Mesh plus the materials its submeshes are drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    pub mesh: Mesh,
    pub materials: Vec<Material>,
}

impl MeshRenderer {
    pub fn new(mesh: Mesh, materials: Vec<Material>) -> Self {
        Self { mesh, materials }
    }

    /// Material for a submesh; extra submeshes reuse the last material.
    pub fn material_for(&self, submesh: usize) -> Option<&Material> {
        self.materials
            .get(submesh)
            .or_else(|| self.materials.last())
    }
}

/// Node of the target hierarchy.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneNode {
    pub name: String,
    pub transform: NodeTransform,
    pub renderer: Option<MeshRenderer>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_renderer(mut self, renderer: MeshRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Visits every renderer depth-first with its accumulated world transform.
    pub fn visit_renderers<F: FnMut(&MeshRenderer, &Affine3A)>(&self, f: &mut F) {
        walk(self, &Affine3A::IDENTITY, f);
    }

    /// Mutable variant of [`SceneNode::visit_renderers`].
    pub fn visit_renderers_mut<F: FnMut(&mut MeshRenderer, &Affine3A)>(&mut self, f: &mut F) {
        walk_mut(self, &Affine3A::IDENTITY, f);
    }

    pub fn renderer_count(&self) -> usize {
        let mut count = 0;
        self.visit_renderers(&mut |_, _| count += 1);
        count
    }
}

fn walk<F: FnMut(&MeshRenderer, &Affine3A)>(node: &SceneNode, parent: &Affine3A, f: &mut F) {
    let world = *parent * node.transform.to_affine();
    if let Some(renderer) = &node.renderer {
        f(renderer, &world);
    }
    for child in &node.children {
        walk(child, &world, f);
    }
}

fn walk_mut<F: FnMut(&mut MeshRenderer, &Affine3A)>(
    node: &mut SceneNode,
    parent: &Affine3A,
    f: &mut F,
) {
    let world = *parent * node.transform.to_affine();
    if let Some(renderer) = &mut node.renderer {
        f(renderer, &world);
    }
    for child in &mut node.children {
        walk_mut(child, &world, f);
    }
}

/// Disposable duplicate of a capture target.
/// Placed at the origin with identity rotation; the caller's scene is never touched.
pub struct WorkingCopy {
    root: SceneNode,
}

impl WorkingCopy {
    pub fn instantiate(target: &SceneNode) -> Self {
        let mut root = target.clone();
        root.transform.translation = Vec3::ZERO;
        root.transform.rotation = Quat::IDENTITY;
        debug!("Instantiated working copy of '{}'", root.name);
        Self { root }
    }

    /// Switches every surface to the capture shader and measures the copy in
    /// the same pass. Returns bounds combined around the origin.
    pub fn prepare_for_capture(&mut self) -> BoundingBox {
        let mut parts = Vec::new();

        self.root.visit_renderers_mut(&mut |renderer, world| {
            parts.push(renderer.mesh.local_bounds().transformed(world));
            for material in &mut renderer.materials {
                *material = material.for_capture();
            }
        });

        combine(Vec3::ZERO, &parts)
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// World transform of the copy's root, the parent space of the capture camera
    pub fn transform(&self) -> Affine3A {
        self.root.transform.to_affine()
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        debug!("Released working copy of '{}'", self.root.name);
    }
}
