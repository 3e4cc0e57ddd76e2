/// JSON scene descriptions for capture targets
use crate::error::CaptureError;
use crate::scene::{Material, Mesh, MeshRenderer, NodeTransform, SceneNode};
use bevy::math::{Quat, Vec3, Vec4};
use constants::shader::STANDARD_SHADER;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDesc {
    pub translation: [f32; 3],
    /// Quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshDesc {
    Cuboid {
        size: [f32; 3],
    },
    UvSphere {
        radius: f32,
        #[serde(default = "default_sectors")]
        sectors: u32,
        #[serde(default = "default_stacks")]
        stacks: u32,
    },
    Triangles {
        positions: Vec<[f32; 3]>,
        /// One triangle list per material slot.
        submeshes: Vec<Vec<u32>>,
    },
}

fn default_sectors() -> u32 {
    24
}

fn default_stacks() -> u32 {
    12
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDesc {
    pub shader: String,
    pub base_color: [f32; 4],
    pub main_texture: Option<String>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            shader: STANDARD_SHADER.to_string(),
            base_color: [1.0; 4],
            main_texture: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererDesc {
    pub mesh: MeshDesc,
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
}

/// One node of a scene file; children nest recursively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDesc {
    pub name: String,
    #[serde(default)]
    pub transform: TransformDesc,
    #[serde(default)]
    pub renderer: Option<RendererDesc>,
    #[serde(default)]
    pub children: Vec<NodeDesc>,
}

impl NodeDesc {
    /// Builds the scene hierarchy, validating mesh indices along the way.
    pub fn build(&self) -> Result<SceneNode, CaptureError> {
        let Some(rotation) = Vec4::from_array(self.transform.rotation).try_normalize() else {
            return Err(CaptureError::Scene(format!(
                "'{}' has a degenerate rotation {:?}",
                self.name, self.transform.rotation
            )));
        };
        let transform = NodeTransform {
            translation: Vec3::from_array(self.transform.translation),
            rotation: Quat::from_vec4(rotation),
            scale: Vec3::from_array(self.transform.scale),
        };

        let renderer = match &self.renderer {
            Some(desc) => Some(build_renderer(&self.name, desc)?),
            None => None,
        };

        let children = self
            .children
            .iter()
            .map(NodeDesc::build)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SceneNode {
            name: self.name.clone(),
            transform,
            renderer,
            children,
        })
    }
}

fn build_renderer(node: &str, desc: &RendererDesc) -> Result<MeshRenderer, CaptureError> {
    let mesh = match &desc.mesh {
        MeshDesc::Cuboid { size } => Mesh::cuboid(Vec3::from_array(*size)),
        MeshDesc::UvSphere {
            radius,
            sectors,
            stacks,
        } => Mesh::uv_sphere(*radius, *sectors, *stacks),
        MeshDesc::Triangles {
            positions,
            submeshes,
        } => {
            for (slot, indices) in submeshes.iter().enumerate() {
                if indices.len() % 3 != 0 {
                    return Err(CaptureError::Scene(format!(
                        "'{}' submesh {} has {} indices, not a multiple of 3",
                        node,
                        slot,
                        indices.len()
                    )));
                }
                if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
                    return Err(CaptureError::Scene(format!(
                        "'{}' submesh {} references vertex {} of {}",
                        node,
                        slot,
                        bad,
                        positions.len()
                    )));
                }
            }
            Mesh::from_triangles(
                positions.iter().copied().map(Vec3::from_array).collect(),
                submeshes.clone(),
            )
        }
    };

    let materials = desc
        .materials
        .iter()
        .map(|m| Material {
            shader: m.shader.clone(),
            base_color: m.base_color,
            main_texture: m.main_texture.clone(),
            base_map: None,
        })
        .collect();

    Ok(MeshRenderer::new(mesh, materials))
}

/// Reads a scene file into a target hierarchy.
pub fn load_scene(path: &Path) -> Result<SceneNode, CaptureError> {
    let text = fs::read_to_string(path)?;
    let desc: NodeDesc = serde_json::from_str(&text)?;
    desc.build()
}
