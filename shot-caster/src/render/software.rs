/// CPU reference render service: z-buffered orthographic triangle rasterizer
use super::{PipelineId, RenderError, RenderService};
use crate::camera::CaptureCamera;
use crate::scene::{Material, SceneNode};
use bevy::math::{Vec2, Vec3};
use constants::channel::{ALBEDO_PIPELINE, MASK_PIPELINE, NORMAL_PIPELINE};
use constants::shader::{LIT_AMBIENT, LIT_LIGHT_DIRECTION};
use image::{Rgba, RgbaImage};

/// What a fragment writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shading {
    /// Production look: base colour under one directional light.
    Lit,
    Albedo,
    /// World normal packed as `n * 0.5 + 0.5`.
    Normal,
    /// Opaque white wherever the object covers the pixel.
    Mask,
}

/// Renders capture-shaded surfaces according to the active pipeline.
/// Surfaces that were not switched to the capture shader always draw lit.
pub struct SoftwareRenderer {
    active: Option<PipelineId>,
    depth: Vec<f32>,
    light_direction: Vec3,
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self {
            active: None,
            depth: Vec::new(),
            light_direction: Vec3::from_array(LIT_LIGHT_DIRECTION).normalize(),
        }
    }

    fn pipeline_shading(&self) -> Result<Shading, RenderError> {
        let Some(pipeline) = &self.active else {
            return Ok(Shading::Lit);
        };

        match pipeline.as_str() {
            ALBEDO_PIPELINE => Ok(Shading::Albedo),
            NORMAL_PIPELINE => Ok(Shading::Normal),
            MASK_PIPELINE => Ok(Shading::Mask),
            _ => Err(RenderError::UnknownPipeline(pipeline.clone())),
        }
    }
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for SoftwareRenderer {
    fn active_pipeline(&self) -> Option<PipelineId> {
        self.active.clone()
    }

    fn set_active_pipeline(&mut self, pipeline: Option<PipelineId>) {
        self.active = pipeline;
    }

    fn render(
        &mut self,
        scene: &SceneNode,
        camera: &CaptureCamera,
        target: &mut RgbaImage,
    ) -> Result<(), RenderError> {
        let pipeline = self.pipeline_shading()?;
        let (width, height) = target.dimensions();
        if width == 0 || width != height {
            return Err(RenderError::InvalidTarget { width, height });
        }

        let target_bytes: &mut [u8] = &mut **target;
        target_bytes.fill(0);
        self.depth.clear();
        self.depth.resize((width * height) as usize, f32::INFINITY);

        let mut raster = Raster {
            target,
            depth: &mut self.depth,
            camera,
            light_direction: self.light_direction,
        };

        scene.visit_renderers(&mut |renderer, world| {
            let normal_matrix = world.matrix3.inverse().transpose();
            let mesh = &renderer.mesh;

            for (submesh, indices) in mesh.submeshes.iter().enumerate() {
                let Some(material) = renderer.material_for(submesh) else {
                    continue;
                };
                let shading = if material.is_capture() {
                    pipeline
                } else {
                    Shading::Lit
                };

                for tri in indices.chunks_exact(3) {
                    let mut positions = [Vec3::ZERO; 3];
                    let mut normals = [Vec3::ZERO; 3];
                    let mut complete = true;

                    for (corner, &index) in tri.iter().enumerate() {
                        match mesh.positions.get(index as usize) {
                            Some(&p) => positions[corner] = world.transform_point3(p),
                            None => complete = false,
                        }
                        let normal = mesh.normals.get(index as usize).copied().unwrap_or(Vec3::ZERO);
                        normals[corner] = (normal_matrix * normal).normalize_or_zero();
                    }

                    if complete {
                        raster.triangle(positions, normals, material, shading);
                    }
                }
            }
        });

        Ok(())
    }
}

struct Raster<'a> {
    target: &'a mut RgbaImage,
    depth: &'a mut [f32],
    camera: &'a CaptureCamera,
    light_direction: Vec3,
}

impl Raster<'_> {
    fn triangle(
        &mut self,
        positions: [Vec3; 3],
        normals: [Vec3; 3],
        material: &Material,
        shading: Shading,
    ) {
        let width = self.target.width();
        let size = width as f32;

        // Pixel space: x right, y down, z = distance in front of the camera.
        let mut screen = [Vec3::ZERO; 3];
        for (s, &p) in screen.iter_mut().zip(&positions) {
            let Some(view) = self.camera.project(p) else {
                return;
            };
            *s = Vec3::new((view.x * 0.5 + 0.5) * size, (0.5 - view.y * 0.5) * size, view.z);
        }

        let [s0, s1, s2] = screen.map(|s| s.truncate());
        let area = edge(s0, s1, s2);
        if area.abs() <= f32::EPSILON {
            return;
        }

        let min = s0.min(s1).min(s2).max(Vec2::ZERO);
        let max = s0.max(s1).max(s2).min(Vec2::splat(size));
        if min.x >= max.x || min.y >= max.y {
            return;
        }

        for y in min.y.floor() as u32..max.y.ceil() as u32 {
            for x in min.x.floor() as u32..max.x.ceil() as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(s1, s2, p) / area;
                let w1 = edge(s2, s0, p) / area;
                let w2 = edge(s0, s1, p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * screen[0].z + w1 * screen[1].z + w2 * screen[2].z;
                let pixel = (y * width + x) as usize;
                if depth <= 0.0 || depth >= self.depth[pixel] {
                    continue;
                }
                self.depth[pixel] = depth;

                let normal = (normals[0] * w0 + normals[1] * w1 + normals[2] * w2).normalize_or_zero();
                let colour = self.shade(material, shading, normal);
                self.target.put_pixel(x, y, colour);
            }
        }
    }

    fn shade(&self, material: &Material, shading: Shading, normal: Vec3) -> Rgba<u8> {
        let [r, g, b, a] = material.base_color;
        match shading {
            Shading::Albedo => to_rgba8([r, g, b, a]),
            Shading::Normal => {
                let packed = normal * 0.5 + 0.5;
                to_rgba8([packed.x, packed.y, packed.z, 1.0])
            }
            Shading::Mask => Rgba([255, 255, 255, 255]),
            Shading::Lit => {
                let diffuse = normal.dot(self.light_direction).max(0.0);
                let k = LIT_AMBIENT + (1.0 - LIT_AMBIENT) * diffuse;
                to_rgba8([r * k, g * k, b * k, a])
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

fn to_rgba8(colour: [f32; 4]) -> Rgba<u8> {
    Rgba(colour.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Mesh, MeshRenderer, NodeTransform};
    use bevy::math::Affine3A;

    const SIZE: u32 = 64;

    fn cube(colour: [f32; 4], capture: bool, translation: Vec3) -> SceneNode {
        let material = Material::standard(colour);
        let material = if capture {
            material.for_capture()
        } else {
            material
        };
        SceneNode::new("cube")
            .with_transform(NodeTransform::from_translation(translation))
            .with_renderer(MeshRenderer::new(Mesh::cuboid(Vec3::ONE), vec![material]))
    }

    fn front_camera() -> CaptureCamera {
        let mut camera = CaptureCamera::new(Affine3A::IDENTITY, 1.0);
        camera.look_from(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::Y);
        camera
    }

    fn render_with(pipeline: Option<&str>, scene: &SceneNode) -> RgbaImage {
        let mut renderer = SoftwareRenderer::new();
        renderer.set_active_pipeline(pipeline.map(PipelineId::new));
        let mut target = RgbaImage::new(SIZE, SIZE);
        renderer
            .render(scene, &front_camera(), &mut target)
            .expect("render succeeds");
        target
    }

    #[test]
    fn albedo_pipeline_writes_base_colour() {
        let image = render_with(Some(ALBEDO_PIPELINE), &cube([1.0, 0.0, 0.0, 1.0], true, Vec3::ZERO));

        assert_eq!(image.get_pixel(SIZE / 2, SIZE / 2).0, [255, 0, 0, 255]);
        // Unit cube under a half-size of 1 covers the middle half of the frame.
        assert_eq!(image.get_pixel(2, 2).0, [0, 0, 0, 0]);
        assert_eq!(image.get_pixel(SIZE / 4 + 1, SIZE / 4 + 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn normal_pipeline_packs_facing_normal() {
        let image = render_with(Some(NORMAL_PIPELINE), &cube([1.0; 4], true, Vec3::ZERO));
        assert_eq!(image.get_pixel(SIZE / 2, SIZE / 2).0, [128, 128, 255, 255]);
    }

    #[test]
    fn mask_pipeline_marks_coverage() {
        let image = render_with(Some(MASK_PIPELINE), &cube([0.1, 0.2, 0.3, 0.5], true, Vec3::ZERO));
        assert_eq!(image.get_pixel(SIZE / 2, SIZE / 2).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, SIZE - 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn production_materials_ignore_capture_pipeline() {
        let image = render_with(Some(ALBEDO_PIPELINE), &cube([1.0, 0.0, 0.0, 1.0], false, Vec3::ZERO));
        let [r, g, b, a] = image.get_pixel(SIZE / 2, SIZE / 2).0;

        assert!(r > 0 && r < 255, "lit red channel was {r}");
        assert_eq!((g, b, a), (0, 0, 255));
    }

    #[test]
    fn nearer_surface_wins() {
        let scene = SceneNode::new("pair")
            .with_child(cube([1.0, 0.0, 0.0, 1.0], true, Vec3::ZERO))
            .with_child(cube([0.0, 0.0, 1.0, 1.0], true, Vec3::new(0.0, 0.0, 1.5)));
        let image = render_with(Some(ALBEDO_PIPELINE), &scene);

        assert_eq!(image.get_pixel(SIZE / 2, SIZE / 2).0, [0, 0, 255, 255]);
    }

    #[test]
    fn unknown_pipeline_is_rejected() {
        let mut renderer = SoftwareRenderer::new();
        renderer.set_active_pipeline(Some(PipelineId::new("deferred")));
        let result = renderer.render(
            &SceneNode::new("empty"),
            &front_camera(),
            &mut RgbaImage::new(SIZE, SIZE),
        );

        assert!(matches!(result, Err(RenderError::UnknownPipeline(_))));
    }

    #[test]
    fn non_square_target_is_rejected() {
        let mut renderer = SoftwareRenderer::new();
        let result = renderer.render(
            &SceneNode::new("empty"),
            &front_camera(),
            &mut RgbaImage::new(SIZE, SIZE / 2),
        );

        assert!(matches!(result, Err(RenderError::InvalidTarget { .. })));
    }

    #[test]
    fn zero_sized_view_renders_blank() {
        let mut renderer = SoftwareRenderer::new();
        renderer.set_active_pipeline(Some(PipelineId::new(MASK_PIPELINE)));
        let mut target = RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 9]));
        let camera = CaptureCamera::new(Affine3A::IDENTITY, 0.0);

        renderer
            .render(&cube([1.0; 4], true, Vec3::ZERO), &camera, &mut target)
            .expect("render succeeds");
        assert!(target.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
