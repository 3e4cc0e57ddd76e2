/// Rendering service boundary and pipeline switching
pub mod software;

pub use software::SoftwareRenderer;

use crate::camera::CaptureCamera;
use crate::scene::SceneNode;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Opaque identifier of a render pipeline (shading configuration).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineId(String);

impl PipelineId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error types reported by a render service.
#[derive(Debug)]
pub enum RenderError {
    UnknownPipeline(PipelineId),
    /// Target buffer is not square or has no pixels.
    InvalidTarget { width: u32, height: u32 },
    Backend(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownPipeline(id) => write!(f, "Unknown render pipeline '{}'", id),
            RenderError::InvalidTarget { width, height } => {
                write!(f, "Invalid render target {}x{}", width, height)
            }
            RenderError::Backend(msg) => write!(f, "Render backend error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Produces a colour image of a scene seen from a camera.
///
/// The active pipeline is process-wide state of the service rather than a
/// per-call parameter, so captures that switch it must run one at a time.
pub trait RenderService {
    /// Pipeline currently in effect; `None` is the service's production shading.
    fn active_pipeline(&self) -> Option<PipelineId>;

    fn set_active_pipeline(&mut self, pipeline: Option<PipelineId>);

    /// Renders `scene` into `target`, replacing its previous contents.
    fn render(
        &mut self,
        scene: &SceneNode,
        camera: &CaptureCamera,
        target: &mut RgbaImage,
    ) -> Result<(), RenderError>;
}

/// Switches a service to a pipeline for the lifetime of the scope.
/// The pipeline that was active before is restored on drop, on every exit path.
pub struct PipelineScope<'a, R: RenderService + ?Sized> {
    service: &'a mut R,
    previous: Option<PipelineId>,
}

impl<'a, R: RenderService + ?Sized> PipelineScope<'a, R> {
    pub fn enter(service: &'a mut R, pipeline: PipelineId) -> Self {
        let previous = service.active_pipeline();
        service.set_active_pipeline(Some(pipeline));
        Self { service, previous }
    }
}

impl<R: RenderService + ?Sized> Deref for PipelineScope<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.service
    }
}

impl<R: RenderService + ?Sized> DerefMut for PipelineScope<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.service
    }
}

impl<R: RenderService + ?Sized> Drop for PipelineScope<'_, R> {
    fn drop(&mut self) {
        self.service.set_active_pipeline(self.previous.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Switchboard {
        active: Option<PipelineId>,
        history: Vec<Option<PipelineId>>,
    }

    impl RenderService for Switchboard {
        fn active_pipeline(&self) -> Option<PipelineId> {
            self.active.clone()
        }

        fn set_active_pipeline(&mut self, pipeline: Option<PipelineId>) {
            self.history.push(pipeline.clone());
            self.active = pipeline;
        }

        fn render(
            &mut self,
            _scene: &SceneNode,
            _camera: &CaptureCamera,
            _target: &mut RgbaImage,
        ) -> Result<(), RenderError> {
            Err(RenderError::Backend("switchboard cannot draw".to_string()))
        }
    }

    #[test]
    fn scope_restores_previous_pipeline() {
        let mut service = Switchboard {
            active: Some(PipelineId::new("forward")),
            ..Default::default()
        };

        {
            let scope = PipelineScope::enter(&mut service, PipelineId::new("shot_mask"));
            assert_eq!(scope.active_pipeline(), Some(PipelineId::new("shot_mask")));
        }

        assert_eq!(service.active_pipeline(), Some(PipelineId::new("forward")));
    }

    #[test]
    fn scope_restores_after_failed_render() {
        let mut service = Switchboard::default();
        let result = (|| {
            let mut scope = PipelineScope::enter(&mut service, PipelineId::new("shot_albedo"));
            let camera = CaptureCamera::new(bevy::math::Affine3A::IDENTITY, 1.0);
            scope.render(&SceneNode::new("empty"), &camera, &mut RgbaImage::new(4, 4))
        })();

        assert!(result.is_err());
        assert_eq!(service.active_pipeline(), None);
        assert_eq!(
            service.history,
            vec![Some(PipelineId::new("shot_albedo")), None]
        );
    }
}
