/// Spherical capture scheduler and atlas compositor
pub mod bounds;
pub mod camera;
pub mod capture;
pub mod channel;
pub mod compositor;
pub mod config;
pub mod directions;
pub mod error;
pub mod layout;
pub mod logging;
pub mod render;
pub mod scene;
pub mod scene_file;
pub mod writer;

pub use bounds::BoundingBox;
pub use capture::{CaptureReport, CaptureRequest, execute};
pub use channel::Channel;
pub use error::CaptureError;
pub use layout::AtlasLayout;
pub use render::{PipelineId, RenderService, SoftwareRenderer};
pub use scene::SceneNode;
