/// Default pixel size of a single atlas cell
pub const DEFAULT_SEGMENT_SIZE: u32 = 64;

/// Smallest cell size the settings layer lets through
pub const MIN_SEGMENT_SIZE: u32 = 16;

/// Default segment count scale (zenith = 2 * scale, azimuth = 4 * scale)
pub const DEFAULT_SEGMENT_COUNT_SCALE: i32 = 4;

/// Zenith samples added per unit of segment count scale
pub const ZENITH_PER_SCALE: u32 = 2;

/// Azimuth samples added per unit of segment count scale
pub const AZIMUTH_PER_SCALE: u32 = 4;

/// Camera distance from the bounds centre, in multiples of half the bounds diagonal
pub const CAMERA_DISTANCE_FACTOR: f32 = 2.0;

/// Extension of every written atlas
pub const OUTPUT_EXTENSION: &str = "png";

/// Largest atlas side the capture accepts, in pixels
pub const MAX_ATLAS_PIXEL_SIZE: u32 = 16384;
