/// Shader every captured surface is switched to, so pixels carry raw channel data
pub const CAPTURE_SHADER: &str = "shot_caster/cast";

/// Shader assigned to materials that do not name one
pub const STANDARD_SHADER: &str = "standard";

/// Ambient term of the lit fallback shading
pub const LIT_AMBIENT: f32 = 0.25;

/// Key light direction of the lit fallback shading (points towards the light)
pub const LIT_LIGHT_DIRECTION: [f32; 3] = [0.4, 0.8, 0.45];
