/// Deterministic sample directions over a sphere
use bevy::math::Vec3;
use std::f32::consts::PI;

/// One capture direction and the cell index it lands in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionSample {
    pub index: u32,
    /// Polar angle from +Y.
    pub theta: f32,
    /// Azimuth around +Y, starting at +Z.
    pub phi: f32,
    /// Unit vector the camera looks along (towards the sphere centre).
    pub view_direction: Vec3,
    /// Screen-up vector, orthogonal to the view direction.
    pub up_direction: Vec3,
}

impl DirectionSample {
    fn new(index: u32, i: u32, j: u32, zenith_count: u32, azimuth_count: u32) -> Self {
        let theta = if zenith_count == 0 {
            PI / 2.0
        } else {
            PI * i as f32 / zenith_count as f32
        };
        let phi = 2.0 * j as f32 * PI / azimuth_count as f32;

        let raw = Vec3::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
        let up = Vec3::new(
            -theta.cos() * phi.sin(),
            theta.sin(),
            -theta.cos() * phi.cos(),
        );

        Self {
            index,
            theta,
            phi,
            view_direction: -raw,
            up_direction: up,
        }
    }
}

/// Number of samples a grid produces; zenith covers both poles, hence the `+ 1`.
/// `None` when the count does not fit in a `u32`.
pub fn checked_total_count(zenith_count: u32, azimuth_count: u32) -> Option<u32> {
    zenith_count
        .checked_add(1)?
        .checked_mul(azimuth_count.max(1))
}

/// Like [`checked_total_count`], saturating at `u32::MAX`.
pub fn total_count(zenith_count: u32, azimuth_count: u32) -> u32 {
    checked_total_count(zenith_count, azimuth_count).unwrap_or(u32::MAX)
}

/// Enumerates the grid zenith-major: every azimuth of ring 0, then ring 1, ...
/// The index of a sample is its position in this order and decides its atlas cell.
/// The grid is expected to pass [`checked_total_count`].
pub fn generate(zenith_count: u32, azimuth_count: u32) -> (Vec<DirectionSample>, u32) {
    let mut samples = Vec::with_capacity(total_count(zenith_count, azimuth_count) as usize);
    let mut index = 0;

    for i in 0..=zenith_count {
        for j in 0..azimuth_count {
            samples.push(DirectionSample::new(index, i, j, zenith_count, azimuth_count));
            index += 1;
        }
    }

    (samples, total_count(zenith_count, azimuth_count))
}

/// Sample for a single index without enumerating the grid.
pub fn sample_at(zenith_count: u32, azimuth_count: u32, index: u32) -> Option<DirectionSample> {
    if azimuth_count == 0 {
        return None;
    }
    let i = index / azimuth_count;
    let j = index % azimuth_count;
    (i <= zenith_count).then(|| DirectionSample::new(index, i, j, zenith_count, azimuth_count))
}
