/// Capture settings: defaults, clamping and request construction
use crate::bounds::{BoundingBox, BoundsSetting, seed_bounds};
use crate::capture::CaptureRequest;
use crate::channel::Channel;
use crate::error::CaptureError;
use crate::render::PipelineId;
use crate::scene::SceneNode;
use constants::capture::{
    AZIMUTH_PER_SCALE, DEFAULT_SEGMENT_COUNT_SCALE, DEFAULT_SEGMENT_SIZE, MIN_SEGMENT_SIZE,
    ZENITH_PER_SCALE,
};
use constants::channel::CHANNEL_MAP;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Which channels a capture produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelToggles {
    pub albedo: bool,
    pub normal: bool,
    pub mask: bool,
}

impl ChannelToggles {
    pub fn is_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Albedo => self.albedo,
            Channel::Normal => self.normal,
            Channel::Mask => self.mask,
        }
    }

    pub fn set(&mut self, channel: Channel, enabled: bool) {
        match channel {
            Channel::Albedo => self.albedo = enabled,
            Channel::Normal => self.normal = enabled,
            Channel::Mask => self.mask = enabled,
        }
    }
}

impl Default for ChannelToggles {
    fn default() -> Self {
        let mut toggles = Self {
            albedo: false,
            normal: false,
            mask: false,
        };
        for info in CHANNEL_MAP {
            if let Some(channel) = Channel::from_name(info.suffix) {
                toggles.set(channel, info.enabled_by_default);
            }
        }
        toggles
    }
}

/// User-facing capture configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Pixel size of one atlas cell.
    pub segment_size: u32,
    /// Sampling density; zenith and azimuth counts are derived from it.
    pub segment_count_scale: i32,
    /// Capture bounds; seeded from the target when absent.
    pub bounds: Option<BoundsSetting>,
    pub channels: ChannelToggles,
    /// Per-channel pipeline overrides.
    pub pipelines: BTreeMap<Channel, PipelineId>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            segment_count_scale: DEFAULT_SEGMENT_COUNT_SCALE,
            bounds: None,
            channels: ChannelToggles::default(),
            pipelines: BTreeMap::new(),
        }
    }
}

impl CaptureSettings {
    /// Loads settings from a JSON file; missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let text = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        Ok(settings.clamped())
    }

    /// Applies the same floors the interactive panel enforces.
    pub fn clamped(mut self) -> Self {
        self.segment_size = self.segment_size.max(MIN_SEGMENT_SIZE);
        self.segment_count_scale = self.segment_count_scale.max(0);
        self
    }

    /// Saturates for huge scales; the capture request rejects those.
    pub fn zenith_count(&self) -> u32 {
        ZENITH_PER_SCALE.saturating_mul(self.segment_count_scale.max(0) as u32)
    }

    /// Never zero, so every ring has at least one sample.
    pub fn azimuth_count(&self) -> u32 {
        AZIMUTH_PER_SCALE
            .saturating_mul(self.segment_count_scale.max(0) as u32)
            .max(1)
    }

    /// Enabled channels with their pipelines, in capture order.
    pub fn requested_channels(&self) -> BTreeMap<Channel, PipelineId> {
        Channel::ALL
            .into_iter()
            .filter(|&channel| self.channels.is_enabled(channel))
            .map(|channel| {
                let pipeline = self
                    .pipelines
                    .get(&channel)
                    .cloned()
                    .unwrap_or_else(|| channel.default_pipeline());
                (channel, pipeline)
            })
            .collect()
    }

    /// Builds a capture request. Without configured bounds the request is
    /// framed on the bounds seeded from the target.
    pub fn to_request(&self, target: SceneNode, output_stem: PathBuf) -> CaptureRequest {
        let bounds = self
            .bounds
            .map(BoundingBox::from)
            .unwrap_or_else(|| seed_bounds(&target));

        CaptureRequest {
            target,
            bounds: Some(bounds),
            output_stem,
            zenith_count: self.zenith_count(),
            azimuth_count: self.azimuth_count(),
            cell_pixel_size: self.segment_size,
            channels: self.requested_channels(),
        }
    }
}

/// Turns a picked output path into the stem atlases are written under.
/// A file name ending in `_<channel>` (with or without extension) is cut back
/// to what precedes it, so picking an earlier output targets the same set.
pub fn resolve_output_stem(picked: &Path) -> PathBuf {
    let Some(file_stem) = picked.file_stem().and_then(|s| s.to_str()) else {
        return picked.to_path_buf();
    };

    let base = match file_stem.rsplit_once('_') {
        Some((base, suffix)) if !base.is_empty() && Channel::from_name(suffix).is_some() => base,
        _ => file_stem,
    };

    picked.with_file_name(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Mesh, MeshRenderer, NodeTransform};
    use bevy::math::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn defaults_match_panel() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.segment_size, 64);
        assert_eq!(settings.segment_count_scale, 4);
        assert_eq!(settings.zenith_count(), 8);
        assert_eq!(settings.azimuth_count(), 16);
        assert_eq!(
            settings.requested_channels().into_keys().collect::<Vec<_>>(),
            vec![Channel::Albedo, Channel::Normal]
        );
    }

    #[test]
    fn clamps_out_of_range_values() {
        let settings = CaptureSettings {
            segment_size: 4,
            segment_count_scale: -3,
            ..Default::default()
        }
        .clamped();

        assert_eq!(settings.segment_size, 16);
        assert_eq!(settings.segment_count_scale, 0);
        assert_eq!(settings.zenith_count(), 0);
        assert_eq!(settings.azimuth_count(), 1);
    }

    #[test]
    fn parses_partial_json() {
        let settings: CaptureSettings = serde_json::from_str(
            r#"{
                "segment_count_scale": 1,
                "channels": { "mask": true },
                "pipelines": { "mask": "custom_mask" },
                "bounds": { "center": [0, 1, 0], "size": [2, 2, 2] }
            }"#,
        )
        .expect("valid settings");

        assert_eq!(settings.segment_size, 64);
        assert_eq!(settings.zenith_count(), 2);
        assert_eq!(settings.azimuth_count(), 4);

        let channels = settings.requested_channels();
        assert_eq!(channels.len(), 3);
        assert_eq!(channels[&Channel::Mask], PipelineId::new("custom_mask"));
        assert_eq!(channels[&Channel::Albedo], Channel::Albedo.default_pipeline());
    }

    #[test]
    fn request_carries_derived_counts() {
        let settings = CaptureSettings {
            segment_count_scale: 1,
            bounds: Some(BoundsSetting {
                center: [0.0, 1.0, 0.0],
                size: [2.0, 2.0, 2.0],
            }),
            ..Default::default()
        };
        let request = settings.to_request(SceneNode::new("rock"), PathBuf::from("out/rock"));

        assert_eq!(request.zenith_count, 2);
        assert_eq!(request.azimuth_count, 4);
        assert_eq!(request.cell_pixel_size, 64);
        assert_eq!(request.bounds.map(|b| b.diagonal()), Some(12f32.sqrt()));
    }

    #[test]
    fn huge_scales_saturate_instead_of_overflowing() {
        let settings = CaptureSettings {
            segment_count_scale: 1_200_000_000,
            ..Default::default()
        }
        .clamped();

        assert_eq!(settings.zenith_count(), 2_400_000_000);
        assert_eq!(settings.azimuth_count(), u32::MAX);
    }

    #[test]
    fn unset_bounds_are_seeded_from_rotated_target() {
        let target = SceneNode::new("crate")
            .with_transform(NodeTransform {
                translation: Vec3::new(5.0, 0.0, -2.0),
                rotation: Quat::from_rotation_y(FRAC_PI_4),
                scale: Vec3::ONE,
            })
            .with_child(SceneNode::new("body").with_renderer(MeshRenderer::new(
                Mesh::cuboid(Vec3::splat(2.0)),
                vec![Material::standard([1.0; 4])],
            )));

        let request = CaptureSettings::default().to_request(target.clone(), PathBuf::from("crate"));
        let bounds = request.bounds.expect("seeded bounds");

        assert_eq!(bounds, seed_bounds(&target));
        let diagonal_extent = 2.0 * 2f32.sqrt();
        assert!(bounds.size.abs_diff_eq(Vec3::new(diagonal_extent, 2.0, diagonal_extent), 1e-4));
        assert!(bounds.center.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn output_stem_drops_channel_suffix() {
        assert_eq!(
            resolve_output_stem(Path::new("art/tree_albedo.png")),
            PathBuf::from("art/tree")
        );
        assert_eq!(
            resolve_output_stem(Path::new("art/old_tree_mask")),
            PathBuf::from("art/old_tree")
        );
        assert_eq!(
            resolve_output_stem(Path::new("art/old_tree")),
            PathBuf::from("art/old_tree")
        );
        assert_eq!(resolve_output_stem(Path::new("art/tree.png")), PathBuf::from("art/tree"));
        assert_eq!(resolve_output_stem(Path::new("_normal")), PathBuf::from("_normal"));
    }
}
