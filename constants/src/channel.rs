/// Render pipeline used while capturing the albedo atlas
pub const ALBEDO_PIPELINE: &str = "shot_albedo";

/// Render pipeline used while capturing the normal atlas
pub const NORMAL_PIPELINE: &str = "shot_normal";

/// Render pipeline used while capturing the mask atlas
pub const MASK_PIPELINE: &str = "shot_mask";

pub struct ChannelInfo {
    pub suffix: &'static str,
    pub pipeline: &'static str,
    pub enabled_by_default: bool,
}

pub const CHANNEL_MAP: &[ChannelInfo] = &[
    ChannelInfo {
        suffix: "albedo",
        pipeline: ALBEDO_PIPELINE,
        enabled_by_default: true,
    },
    ChannelInfo {
        suffix: "normal",
        pipeline: NORMAL_PIPELINE,
        enabled_by_default: true,
    },
    ChannelInfo {
        suffix: "mask",
        pipeline: MASK_PIPELINE,
        enabled_by_default: false,
    },
];

pub fn get_channel_pipeline(suffix: &str) -> Option<&'static str> {
    CHANNEL_MAP
        .iter()
        .find(|c| c.suffix == suffix)
        .map(|c| c.pipeline)
}
