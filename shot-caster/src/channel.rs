/// Output channels captured into separate atlases
use crate::render::PipelineId;
use constants::channel::get_channel_pipeline;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One independent shading interpretation of the captured object.
/// The derived ordering is the order channels are captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Albedo,
    Normal,
    Mask,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Albedo, Channel::Normal, Channel::Mask];

    /// Lowercase name used in output file suffixes.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Albedo => "albedo",
            Channel::Normal => "normal",
            Channel::Mask => "mask",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Pipeline the channel renders under unless the settings override it.
    pub fn default_pipeline(self) -> PipelineId {
        // Every channel has an entry in the constants table.
        PipelineId::new(get_channel_pipeline(self.name()).unwrap_or(self.name()))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
