/// Atlas encoding and file output
use crate::channel::Channel;
use constants::capture::OUTPUT_EXTENSION;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, ImageEncoder, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Destination for encoded atlases.
pub trait AtlasWriter {
    /// Writes `bytes` to `path`, replacing any existing file. The parent directory must exist.
    fn write(&mut self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
}

/// Writes atlases straight to the file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskWriter;

impl AtlasWriter for DiskWriter {
    fn write(&mut self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        fs::write(path, bytes)
    }
}

/// Encodes an atlas as lossless 8-bit RGBA PNG.
pub fn encode_png(atlas: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut bytes, CompressionType::Default, FilterType::Adaptive);
    encoder.write_image(atlas.as_raw(), atlas.width(), atlas.height(), ColorType::Rgba8)?;
    Ok(bytes)
}

/// `<stem>_<channel>.png`
pub fn channel_output_path(stem: &Path, channel: Channel) -> PathBuf {
    let mut path = stem.as_os_str().to_owned();
    path.push(format!("_{}.{}", channel.name(), OUTPUT_EXTENSION));
    PathBuf::from(path)
}
