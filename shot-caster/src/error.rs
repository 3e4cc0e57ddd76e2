/// Error types surfaced by a capture run
use crate::channel::Channel;
use crate::render::RenderError;
use std::path::PathBuf;

/// A channel whose atlas could not be written to disk.
#[derive(Debug)]
pub struct WriteFailure {
    pub channel: Channel,
    pub path: PathBuf,
    pub error: std::io::Error,
}

/// Error types for capture operations.
#[derive(Debug)]
pub enum CaptureError {
    /// Request rejected before any rendering started.
    InvalidConfig(String),
    /// Render service failed mid-loop; the channel's atlas was discarded.
    /// `write_failures` holds earlier channels whose atlas could not be written.
    Render {
        channel: Channel,
        index: u32,
        source: RenderError,
        write_failures: Vec<WriteFailure>,
    },
    Encode {
        channel: Channel,
        source: image::ImageError,
        write_failures: Vec<WriteFailure>,
    },
    /// One or more channel atlases failed to write; the others were written.
    Write(Vec<WriteFailure>),
    /// Malformed scene description.
    Scene(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl CaptureError {
    /// Attaches write failures of channels finished before an aborting error.
    pub(crate) fn with_write_failures(mut self, failures: Vec<WriteFailure>) -> Self {
        match &mut self {
            CaptureError::Render { write_failures, .. }
            | CaptureError::Encode { write_failures, .. } => *write_failures = failures,
            _ => {}
        }
        self
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::IoError(err)
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::JsonError(err)
    }
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::InvalidConfig(msg) => write!(f, "Invalid capture configuration: {}", msg),
            CaptureError::Render {
                channel,
                index,
                source,
                write_failures,
            } => {
                write!(
                    f,
                    "Render failed for {} sample {}: {}",
                    channel, index, source
                )?;
                write_failure_list(f, write_failures)
            }
            CaptureError::Encode {
                channel,
                source,
                write_failures,
            } => {
                write!(f, "Failed to encode {} atlas: {}", channel, source)?;
                write_failure_list(f, write_failures)
            }
            CaptureError::Write(failures) => {
                write!(f, "Failed to write {} atlas file(s)", failures.len())?;
                write_failure_list(f, failures)
            }
            CaptureError::Scene(msg) => write!(f, "Invalid scene: {}", msg),
            CaptureError::IoError(e) => write!(f, "IO error: {}", e),
            CaptureError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

fn write_failure_list(f: &mut std::fmt::Formatter<'_>, failures: &[WriteFailure]) -> std::fmt::Result {
    if failures.is_empty() {
        return Ok(());
    }
    write!(f, "; unwritten atlases:")?;
    for failure in failures {
        write!(
            f,
            " [{} -> {}: {}]",
            failure.channel,
            failure.path.display(),
            failure.error
        )?;
    }
    Ok(())
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Render { source, .. } => Some(source),
            CaptureError::Encode { source, .. } => Some(source),
            CaptureError::IoError(e) => Some(e),
            CaptureError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}
