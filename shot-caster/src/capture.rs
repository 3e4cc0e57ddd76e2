/// Capture orchestration: one atlas per channel from a sphere of renders
use crate::bounds::BoundingBox;
use crate::camera::CaptureCamera;
use crate::channel::Channel;
use crate::compositor;
use crate::directions::{self, DirectionSample};
use crate::error::{CaptureError, WriteFailure};
use crate::layout::AtlasLayout;
use crate::render::{PipelineId, PipelineScope, RenderService};
use crate::scene::{SceneNode, WorkingCopy};
use crate::writer::{AtlasWriter, channel_output_path, encode_png};
use bevy::log::{debug, info, warn};
use constants::capture::{CAMERA_DISTANCE_FACTOR, MAX_ATLAS_PIXEL_SIZE};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything one capture run needs.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Object to capture. Only a duplicate is ever modified.
    pub target: SceneNode,
    /// Capture volume; `None` uses the bounds measured on the working copy.
    pub bounds: Option<BoundingBox>,
    /// Output files are `<output_stem>_<channel>.png`.
    pub output_stem: PathBuf,
    pub zenith_count: u32,
    pub azimuth_count: u32,
    pub cell_pixel_size: u32,
    /// Requested channels with their pipelines; iterated in capture order.
    pub channels: BTreeMap<Channel, PipelineId>,
}

impl CaptureRequest {
    /// Rejects requests that cannot produce output, before anything is rendered.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.cell_pixel_size == 0 {
            return Err(CaptureError::InvalidConfig(
                "cell pixel size must be positive".to_string(),
            ));
        }
        if self.azimuth_count == 0 {
            return Err(CaptureError::InvalidConfig(
                "azimuth count must be at least 1".to_string(),
            ));
        }
        if self.channels.is_empty() {
            return Err(CaptureError::InvalidConfig(
                "no output channels requested".to_string(),
            ));
        }
        let has_file_name = self
            .output_stem
            .file_name()
            .is_some_and(|name| !name.is_empty());
        if !has_file_name {
            return Err(CaptureError::InvalidConfig(format!(
                "output path '{}' has no file name",
                self.output_stem.display()
            )));
        }
        if let Some(bounds) = &self.bounds {
            if !bounds.center.is_finite() || !bounds.size.is_finite() {
                return Err(CaptureError::InvalidConfig(
                    "capture bounds must be finite".to_string(),
                ));
            }
        }
        self.atlas_layout()?;
        Ok(())
    }

    /// Sample count and atlas layout of the request, rejecting grids and
    /// atlases too large to count or allocate.
    pub fn atlas_layout(&self) -> Result<(u32, AtlasLayout), CaptureError> {
        let sample_count = directions::checked_total_count(self.zenith_count, self.azimuth_count)
            .ok_or_else(|| {
                CaptureError::InvalidConfig(format!(
                    "{} zenith x {} azimuth samples is too many directions",
                    self.zenith_count, self.azimuth_count
                ))
            })?;

        let layout = AtlasLayout::plan(sample_count, self.cell_pixel_size)
            .filter(|layout| layout.atlas_byte_len().is_some())
            .ok_or_else(|| {
                CaptureError::InvalidConfig(format!(
                    "{} cells of {}px do not fit in an addressable atlas",
                    sample_count, self.cell_pixel_size
                ))
            })?;

        if layout.atlas_pixel_size > MAX_ATLAS_PIXEL_SIZE {
            return Err(CaptureError::InvalidConfig(format!(
                "atlas of {}px exceeds the {}px limit",
                layout.atlas_pixel_size, MAX_ATLAS_PIXEL_SIZE
            )));
        }

        Ok((sample_count, layout))
    }
}

/// Summary of a finished capture.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// Bounds measured on the working copy.
    pub working_bounds: BoundingBox,
    /// Bounds the camera was framed with.
    pub capture_bounds: BoundingBox,
    pub layout: AtlasLayout,
    pub sample_count: u32,
    /// Atlas files written, in capture order.
    pub written: Vec<PathBuf>,
}

/// Runs a capture: renders every direction for every requested channel and
/// writes one atlas per channel.
///
/// The working copy, camera and buffers are owned by this call and dropped on
/// every exit path; the renderer's active pipeline is restored likewise. A
/// render failure aborts the run without writing that channel. A write failure
/// is collected and the remaining channels still run.
pub fn execute<R, W>(
    request: &CaptureRequest,
    renderer: &mut R,
    writer: &mut W,
) -> Result<CaptureReport, CaptureError>
where
    R: RenderService + ?Sized,
    W: AtlasWriter + ?Sized,
{
    request.validate()?;
    let (sample_count, layout) = request.atlas_layout()?;

    let mut working = WorkingCopy::instantiate(&request.target);
    let working_bounds = working.prepare_for_capture();
    if working.root().renderer_count() == 0 {
        warn!(
            "'{}' has no renderable parts, atlases will be blank",
            request.target.name
        );
    }

    let capture_bounds = request.bounds.unwrap_or(working_bounds);
    let half_diagonal = capture_bounds.half_diagonal();
    let mut camera = CaptureCamera::new(working.transform(), half_diagonal);

    let (samples, _) = directions::generate(request.zenith_count, request.azimuth_count);

    info!(
        "Capturing '{}': {} directions ({} zenith x {} azimuth) into {}x{} atlas of {}px cells",
        request.target.name,
        sample_count,
        request.zenith_count + 1,
        request.azimuth_count,
        layout.grid_width,
        layout.grid_width,
        layout.cell_pixel_size
    );

    let mut cell = RgbaImage::new(layout.cell_pixel_size, layout.cell_pixel_size);
    let mut atlas = RgbaImage::new(layout.atlas_pixel_size, layout.atlas_pixel_size);
    let mut written = Vec::new();
    let mut failures = Vec::new();

    for (&channel, pipeline) in &request.channels {
        let rendered = {
            let mut scope = PipelineScope::enter(&mut *renderer, pipeline.clone());
            info!("Casting {} with pipeline '{}'", channel, pipeline);

            compositor::clear(&mut atlas);
            let progress = channel_progress(channel, samples.len());
            let mut rendered = Ok(());

            for sample in &samples {
                place_camera(&mut camera, &capture_bounds, half_diagonal, sample);
                if let Err(source) = scope.render(working.root(), &camera, &mut cell) {
                    rendered = Err(CaptureError::Render {
                        channel,
                        index: sample.index,
                        source,
                        write_failures: Vec::new(),
                    });
                    break;
                }

                let (offset_x, offset_y) = layout.cell_offset(sample.index);
                compositor::composite(&mut atlas, &cell, offset_x, offset_y);
                progress.inc(1);
            }

            progress.finish_and_clear();
            rendered
        };

        let encoded = rendered.and_then(|()| {
            encode_png(&atlas).map_err(|source| CaptureError::Encode {
                channel,
                source,
                write_failures: Vec::new(),
            })
        });
        let bytes = match encoded {
            Ok(bytes) => bytes,
            Err(error) => return Err(error.with_write_failures(failures)),
        };

        let path = channel_output_path(&request.output_stem, channel);
        match writer.write(&path, &bytes) {
            Ok(()) => {
                info!("Saved {} ({} atlas, {} bytes)", path.display(), channel, bytes.len());
                written.push(path);
            }
            Err(error) => {
                warn!("Failed to write {}: {}", path.display(), error);
                failures.push(WriteFailure {
                    channel,
                    path,
                    error,
                });
            }
        }
    }

    if !failures.is_empty() {
        return Err(CaptureError::Write(failures));
    }

    Ok(CaptureReport {
        working_bounds,
        capture_bounds,
        layout,
        sample_count,
        written,
    })
}

/// Puts the camera on the sphere around the bounds, looking back at the centre.
fn place_camera(
    camera: &mut CaptureCamera,
    bounds: &BoundingBox,
    half_diagonal: f32,
    sample: &DirectionSample,
) {
    let position =
        bounds.center - sample.view_direction * half_diagonal * CAMERA_DISTANCE_FACTOR;
    camera.look_from(position, sample.view_direction, sample.up_direction);
    debug!(
        "Sample {} at theta {:.3} phi {:.3} from {:?}",
        sample.index, sample.theta, sample.phi, position
    );
}

fn channel_progress(channel: Channel, samples: usize) -> ProgressBar {
    let pb = ProgressBar::new(samples as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/blue}] {pos}/{len} shots ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏"),
    );
    pb.set_message(format!("Casting {}", channel));
    pb
}
