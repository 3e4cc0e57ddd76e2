/// Shot caster command-line entry point
use bevy::log::info;
use clap::Parser;
use shot_caster::bounds::{BoundsSetting, seed_bounds};
use shot_caster::config::{CaptureSettings, resolve_output_stem};
use shot_caster::render::SoftwareRenderer;
use shot_caster::scene_file::load_scene;
use shot_caster::writer::DiskWriter;
use shot_caster::{Channel, logging};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shot-caster")]
#[command(about = "Captures an object from every direction into per-channel texture atlases")]
#[command(version)]
struct Cli {
    /// Scene description (JSON) of the object to capture
    scene: PathBuf,

    /// Output path; atlases are written as <stem>_<channel>.png
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Capture settings file (JSON)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Pixel size of one atlas cell
    #[arg(long)]
    segment_size: Option<u32>,

    /// Sampling density; 2x zenith rings and 4x azimuth steps per unit
    #[arg(long, allow_negative_numbers = true)]
    segment_count_scale: Option<i32>,

    /// Also write the coverage mask atlas
    #[arg(long)]
    mask: bool,

    #[arg(long)]
    no_albedo: bool,

    #[arg(long)]
    no_normal: bool,

    /// Print the seeded capture bounds as JSON and exit
    #[arg(long)]
    print_bounds: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init("info");

    let target = load_scene(&cli.scene)?;

    if cli.print_bounds {
        let bounds = BoundsSetting::from(seed_bounds(&target));
        println!("{}", serde_json::to_string_pretty(&bounds)?);
        return Ok(());
    }

    let mut settings = match &cli.settings {
        Some(path) => CaptureSettings::load(path)?,
        None => CaptureSettings::default(),
    };
    if let Some(size) = cli.segment_size {
        settings.segment_size = size;
    }
    if let Some(scale) = cli.segment_count_scale {
        settings.segment_count_scale = scale;
    }
    if cli.mask {
        settings.channels.set(Channel::Mask, true);
    }
    if cli.no_albedo {
        settings.channels.set(Channel::Albedo, false);
    }
    if cli.no_normal {
        settings.channels.set(Channel::Normal, false);
    }
    let settings = settings.clamped();

    let picked = cli.output.unwrap_or_else(|| cli.scene.clone());
    let request = settings.to_request(target, resolve_output_stem(&picked));

    let report = shot_caster::execute(&request, &mut SoftwareRenderer::new(), &mut DiskWriter)?;

    info!(
        "Captured {} directions into a {}x{} grid ({}px atlases)",
        report.sample_count,
        report.layout.grid_width,
        report.layout.grid_width,
        report.layout.atlas_pixel_size
    );
    for path in &report.written {
        println!("{}", path.display());
    }

    Ok(())
}
