use clap::{Parser, Subcommand};
use pano_slicer::config::{self, SlicerConfig};
use pano_slicer::imaging::{RustBackend, SliceMode, calculate_slicing_plan};
use pano_slicer::output;
use pano_slicer::session::Session;
use pano_slicer::source::probe_source;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pano-slicer")]
#[command(about = "Slice a panorama into a seamless Instagram carousel")]
#[command(long_about = "\
Slice a panorama into a seamless Instagram carousel

A landscape image is scaled and cut into equal 3:4 portrait tiles that line
up edge to edge when swiped. A letterboxed full-view tile showing the whole
panorama is added, and everything is packed into a zip archive:

  instagram_carousel_slices.zip
  ├── standard_slices/             # or high_res_slices/ with --high-res
  │   ├── slice_00_full_view.jpg
  │   ├── slice_01.jpg
  │   └── slice_NN.jpg
  └── README.txt

Standard tiles are 1080×1440. High-res tiles keep the original height.

Run 'pano-slicer gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Shared flags for commands that read an image.
#[derive(clap::Args, Clone)]
struct ImageArgs {
    /// Panorama image (JPEG, PNG, WebP, TIFF, BMP, GIF)
    image: PathBuf,

    /// Keep the original height instead of scaling to 1440px tiles
    #[arg(long)]
    high_res: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show how an image would be sliced
    Plan {
        #[command(flatten)]
        image: ImageArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Slice an image and write the zip archive
    Slice {
        #[command(flatten)]
        image: ImageArgs,

        /// Archive path (defaults to the configured archive name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Plan { image, json } => {
            let config = config::load_config(cli.config.as_deref())?;
            let mode = SliceMode::from_high_res(image.high_res);

            // Header dimensions are enough; pixels are never decoded.
            let bytes = std::fs::read(&image.image)?;
            let dims = probe_source(&RustBackend::new(), &bytes)?;
            let plan = calculate_slicing_plan(dims, mode, &config.layout_params());
            let summary = output::PlanSummary::new(dims, mode, plan);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                output::print_plan(&summary);
            }
        }
        Command::Slice {
            image,
            output: archive_path,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            let (mut session, dims) = open_session(&config, &image).await?;
            let plan = session.process().await?;
            output::print_plan(&output::PlanSummary::new(dims, session.mode(), plan));

            if let Some(run) = session.processed() {
                println!();
                output::print_slices(run);
            }

            let path = archive_path.unwrap_or_else(|| PathBuf::from(&config.output.archive_name));
            let archive = session.download_to(&path).await?;
            output::print_archive(&archive, &path);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build a session in the mode the flags ask for and upload the image.
async fn open_session(
    config: &SlicerConfig,
    args: &ImageArgs,
) -> Result<(Session<RustBackend>, (u32, u32)), Box<dyn std::error::Error>> {
    let mut session = Session::new(RustBackend::new(), config)?;
    session.set_mode(SliceMode::from_high_res(args.high_res));

    log::debug!("reading {}", args.image.display());
    let bytes = std::fs::read(&args.image)?;
    let dims = session.upload(bytes).await?;
    Ok((session, dims))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
