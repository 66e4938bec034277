mod cv_source;
mod headless;
mod interactive;
mod renderer;
mod session;

use anyhow::Context;
use clap::Parser;
use cv_source::CvSource;
use roi_watch::playback::DEFAULT_INTERVAL_MS;
use roi_watch::{PlaybackController, Roi, VideoSource};
use session::SessionOptions;
use std::path::PathBuf;
use tracing::{info, warn};

/// Plays a video and pauses on sustained motion inside a region of interest.
#[derive(Parser, Debug)]
#[command(name = "roi_player", version, about)]
struct Args {
    /// Video file to play.
    video_path: String,

    /// Motion sensitivity, 1-1000. Used as both the pixel difference threshold and
    /// the minimum region area.
    sensitivity: u32,

    /// Milliseconds between frames, 1-300.
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Initial region of interest as `x,y;x,y;...` in frame coordinates.
    #[arg(long, value_name = "POINTS")]
    roi: Option<Roi>,

    /// Render to a video file instead of opening a window.
    #[arg(long, requires = "output")]
    headless: bool,

    /// Annotated output video (headless mode).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write every filtered motion mask as a PNG into this directory.
    #[arg(long, value_name = "DIR")]
    dump_masks: Option<PathBuf>,

    /// Scale the window to this width.
    #[arg(long)]
    display_width: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let source = CvSource::open(&args.video_path)
        .with_context(|| format!("opening {}", args.video_path))?;
    let frame_size = source.size();
    let fps = source.fps();
    info!(
        path = %args.video_path,
        frames = source.frame_count(),
        width = frame_size.0,
        height = frame_size.1,
        fps,
        "video opened"
    );

    let mut playback = PlaybackController::new(source, args.sensitivity);
    playback.set_interval(args.interval);
    if let Some(roi) = args.roi {
        if !roi.is_empty() && !roi.is_well_formed() {
            warn!(roi = %roi, "region of interest has fewer than 3 points, all motion is masked");
        }
        playback.detector_mut().set_roi(roi);
    }

    let options = SessionOptions {
        dump_masks: args.dump_masks,
        display_width: args.display_width,
    };
    options.prepare()?;

    if args.headless {
        let output = args.output.context("--headless needs --output")?;
        headless::run(playback, fps, &output, options).await
    } else {
        interactive::run(playback, frame_size, options)
    }
}
