use crate::cv_source::CvSource;
use crate::renderer;
use crate::session::SessionOptions;
use anyhow::Context;
use opencv::{core, prelude::*, videoio::VideoWriter};
use roi_watch::{PlaybackController, TickOutcome};
use std::path::Path;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

/// Plays the whole stream without a window, writing every annotated frame to
/// `output`. Nobody is there to resume an auto-pause, so playback resumes on its own.
pub async fn run(
    mut playback: PlaybackController<CvSource>,
    fps: f64,
    output: &Path,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let output_path = output
        .to_str()
        .context("output path must be valid UTF-8")?
        .to_owned();
    let mut writer: Option<VideoWriter> = None;
    let mut written: u64 = 0;

    let mut ticker = time::interval(playback.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                info!("interrupted, stopping");
                playback.stop();
                break;
            }
            _ = ticker.tick() => {
                match playback.tick()? {
                    TickOutcome::Frame(report) => {
                        options.dump_mask(&playback)?;
                        if report.auto_paused {
                            info!(boxes = report.analysis.boxes.len(), "sustained motion, resuming");
                            playback.toggle();
                        }
                        if let Some(position) = report.position_report {
                            info!(position, total = playback.frame_count(), "progress");
                        }

                        let canvas = renderer::render(
                            &report.frame,
                            &report.analysis.boxes,
                            playback.detector().roi(),
                            &[],
                        )?;
                        if writer.is_none() {
                            writer = Some(open_writer(&output_path, fps, &canvas)?);
                        }
                        if let Some(writer) = writer.as_mut() {
                            writer.write(&canvas)?;
                            written += 1;
                        }
                    }
                    TickOutcome::EndOfStream { last_frame } => {
                        info!(last_frame, "stream finished");
                        break;
                    }
                    TickOutcome::Idle => break,
                }
            }
        }
    }

    if let Some(mut writer) = writer {
        writer.release()?;
    }
    info!(frames = written, output = %output.display(), "processing complete");
    Ok(())
}

fn open_writer(path: &str, fps: f64, first: &core::Mat) -> anyhow::Result<VideoWriter> {
    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let writer = VideoWriter::new(path, fourcc, fps, first.size()?, true)
        .with_context(|| format!("creating output video {path}"))?;
    if !writer.is_opened()? {
        anyhow::bail!("no encoder could open {path}");
    }
    Ok(writer)
}
