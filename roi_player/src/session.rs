use anyhow::Context;
use roi_watch::core_modules::utils::image_helper::image_helper::{mask_file_name, save_gray};
use roi_watch::{PlaybackController, VideoSource};
use std::path::PathBuf;
use tracing::debug;

/// Front-end settings shared by the interactive and headless modes.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Directory receiving a PNG of every filtered motion mask.
    pub dump_masks: Option<PathBuf>,
    /// Width of the interactive window; frames are scaled to fit.
    pub display_width: Option<u32>,
}

impl SessionOptions {
    pub fn prepare(&self) -> anyhow::Result<()> {
        if let Some(dir) = &self.dump_masks {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating mask directory {}", dir.display()))?;
        }
        Ok(())
    }

    /// Writes the mask of the frame just processed, if dumping is enabled.
    pub fn dump_mask<S: VideoSource>(&self, playback: &PlaybackController<S>) -> anyhow::Result<()> {
        let Some(dir) = &self.dump_masks else {
            return Ok(());
        };
        let (Some(mask), Some(position)) =
            (playback.detector().last_mask(), playback.current_position())
        else {
            return Ok(());
        };

        let path = dir.join(mask_file_name(position.saturating_sub(1)));
        save_gray(&path, mask).with_context(|| format!("writing mask {}", path.display()))?;
        debug!(path = %path.display(), "mask written");
        Ok(())
    }

    /// Display size for a frame of `frame` size.
    pub fn display_size(&self, frame: (u32, u32)) -> (u32, u32) {
        match self.display_width {
            Some(width) if frame.0 > 0 && width > 0 => {
                let height = (u64::from(frame.1) * u64::from(width) / u64::from(frame.0)).max(1);
                (width, height as u32)
            }
            _ => frame,
        }
    }
}
