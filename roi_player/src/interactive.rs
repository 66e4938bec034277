// THEORY:
// The interactive front-end is a HighGUI window around a `PlaybackController`.
// `wait_key` is the scheduler: each loop iteration waits up to the controller's
// interval for a key, then ticks once. Pointer events arrive on HighGUI's callback
// and are handed to the loop through a shared `RegionBuilder`; the loop is the only
// place the detector is touched.

use crate::cv_source::CvSource;
use crate::renderer;
use crate::session::SessionOptions;
use anyhow::Context;
use opencv::highgui;
use roi_watch::playback::{INTERVAL_RANGE_MS, SENSITIVITY_RANGE};
use roi_watch::{
    BoundingBox, DisplayMapping, Frame, PlaybackController, RegionBuilder, Roi, TickOutcome,
};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

const WINDOW: &str = "roi_player";
const POSITION_TRACKBAR: &str = "position";
const SENSITIVITY_STEP: u32 = 10;
const INTERVAL_STEP_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle,
    Step,
    Stop,
    SensitivityUp,
    SensitivityDown,
    IntervalUp,
    IntervalDown,
    ClearRoi,
}

impl Command {
    fn from_key(key: i32) -> Option<Self> {
        match key {
            32 => Some(Self::Toggle),
            27 => Some(Self::Stop),
            k => match u8::try_from(k & 0xFF).ok().map(char::from)? {
                'n' => Some(Self::Step),
                'q' => Some(Self::Stop),
                '+' | '=' => Some(Self::SensitivityUp),
                '-' => Some(Self::SensitivityDown),
                ']' => Some(Self::IntervalUp),
                '[' => Some(Self::IntervalDown),
                'c' => Some(Self::ClearRoi),
                _ => None,
            },
        }
    }
}

/// Pointer state shared with the HighGUI mouse callback.
#[derive(Debug, Default)]
struct Pointer {
    builder: RegionBuilder,
    committed: Option<Roi>,
}

struct Session {
    playback: PlaybackController<CvSource>,
    options: SessionOptions,
    pointer: Arc<Mutex<Pointer>>,
    display: (u32, u32),
    trackbar_position: i32,
    shown: Option<(Frame, Vec<BoundingBox>)>,
}

pub fn run(
    playback: PlaybackController<CvSource>,
    frame_size: (u32, u32),
    options: SessionOptions,
) -> anyhow::Result<()> {
    let display = options.display_size(frame_size);
    let mapping = DisplayMapping::new(display, frame_size);
    let pointer = Arc::new(Mutex::new(Pointer::default()));

    highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE).context("opening window")?;

    let callback_pointer = Arc::clone(&pointer);
    highgui::set_mouse_callback(
        WINDOW,
        Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
            let Ok(mut pointer) = callback_pointer.lock() else {
                return;
            };
            let point = mapping.to_frame(x, y);
            match event {
                highgui::EVENT_LBUTTONDOWN => pointer.builder.begin_region(point),
                highgui::EVENT_MOUSEMOVE => pointer.builder.extend_region(point),
                highgui::EVENT_LBUTTONUP if pointer.builder.is_drawing() => {
                    pointer.builder.extend_region(point);
                    let roi = pointer.builder.commit_region();
                    pointer.committed = Some(roi);
                }
                _ => {}
            }
        })),
    )?;

    let last_index = playback.frame_count().saturating_sub(1).max(1);
    highgui::create_trackbar(POSITION_TRACKBAR, WINDOW, None, last_index as i32, None)?;

    let mut session = Session {
        playback,
        options,
        pointer,
        display,
        trackbar_position: 0,
        shown: None,
    };
    let result = session.event_loop();

    session.playback.stop();
    highgui::destroy_all_windows()?;
    result
}

impl Session {
    fn event_loop(&mut self) -> anyhow::Result<()> {
        loop {
            self.take_committed_roi();
            self.follow_trackbar()?;

            let outcome = self.playback.tick()?;
            self.present(outcome)?;
            self.show()?;

            let wait = self.playback.interval().as_millis().clamp(1, i32::MAX as u128) as i32;
            let key = highgui::wait_key(wait)?;
            if let Some(command) = Command::from_key(key) {
                self.apply(command)?;
            }
            if self.playback.is_stopped() {
                return Ok(());
            }
        }
    }

    fn apply(&mut self, command: Command) -> anyhow::Result<()> {
        let sensitivity = self.playback.sensitivity();
        let interval = self.playback.interval().as_millis() as u64;
        match command {
            Command::Toggle => {
                self.playback.toggle();
            }
            Command::Step => {
                let outcome = self.playback.step()?;
                self.present(outcome)?;
            }
            Command::Stop => self.playback.stop(),
            Command::SensitivityUp => self.playback.set_sensitivity(
                (sensitivity + SENSITIVITY_STEP).min(*SENSITIVITY_RANGE.end()),
            ),
            Command::SensitivityDown => self
                .playback
                .set_sensitivity(sensitivity.saturating_sub(SENSITIVITY_STEP)),
            Command::IntervalUp => self
                .playback
                .set_interval((interval + INTERVAL_STEP_MS).min(*INTERVAL_RANGE_MS.end())),
            Command::IntervalDown => self
                .playback
                .set_interval(interval.saturating_sub(INTERVAL_STEP_MS)),
            Command::ClearRoi => {
                self.playback.detector_mut().set_roi(Roi::whole_frame());
                info!("region of interest cleared");
            }
        }
        Ok(())
    }

    fn present(&mut self, outcome: TickOutcome) -> anyhow::Result<()> {
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Frame(report) => {
                self.options.dump_mask(&self.playback)?;
                if let Some(position) = report.position_report {
                    self.move_trackbar(position)?;
                }
                if report.auto_paused {
                    info!(boxes = report.analysis.boxes.len(), "paused on sustained motion");
                }
                self.shown = Some((report.frame, report.analysis.boxes));
            }
            TickOutcome::EndOfStream { last_frame } => {
                self.move_trackbar(last_frame)?;
            }
        }
        Ok(())
    }

    fn show(&self) -> anyhow::Result<()> {
        let Some((frame, boxes)) = &self.shown else {
            return Ok(());
        };
        let draft = match self.pointer.lock() {
            Ok(pointer) => pointer.builder.draft().to_vec(),
            Err(_) => Vec::new(),
        };
        let canvas = renderer::render(frame, boxes, self.playback.detector().roi(), &draft)?;
        let canvas = renderer::fit_to_display(&canvas, self.display)?;
        highgui::imshow(WINDOW, &canvas)?;
        Ok(())
    }

    fn take_committed_roi(&mut self) {
        let committed = match self.pointer.lock() {
            Ok(mut pointer) => pointer.committed.take(),
            Err(_) => None,
        };
        if let Some(roi) = committed {
            if roi.is_well_formed() {
                info!(roi = %roi, "region of interest set");
            } else {
                warn!(roi = %roi, "region of interest has fewer than 3 points, all motion is masked");
            }
            self.playback.detector_mut().set_roi(roi);
        }
    }

    /// Seeks when the operator dragged the position trackbar.
    fn follow_trackbar(&mut self) -> anyhow::Result<()> {
        let position = highgui::get_trackbar_pos(POSITION_TRACKBAR, WINDOW)?;
        if position == self.trackbar_position {
            return Ok(());
        }
        self.trackbar_position = position;
        if let Err(e) = self.playback.seek(position.max(0) as u64) {
            warn!(error = %e, position, "seek failed");
        }
        Ok(())
    }

    fn move_trackbar(&mut self, position: u64) -> anyhow::Result<()> {
        let position = i32::try_from(position).unwrap_or(i32::MAX);
        highgui::set_trackbar_pos(POSITION_TRACKBAR, WINDOW, position)?;
        self.trackbar_position = position;
        Ok(())
    }
}
