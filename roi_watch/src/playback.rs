// THEORY:
// The `playback` module owns a video session: the source, the detector and the small
// amount of policy that sits between "a frame was analyzed" and "what the operator
// sees". It never sleeps and never draws. A front-end calls `tick()` on its own
// schedule (honouring `interval()`) and renders whatever the tick hands back.
//
// Key principles:
// 1.  **Auto-pause**: Every analyzed frame with motion bumps a counter. When the
//     counter exceeds `AUTO_PAUSE_LIMIT` playback pauses and the counter restarts.
//     Frames without motion leave the counter alone, so sparse motion still adds up.
// 2.  **One pass per tick**: A tick while playing reads and analyzes exactly one
//     frame. A tick while paused or after stop does nothing. `step` forces a pause
//     and then performs exactly one pass, whatever the state was.
// 3.  **Deterministic release**: End of stream and stop both drop the source right
//     away. A decode failure is treated like running out of frames.
// 4.  **Position reports**: Every `POSITION_REPORT_PERIOD + 1` analyzed frames the
//     tick carries the source position so a front-end can refresh its seek bar
//     without querying on every frame.

use crate::core_modules::frame::frame::Frame;
use crate::error::MotionResult;
use crate::pipeline::{DetectorConfig, FrameAnalysis, MotionDetector};
use crate::source::VideoSource;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{info, warn};

/// Detecting frames tolerated before playback pauses on its own.
pub const AUTO_PAUSE_LIMIT: u32 = 3;
/// A position report is emitted once the frame counter exceeds this.
pub const POSITION_REPORT_PERIOD: u32 = 200;
pub const DEFAULT_INTERVAL_MS: u64 = 1;
pub const SENSITIVITY_RANGE: RangeInclusive<u32> = 1..=1000;
pub const INTERVAL_RANGE_MS: RangeInclusive<u64> = 1..=300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Everything a front-end needs to present one analyzed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub frame: Frame,
    pub analysis: FrameAnalysis,
    /// This frame tipped the detection counter over the limit and paused playback.
    pub auto_paused: bool,
    /// Source position to show, when a periodic report is due.
    pub position_report: Option<u64>,
}

/// The result of one `tick` or `step`.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// Nothing was read: paused, stopped or already at the end.
    Idle,
    Frame(FrameReport),
    /// The stream ran out (or failed to decode). The source has been released.
    EndOfStream { last_frame: u64 },
}

/// Drives a `VideoSource` through a `MotionDetector` with play/pause/step semantics.
pub struct PlaybackController<S: VideoSource> {
    source: Option<S>,
    detector: MotionDetector,
    state: PlaybackState,
    interval: Duration,
    sensitivity: u32,
    detection_count: u32,
    frames_since_report: u32,
    position_indicator: u64,
    frame_count: u64,
    stopped: bool,
}

impl<S: VideoSource> PlaybackController<S> {
    /// Starts a playing session over `source` with both detector thresholds set
    /// from `sensitivity`.
    pub fn new(source: S, sensitivity: u32) -> Self {
        let sensitivity = clamp_sensitivity(sensitivity);
        Self::with_detector(
            source,
            MotionDetector::new(DetectorConfig::from_sensitivity(sensitivity)),
        )
    }

    /// Starts a playing session with a preconfigured detector (ROI, split thresholds).
    pub fn with_detector(source: S, detector: MotionDetector) -> Self {
        let frame_count = source.frame_count();
        let position_indicator = source.current_position();
        let config = detector.config();
        Self {
            source: Some(source),
            detector,
            state: PlaybackState::Playing,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            sensitivity: clamp_sensitivity(config.intensity_threshold),
            detection_count: 0,
            frames_since_report: 0,
            position_indicator,
            frame_count,
            stopped: false,
        }
    }

    /// Performs one pass if playing, otherwise does nothing.
    pub fn tick(&mut self) -> MotionResult<TickOutcome> {
        if self.stopped || self.source.is_none() || self.state == PlaybackState::Paused {
            return Ok(TickOutcome::Idle);
        }
        self.advance()
    }

    /// Flips between playing and paused and returns the new state.
    pub fn toggle(&mut self) -> PlaybackState {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        };
        info!(state = ?self.state, "playback toggled");
        self.state
    }

    /// Pauses, then performs exactly one pass.
    pub fn step(&mut self) -> MotionResult<TickOutcome> {
        self.state = PlaybackState::Paused;
        if self.stopped || self.source.is_none() {
            return Ok(TickOutcome::Idle);
        }
        self.advance()
    }

    /// Releases the source. No further frames are read.
    pub fn stop(&mut self) {
        if self.source.take().is_some() {
            info!("playback stopped, source released");
        }
        self.stopped = true;
    }

    /// Repositions the source. Playback state is unchanged, and so is the detector's
    /// previous frame.
    pub fn seek(&mut self, index: u64) -> MotionResult<()> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        source.seek(index)?;
        self.position_indicator = index;
        info!(index, "seeked");
        Ok(())
    }

    /// Updates both detector thresholds. Values are clamped to `SENSITIVITY_RANGE`.
    pub fn set_sensitivity(&mut self, sensitivity: u32) {
        self.sensitivity = clamp_sensitivity(sensitivity);
        self.detector.set_sensitivity(self.sensitivity);
        info!(sensitivity = self.sensitivity, "sensitivity changed");
    }

    /// Updates the tick interval. Values are clamped to `INTERVAL_RANGE_MS`.
    pub fn set_interval(&mut self, millis: u64) {
        let millis = millis.clamp(*INTERVAL_RANGE_MS.start(), *INTERVAL_RANGE_MS.end());
        self.interval = Duration::from_millis(millis);
        info!(interval_ms = millis, "interval changed");
    }

    /// Feeds one detection result into the auto-pause counter. Returns `true` when
    /// this result paused playback.
    pub fn apply_detection(&mut self, motion_present: bool) -> bool {
        if !motion_present {
            return false;
        }
        self.detection_count += 1;
        if self.detection_count > AUTO_PAUSE_LIMIT {
            self.state = PlaybackState::Paused;
            self.detection_count = 0;
            info!("sustained motion, playback auto-paused");
            return true;
        }
        false
    }

    /// Pauses on the last frame and releases the source. Returns the last frame index.
    pub fn end_of_stream(&mut self) -> u64 {
        let last_frame = self.frame_count.saturating_sub(1);
        self.position_indicator = last_frame;
        self.state = PlaybackState::Paused;
        self.source = None;
        info!(last_frame, "end of stream");
        last_frame
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Whether a source is still held.
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn sensitivity(&self) -> u32 {
        self.sensitivity
    }

    pub fn detection_count(&self) -> u32 {
        self.detection_count
    }

    /// Last position shown to the operator (seek, periodic report or end of stream).
    pub fn position_indicator(&self) -> u64 {
        self.position_indicator
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Index of the next frame the source will decode, while a source is held.
    pub fn current_position(&self) -> Option<u64> {
        self.source.as_ref().map(VideoSource::current_position)
    }

    pub fn detector(&self) -> &MotionDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut MotionDetector {
        &mut self.detector
    }

    fn advance(&mut self) -> MotionResult<TickOutcome> {
        let Some(source) = self.source.as_mut() else {
            return Ok(TickOutcome::Idle);
        };

        let frame = match source.read_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                return Ok(TickOutcome::EndOfStream {
                    last_frame: self.end_of_stream(),
                });
            }
            Err(e) if e.is_end_of_stream() => {
                warn!(error = %e, "frame could not be decoded, ending stream");
                return Ok(TickOutcome::EndOfStream {
                    last_frame: self.end_of_stream(),
                });
            }
            Err(e) => return Err(e),
        };

        let analysis = self.detector.process_frame(&frame)?;
        let auto_paused = self.apply_detection(analysis.motion_present);
        let position_report = self.next_position_report();

        Ok(TickOutcome::Frame(FrameReport {
            frame,
            analysis,
            auto_paused,
            position_report,
        }))
    }

    fn next_position_report(&mut self) -> Option<u64> {
        self.frames_since_report += 1;
        if self.frames_since_report <= POSITION_REPORT_PERIOD {
            return None;
        }
        self.frames_since_report = 0;
        let position = self.source.as_ref()?.current_position();
        self.position_indicator = position;
        Some(position)
    }
}

fn clamp_sensitivity(sensitivity: u32) -> u32 {
    sensitivity.clamp(*SENSITIVITY_RANGE.start(), *SENSITIVITY_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn controller() -> PlaybackController<MemorySource> {
        PlaybackController::new(MemorySource::new(vec![Frame::new(8, 8); 3]), 25)
    }

    #[test]
    fn starts_playing_with_defaults() {
        let playback = controller();
        assert!(playback.is_playing());
        assert_eq!(playback.interval(), Duration::from_millis(DEFAULT_INTERVAL_MS));
        assert_eq!(playback.frame_count(), 3);
        assert_eq!(playback.detection_count(), 0);
    }

    #[test]
    fn counter_pauses_after_the_limit_and_restarts() {
        let mut playback = controller();
        for _ in 0..AUTO_PAUSE_LIMIT {
            assert!(!playback.apply_detection(true));
        }
        assert!(playback.is_playing());

        assert!(playback.apply_detection(true));
        assert_eq!(playback.state(), PlaybackState::Paused);
        assert_eq!(playback.detection_count(), 0);
    }

    #[test]
    fn quiet_frames_do_not_reset_the_counter() {
        let mut playback = controller();
        playback.apply_detection(true);
        playback.apply_detection(false);
        playback.apply_detection(true);
        playback.apply_detection(false);
        assert_eq!(playback.detection_count(), 2);
    }

    #[test]
    fn toggle_flips_state() {
        let mut playback = controller();
        assert_eq!(playback.toggle(), PlaybackState::Paused);
        assert_eq!(playback.toggle(), PlaybackState::Playing);
    }

    #[test]
    fn settings_are_clamped() {
        let mut playback = controller();
        playback.set_sensitivity(0);
        assert_eq!(playback.sensitivity(), 1);
        playback.set_sensitivity(5000);
        assert_eq!(playback.sensitivity(), 1000);
        assert_eq!(playback.detector().config(), DetectorConfig::from_sensitivity(1000));

        playback.set_interval(0);
        assert_eq!(playback.interval(), Duration::from_millis(1));
        playback.set_interval(301);
        assert_eq!(playback.interval(), Duration::from_millis(300));
    }

    #[test]
    fn end_of_stream_on_empty_source_points_at_zero() {
        let mut playback = PlaybackController::new(MemorySource::default(), 25);
        assert!(matches!(
            playback.tick().unwrap(),
            TickOutcome::EndOfStream { last_frame: 0 }
        ));
        assert!(!playback.has_source());
    }
}
