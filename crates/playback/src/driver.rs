//! Animation driver: the play/pause state machine and the playback position.

use serde::Serialize;
use tracing::{debug, trace};

use crate::time_scale::PlaybackPosition;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    #[default]
    Stopped,
    Playing,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; nothing changed.
    Idle,
    Advanced(PlaybackPosition),
    /// Reached the end of the range and restarted at 0.
    Wrapped,
}

/// An in-progress slider drag.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Scrub {
    resume_playing: bool,
}

/// Owns the playback position and play state.
///
/// Invariant: `position <= scale_range` after every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationDriver {
    position: u32,
    state: DriverState,
    scale_range: u32,
    speed: u32,
    scrub: Option<Scrub>,
}

impl AnimationDriver {
    pub fn new(scale_range: u32, speed: u32) -> Self {
        Self {
            position: 0,
            state: DriverState::Stopped,
            scale_range,
            speed,
            scrub: None,
        }
    }

    pub fn position(&self) -> PlaybackPosition {
        PlaybackPosition::clamped(i64::from(self.position), self.scale_range)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == DriverState::Playing
    }

    pub fn scale_range(&self) -> u32 {
        self.scale_range
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed;
    }

    pub fn toggle(&mut self) -> DriverState {
        self.state = match self.state {
            DriverState::Stopped => DriverState::Playing,
            DriverState::Playing => DriverState::Stopped,
        };
        debug!(state = ?self.state, position = self.position, "playback toggled");
        self.state
    }

    /// Returns `true` if the state changed.
    pub fn play(&mut self) -> bool {
        let changed = self.state != DriverState::Playing;
        self.state = DriverState::Playing;
        changed
    }

    /// Returns `true` if the state changed.
    pub fn stop(&mut self) -> bool {
        let changed = self.state != DriverState::Stopped;
        self.state = DriverState::Stopped;
        changed
    }

    /// Rewinds to 0 without touching the play state.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Moves to `requested`, clamped into `[0, scale_range]`. Does not touch
    /// the play state.
    pub fn seek(&mut self, requested: i64) -> PlaybackPosition {
        let position = PlaybackPosition::clamped(requested, self.scale_range);
        self.position = position.value();
        position
    }

    /// Starts a slider drag: playback stops until [`Self::end_scrub`].
    ///
    /// A second call while already scrubbing keeps the first resume state.
    pub fn begin_scrub(&mut self) {
        if self.scrub.is_none() {
            self.scrub = Some(Scrub {
                resume_playing: self.is_playing(),
            });
        }
        self.stop();
    }

    /// Moves the slider. Inside a drag playback stays stopped; a lone change
    /// (keyboard, or a host that never reports the press) keeps the play
    /// state like [`Self::seek`].
    pub fn scrub_to(&mut self, requested: i64) -> PlaybackPosition {
        if self.scrub.is_some() {
            self.stop();
        }
        self.seek(requested)
    }

    /// Ends a slider drag, resuming playback only if it was on when the drag
    /// began. No-op without a drag in progress.
    pub fn end_scrub(&mut self) -> DriverState {
        if let Some(scrub) = self.scrub.take()
            && scrub.resume_playing
        {
            self.play();
        }
        self.state
    }

    /// Forgets an in-progress drag without resuming.
    pub fn cancel_scrub(&mut self) {
        self.scrub = None;
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }

    /// Advances one frame. The position wraps to 0 instead of reaching or
    /// passing the end of the range.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_playing() {
            return TickOutcome::Idle;
        }
        let next = self.position.saturating_add(self.speed);
        if next >= self.scale_range {
            self.position = 0;
            trace!("playback wrapped");
            TickOutcome::Wrapped
        } else {
            self.position = next;
            TickOutcome::Advanced(PlaybackPosition::clamped(
                i64::from(next),
                self.scale_range,
            ))
        }
    }
}
