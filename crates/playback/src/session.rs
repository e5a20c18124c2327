use runtime::{Event, Frame, FrameClock, FrameScheduler, RecurringTask, TaskControl, TaskHandle};
use tracing::debug;

use crate::coordinator::{PlaybackCoordinator, PlaybackEvent};
use crate::error::PlaybackError;

const ADVANCE_TASK: &str = "playback.advance";

fn advance(frame: Frame, coordinator: &mut PlaybackCoordinator) -> TaskControl {
    coordinator.tick(frame);
    if coordinator.is_playing() {
        TaskControl::Continue
    } else {
        TaskControl::Cancel
    }
}

/// What one frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub tasks_run: usize,
    /// Every event emitted since the previous drain, oldest first.
    pub events: Vec<Event<PlaybackEvent>>,
}

/// A coordinator bound to a frame scheduler.
///
/// At most one advance task is registered at any time: it exists exactly
/// while the coordinator is playing. Mutate the coordinator through
/// [`PlaybackSession::update`] so the task follows the play state.
pub struct PlaybackSession {
    coordinator: PlaybackCoordinator,
    scheduler: FrameScheduler<PlaybackCoordinator>,
    clock: FrameClock,
    animation: Option<TaskHandle>,
}

impl PlaybackSession {
    pub fn new(coordinator: PlaybackCoordinator) -> Self {
        Self {
            coordinator,
            scheduler: FrameScheduler::new(),
            clock: FrameClock::default(),
            animation: None,
        }
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    /// Starts playback, as the map does once it is shown.
    pub fn mount(&mut self) -> Result<(), PlaybackError> {
        self.update(PlaybackCoordinator::play)
    }

    /// Runs `f` against the coordinator, then registers or cancels the
    /// advance task to match the new play state.
    pub fn update<T>(
        &mut self,
        f: impl FnOnce(&mut PlaybackCoordinator) -> T,
    ) -> Result<T, PlaybackError> {
        if self.scheduler.is_closed() {
            return Err(runtime::SchedulerClosed.into());
        }
        let out = f(&mut self.coordinator);
        self.sync()?;
        Ok(out)
    }

    /// Runs one frame and hands over the events it produced, together with
    /// any left over from updates since the last drain.
    pub fn run_frame(&mut self, frame: Frame) -> FrameReport {
        let tasks_run = self.scheduler.run_frame(frame, &mut self.coordinator);
        self.forget_finished_task();
        FrameReport {
            tasks_run,
            events: self.take_events(),
        }
    }

    /// Runs one frame for a host timestamp in milliseconds.
    pub fn run_host_frame(&mut self, host_ms: f64) -> FrameReport {
        let frame = self.clock.advance(host_ms);
        self.run_frame(frame)
    }

    /// Drains pending events outside a frame, e.g. right after an update
    /// while playback is stopped.
    pub fn take_events(&mut self) -> Vec<Event<PlaybackEvent>> {
        self.coordinator.drain_events()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn task_count(&self) -> usize {
        self.scheduler.task_count()
    }

    /// Cancels all frame work and stops playback. No tick fires afterwards
    /// and later updates are rejected.
    pub fn teardown(&mut self) {
        if self.scheduler.is_closed() {
            return;
        }
        self.scheduler.shutdown();
        self.animation = None;
        self.coordinator.stop();
        debug!("playback session torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.scheduler.is_closed()
    }

    fn sync(&mut self) -> Result<(), PlaybackError> {
        self.forget_finished_task();
        match (self.coordinator.is_playing(), self.animation) {
            (true, None) => {
                let handle = self
                    .scheduler
                    .register(RecurringTask::new(ADVANCE_TASK, advance))?;
                self.animation = Some(handle);
            }
            (false, Some(handle)) => {
                self.scheduler.cancel(handle);
                self.animation = None;
                self.clock.rebase();
            }
            _ => {}
        }
        Ok(())
    }

    fn forget_finished_task(&mut self) {
        if let Some(handle) = self.animation
            && !self.scheduler.is_active(handle)
        {
            self.animation = None;
            self.clock.rebase();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catalog::{Dataset, PrepareOptions, RawDataset, Selection};
    use foundation::VoyageId;
    use runtime::Frame;

    use super::PlaybackSession;
    use crate::config::PlaybackConfig;
    use crate::coordinator::{PlaybackCoordinator, PlaybackEvent};
    use crate::error::PlaybackError;

    fn session() -> PlaybackSession {
        let raw = RawDataset::from_json_strs(
            r#"[{"coordinates": [[0, 0, 10], [1, 1, 20], [2, 2, 30]],
                 "metadata": {"vessel": "beagle", "year_from": 1831, "year_to": 1836}}]"#,
            "{}",
            Some(r#"{"minTimestamp": 0, "maxTimestamp": 100}"#),
        )
        .unwrap();
        let dataset = Dataset::prepare(raw, PrepareOptions::default()).unwrap();
        let coordinator =
            PlaybackCoordinator::new(Arc::new(dataset), PlaybackConfig::default()).unwrap();
        PlaybackSession::new(coordinator)
    }

    fn run(session: &mut PlaybackSession, frames: u64) {
        let mut frame = Frame::fixed(0, 1.0 / 60.0);
        for _ in 0..frames {
            session.run_frame(frame);
            frame = frame.next_fixed();
        }
    }

    #[test]
    fn nothing_ticks_before_mount() {
        let mut s = session();
        run(&mut s, 10);
        assert_eq!(s.coordinator().position().value(), 0);
        assert!(!s.is_animating());
    }

    #[test]
    fn mount_starts_animation() {
        let mut s = session();
        s.mount().unwrap();
        assert!(s.is_animating());
        run(&mut s, 10);
        assert_eq!(s.coordinator().position().value(), 10);
    }

    #[test]
    fn stopping_cancels_the_task() {
        let mut s = session();
        s.mount().unwrap();
        run(&mut s, 3);
        s.update(|c| c.toggle()).unwrap();
        assert!(!s.is_animating());
        assert_eq!(s.task_count(), 0);
        run(&mut s, 3);
        assert_eq!(s.coordinator().position().value(), 3);
    }

    #[test]
    fn repeated_selection_never_doubles_the_task() {
        let mut s = session();
        s.mount().unwrap();
        let beagle = Selection::Voyage(VoyageId::new(0));
        assert!(s.update(|c| c.select(beagle)).unwrap().unwrap());
        assert!(!s.update(|c| c.select(beagle)).unwrap().unwrap());
        s.update(|c| c.play()).unwrap();
        assert_eq!(s.task_count(), 1);

        run(&mut s, 4);
        // one task at speed 2
        assert_eq!(s.coordinator().position().value(), 8);
    }

    #[test]
    fn scrub_cancels_and_restores_the_task() {
        let mut s = session();
        s.mount().unwrap();
        s.update(|c| c.begin_scrub()).unwrap();
        assert!(!s.is_animating());
        s.update(|c| c.scrub_to(400)).unwrap();
        run(&mut s, 5);
        assert_eq!(s.coordinator().position().value(), 400);

        s.update(|c| c.end_scrub()).unwrap();
        assert!(s.is_animating());
        run(&mut s, 5);
        assert_eq!(s.coordinator().position().value(), 405);
    }

    #[test]
    fn slider_change_without_press_keeps_animating() {
        let mut s = session();
        s.mount().unwrap();
        s.update(|c| c.scrub_to(1000)).unwrap();
        s.update(|c| c.end_scrub()).unwrap();
        assert!(s.coordinator().is_playing());
        assert!(s.is_animating());
        run(&mut s, 5);
        assert_eq!(s.coordinator().position().value(), 1005);
    }

    #[test]
    fn frames_hand_over_pending_events() {
        let mut s = session();
        s.mount().unwrap();
        let report = s.run_frame(Frame::fixed(0, 1.0 / 60.0));
        assert_eq!(report.tasks_run, 1);
        let payloads: Vec<_> = report.events.into_iter().map(|e| e.payload).collect();
        assert_eq!(payloads, vec![PlaybackEvent::Started]);
        assert!(s.coordinator().events().is_empty());
    }

    #[test]
    fn long_playback_keeps_no_event_backlog() {
        let mut s = session();
        s.mount().unwrap();
        let mut wraps = 0;
        let mut frame = Frame::fixed(0, 1.0 / 60.0);
        for _ in 0..20_000 {
            let report = s.run_frame(frame);
            wraps += report
                .events
                .iter()
                .filter(|e| e.payload == PlaybackEvent::Wrapped)
                .count();
            assert!(s.coordinator().events().is_empty());
            frame = frame.next_fixed();
        }
        assert_eq!(wraps, 4);
    }

    #[test]
    fn host_frames_drive_playback() {
        let mut s = session();
        s.mount().unwrap();
        for i in 0..4 {
            assert_eq!(s.run_host_frame(1000.0 + f64::from(i) * 16.7).tasks_run, 1);
        }
        assert_eq!(s.coordinator().position().value(), 4);
    }

    #[test]
    fn teardown_stops_everything() {
        let mut s = session();
        s.mount().unwrap();
        run(&mut s, 2);
        s.teardown();
        assert!(s.is_torn_down());
        assert!(!s.coordinator().is_playing());
        run(&mut s, 5);
        assert_eq!(s.coordinator().position().value(), 2);
        assert!(matches!(
            s.update(|c| c.play()),
            Err(PlaybackError::SessionClosed(_))
        ));
        assert!(!s.coordinator().is_playing());
        s.teardown();
    }
}
