//! Playback coordinator: owns the playback state and wires the time scale,
//! driver, selector and scroll sync together.
//!
//! Every mutation goes through a method here. Each method applies its change
//! completely before returning, so reads after a call always observe a
//! consistent `(selection, scale, position, state)` tuple.

use std::sync::Arc;

use catalog::{Dataset, Occurrence, Selection, Voyage};
use foundation::{TimeRange, Timestamp, calendar};
use runtime::{Event, EventBus, Frame, Metrics, MetricsSnapshot};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::PlaybackConfig;
use crate::driver::{AnimationDriver, DriverState, TickOutcome};
use crate::error::PlaybackError;
use crate::labels::{self, Header, OccurrenceRow, RangeLabels, SelectorOption};
use crate::scroll_sync::ScrollSync;
use crate::selector::VoyageSelector;
use crate::time_scale::{PlaybackPosition, TimeScale};

pub const METRIC_TICKS: &str = "playback.ticks";
pub const METRIC_WRAPS: &str = "playback.wraps";
pub const METRIC_SEEKS: &str = "playback.seeks";
pub const METRIC_SELECTIONS: &str = "playback.selections";
pub const GAUGE_POSITION: &str = "playback.position";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    Started,
    Stopped,
    Seeked { position: PlaybackPosition },
    Wrapped,
    SelectionChanged { selection: Selection },
    /// The occurrence list should scroll so that `row` is at the top.
    Scrolled { row: usize },
}

/// Everything a view layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackView {
    pub position: PlaybackPosition,
    pub scale_range: u32,
    pub slider_step: u32,
    pub state: DriverState,
    pub is_playing: bool,
    pub selection: Selection,
    pub timestamp: Timestamp,
    /// Month name and year of `timestamp`.
    pub date_label: String,
    pub range_labels: RangeLabels,
    pub header: Header,
    pub scroll_row: Option<usize>,
}

pub struct PlaybackCoordinator {
    dataset: Arc<Dataset>,
    config: PlaybackConfig,
    selector: VoyageSelector,
    driver: AnimationDriver,
    scroll: ScrollSync,
    events: EventBus<PlaybackEvent>,
    metrics: Metrics,
    frame_index: u64,
}

impl PlaybackCoordinator {
    /// Starts stopped at position 0 with every voyage shown.
    pub fn new(dataset: Arc<Dataset>, config: PlaybackConfig) -> Result<Self, PlaybackError> {
        let config = config.validate()?;
        let selector = VoyageSelector::new(&dataset, config.scale_range);
        let driver = AnimationDriver::new(config.scale_range, config.speed_for(Selection::All));
        Ok(Self {
            dataset,
            config,
            selector,
            driver,
            scroll: ScrollSync::new(),
            events: EventBus::new(),
            metrics: Metrics::new(),
            frame_index: 0,
        })
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // --- driver -----------------------------------------------------------

    pub fn play(&mut self) {
        if self.driver.play() {
            self.emit(PlaybackEvent::Started);
        }
    }

    pub fn stop(&mut self) {
        if self.driver.stop() {
            self.emit(PlaybackEvent::Stopped);
        }
    }

    pub fn toggle(&mut self) -> DriverState {
        let state = self.driver.toggle();
        self.emit_state(state);
        state
    }

    /// Rewinds to 0; the play state is unchanged.
    pub fn reset(&mut self) {
        self.driver.reset();
        self.position_changed();
    }

    /// Moves playback to `requested`, clamped into the range. A seek during
    /// playback pauses, moves, then resumes.
    pub fn seek(&mut self, requested: i64) -> PlaybackPosition {
        let was_playing = self.driver.is_playing();
        self.driver.stop();
        let position = self.driver.seek(requested);
        if was_playing {
            self.driver.play();
        }
        self.metrics.inc_counter(METRIC_SEEKS, 1);
        self.position_changed();
        position
    }

    /// Slider pressed.
    pub fn begin_scrub(&mut self) {
        let was_playing = self.driver.is_playing();
        self.driver.begin_scrub();
        if was_playing {
            self.emit(PlaybackEvent::Stopped);
        }
    }

    /// Slider moved. Outside a drag this behaves like [`Self::seek`].
    pub fn scrub_to(&mut self, requested: i64) -> PlaybackPosition {
        let was_playing = self.driver.is_playing();
        let position = self.driver.scrub_to(requested);
        if was_playing && !self.driver.is_playing() {
            self.emit(PlaybackEvent::Stopped);
        }
        self.metrics.inc_counter(METRIC_SEEKS, 1);
        self.position_changed();
        position
    }

    /// Slider released.
    pub fn end_scrub(&mut self) -> DriverState {
        let was_playing = self.driver.is_playing();
        let state = self.driver.end_scrub();
        if !was_playing && state == DriverState::Playing {
            self.emit(PlaybackEvent::Started);
        }
        state
    }

    // --- selection --------------------------------------------------------

    /// Shows `selection` and restarts playback from 0.
    ///
    /// Returns `Ok(false)` without touching anything when `selection` is
    /// already active.
    pub fn select(&mut self, selection: Selection) -> Result<bool, PlaybackError> {
        if !self.selector.select(&self.dataset, selection)? {
            debug!(?selection, "selection unchanged");
            return Ok(false);
        }

        self.driver.cancel_scrub();
        self.driver.set_speed(self.config.speed_for(selection));
        self.driver.reset();
        self.scroll.reset();
        self.metrics.inc_counter(METRIC_SELECTIONS, 1);
        self.emit(PlaybackEvent::SelectionChanged { selection });
        self.play();
        self.position_changed();
        Ok(true)
    }

    // --- occurrence list --------------------------------------------------

    /// The list was scrolled by the user so that `top_row` is the first
    /// visible row. Seeks only while stopped.
    pub fn manual_scroll(&mut self, top_row: usize) -> Option<PlaybackPosition> {
        let occurrences = self.dataset.occurrences_for_selection(self.selector.selection());
        let target = self.scroll.follow_list(
            occurrences,
            self.driver.state(),
            self.selector.time_scale(),
            top_row,
        )?;
        Some(self.seek(i64::from(target.value())))
    }

    // --- frames -----------------------------------------------------------

    /// Advances playback by one frame.
    pub fn tick(&mut self, frame: Frame) -> TickOutcome {
        self.frame_index = frame.index;
        let outcome = self.driver.tick();
        match outcome {
            TickOutcome::Idle => return outcome,
            TickOutcome::Wrapped => {
                self.metrics.inc_counter(METRIC_WRAPS, 1);
                info!(selection = ?self.selector.selection(), "playback wrapped");
                self.emit(PlaybackEvent::Wrapped);
            }
            TickOutcome::Advanced(_) => {}
        }
        self.metrics.inc_counter(METRIC_TICKS, 1);
        self.position_changed();
        outcome
    }

    // --- reads ------------------------------------------------------------

    pub fn position(&self) -> PlaybackPosition {
        self.driver.position()
    }

    pub fn state(&self) -> DriverState {
        self.driver.state()
    }

    pub fn is_playing(&self) -> bool {
        self.driver.is_playing()
    }

    pub fn is_scrubbing(&self) -> bool {
        self.driver.is_scrubbing()
    }

    pub fn speed(&self) -> u32 {
        self.driver.speed()
    }

    pub fn selection(&self) -> Selection {
        self.selector.selection()
    }

    pub fn time_range(&self) -> TimeRange {
        self.selector.time_range()
    }

    pub fn time_scale(&self) -> &TimeScale {
        self.selector.time_scale()
    }

    pub fn current_timestamp(&self) -> Timestamp {
        self.selector.time_scale().inverse(self.driver.position())
    }

    /// e.g. `March 1832`; empty if the timestamp is outside the calendar.
    pub fn date_label(&self) -> String {
        calendar::month_year(self.current_timestamp())
            .map(|my| my.to_string())
            .unwrap_or_default()
    }

    pub fn range_labels(&self) -> RangeLabels {
        labels::range_labels(self.selector.time_scale(), self.selector.selection())
    }

    pub fn header(&self) -> Header {
        labels::header(&self.dataset, self.selector.selection())
    }

    pub fn selector_options(&self) -> Vec<SelectorOption> {
        labels::selector_options(&self.dataset, self.selector.selection())
    }

    pub fn visible_voyages(&self) -> &[Voyage] {
        self.dataset.visible_voyages(self.selector.selection())
    }

    /// Occurrences listed for the current selection; empty for all voyages.
    pub fn occurrences(&self) -> &[Occurrence] {
        self.dataset.occurrences_for_selection(self.selector.selection())
    }

    pub fn occurrence_rows(&self) -> Vec<OccurrenceRow> {
        self.occurrences().iter().map(OccurrenceRow::from).collect()
    }

    /// Row the occurrence list was last scrolled to by playback.
    pub fn scroll_row(&self) -> Option<usize> {
        self.scroll.row()
    }

    pub fn view(&self) -> PlaybackView {
        PlaybackView {
            position: self.position(),
            scale_range: self.config.scale_range,
            slider_step: self.config.slider_step,
            state: self.state(),
            is_playing: self.is_playing(),
            selection: self.selection(),
            timestamp: self.current_timestamp(),
            date_label: self.date_label(),
            range_labels: self.range_labels(),
            header: self.header(),
            scroll_row: self.scroll_row(),
        }
    }

    pub fn events(&self) -> &[Event<PlaybackEvent>] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event<PlaybackEvent>> {
        self.events.drain()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // --- internals --------------------------------------------------------

    fn emit(&mut self, event: PlaybackEvent) {
        self.events.emit(self.frame_index, event);
    }

    fn emit_state(&mut self, state: DriverState) {
        self.emit(match state {
            DriverState::Playing => PlaybackEvent::Started,
            DriverState::Stopped => PlaybackEvent::Stopped,
        });
    }

    fn position_changed(&mut self) {
        let position = self.driver.position();
        self.metrics
            .set_gauge(GAUGE_POSITION, i64::from(position.value()));

        let previous = self.scroll.row();
        let occurrences = self.dataset.occurrences_for_selection(self.selector.selection());
        let row = self.scroll.follow_playback(
            occurrences,
            self.driver.state(),
            self.selector.time_scale(),
            position,
        );
        if let Some(row) = row
            && previous != Some(row)
        {
            self.emit(PlaybackEvent::Scrolled { row });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catalog::{Dataset, PrepareOptions, RawDataset, Selection};
    use foundation::{TimeRange, Timestamp, VoyageId};
    use pretty_assertions::assert_eq;
    use runtime::Frame;

    use super::*;

    const VOYAGES: &str = r#"[
        {"coordinates": [[0, 0, 10], [1, 1, 20], [2, 2, 30]],
         "metadata": {"vessel": "beagle", "year_from": 1831, "year_to": 1836}},
        {"coordinates": [[0, 0, 0], [1, 1, 50], [2, 2, 100]],
         "metadata": {"vessel": "challenger", "year_from": 1872, "year_to": 1876}}
    ]"#;

    const OCCURRENCES: &str = r#"{
        "challenger": [[5, 1, "Fucus"], [15, 2, "Sargassum"], [25, 3, "Globigerina"]]
    }"#;

    const BEAGLE: Selection = Selection::Voyage(VoyageId::new(0));
    const CHALLENGER: Selection = Selection::Voyage(VoyageId::new(1));

    fn coordinator() -> PlaybackCoordinator {
        let raw = RawDataset::from_json_strs(
            VOYAGES,
            OCCURRENCES,
            Some(r#"{"minTimestamp": 0, "maxTimestamp": 100}"#),
        )
        .unwrap();
        let dataset = Dataset::prepare(raw, PrepareOptions::default()).unwrap();
        PlaybackCoordinator::new(Arc::new(dataset), PlaybackConfig::default()).unwrap()
    }

    fn payloads(c: &mut PlaybackCoordinator) -> Vec<PlaybackEvent> {
        c.drain_events().into_iter().map(|e| e.payload).collect()
    }

    #[test]
    fn starts_stopped_on_dataset_bounds() {
        let c = coordinator();
        assert_eq!(c.state(), DriverState::Stopped);
        assert_eq!(c.position(), PlaybackPosition::ZERO);
        assert_eq!(c.selection(), Selection::All);
        assert_eq!(c.time_range(), TimeRange::new(Timestamp(0.0), Timestamp(100.0)));
        assert_eq!(c.speed(), 1);
    }

    #[test]
    fn rejects_invalid_config() {
        let c = coordinator();
        let config = PlaybackConfig {
            scale_range: 0,
            ..PlaybackConfig::default()
        };
        assert!(matches!(
            PlaybackCoordinator::new(Arc::clone(c.dataset()), config),
            Err(PlaybackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn selecting_voyage_restarts_on_its_track() {
        let mut c = coordinator();
        c.seek(700);
        assert!(c.select(BEAGLE).unwrap());
        assert_eq!(c.time_range(), TimeRange::new(Timestamp(10.0), Timestamp(30.0)));
        assert_eq!(c.position(), PlaybackPosition::ZERO);
        assert_eq!(c.state(), DriverState::Playing);
        assert_eq!(c.speed(), 2);

        assert!(c.select(Selection::All).unwrap());
        assert_eq!(c.speed(), 1);
    }

    #[test]
    fn reselecting_does_not_restart() {
        let mut c = coordinator();
        c.select(BEAGLE).unwrap();
        for i in 0..5 {
            c.tick(Frame::fixed(i, 1.0 / 60.0));
        }
        assert_eq!(c.position().value(), 10);
        c.drain_events();

        assert!(!c.select(BEAGLE).unwrap());
        assert_eq!(c.position().value(), 10);
        assert!(c.events().is_empty());
    }

    #[test]
    fn unknown_voyage_is_rejected() {
        let mut c = coordinator();
        c.seek(42);
        let err = c.select(Selection::Voyage(VoyageId::new(9))).unwrap_err();
        assert!(matches!(err, PlaybackError::UnknownSelection(_)));
        assert_eq!(c.selection(), Selection::All);
        assert_eq!(c.position().value(), 42);
        assert_eq!(c.state(), DriverState::Stopped);
    }

    #[test]
    fn seek_while_playing_keeps_playing() {
        let mut c = coordinator();
        c.play();
        assert_eq!(c.seek(9000).value(), 5000);
        assert!(c.is_playing());
        assert_eq!(c.seek(-3).value(), 0);
        assert_eq!(c.metrics().counters, vec![(METRIC_SEEKS, 2)]);
    }

    #[test]
    fn playback_drives_scroll_row() {
        let mut c = coordinator();
        c.select(CHALLENGER).unwrap();
        // 1000 of 5000 over 0..100 is t=20; one tick at speed 2 lands on 20.04
        c.seek(1000);
        c.tick(Frame::fixed(0, 1.0 / 60.0));
        assert_eq!(c.scroll_row(), Some(2));
        assert!(
            c.events()
                .iter()
                .any(|e| e.payload == PlaybackEvent::Scrolled { row: 2 })
        );
    }

    #[test]
    fn scroll_row_events_fire_only_on_change() {
        let mut c = coordinator();
        c.select(CHALLENGER).unwrap();
        c.seek(1000);
        c.drain_events();
        c.tick(Frame::fixed(0, 1.0 / 60.0));
        c.tick(Frame::fixed(1, 1.0 / 60.0));
        assert!(c.events().is_empty());
    }

    #[test]
    fn manual_scroll_seeks_only_while_stopped() {
        let mut c = coordinator();
        c.select(CHALLENGER).unwrap();
        assert_eq!(c.manual_scroll(1), None);

        c.stop();
        assert_eq!(c.manual_scroll(1), Some(PlaybackPosition::clamped(750, 5000)));
        assert_eq!(c.position().value(), 750);
        assert!(!c.is_playing());
        assert_eq!(c.manual_scroll(3), None);
    }

    #[test]
    fn manual_scroll_without_occurrences_is_noop() {
        let mut c = coordinator();
        assert_eq!(c.manual_scroll(0), None);
        c.select(BEAGLE).unwrap();
        c.stop();
        assert_eq!(c.manual_scroll(0), None);
        assert_eq!(c.position(), PlaybackPosition::ZERO);
    }

    #[test]
    fn scrub_pauses_and_resumes() {
        let mut c = coordinator();
        c.play();
        c.drain_events();

        c.begin_scrub();
        assert!(c.is_scrubbing());
        c.scrub_to(2500);
        assert_eq!(c.tick(Frame::fixed(0, 1.0 / 60.0)), TickOutcome::Idle);
        assert_eq!(c.end_scrub(), DriverState::Playing);
        assert_eq!(c.position().value(), 2500);
        assert_eq!(
            payloads(&mut c),
            vec![
                PlaybackEvent::Stopped,
                PlaybackEvent::Started,
            ]
        );
    }

    #[test]
    fn slider_change_without_press_keeps_playing() {
        let mut c = coordinator();
        c.play();
        c.drain_events();
        c.scrub_to(1200);
        assert!(c.is_playing());
        let events = payloads(&mut c);
        assert!(!events.contains(&PlaybackEvent::Stopped));
        assert!(!events.contains(&PlaybackEvent::Started));
        assert_eq!(
            c.tick(Frame::fixed(0, 1.0 / 60.0)),
            TickOutcome::Advanced(PlaybackPosition::clamped(1201, 5000))
        );
    }

    #[test]
    fn selecting_during_drag_ends_the_drag() {
        let mut c = coordinator();
        c.play();
        c.begin_scrub();
        c.select(BEAGLE).unwrap();
        assert!(c.is_playing());
        assert!(!c.is_scrubbing());
        c.tick(Frame::fixed(0, 1.0 / 60.0));
        assert_eq!(c.end_scrub(), DriverState::Playing);
        assert_eq!(c.position().value(), 2);
    }

    #[test]
    fn tick_wraps_and_counts() {
        let mut c = coordinator();
        c.play();
        c.seek(4999);
        assert_eq!(c.tick(Frame::fixed(7, 1.0 / 60.0)), TickOutcome::Wrapped);
        assert_eq!(c.position(), PlaybackPosition::ZERO);

        let snap = c.metrics();
        assert_eq!(
            snap.counters,
            vec![(METRIC_SEEKS, 1), (METRIC_TICKS, 1), (METRIC_WRAPS, 1)]
        );
        assert_eq!(snap.gauges, vec![(GAUGE_POSITION, 0)]);
        let wrapped = c
            .events()
            .iter()
            .find(|e| e.payload == PlaybackEvent::Wrapped)
            .unwrap();
        assert_eq!(wrapped.frame_index, 7);
    }

    #[test]
    fn toggle_twice_is_identity() {
        let mut c = coordinator();
        c.seek(321);
        c.toggle();
        c.toggle();
        assert_eq!(c.state(), DriverState::Stopped);
        assert_eq!(c.position().value(), 321);
    }

    #[test]
    fn view_reflects_selection() {
        let mut c = coordinator();
        c.select(CHALLENGER).unwrap();
        let view = c.view();
        assert_eq!(view.header.title, "Voyage of HMS Challenger");
        assert_eq!(view.slider_step, 10);
        assert_eq!(view.scale_range, 5000);
        assert!(view.is_playing);
        assert_eq!(view.date_label, "January 1970");
        assert_eq!(c.visible_voyages().len(), 1);
        assert_eq!(c.occurrence_rows().len(), 3);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "playing");
        assert_eq!(json["selection"]["kind"], "voyage");
        assert_eq!(json["selection"]["voyage"], 1);
    }
}
