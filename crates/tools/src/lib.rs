//! Headless helpers behind the `voyager` binary.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use catalog::{Dataset, JsonDirSource, PrepareOptions, Selection};
use foundation::calendar;
use playback::{PlaybackConfig, PlaybackCoordinator, PlaybackSession, PlaybackView};
use runtime::{Frame, FrameClock, MetricsSnapshot};
use serde::Serialize;
use tracing::{debug, info};

/// Per-field overrides applied on top of the config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigOverrides {
    pub scale_range: Option<u32>,
    pub speed_all: Option<u32>,
    pub speed_selected: Option<u32>,
}

pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> anyhow::Result<PlaybackConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            PlaybackConfig::from_json_str(&raw)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => PlaybackConfig::default(),
    };
    if let Some(v) = overrides.scale_range {
        config.scale_range = v;
    }
    if let Some(v) = overrides.speed_all {
        config.speed_all = v;
    }
    if let Some(v) = overrides.speed_selected {
        config.speed_selected = v;
    }
    Ok(config.validate()?)
}

pub fn load_dataset(dir: &Path, config: &PlaybackConfig) -> anyhow::Result<Dataset> {
    let options = PrepareOptions {
        lead_in_months: config.lead_in_months,
    };
    Dataset::load(&JsonDirSource::new(dir), options)
        .with_context(|| format!("load dataset from {}", dir.display()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoyageSummary {
    pub vessel: String,
    pub name: String,
    pub years: String,
    pub samples: usize,
    pub occurrences: usize,
    pub first_sample: String,
    pub last_sample: String,
    pub color: String,
}

pub fn summarize(dataset: &Dataset) -> Vec<VoyageSummary> {
    dataset
        .voyages()
        .iter()
        .map(|v| {
            let meta = v.metadata();
            let range = v.time_range();
            VoyageSummary {
                vessel: meta.vessel.clone(),
                name: meta.vessel_name.clone(),
                years: format!("{}-{}", meta.year_from, meta.year_to),
                samples: v.coordinates().len(),
                occurrences: dataset.occurrences_for(v.id()).len(),
                first_sample: calendar::ordinal_date(range.min()).unwrap_or_default(),
                last_sample: calendar::ordinal_date(range.max()).unwrap_or_default(),
                color: meta.color.to_hex(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Vessel key of the voyage to select; all voyages when `None`.
    pub vessel: Option<String>,
    pub frames: u64,
}

/// View captured on a frame where the date label changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub frame: u64,
    pub view: PlaybackView,
}

#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    /// Playback events delivered over the whole run.
    pub events: usize,
    pub metrics: MetricsSnapshot,
}

/// Mounts a session, applies the selection and runs `frames` fixed-step
/// frames.
pub fn replay(
    dataset: Arc<Dataset>,
    config: PlaybackConfig,
    options: &ReplayOptions,
) -> anyhow::Result<ReplayReport> {
    let selection = match options.vessel.as_deref() {
        Some(vessel) => match dataset.find_by_vessel(vessel) {
            Some(voyage) => Selection::Voyage(voyage.id()),
            None => bail!("no voyage for vessel {vessel:?}"),
        },
        None => Selection::All,
    };

    let coordinator = PlaybackCoordinator::new(dataset, config)?;
    let mut session = PlaybackSession::new(coordinator);
    session.mount()?;
    session.update(|c| c.select(selection))??;

    let mut steps = Vec::new();
    let mut events = session.take_events().len();
    let mut last_label = String::new();
    let mut frame = Frame::fixed(0, FrameClock::DEFAULT_DT_S);
    for _ in 0..options.frames {
        let report = session.run_frame(frame);
        for event in &report.events {
            debug!(frame = event.frame_index, event = ?event.payload, "playback event");
        }
        events += report.events.len();
        let view = session.coordinator().view();
        if view.date_label != last_label {
            info!(frame = frame.index, date = %view.date_label, position = view.position.value(), "date changed");
            last_label.clone_from(&view.date_label);
            steps.push(ReplayStep {
                frame: frame.index,
                view,
            });
        }
        frame = frame.next_fixed();
    }

    let metrics = session.coordinator().metrics();
    session.teardown();
    events += session.take_events().len();
    Ok(ReplayReport {
        steps,
        events,
        metrics,
    })
}
