//! Offline helpers behind the `globe` binary: dataset inspection and
//! headless playback against the recording backend.

use foundation::DayIndex;
use gpu::{DriverSettings, FrameDriver, FrameError, InitError, RecordingBackend};
use runtime::SessionEvent;
use scene::{ColorTier, RowStore, Viewport, tier_histogram};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierCount {
    pub tier: &'static str,
    pub markers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub day: u8,
    pub label: String,
    pub visible: usize,
    pub tiers: Vec<TierCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub days: Vec<DaySummary>,
}

/// Per-day marker counts, split by colour tier.
pub fn inspect_dataset(rows: &RowStore) -> DatasetSummary {
    let days = DayIndex::all()
        .map(|day| {
            let histogram = tier_histogram(rows, day);
            DaySummary {
                day: day.get(),
                label: day.label(),
                visible: rows.visible_count(day),
                tiers: ColorTier::ALL
                    .iter()
                    .zip(histogram)
                    .map(|(tier, markers)| TierCount {
                        tier: tier.name(),
                        markers,
                    })
                    .collect(),
            }
        })
        .collect();
    DatasetSummary {
        rows: rows.len(),
        days,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulateOptions {
    pub frames: u64,
    pub dt_s: f64,
    pub viewport: Viewport,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            frames: 600,
            dt_s: 1.0 / 60.0,
            viewport: Viewport::default(),
        }
    }
}

/// One line of simulation output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameLine {
    pub frame: u64,
    pub day: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub markers: usize,
    pub day_advanced: bool,
    /// Velocity text first rejected on this frame.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_velocity: Option<String>,
}

// Upper bound on up-front allocation; longer runs grow as they go.
const MAX_PREALLOCATED_LINES: u64 = 1 << 16;

fn line_capacity(frames: u64) -> usize {
    frames.min(MAX_PREALLOCATED_LINES) as usize
}

#[derive(Debug)]
pub enum SimulateError {
    Init(InitError),
    Frame { frame: u64, source: FrameError },
}

impl std::fmt::Display for SimulateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulateError::Init(e) => write!(f, "{e}"),
            SimulateError::Frame { frame, source } => write!(f, "frame {frame}: {source}"),
        }
    }
}

impl std::error::Error for SimulateError {}

/// Runs the frame loop with a fixed step and reports every frame.
pub fn simulate(
    rows: RowStore,
    settings: DriverSettings,
    options: &SimulateOptions,
) -> Result<Vec<FrameLine>, SimulateError> {
    let mut backend = RecordingBackend::new(options.viewport);
    backend.keep_last_frame_only = true;
    let mut driver =
        FrameDriver::new(settings, rows, &mut backend).map_err(SimulateError::Init)?;

    let mut lines = Vec::with_capacity(line_capacity(options.frames));
    for _ in 0..options.frames {
        let report = driver
            .advance(options.dt_s, &mut backend)
            .map_err(|source| SimulateError::Frame {
                frame: lines.len() as u64,
                source,
            })?;
        let rejected_velocity = driver
            .drain_events()
            .into_iter()
            .find_map(|e| match e.event {
                SessionEvent::VelocityRejected { text } => Some(text),
                _ => None,
            });
        lines.push(FrameLine {
            frame: report.frame.index,
            day: report.day.get(),
            latitude: report.latitude,
            longitude: report.longitude,
            markers: report.markers(),
            day_advanced: report.outcome.day_advanced.is_some(),
            rejected_velocity,
        });
    }
    tracing::info!(
        frames = lines.len(),
        final_day = driver.state().day().get(),
        "simulation finished"
    );
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::{MAX_PREALLOCATED_LINES, SimulateOptions, inspect_dataset, line_capacity, simulate};
    use formats::parse_dataset_csv;
    use foundation::DayIndex;
    use gpu::DriverSettings;
    use pretty_assertions::assert_eq;
    use runtime::InteractionState;

    fn csv() -> String {
        let days: Vec<String> = DayIndex::all().map(|d| d.column_name()).collect();
        let header = format!("Province/State,Country/Region,Lat,Long,{}", days.join(","));
        let mut first = vec!["0"; 51];
        first[0] = "3";
        first[1] = "25";
        let second = vec!["200"; 51];
        format!(
            "{header}\n,Somewhere,10,20,{}\n,Elsewhere,-30,40,{}\n",
            first.join(","),
            second.join(",")
        )
    }

    #[test]
    fn inspect_counts_visible_markers_per_day() {
        let rows = parse_dataset_csv(&csv()).unwrap();
        let summary = inspect_dataset(&rows);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.days.len(), 51);
        assert_eq!(summary.days[0].visible, 2);
        assert_eq!(summary.days[2].visible, 1);

        let day1: Vec<usize> = summary.days[0].tiers.iter().map(|t| t.markers).collect();
        assert_eq!(day1, vec![1, 0, 1, 0]);
        let day2: Vec<usize> = summary.days[1].tiers.iter().map(|t| t.markers).collect();
        assert_eq!(day2, vec![0, 1, 1, 0]);
    }

    #[test]
    fn simulate_reports_every_frame() {
        let rows = parse_dataset_csv(&csv()).unwrap();
        let options = SimulateOptions {
            frames: 5,
            ..SimulateOptions::default()
        };
        let lines = simulate(rows, DriverSettings::default(), &options).unwrap();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].frame, 0);
        assert!(lines.iter().all(|l| l.day == 1 && l.markers == 2));
        assert!(lines.iter().all(|l| l.longitude == 0.0));
    }

    #[test]
    fn simulate_spins_into_the_next_day() {
        let rows = parse_dataset_csv(&csv()).unwrap();
        let settings = DriverSettings {
            initial: InteractionState::new(1, 0.0, 10.0, true, "90").unwrap(),
            ..DriverSettings::default()
        };
        let options = SimulateOptions {
            frames: 40,
            dt_s: 0.1,
            ..SimulateOptions::default()
        };
        let lines = simulate(rows, settings, &options).unwrap();
        assert_eq!(lines.iter().filter(|l| l.day_advanced).count(), 1);
        assert_eq!(lines.last().map(|l| l.day), Some(2));
    }

    #[test]
    fn rejected_velocity_appears_on_first_frame_only() {
        let rows = parse_dataset_csv(&csv()).unwrap();
        let settings = DriverSettings {
            initial: InteractionState::new(1, 0.0, 10.0, true, "fast").unwrap(),
            ..DriverSettings::default()
        };
        let options = SimulateOptions {
            frames: 30,
            ..SimulateOptions::default()
        };
        let lines = simulate(rows, settings, &options).unwrap();
        assert_eq!(lines[0].rejected_velocity.as_deref(), Some("fast"));
        assert!(lines[1..].iter().all(|l| l.rejected_velocity.is_none()));
        assert!(lines.iter().all(|l| l.longitude == 10.0));
    }

    #[test]
    fn preallocation_is_capped() {
        assert_eq!(line_capacity(12), 12);
        assert_eq!(line_capacity(u64::MAX), MAX_PREALLOCATED_LINES as usize);
    }
}
