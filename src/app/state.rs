//! Application state, grouped per concern so the UI modules and handlers
//! can borrow what they need without reaching across each other.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender};

use crate::analysis::{stats, SeriesStats};
use crate::config::AppConfig;
use crate::dsp::DspError;
use crate::pipeline::DataProcessor;
use crate::sensor::{OutputRate, SensorWorkerHandle};
use crate::types::{LinkEvent, SensorSample, AXES};
use crate::utils::format_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Display,
    Sensors,
    DataHub,
    Analysis,
    Settings,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Display,
            Tab::Sensors,
            Tab::DataHub,
            Tab::Analysis,
            Tab::Settings,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Display => "Display",
            Tab::Sensors => "Sensors",
            Tab::DataHub => "Data Hub",
            Tab::Analysis => "Analysis",
            Tab::Settings => "Settings",
        }
    }
}

/// Connection form plus live link status.
pub struct LinkState {
    pub port_input: String,
    pub baud_input: u32,
    pub output_rate: OutputRate,
    pub mock: bool,
    pub connected: bool,
    pub status_message: String,
    pub worker: Option<SensorWorkerHandle>,
}

pub struct DisplayState {
    pub active_tab: Tab,
    pub refresh_rate_hz: u32,
    pub settings_status: String,
}

/// Data hub: recent-sample table, CSV export and MQTT forwarding.
pub struct HubState {
    pub recent: VecDeque<SensorSample>,
    pub table_rows: usize,
    pub publish_enabled: bool,
    pub publish_available: bool,
    pub export_status: String,
}

const RECENT_CAPACITY: usize = 500;

impl HubState {
    pub fn push_recent(&mut self, sample: SensorSample) {
        self.recent.push_back(sample);
        while self.recent.len() > RECENT_CAPACITY {
            self.recent.pop_front();
        }
    }
}

/// Which processed series an analysis runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Acceleration,
    Velocity,
    Displacement,
}

impl SeriesKind {
    pub fn all() -> &'static [SeriesKind] {
        &[
            SeriesKind::Acceleration,
            SeriesKind::Velocity,
            SeriesKind::Displacement,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Acceleration => "Acceleration",
            SeriesKind::Velocity => "Velocity",
            SeriesKind::Displacement => "Displacement",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            SeriesKind::Acceleration => "Acc",
            SeriesKind::Velocity => "Vel",
            SeriesKind::Displacement => "Disp",
        }
    }
}

/// Frozen copy of the processed history with precomputed summaries, so the
/// analysis tab works on stable data while acquisition continues.
pub struct AnalysisSnapshot {
    pub taken_at: String,
    pub samples: usize,
    pub acc: [Vec<f64>; 3],
    pub vel: [Vec<f64>; 3],
    pub disp: [Vec<f64>; 3],
    pub stats: Vec<(String, SeriesStats)>,
    pub correlations: Vec<(SeriesKind, Vec<Vec<f64>>)>,
}

impl AnalysisSnapshot {
    pub fn capture(processor: &DataProcessor, timestamp_ms: i64) -> Option<Self> {
        if processor.time().is_empty() {
            return None;
        }
        let acc = [0usize, 1, 2].map(|axis| processor.acceleration(axis).to_vec());
        let vel = [0usize, 1, 2].map(|axis| processor.velocity(axis).to_vec());
        let disp = [0usize, 1, 2].map(|axis| processor.displacement(axis).to_vec());

        let mut stats_rows = Vec::new();
        let mut correlations = Vec::new();
        for (kind, series) in [
            (SeriesKind::Acceleration, &acc),
            (SeriesKind::Velocity, &vel),
            (SeriesKind::Displacement, &disp),
        ] {
            for axis in 0..3 {
                if let Some(s) = stats::describe(&series[axis]) {
                    stats_rows.push((format!("{} {}", kind.short(), AXES[axis]), s));
                }
            }
            correlations.push((kind, stats::correlation_matrix(series)));
        }

        Some(Self {
            taken_at: format_timestamp(timestamp_ms),
            samples: processor.time().len(),
            acc,
            vel,
            disp,
            stats: stats_rows,
            correlations,
        })
    }

    pub fn series(&self, kind: SeriesKind, axis: usize) -> &[f64] {
        match kind {
            SeriesKind::Acceleration => &self.acc[axis],
            SeriesKind::Velocity => &self.vel[axis],
            SeriesKind::Displacement => &self.disp[axis],
        }
    }
}

/// Result of an anomaly run, kept for display until the next run.
pub struct AnomalyReport {
    pub label: String,
    pub zscore: usize,
    pub moving_average: usize,
    pub sudden_changes: usize,
    pub listing: Vec<String>,
}

pub struct AnalysisState {
    pub snapshot: Option<AnalysisSnapshot>,
    pub series_kind: SeriesKind,
    pub axis: usize,
    pub zscore_threshold: f64,
    pub moving_window: usize,
    pub moving_threshold: f64,
    pub change_threshold: f64,
    pub histogram_bins: usize,
    pub anomaly_report: Option<AnomalyReport>,
    pub status: String,
}

/// Channel endpoints shared with the worker threads. The sender sides are
/// kept so reconnecting can hand fresh clones to a new worker.
pub struct Channels {
    pub samples: Receiver<SensorSample>,
    pub status: Receiver<LinkEvent>,
    pub sample_tx: Sender<SensorSample>,
    pub status_tx: Sender<LinkEvent>,
    pub publish_tx: Option<Sender<SensorSample>>,
}

pub struct AppState {
    pub link: LinkState,
    pub display: DisplayState,
    pub hub: HubState,
    pub analysis: AnalysisState,
    pub processor: DataProcessor,
    pub channels: Channels,
}

impl AppState {
    pub fn new(config: &AppConfig, channels: Channels) -> Result<Self, DspError> {
        let processor = DataProcessor::new(
            config.link.output_rate.dt(),
            &config.processing,
            &config.spectrum,
            config.plot.max_points,
        )?;
        let publish_available = channels.publish_tx.is_some();
        Ok(Self {
            link: LinkState {
                port_input: config.link.port.clone(),
                baud_input: config.link.baud_rate,
                output_rate: config.link.output_rate,
                mock: config.link.mock,
                connected: false,
                status_message: "Not connected".to_string(),
                worker: None,
            },
            display: DisplayState {
                active_tab: Tab::Display,
                refresh_rate_hz: config.plot.refresh_rate_hz,
                settings_status: String::new(),
            },
            hub: HubState {
                recent: VecDeque::new(),
                table_rows: 50,
                publish_enabled: config.mqtt.enabled,
                publish_available,
                export_status: String::new(),
            },
            analysis: AnalysisState {
                snapshot: None,
                series_kind: SeriesKind::Acceleration,
                axis: 0,
                zscore_threshold: 3.0,
                moving_window: 20,
                moving_threshold: 2.0,
                change_threshold: 2.0,
                histogram_bins: 50,
                anomaly_report: None,
                status: "No snapshot captured".to_string(),
            },
            processor,
            channels,
        })
    }
}
