use chrono::Utc;
use log::info;

use crate::analysis::anomaly;
use crate::app::monitor_app::MonitorApp;
use crate::app::state::{AnalysisSnapshot, AnomalyReport};
use crate::types::AXES;
use crate::utils::format_timestamp;

/// How many flagged points the anomaly listing shows.
const LISTING_LIMIT: usize = 20;

pub struct AnalysisHandler;

impl AnalysisHandler {
    /// Freezes the current processed history for the analysis tab.
    pub fn capture_snapshot(app: &mut MonitorApp) {
        let now = Utc::now().timestamp_millis();
        match AnalysisSnapshot::capture(&app.state.processor, now) {
            Some(snapshot) => {
                info!("Captured analysis snapshot of {} samples", snapshot.samples);
                app.state.analysis.status =
                    format!("Snapshot of {} samples at {}", snapshot.samples, snapshot.taken_at);
                app.state.analysis.snapshot = Some(snapshot);
                app.state.analysis.anomaly_report = None;
            }
            None => {
                app.state.analysis.status = "No processed data to snapshot".to_string();
            }
        }
    }

    /// Runs all three detectors over the selected series of the snapshot.
    pub fn detect_anomalies(app: &mut MonitorApp) {
        let analysis = &mut app.state.analysis;
        let Some(snapshot) = &analysis.snapshot else {
            analysis.status = "Capture a snapshot first".to_string();
            return;
        };
        let series = snapshot.series(analysis.series_kind, analysis.axis);
        let label = format!("{} {}", analysis.series_kind.short(), AXES[analysis.axis]);

        let zscore = anomaly::zscore_outliers(series, analysis.zscore_threshold);
        let moving = anomaly::moving_average_anomalies(
            series,
            analysis.moving_window,
            analysis.moving_threshold,
        );
        let sudden = anomaly::sudden_changes(series, analysis.change_threshold);

        let mut listing = Vec::new();
        for point in zscore.iter().take(LISTING_LIMIT) {
            listing.push(format!("z-score  #{}: {:.4}", point.index, point.value));
        }
        for point in moving.iter().take(LISTING_LIMIT) {
            listing.push(format!("band     #{}: {:.4}", point.index, point.value));
        }
        for point in sudden.iter().take(LISTING_LIMIT) {
            listing.push(format!("step     #{}: {:+.4}", point.index, point.value));
        }

        info!(
            "Anomaly run on {}: {} z-score, {} band, {} step",
            label,
            zscore.len(),
            moving.len(),
            sudden.len()
        );
        analysis.anomaly_report = Some(AnomalyReport {
            label,
            zscore: zscore.len(),
            moving_average: moving.len(),
            sudden_changes: sudden.len(),
            listing,
        });
        analysis.status = format!("Anomaly run at {}", format_timestamp(now_ms()));
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
