use log::{info, warn};

use crate::app::monitor_app::MonitorApp;
use crate::config::LinkConfig;
use crate::pipeline::DataProcessor;
use crate::sensor;

pub struct AcquisitionHandler;

impl AcquisitionHandler {
    /// Applies pending link status events from the worker thread.
    pub fn drain_status(app: &mut MonitorApp) {
        while let Ok(event) = app.state.channels.status.try_recv() {
            app.state.link.connected = event.connected;
            app.state.link.status_message = event.message;
            if !event.connected {
                // The worker has exited; reap the handle so a new
                // connection can start.
                if let Some(mut worker) = app.state.link.worker.take() {
                    worker.stop();
                }
            }
        }
    }

    /// Drains pending samples into the pipeline, the data hub table and the
    /// MQTT forwarder.
    pub fn drain_samples(app: &mut MonitorApp) {
        let mut received = false;
        while let Ok(sample) = app.state.channels.samples.try_recv() {
            received = true;
            app.state.hub.push_recent(sample);
            if app.state.hub.publish_enabled {
                if let Some(tx) = &app.state.channels.publish_tx {
                    // Drop rather than block when the publisher lags.
                    let _ = tx.try_send(sample);
                }
            }
            app.state.processor.ingest(&sample);
        }
        if received {
            app.state.processor.update_spectra();
        }
    }

    pub fn connect(app: &mut MonitorApp) {
        if app.state.link.worker.is_some() {
            warn!("Connect requested while a sensor worker is active");
            app.state.link.status_message = "Already connected".to_string();
            return;
        }

        let link = LinkConfig {
            port: app.state.link.port_input.clone(),
            baud_rate: app.state.link.baud_input,
            output_rate: app.state.link.output_rate,
            mock: app.state.link.mock,
        };

        // A different output rate means a different sample interval, so the
        // whole pipeline restarts on the new grid.
        if (link.output_rate.dt() - app.state.processor.dt()).abs() > f64::EPSILON {
            let config = app.config.get_config();
            match DataProcessor::new(
                link.output_rate.dt(),
                &config.processing,
                &config.spectrum,
                config.plot.max_points,
            ) {
                Ok(processor) => {
                    info!(
                        "Rebuilt pipeline for {} sampling",
                        link.output_rate.label()
                    );
                    app.state.processor = processor;
                }
                Err(e) => {
                    app.state.link.status_message = format!("Invalid pipeline settings: {}", e);
                    return;
                }
            }
        }

        let samples = app.state.channels.sample_tx.clone();
        let status = app.state.channels.status_tx.clone();
        app.state.link.worker = Some(sensor::spawn(link, samples, status));
        app.state.link.status_message = "Connecting...".to_string();
    }

    pub fn disconnect(app: &mut MonitorApp) {
        if let Some(mut worker) = app.state.link.worker.take() {
            info!("Disconnect requested");
            worker.stop();
        }
        app.state.link.connected = false;
    }

    /// Clears the processed history and restarts the plot clock without
    /// touching the connection.
    pub fn reset_pipeline(app: &mut MonitorApp) {
        app.state.processor.reset();
        app.state.hub.recent.clear();
        info!("Processing pipeline reset");
    }
}
