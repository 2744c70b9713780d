mod analysis;
mod app;
mod config;
mod dsp;
mod logger;
mod mqtt;
mod pipeline;
mod plotter;
mod sensor;
mod types;
mod utils;

use std::path::Path;

use crossbeam_channel::bounded;
use eframe::egui;
use log::{error, info, warn};

use crate::app::state::Channels;
use crate::app::MonitorApp;
use crate::config::ConfigManager;

const CONFIG_PATH: &str = "config.toml";

fn main() {
    logger::init_logger();
    info!("Application starting");

    let config = if Path::new(CONFIG_PATH).exists() {
        match ConfigManager::load_from_file(CONFIG_PATH) {
            Ok(manager) => {
                info!("Loaded configuration from {}", CONFIG_PATH);
                manager
            }
            Err(e) => {
                warn!("Failed to load {}: {}. Using defaults", CONFIG_PATH, e);
                ConfigManager::new()
            }
        }
    } else {
        info!("No {} found, using defaults", CONFIG_PATH);
        ConfigManager::new()
    };
    let cfg = config.get_config().clone();

    let (sample_tx, sample_rx) = bounded(cfg.channels.sample_channel_capacity);
    let (status_tx, status_rx) = bounded(cfg.channels.status_channel_capacity);

    // The MQTT republisher only exists when configured; the data hub
    // checkbox stays greyed out otherwise.
    let (publish_tx, mut publisher) = if cfg.mqtt.enabled {
        let (tx, rx) = bounded(cfg.channels.publish_channel_capacity);
        (Some(tx), Some(mqtt::spawn(cfg.mqtt.clone(), rx)))
    } else {
        (None, None)
    };

    let channels = Channels {
        samples: sample_rx,
        status: status_rx,
        sample_tx,
        status_tx,
        publish_tx,
    };

    let monitor = match MonitorApp::new(config, channels) {
        Ok(monitor) => monitor,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        vsync: cfg.window.vsync,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        renderer: eframe::Renderer::Glow,
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([cfg.window.width, cfg.window.height])
            .with_resizable(cfg.window.resizable),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        &cfg.window.title,
        options,
        Box::new(move |_cc| Ok(Box::new(monitor))),
    ) {
        error!("GUI failed: {}", e);
        std::process::exit(1);
    }

    // The sensor worker is stopped by the app state dropping with the GUI;
    // the publisher handle lives here.
    info!("GUI closed, shutting down worker threads");
    if let Some(publisher) = publisher.as_mut() {
        publisher.stop();
    }
    info!("Shutdown complete");
}
