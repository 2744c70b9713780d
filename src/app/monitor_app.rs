use std::time::Duration;

use eframe::{egui, Frame};
use log::info;

use crate::app::handlers::AcquisitionHandler;
use crate::app::state::{AppState, Channels, Tab};
use crate::app::ui;
use crate::config::ConfigManager;
use crate::dsp::DspError;

pub struct MonitorApp {
    pub state: AppState,
    pub config: ConfigManager,
}

impl MonitorApp {
    pub fn new(config: ConfigManager, channels: Channels) -> Result<Self, DspError> {
        let state = AppState::new(config.get_config(), channels)?;
        info!("Application state initialized");
        Ok(Self { state, config })
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ctx.set_visuals(egui::Visuals::light());

        AcquisitionHandler::drain_status(self);
        AcquisitionHandler::drain_samples(self);

        ui::render_status_bar(self, ctx);

        egui::TopBottomPanel::top("tab_bar").show(ctx, |panel| {
            panel.horizontal(|panel| {
                for &tab in Tab::all() {
                    panel.selectable_value(&mut self.state.display.active_tab, tab, tab.label());
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |panel| {
            let tab = self.state.display.active_tab;
            match tab {
                Tab::Display => ui::render_display_panel(self, panel),
                Tab::Sensors => ui::render_sensor_panel(self, panel),
                Tab::DataHub => ui::render_data_hub_panel(self, panel),
                Tab::Analysis => ui::render_analysis_panel(self, panel),
                Tab::Settings => ui::render_settings_panel(self, panel),
            }
        });

        let refresh = self.state.display.refresh_rate_hz.clamp(10, 200);
        ctx.request_repaint_after(Duration::from_millis((1000 / refresh).max(1) as u64));
    }
}
