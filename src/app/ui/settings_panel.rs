use eframe::egui;
use log::info;

use crate::analysis::SpectrumWindow;
use crate::app::monitor_app::MonitorApp;
use crate::config::{FFT_SIZE_CHOICES, REFRESH_RATE_CHOICES};

pub fn render_settings_panel(app: &mut MonitorApp, ui: &mut egui::Ui) {
    let MonitorApp { state, config } = app;

    {
        let cfg = config.get_config_mut();

        ui.heading("Display");
        ui.horizontal(|ui| {
            ui.label("Refresh rate:");
            egui::ComboBox::from_id_salt("refresh_rate")
                .selected_text(format!("{} Hz", state.display.refresh_rate_hz))
                .show_ui(ui, |ui| {
                    for rate in REFRESH_RATE_CHOICES {
                        ui.selectable_value(
                            &mut state.display.refresh_rate_hz,
                            rate,
                            format!("{} Hz", rate),
                        );
                    }
                });
        });
        cfg.plot.refresh_rate_hz = state.display.refresh_rate_hz;

        ui.horizontal(|ui| {
            ui.label("Plot history (samples):");
            ui.add(egui::DragValue::new(&mut cfg.plot.max_points).range(200..=20_000));
        });
        state.processor.set_max_points(cfg.plot.max_points);

        ui.add_space(10.0);
        ui.heading("Spectrum");
        let before = (cfg.spectrum.n_fft, cfg.spectrum.window);
        ui.horizontal(|ui| {
            ui.label("FFT size:");
            egui::ComboBox::from_id_salt("fft_size")
                .selected_text(cfg.spectrum.n_fft.to_string())
                .show_ui(ui, |ui| {
                    for size in FFT_SIZE_CHOICES {
                        ui.selectable_value(&mut cfg.spectrum.n_fft, size, size.to_string());
                    }
                });
            ui.label("Window:");
            egui::ComboBox::from_id_salt("fft_window")
                .selected_text(cfg.spectrum.window.label())
                .show_ui(ui, |ui| {
                    for &window in SpectrumWindow::all() {
                        ui.selectable_value(&mut cfg.spectrum.window, window, window.label());
                    }
                });
        });
        if (cfg.spectrum.n_fft, cfg.spectrum.window) != before {
            info!(
                "Spectrum settings changed: n_fft={}, window={}",
                cfg.spectrum.n_fft,
                cfg.spectrum.window.label()
            );
            state
                .processor
                .set_spectrum_settings(cfg.spectrum.n_fft, cfg.spectrum.window);
        }
    }

    ui.add_space(10.0);
    ui.separator();
    if ui.button("Save configuration").clicked() {
        {
            let cfg = config.get_config_mut();
            cfg.link.port = state.link.port_input.clone();
            cfg.link.baud_rate = state.link.baud_input;
            cfg.link.output_rate = state.link.output_rate;
            cfg.link.mock = state.link.mock;
        }
        state.display.settings_status = match config.save() {
            Ok(()) => "Configuration saved".to_string(),
            Err(e) => format!("Save failed: {}", e),
        };
    }
    if !state.display.settings_status.is_empty() {
        ui.label(&state.display.settings_status);
    }
}
