use eframe::egui;
use egui::Color32;

use crate::app::monitor_app::MonitorApp;
use crate::plotter::{plot_spectrum, plot_time_series, SeriesLine};
use crate::types::AXES;

pub fn render_display_panel(app: &mut MonitorApp, ui: &mut egui::Ui) {
    let processor = &app.state.processor;
    let plot_cfg = &app.config.get_config().plot;
    let colors = [
        Color32::from_rgb(
            plot_cfg.colors.x_axis[0],
            plot_cfg.colors.x_axis[1],
            plot_cfg.colors.x_axis[2],
        ),
        Color32::from_rgb(
            plot_cfg.colors.y_axis[0],
            plot_cfg.colors.y_axis[1],
            plot_cfg.colors.y_axis[2],
        ),
        Color32::from_rgb(
            plot_cfg.colors.z_axis[0],
            plot_cfg.colors.z_axis[1],
            plot_cfg.colors.z_axis[2],
        ),
    ];
    let height = plot_cfg.plot_height;

    if processor.time().is_empty() {
        ui.add_space(24.0);
        ui.vertical_centered(|ui| {
            ui.label("No data yet. Connect a sensor from the Sensors tab.");
        });
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.columns(2, |columns| {
            {
                let ui = &mut columns[0];
                let time = processor.time();
                for (title, unit, series) in [
                    ("Acceleration", "m/s²", [
                        processor.acceleration(0),
                        processor.acceleration(1),
                        processor.acceleration(2),
                    ]),
                    ("Velocity", "m/s", [
                        processor.velocity(0),
                        processor.velocity(1),
                        processor.velocity(2),
                    ]),
                    ("Displacement", "m", [
                        processor.displacement(0),
                        processor.displacement(1),
                        processor.displacement(2),
                    ]),
                ] {
                    ui.heading(format!("{} ({})", title, unit));
                    let names = [
                        format!("{} {}", title, AXES[0]),
                        format!("{} {}", title, AXES[1]),
                        format!("{} {}", title, AXES[2]),
                    ];
                    let lines: Vec<SeriesLine> = (0..3)
                        .map(|axis| SeriesLine {
                            name: names[axis].as_str(),
                            values: series[axis],
                            color: colors[axis],
                        })
                        .collect();
                    plot_time_series(ui, title, height, time, &lines);
                    ui.add_space(6.0);
                }
            }
            {
                let ui = &mut columns[1];
                ui.heading("Acceleration Spectrum");
                for axis in 0..3 {
                    match processor.spectrum(axis) {
                        Some(spectrum) => {
                            let title = match processor.dominant_frequency(axis) {
                                Some(f) => format!("FFT {} (peak {:.2} Hz)", AXES[axis], f),
                                None => format!("FFT {}", AXES[axis]),
                            };
                            ui.label(title);
                            plot_spectrum(
                                ui,
                                &format!("fft_{}", AXES[axis]),
                                height,
                                spectrum.plot_points(),
                                colors[axis],
                            );
                        }
                        None => {
                            ui.label(format!("FFT {}: collecting samples...", AXES[axis]));
                            ui.add_space(height + 4.0);
                        }
                    }
                    ui.add_space(6.0);
                }
            }
        });
    });
}
