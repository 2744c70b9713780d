use eframe::egui;

use crate::app::monitor_app::MonitorApp;
use crate::types::AXES;

pub fn render_status_bar(app: &mut MonitorApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(36.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Link:");
                let (status_text, status_color) = if app.state.link.connected {
                    ("Connected", egui::Color32::from_rgb(0, 150, 0))
                } else {
                    ("Disconnected", egui::Color32::from_rgb(150, 0, 0))
                };
                ui.colored_label(status_color, status_text);

                ui.separator();
                ui.label(format!(
                    "Sample Rate: {:.0} Hz",
                    app.state.processor.sample_rate_hz()
                ));

                ui.separator();
                if app.state.processor.is_warmed_up() {
                    ui.colored_label(egui::Color32::from_rgb(0, 150, 0), "Filters ready");
                } else {
                    ui.colored_label(egui::Color32::from_rgb(255, 165, 0), "Warming up");
                }

                ui.separator();
                let dominant: Vec<String> = (0..3)
                    .map(|axis| match app.state.processor.dominant_frequency(axis) {
                        Some(f) => format!("{}: {:.2} Hz", AXES[axis], f),
                        None => format!("{}: --", AXES[axis]),
                    })
                    .collect();
                ui.label(format!("Dominant {}", dominant.join(", ")));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Refresh: {} Hz", app.state.display.refresh_rate_hz));
                });
            });
            ui.add_space(4.0);
        });
}
