use eframe::egui;

use crate::app::handlers::ExportHandler;
use crate::app::monitor_app::MonitorApp;
use crate::utils::format_timestamp;

pub fn render_data_hub_panel(app: &mut MonitorApp, ui: &mut egui::Ui) {
    let mut do_export = false;
    ui.horizontal(|ui| {
        if ui.button("Export CSV").clicked() {
            do_export = true;
        }
        if !app.state.hub.export_status.is_empty() {
            ui.label(&app.state.hub.export_status);
        }
    });

    if do_export {
        ExportHandler::export_history(app);
    }

    ui.horizontal(|ui| {
        let available = app.state.hub.publish_available;
        ui.add_enabled(
            available,
            egui::Checkbox::new(&mut app.state.hub.publish_enabled, "Republish over MQTT"),
        );
        if !available {
            ui.weak("(publisher disabled in config)");
        }
    });

    ui.horizontal(|ui| {
        ui.label("Table rows:");
        ui.add(egui::DragValue::new(&mut app.state.hub.table_rows).range(10..=200));
    });

    ui.separator();

    if app.state.hub.recent.is_empty() {
        ui.label("No samples received yet.");
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("recent_samples")
            .striped(true)
            .num_columns(10)
            .spacing([14.0, 3.0])
            .show(ui, |ui| {
                for header in [
                    "Time", "Acc X", "Acc Y", "Acc Z", "Gyro X", "Gyro Y", "Gyro Z", "Angle X",
                    "Angle Y", "Angle Z",
                ] {
                    ui.strong(header);
                }
                ui.end_row();

                let rows = app.state.hub.table_rows;
                for sample in app.state.hub.recent.iter().rev().take(rows) {
                    ui.label(format_timestamp(sample.timestamp));
                    for v in sample.acc {
                        ui.label(format!("{:+.4}", v));
                    }
                    for v in sample.gyro {
                        ui.label(format!("{:+.2}", v));
                    }
                    for v in sample.angle {
                        ui.label(format!("{:+.2}", v));
                    }
                    ui.end_row();
                }
            });
    });
}
