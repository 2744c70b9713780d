use eframe::egui;

use crate::app::handlers::AcquisitionHandler;
use crate::app::monitor_app::MonitorApp;
use crate::sensor::OutputRate;

const BAUD_CHOICES: [u32; 5] = [9600, 19200, 57600, 115_200, 230_400];

pub fn render_sensor_panel(app: &mut MonitorApp, ui: &mut egui::Ui) {
    ui.heading("Sensor Link");
    ui.add_space(6.0);

    let busy = app.state.link.worker.is_some();

    egui::Grid::new("link_form")
        .num_columns(2)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            ui.label("Serial port:");
            ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut app.state.link.port_input)
                    .hint_text("/dev/ttyUSB0"),
            );
            ui.end_row();

            ui.label("Baud rate:");
            ui.add_enabled_ui(!busy, |ui| {
                egui::ComboBox::from_id_salt("baud_rate")
                    .selected_text(app.state.link.baud_input.to_string())
                    .show_ui(ui, |ui| {
                        for baud in BAUD_CHOICES {
                            ui.selectable_value(
                                &mut app.state.link.baud_input,
                                baud,
                                baud.to_string(),
                            );
                        }
                    });
            });
            ui.end_row();

            ui.label("Output rate:");
            ui.add_enabled_ui(!busy, |ui| {
                egui::ComboBox::from_id_salt("output_rate")
                    .selected_text(app.state.link.output_rate.label())
                    .show_ui(ui, |ui| {
                        for &rate in OutputRate::all() {
                            ui.selectable_value(
                                &mut app.state.link.output_rate,
                                rate,
                                rate.label(),
                            );
                        }
                    });
            });
            ui.end_row();

            ui.label("Data source:");
            ui.add_enabled(
                !busy,
                egui::Checkbox::new(&mut app.state.link.mock, "Simulated sensor"),
            );
            ui.end_row();
        });

    ui.add_space(10.0);
    let mut do_connect = false;
    let mut do_disconnect = false;
    let mut do_reset = false;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!busy, egui::Button::new("Connect"))
            .clicked()
        {
            do_connect = true;
        }
        if ui
            .add_enabled(busy, egui::Button::new("Disconnect"))
            .clicked()
        {
            do_disconnect = true;
        }
        ui.separator();
        if ui.button("Reset processing").clicked() {
            do_reset = true;
        }
    });

    ui.add_space(10.0);
    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Status:");
        let color = if app.state.link.connected {
            egui::Color32::from_rgb(0, 150, 0)
        } else {
            egui::Color32::from_rgb(150, 0, 0)
        };
        ui.colored_label(color, &app.state.link.status_message);
    });

    if do_connect {
        AcquisitionHandler::connect(app);
    }
    if do_disconnect {
        AcquisitionHandler::disconnect(app);
    }
    if do_reset {
        AcquisitionHandler::reset_pipeline(app);
    }
}
