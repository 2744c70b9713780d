use eframe::egui;
use egui_plot::{Bar, BarChart, Plot};

use crate::analysis::stats;
use crate::app::handlers::AnalysisHandler;
use crate::app::monitor_app::MonitorApp;
use crate::app::state::SeriesKind;
use crate::types::AXES;

pub fn render_analysis_panel(app: &mut MonitorApp, ui: &mut egui::Ui) {
    let mut do_capture = false;
    let mut do_detect = false;

    ui.horizontal(|ui| {
        if ui.button("Capture snapshot").clicked() {
            do_capture = true;
        }
        ui.label(&app.state.analysis.status);
    });
    ui.separator();

    ui.horizontal(|ui| {
        ui.label("Series:");
        egui::ComboBox::from_id_salt("analysis_kind")
            .selected_text(app.state.analysis.series_kind.label())
            .show_ui(ui, |ui| {
                for &kind in SeriesKind::all() {
                    ui.selectable_value(&mut app.state.analysis.series_kind, kind, kind.label());
                }
            });
        ui.label("Axis:");
        egui::ComboBox::from_id_salt("analysis_axis")
            .selected_text(AXES[app.state.analysis.axis])
            .show_ui(ui, |ui| {
                for axis in 0..3 {
                    ui.selectable_value(&mut app.state.analysis.axis, axis, AXES[axis]);
                }
            });
        ui.label("Histogram bins:");
        ui.add(egui::DragValue::new(&mut app.state.analysis.histogram_bins).range(5..=200));
    });

    ui.horizontal(|ui| {
        ui.label("Z-score:");
        ui.add(
            egui::DragValue::new(&mut app.state.analysis.zscore_threshold)
                .speed(0.1)
                .range(0.5..=10.0),
        );
        ui.label("Band window:");
        ui.add(egui::DragValue::new(&mut app.state.analysis.moving_window).range(5..=200));
        ui.label("Band sigma:");
        ui.add(
            egui::DragValue::new(&mut app.state.analysis.moving_threshold)
                .speed(0.1)
                .range(0.5..=10.0),
        );
        ui.label("Step threshold:");
        ui.add(
            egui::DragValue::new(&mut app.state.analysis.change_threshold)
                .speed(0.1)
                .range(0.01..=100.0),
        );
        if ui.button("Detect anomalies").clicked() {
            do_detect = true;
        }
    });

    ui.separator();

    let kind = app.state.analysis.series_kind;
    let axis = app.state.analysis.axis;
    let bins = app.state.analysis.histogram_bins;

    if let Some(snapshot) = &app.state.analysis.snapshot {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Descriptive Statistics");
            egui::Grid::new("snapshot_stats")
                .striped(true)
                .num_columns(7)
                .spacing([18.0, 3.0])
                .show(ui, |ui| {
                    for header in ["Series", "Mean", "Median", "Std Dev", "Min", "Max", "Variance"]
                    {
                        ui.strong(header);
                    }
                    ui.end_row();
                    for (label, s) in &snapshot.stats {
                        ui.label(label);
                        for value in [s.mean, s.median, s.std_dev, s.min, s.max, s.variance] {
                            ui.label(format!("{:+.5}", value));
                        }
                        ui.end_row();
                    }
                });

            ui.add_space(10.0);
            ui.heading(format!("Axis Correlation ({})", kind.label()));
            if let Some((_, matrix)) = snapshot.correlations.iter().find(|(k, _)| *k == kind) {
                egui::Grid::new("correlation")
                    .num_columns(4)
                    .spacing([18.0, 3.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for name in AXES {
                            ui.strong(name);
                        }
                        ui.end_row();
                        for (i, row) in matrix.iter().enumerate() {
                            ui.strong(AXES[i]);
                            for value in row {
                                ui.label(format!("{:+.3}", value));
                            }
                            ui.end_row();
                        }
                    });
            }

            ui.add_space(10.0);
            ui.heading(format!("Distribution: {} {}", kind.short(), AXES[axis]));
            let series = snapshot.series(kind, axis);
            let (counts, edges) = stats::histogram(series, bins);
            if counts.is_empty() {
                ui.label("Series is empty.");
            } else {
                let width = edges[1] - edges[0];
                let bars: Vec<Bar> = counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| {
                        Bar::new((edges[i] + edges[i + 1]) / 2.0, count as f64).width(width)
                    })
                    .collect();
                Plot::new("histogram")
                    .height(180.0)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .show(ui, |plot_ui| {
                        plot_ui.bar_chart(BarChart::new("histogram", bars));
                    });
            }

            if let Some(report) = &app.state.analysis.anomaly_report {
                ui.add_space(10.0);
                ui.heading(format!("Anomalies: {}", report.label));
                ui.label(format!(
                    "{} z-score outliers, {} band anomalies, {} sudden changes",
                    report.zscore, report.moving_average, report.sudden_changes
                ));
                for line in &report.listing {
                    ui.monospace(line);
                }
            }
        });
    } else {
        ui.label("Capture a snapshot of the processed history to analyze it.");
    }

    if do_capture {
        AnalysisHandler::capture_snapshot(app);
    }
    if do_detect {
        AnalysisHandler::detect_anomalies(app);
    }
}
