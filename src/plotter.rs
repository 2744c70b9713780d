use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};

/// Stateless plot rendering over slices borrowed from the pipeline.

/// Fixed-width y axis labels so stacked plots stay aligned.
fn format_fixed_width_y_label(value: f64) -> String {
    let abs_value = value.abs();
    if abs_value >= 1000.0 {
        format!("{:-6.1e}", value)
    } else if abs_value >= 100.0 {
        format!("{:-6.0}", value)
    } else if abs_value >= 10.0 {
        format!("{:-6.1}", value)
    } else {
        format!("{:-6.2}", value)
    }
}

fn value_bounds<'a>(series: impl Iterator<Item = &'a [f64]>) -> (f64, f64) {
    let (mut min, mut max) = (f64::INFINITY, f64::NEG_INFINITY);
    for slice in series {
        for &v in slice {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
    }
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let range = (max - min).max(0.1);
    (min - range * 0.05, max + range * 0.05)
}

/// One named line in a stacked time-series plot.
pub struct SeriesLine<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
    pub color: Color32,
}

pub fn plot_time_series(
    ui: &mut egui::Ui,
    id: &str,
    height: f32,
    time: &[f64],
    lines: &[SeriesLine],
) {
    if time.is_empty() {
        return;
    }
    let (y_min, y_max) = value_bounds(lines.iter().map(|l| l.values));
    let (t_min, t_max) = (time[0], time[time.len() - 1].max(time[0] + 0.1));

    Plot::new(id.to_string())
        .height(height)
        .x_axis_formatter(|v, _| format!("{:.1}s", v.value))
        .y_axis_formatter(|v, _| format_fixed_width_y_label(v.value))
        .legend(Legend::default())
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max([t_min, y_min], [t_max, y_max]));
            for line in lines {
                let n = line.values.len().min(time.len());
                let points: Vec<[f64; 2]> = time[..n]
                    .iter()
                    .zip(&line.values[..n])
                    .map(|(&t, &y)| [t, y])
                    .collect();
                plot_ui.line(
                    Line::new(line.name, PlotPoints::from(points))
                        .color(line.color)
                        .width(1.0),
                );
            }
        });
}

pub fn plot_spectrum(
    ui: &mut egui::Ui,
    id: &str,
    height: f32,
    points: Vec<[f64; 2]>,
    color: Color32,
) {
    if points.is_empty() {
        return;
    }
    let f_max = points.last().map(|p| p[0]).unwrap_or(1.0);
    let a_max = points.iter().map(|p| p[1]).fold(0.0f64, f64::max).max(1e-9);

    Plot::new(id.to_string())
        .height(height)
        .x_axis_formatter(|v, _| format!("{:.0} Hz", v.value))
        .y_axis_formatter(|v, _| format_fixed_width_y_label(v.value))
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                [0.0, 0.0],
                [f_max, a_max * 1.05],
            ));
            plot_ui.line(
                Line::new(id, PlotPoints::from(points))
                    .color(color)
                    .width(1.0),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_labels_are_fixed_width() {
        for v in [0.123, 5.0, 42.5, 321.0, -0.5, -99.9] {
            assert_eq!(format_fixed_width_y_label(v).len(), 6, "value {}", v);
        }
    }

    #[test]
    fn bounds_ignore_non_finite_values() {
        let series = [1.0, f64::NAN, 3.0];
        let (lo, hi) = value_bounds([&series[..]].into_iter());
        assert!(lo < 1.0 && lo > 0.0);
        assert!(hi > 3.0 && hi < 4.0);
    }

    #[test]
    fn bounds_of_flat_series_keep_minimum_span() {
        let series = [2.0, 2.0, 2.0];
        let (lo, hi) = value_bounds([&series[..]].into_iter());
        assert!(hi - lo >= 0.1);
    }
}
