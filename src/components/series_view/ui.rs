use super::state::SeriesView;
use crate::components::settings::Settings;
use crate::metrics::SummaryStats;

pub fn show_series(ui: &mut egui::Ui, view: &SeriesView, settings: &Settings) {
    ui.group(|ui| {
        ui.heading(&view.title);

        show_summary(ui, &view.summary, settings);

        if view.series.is_empty() {
            ui.label("No samples were collected");
            return;
        }

        let skip = if settings.hide_warmup { view.warmup } else { 0 };
        let samples = view.series.after_warmup(skip);

        let cpu: Vec<[f64; 2]> = samples
            .iter()
            .map(|s| [s.timestamp.as_secs_f64(), s.cpu_total])
            .collect();
        ui.label("CPU Usage Over Time");
        usage_plot(ui, "cpu_plot", settings.plot_height, "CPU Usage (%)", cpu, egui::Color32::LIGHT_BLUE);

        let unit = settings.memory_unit.label();
        let memory: Vec<[f64; 2]> = samples
            .iter()
            .map(|s| {
                [
                    s.timestamp.as_secs_f64(),
                    settings.memory_unit.format_value(s.memory_total).0,
                ]
            })
            .collect();
        ui.label("Memory Usage Over Time");
        usage_plot(
            ui,
            "memory_plot",
            settings.plot_height,
            &format!("Memory Usage ({})", unit),
            memory,
            egui::Color32::LIGHT_RED,
        );
    });
}

fn show_summary(ui: &mut egui::Ui, stats: &SummaryStats, settings: &Settings) {
    let (avg_memory, unit) = settings.memory_unit.format_value(stats.avg_memory);
    let (peak_memory, _) = settings.memory_unit.format_value(stats.peak_memory);

    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(format!("Average CPU: {:.1}%", stats.avg_cpu));
            ui.label(format!("Peak CPU: {:.1}%", stats.peak_cpu));
            ui.label(format!("Minimum CPU: {:.1}%", stats.min_cpu));
        });

        ui.add_space(32.0);

        ui.vertical(|ui| {
            ui.label(format!("Average Memory: {:.1} {}", avg_memory, unit));
            ui.label(format!("Peak Memory: {:.1} {}", peak_memory, unit));
            ui.label(format!("Samples: {}", stats.samples));
        });
    });
    ui.add_space(8.0);
}

fn usage_plot(
    ui: &mut egui::Ui,
    id: impl std::hash::Hash,
    height: f32,
    y_label: &str,
    points: Vec<[f64; 2]>,
    color: egui::Color32,
) {
    let plot = egui_plot::Plot::new(id)
        .height(height)
        .show_axes(true)
        .x_axis_label("Time (seconds)")
        .y_axis_label(y_label)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false);

    plot.show(ui, |plot_ui| {
        let points: egui_plot::PlotPoints = points.into_iter().collect();
        plot_ui.line(egui_plot::Line::new(points).color(color).fill(0.0));
    });
}
