use super::state::{MemoryUnit, Settings};

pub fn show_settings_window(ctx: &egui::Context, settings: &mut Settings) {
    if !settings.is_visible() {
        return;
    }

    egui::Window::new("⚙ Settings")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            slider_row(ui, "UI Scale:", &mut settings.scale, 0.5..=2.0, 0.1);
            slider_row(ui, "Font Size:", &mut settings.font_size, 8.0..=32.0, 1.0);
            slider_row(ui, "Plot Height:", &mut settings.plot_height, 80.0..=600.0, 10.0);

            ui.horizontal(|ui| {
                ui.label("Memory Unit:");
                egui::ComboBox::from_id_salt("memory_unit")
                    .selected_text(settings.memory_unit.label())
                    .show_ui(ui, |ui| {
                        for unit in MemoryUnit::ALL {
                            ui.selectable_value(&mut settings.memory_unit, unit, unit.label());
                        }
                    });
            });

            ui.checkbox(&mut settings.hide_warmup, "Hide warm-up samples");

            ui.separator();

            if ui.button("Close").clicked() {
                settings.hide();
            }
        });
}

fn slider_row(
    ui: &mut egui::Ui,
    label: &str,
    value: &mut f32,
    range: std::ops::RangeInclusive<f32>,
    step: f64,
) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::Slider::new(value, range).step_by(step));
    });
}
