use crate::components::series_view::{show_series, SeriesView};
use crate::components::settings::{show_settings_window, Settings};
use crate::error::{BenchError, Result};

/// Read-only window showing the CPU and memory curves of one session.
///
/// Only the display settings are persisted; the series belongs to the run.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct SeriesViewerApp {
    #[serde(skip)]
    view: SeriesView,
    settings: Settings,
}

impl Default for SeriesViewerApp {
    fn default() -> Self {
        Self {
            view: SeriesView::default(),
            settings: Settings::default(),
        }
    }
}

impl SeriesViewerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, view: SeriesView) -> Self {
        // Restore display settings from the previous viewer (if any).
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<SeriesViewerApp>(storage, eframe::APP_KEY))
            .map(|previous| previous.settings)
            .unwrap_or_default();

        Self { view, settings }
    }
}

impl eframe::App for SeriesViewerApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.settings.apply(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.add_space(16.0);
                egui::widgets::global_theme_preference_buttons(ui);

                ui.add_space(16.0);
                if ui.button("⚙").clicked() {
                    self.settings.show();
                }
            });
        });

        show_settings_window(ctx, &mut self.settings);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_series(ui, &self.view, &self.settings);
            });
        });
    }
}

/// Opens the viewer and blocks until its window is closed.
pub fn show_plot(view: SeriesView) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "varbench",
        native_options,
        Box::new(move |cc| Ok(Box::new(SeriesViewerApp::new(cc, view)))),
    )
    .map_err(|e| BenchError::Viewer(e.to_string()))
}
