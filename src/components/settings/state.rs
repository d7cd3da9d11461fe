#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq, Debug)]
pub enum MemoryUnit {
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl MemoryUnit {
    pub const ALL: [MemoryUnit; 3] = [
        MemoryUnit::Kilobytes,
        MemoryUnit::Megabytes,
        MemoryUnit::Gigabytes,
    ];

    /// Converts a value in MiB into this unit.
    pub fn format_value(&self, megabytes: f64) -> (f64, &'static str) {
        match self {
            MemoryUnit::Kilobytes => (megabytes * 1024.0, "KB"),
            MemoryUnit::Megabytes => (megabytes, "MB"),
            MemoryUnit::Gigabytes => (megabytes / 1024.0, "GB"),
        }
    }

    pub fn label(&self) -> &'static str {
        self.format_value(0.0).1
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug)]
#[serde(default)]
pub struct Settings {
    pub scale: f32,
    pub font_size: f32,
    pub plot_height: f32,
    /// Leave the warm-up samples out of the plots, as the summary does
    pub hide_warmup: bool,
    pub memory_unit: MemoryUnit,
    #[serde(skip)]
    show_window: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: 1.2,
            font_size: 15.0,
            plot_height: 220.0,
            hide_warmup: true,
            memory_unit: MemoryUnit::Megabytes,
            show_window: false,
        }
    }
}

impl Settings {
    pub fn show(&mut self) {
        self.show_window = true;
    }

    pub fn is_visible(&self) -> bool {
        self.show_window
    }

    pub fn hide(&mut self) {
        self.show_window = false;
    }

    /// Text size for a style, scaled from the body font size.
    fn font_size_for(&self, style: &egui::TextStyle) -> f32 {
        match style {
            egui::TextStyle::Heading => (self.font_size * 1.3).round(),
            egui::TextStyle::Small => (self.font_size * 0.8).round(),
            _ => self.font_size,
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_pixels_per_point(self.scale);
        ctx.style_mut(|style| {
            for (text_style, font) in style.text_styles.iter_mut() {
                font.size = self.font_size_for(text_style);
            }
        });
    }
}
