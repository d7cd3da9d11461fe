pub mod series_view;
pub mod settings;
