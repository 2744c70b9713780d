pub mod analysis_panel;
pub mod data_hub_panel;
pub mod display_panel;
pub mod sensor_panel;
pub mod settings_panel;
pub mod status_bar;

pub use analysis_panel::render_analysis_panel;
pub use data_hub_panel::render_data_hub_panel;
pub use display_panel::render_display_panel;
pub use sensor_panel::render_sensor_panel;
pub use settings_panel::render_settings_panel;
pub use status_bar::render_status_bar;
