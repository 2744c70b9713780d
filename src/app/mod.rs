pub mod handlers;
pub mod monitor_app;
pub mod state;
pub mod ui;

pub use monitor_app::MonitorApp;
