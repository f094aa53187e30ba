pub mod display;
pub mod launcher;
pub mod rules;
pub mod startup;
pub mod window_watcher;

pub use display::create_display_detector;
pub use launcher::create_launcher;
pub use startup::run_startup;
pub use window_watcher::create_client_watcher;
