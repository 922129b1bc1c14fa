/// Shared modules for the metals TUIs
pub mod api;
pub mod config;
pub mod debug;
pub mod error;
pub mod format;
pub mod metrics;
pub mod poller;
pub mod present;
pub mod surface;
pub mod tui;
pub mod types;
pub mod widget;
