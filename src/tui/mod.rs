//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a clinical-themed interface for:
//! - Patient indicator input
//! - Carbapenem resistance risk display

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::ClinicalTheme;
