//! Theme components for the TUI.
//!
//! This module provides:
//! - [`Theme`] - Color palette (Catppuccin Mocha / high contrast)

mod colors;

pub use colors::Theme;
