//! Single-slot modal dialog and toast overlay manager for terminal UIs.
//!
//! The [`overlay`] module holds the surface-independent core: at most one
//! dialog, one delayed progress display and one toast at a time, driven by a
//! host event loop. [`ui`] implements the overlay surface with ratatui.

pub mod config;
pub mod overlay;
pub mod theme;
pub mod tui;
pub mod ui;

pub use theme::Theme;
