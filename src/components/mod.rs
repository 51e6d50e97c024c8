//! UI components.

pub mod network_plot;
