//! In-VR control panel model
//!
//! Widget state and labels only; drawing belongs to the rendering substrate.

pub mod panel;

pub use panel::{ButtonState, ControlPanel, PanelWidget};
