//! egui drawing for the controller state and the rendered artifacts.

pub mod output;
pub mod panels;
pub mod plot;
