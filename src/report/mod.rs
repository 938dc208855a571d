//! Rendering of scan results as console text or JSON

pub mod console;
pub mod json;

pub use console::ConsoleOptions;
