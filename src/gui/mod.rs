//! Terminal interfaces for the three programs, built on [ratatui] and
//! [crossterm].

mod accuracy_chart;
mod arm_animation;
mod device_selector;
mod error;
mod terminal;
mod tracing_window;

pub use accuracy_chart::accuracy_chart;
pub use arm_animation::arm_animation;
pub use device_selector::device_selector;
pub use error::GuiError;
pub use tracing_window::tracing_window;
