//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be driven
//! programmatically without requiring physical hardware: a 4×4 matrix
//! keypad with scripted contact bounce, a virtual-clock alarm service and a
//! recording indicator panel.

pub mod alarm;
pub mod keypad;
pub mod panel;

// Re-export commonly used types
pub use alarm::ManualAlarms;
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use panel::MockPanel;
