//! Domain layer - pure scheduling logic
//!
//! No I/O and no async in this module: the window calculator takes the
//! wall clock as an argument and the entities are plain data, which is
//! what keeps the scheduling decisions unit-testable in isolation.

mod entities;
pub mod window;

pub use entities::{Address, Block};
pub use window::{sleep_time, WindowParams};
