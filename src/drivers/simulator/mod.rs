//! In-process DALI bus with emulated devices. Used by the test suite
//! and for trying out tools without hardware.

pub mod bus;
pub mod gear;
pub mod input;
pub mod search;

pub use bus::{driver_info, SimBus};
pub use gear::SimGear;
pub use input::{SimInput, SimInstance};
