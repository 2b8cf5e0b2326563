use crate::drivers::driver::add_driver;
use crate::drivers::{dummy, simulator};

/// Register all available drivers. Call once before
/// [`open`](crate::drivers::open).
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    add_driver(dummy::driver_info());
    add_driver(simulator::driver_info());
    Ok(())
}
