pub mod driver;
pub mod driver_init;
pub use driver::driver_names;
pub use driver::open;
pub use driver_init::init;

pub mod command_utils;
pub mod driver_utils;
pub mod send_flags;

pub mod dummy;
pub mod simulator;
