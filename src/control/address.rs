use crate::common::address::{AddressImpl, GroupImpl};

pub use crate::common::address::Short;

/// Control devices have 32 groups.
pub type Group = GroupImpl<32>;
pub type Address = AddressImpl<32>;
