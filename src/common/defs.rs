/// All bits set. Used on the bus for "no value" and "no address".
pub const MASK: u8 = 0xff;

/// The only answer byte a yes/no query may return.
pub const YES: u8 = 0xff;
