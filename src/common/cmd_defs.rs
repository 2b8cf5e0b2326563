/// First byte of a forward frame, with the address already shifted into
/// place. Build one from the typed addresses in [`crate::common::address`]
/// rather than from raw bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressByte(pub u8);

impl AddressByte {
    /// Clear the command bit, turning the byte into a direct level
    /// (DAPC) address byte.
    pub const fn direct(self) -> AddressByte {
        AddressByte(self.0 & 0xfe)
    }
}

impl From<AddressByte> for u8 {
    fn from(b: AddressByte) -> u8 {
        b.0
    }
}
