use super::address::Short;
use std::time::Duration;

/// Reply to a yes/no query. `Multiple` means the reply was garbled,
/// which during address searches is caused by more than one device
/// answering at once.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
    Multiple,
}

/// Classify command errors without knowing the concrete error type.
pub trait ErrorInfo {
    fn is_timeout(&self) -> bool;
    fn is_framing_error(&self) -> bool;
}

/// Addressing commands shared by control gear and input devices.
///
/// Implementations encode each operation as the frame format of their
/// device family. The address search machinery only depends on this
/// trait and works unchanged for both families.
#[allow(async_fn_in_trait)]
pub trait Commands {
    type Error: std::error::Error + ErrorInfo + Send + Sync + 'static;

    /// INITIALISE targeting every device on the bus.
    async fn initialise_all(&mut self) -> Result<(), Self::Error>;

    /// INITIALISE targeting only devices without a short address.
    async fn initialise_unaddressed(&mut self) -> Result<(), Self::Error>;

    /// End the initialisation period.
    async fn terminate(&mut self) -> Result<(), Self::Error>;

    /// Make all initialised devices pick a new random address.
    async fn randomise(&mut self) -> Result<(), Self::Error>;

    /// Ask if any device has a random address at or below the search
    /// address.
    async fn compare(&mut self) -> Result<YesNo, Self::Error>;

    /// Remove the selected device from further compares.
    async fn withdraw(&mut self) -> Result<(), Self::Error>;

    async fn searchaddr_h(&mut self, h: u8) -> Result<(), Self::Error>;
    async fn searchaddr_m(&mut self, m: u8) -> Result<(), Self::Error>;
    async fn searchaddr_l(&mut self, l: u8) -> Result<(), Self::Error>;

    /// Store a short address in the selected device.
    async fn program_short_address(&mut self, addr: Short) -> Result<(), Self::Error>;

    /// Short address of the selected device. `None` if no device is
    /// selected or the selected device has no address.
    async fn query_short_address(&mut self) -> Result<Option<Short>, Self::Error>;

    /// Leave the bus idle, e.g. to let devices finish RANDOMISE.
    async fn settle(&mut self, duration: Duration);
}
