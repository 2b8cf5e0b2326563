use crate::common::address::{Long, Short};
use crate::common::commands::{Commands, YesNo};
use crate::common::driver_commands::DriverCommands;
use crate::control::commands_103::Device103;
use crate::drivers::driver::{DaliDriver, DaliSendResult};
use crate::drivers::send_flags::PRIORITY_1;
use crate::gear::commands_102::Gear102;
use crate::utils::address_pool::AddressPool;
use log::{debug, warn};
use serde_derive::Serialize;
use std::time::Duration;

/// Highest value of the 24 bit search address.
pub const TOP_SEARCH_ADDR: Long = 0xffffff;

// Wait for devices to finish RANDOMISE before comparing.
const RANDOMISE_SETTLE: Duration = Duration::from_millis(100);

// Stop searching when this many isolation attempts in a row end with
// no device answering at the resolved search address.
const MAX_FAILED_ISOLATIONS: u32 = 3;

/// Settings for one commissioning run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Run every device through the search, even those that already
    /// hold a short address. Stored addresses are kept unless they
    /// collide. When false only unaddressed devices take part and
    /// new addresses are handed out above the highest one found on
    /// the bus.
    pub reset_addresses: bool,
    /// Lowest short address handed out in this run.
    pub first_address: u8,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            reset_addresses: false,
            first_address: 0,
        }
    }
}

/// One device found during commissioning.
#[derive(Debug, Clone, Serialize)]
pub struct CommissionedDevice {
    /// Random address the device was isolated at.
    pub long: Long,
    /// Short address stored in the device. `None` if the address
    /// space was full and the device was left unprogrammed.
    pub short: Option<u8>,
    /// The device already held this address before the run.
    pub existing: bool,
    /// Reading the address back returned the expected value.
    pub verified: bool,
}

/// Outcome of a commissioning run for one device family.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommissionReport {
    /// Devices in the order they were isolated.
    pub devices: Vec<CommissionedDevice>,
    /// Addresses newly programmed in this run.
    pub assigned: u8,
    /// Devices that already held a short address.
    pub existing: u8,
    /// Devices beyond the capacity of the address space. These are
    /// left without a short address.
    pub overflow: u8,
    /// Highest address found by the scan that precedes a run with
    /// `reset_addresses` off.
    pub highest_existing: Option<u8>,
    /// Short addresses in use after the run, counting the range
    /// reserved below `first_address`.
    pub in_use: u8,
}

/// Outcome of commissioning both device families on a bus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BusReport {
    pub gear: CommissionReport,
    pub input: CommissionReport,
}

// The three search address registers are only rewritten when the
// corresponding byte changes. `current` is None before the first
// write, which forces all three bytes out whatever the first value
// is.
struct SearchAddr {
    current: Option<Long>,
}

impl SearchAddr {
    fn new() -> SearchAddr {
        SearchAddr { current: None }
    }

    async fn set<C>(&mut self, commands: &mut C, addr: Long) -> Result<(), C::Error>
    where
        C: Commands,
    {
        let diff = match self.current {
            Some(current) => current ^ addr,
            None => 0xffffff,
        };
        if diff & 0xff0000 != 0 {
            commands.searchaddr_h((addr >> 16 & 0xff) as u8).await?;
        }
        if diff & 0x00ff00 != 0 {
            commands.searchaddr_m((addr >> 8 & 0xff) as u8).await?;
        }
        if diff & 0x0000ff != 0 {
            commands.searchaddr_l((addr & 0xff) as u8).await?;
        }
        self.current = Some(addr);
        Ok(())
    }
}

struct Isolated {
    key: Long,
    // The confirming compare saw a single answer.
    unique: bool,
}

/// Narrow the search address down to the lowest random address still
/// answering, then confirm it. Clearing a bit restricts the compare
/// to lower keys; a NO means some remaining device needs that bit
/// set, so it is restored. After bit 0 the search address equals the
/// lowest key exactly.
async fn isolate_lowest<C>(
    commands: &mut C,
    search: &mut SearchAddr,
) -> Result<Option<Isolated>, C::Error>
where
    C: Commands,
{
    let mut addr = TOP_SEARCH_ADDR;
    for bit in (0..24).rev() {
        let mask = 1 << bit;
        addr &= !mask;
        search.set(commands, addr).await?;
        match commands.compare().await? {
            YesNo::No => {
                addr |= mask;
            }
            YesNo::Yes | YesNo::Multiple => {}
        }
    }
    search.set(commands, addr).await?;
    match commands.compare().await? {
        YesNo::Yes => Ok(Some(Isolated {
            key: addr,
            unique: true,
        })),
        YesNo::Multiple => Ok(Some(Isolated {
            key: addr,
            unique: false,
        })),
        YesNo::No => Ok(None),
    }
}

/// Give the isolated device a short address and withdraw it from the
/// search. Devices that already hold an address keep it.
async fn assign_device<C>(
    commands: &mut C,
    pool: &mut AddressPool,
    isolated: &Isolated,
) -> Result<CommissionedDevice, C::Error>
where
    C: Commands,
{
    let stored = commands.query_short_address().await?;
    let (addr, existing) = match stored {
        Some(addr) => (Some(addr), true),
        None => (pool.allocate(), false),
    };
    let device = match addr {
        Some(addr) => {
            if existing {
                if let Err(dup) = pool.mark_assigned(addr) {
                    warn!("Device 0x{:06x}: {}", isolated.key, dup);
                    commands.withdraw().await?;
                    return Ok(CommissionedDevice {
                        long: isolated.key,
                        short: Some(addr.value()),
                        existing: true,
                        verified: false,
                    });
                }
            }
            commands.program_short_address(addr).await?;
            let readback = commands.query_short_address().await?;
            let verified = isolated.unique && readback == Some(addr);
            if verified {
                debug!(
                    "Device 0x{:06x}: short address {}{}",
                    isolated.key,
                    addr,
                    if existing { " (kept)" } else { "" }
                );
            } else {
                warn!(
                    "Device 0x{:06x}: short address {} not verified",
                    isolated.key, addr
                );
            }
            CommissionedDevice {
                long: isolated.key,
                short: Some(addr.value()),
                existing,
                verified,
            }
        }
        None => {
            warn!(
                "Device 0x{:06x}: no short address left, device stays unaddressed",
                isolated.key
            );
            CommissionedDevice {
                long: isolated.key,
                short: None,
                existing: false,
                verified: false,
            }
        }
    };
    commands.withdraw().await?;
    Ok(device)
}

/// Assign a short address to every device of one family.
///
/// Runs the search from [`find_highest_address`] first when existing
/// addresses are kept, so new devices end up above the old ones.
/// `found` is called once per device as it is withdrawn.
pub async fn assign_short_addresses<C, F>(
    commands: &mut C,
    config: &Config,
    found: &mut F,
) -> Result<CommissionReport, C::Error>
where
    C: Commands,
    F: FnMut(&CommissionedDevice),
{
    let mut pool = AddressPool::new();
    pool.seed_below(config.first_address);
    let mut report = CommissionReport::default();
    if !config.reset_addresses {
        report.highest_existing = find_highest_address(commands).await?.map(|a| {
            pool.seed_through(a);
            a.value()
        });
    }

    initialise(commands, config).await?;
    commands.randomise().await?;
    commands.settle(RANDOMISE_SETTLE).await;

    let mut search = SearchAddr::new();
    let mut failed = 0u32;
    loop {
        search.set(commands, TOP_SEARCH_ADDR).await?;
        if commands.compare().await? == YesNo::No {
            break;
        }
        match isolate_lowest(commands, &mut search).await? {
            Some(isolated) => {
                if !isolated.unique {
                    warn!(
                        "More than one device at search address 0x{:06x}",
                        isolated.key
                    );
                }
                let device = assign_device(commands, &mut pool, &isolated).await?;
                match (device.short, device.existing) {
                    (Some(_), false) => report.assigned += 1,
                    (Some(_), true) => report.existing += 1,
                    (None, _) => report.overflow += 1,
                }
                found(&device);
                report.devices.push(device);
                failed = 0;
            }
            None => {
                failed += 1;
                warn!("No device answered at the resolved search address");
                if failed >= MAX_FAILED_ISOLATIONS {
                    warn!("Giving up after {} attempts without isolating a device", failed);
                    break;
                }
            }
        }
        initialise(commands, config).await?;
    }
    commands.terminate().await?;
    report.in_use = pool.count();
    Ok(report)
}

async fn initialise<C>(commands: &mut C, config: &Config) -> Result<(), C::Error>
where
    C: Commands,
{
    if config.reset_addresses {
        commands.initialise_all().await
    } else {
        commands.initialise_unaddressed().await
    }
}

/// Find the highest short address stored in any device of one family.
///
/// Every device is isolated and read in turn, nothing is programmed.
/// Returns `None` on a bus with no addressed devices.
pub async fn find_highest_address<C>(commands: &mut C) -> Result<Option<Short>, C::Error>
where
    C: Commands,
{
    let mut highest: Option<Short> = None;
    commands.initialise_all().await?;
    commands.randomise().await?;
    commands.settle(RANDOMISE_SETTLE).await;

    let mut search = SearchAddr::new();
    let mut failed = 0u32;
    loop {
        search.set(commands, TOP_SEARCH_ADDR).await?;
        if commands.compare().await? == YesNo::No {
            break;
        }
        match isolate_lowest(commands, &mut search).await? {
            Some(isolated) => {
                if let Some(addr) = commands.query_short_address().await? {
                    if highest.map_or(true, |h| addr > h) {
                        highest = Some(addr);
                    }
                }
                commands.withdraw().await?;
                failed = 0;
            }
            None => {
                failed += 1;
                if failed >= MAX_FAILED_ISOLATIONS {
                    warn!("Giving up after {} attempts without isolating a device", failed);
                    break;
                }
            }
        }
        commands.initialise_all().await?;
    }
    commands.terminate().await?;
    debug!(
        "Highest existing address: {}",
        highest.map_or_else(|| "none".to_string(), |a| a.to_string())
    );
    Ok(highest)
}

/// Commission one device family through a raw driver.
pub async fn commission_family<DC>(
    driver: &mut dyn DaliDriver,
    config: &Config,
    found: &mut dyn FnMut(&CommissionedDevice),
) -> Result<CommissionReport, DaliSendResult>
where
    DC: DriverCommands,
{
    let mut commands = DC::from_driver(driver, PRIORITY_1);
    assign_short_addresses(&mut commands, config, &mut |device: &CommissionedDevice| {
        found(device)
    })
    .await
}

/// Commission control gear first and input devices second. Input
/// devices are numbered starting right after the gear, so the two
/// families never share a short address.
pub async fn commission_bus(
    driver: &mut dyn DaliDriver,
    config: &Config,
    found: &mut dyn FnMut(&CommissionedDevice),
) -> Result<BusReport, DaliSendResult> {
    let gear = {
        let mut commands = Gear102::with_flags(driver, PRIORITY_1);
        assign_short_addresses(&mut commands, config, &mut |device: &CommissionedDevice| {
            found(device)
        })
        .await?
    };
    let input_config = Config {
        reset_addresses: config.reset_addresses,
        first_address: gear.in_use,
    };
    let input = {
        let mut commands = Device103::with_flags(driver, PRIORITY_1);
        assign_short_addresses(
            &mut commands,
            &input_config,
            &mut |device: &CommissionedDevice| found(device),
        )
        .await?
    };
    Ok(BusReport { gear, input })
}

#[cfg(test)]
mod test {
    use super::SearchAddr;
    use crate::common::address::Short;
    use crate::common::commands::{Commands, ErrorInfo, YesNo};
    use std::time::Duration;

    #[derive(Debug)]
    struct NoError;

    impl std::fmt::Display for NoError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "no error")
        }
    }

    impl std::error::Error for NoError {}

    impl ErrorInfo for NoError {
        fn is_timeout(&self) -> bool {
            false
        }
        fn is_framing_error(&self) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct RecordingCommands {
        writes: Vec<(char, u8)>,
    }

    impl Commands for RecordingCommands {
        type Error = NoError;

        async fn initialise_all(&mut self) -> Result<(), NoError> {
            Ok(())
        }
        async fn initialise_unaddressed(&mut self) -> Result<(), NoError> {
            Ok(())
        }
        async fn terminate(&mut self) -> Result<(), NoError> {
            Ok(())
        }
        async fn randomise(&mut self) -> Result<(), NoError> {
            Ok(())
        }
        async fn compare(&mut self) -> Result<YesNo, NoError> {
            Ok(YesNo::No)
        }
        async fn withdraw(&mut self) -> Result<(), NoError> {
            Ok(())
        }
        async fn searchaddr_h(&mut self, h: u8) -> Result<(), NoError> {
            self.writes.push(('h', h));
            Ok(())
        }
        async fn searchaddr_m(&mut self, m: u8) -> Result<(), NoError> {
            self.writes.push(('m', m));
            Ok(())
        }
        async fn searchaddr_l(&mut self, l: u8) -> Result<(), NoError> {
            self.writes.push(('l', l));
            Ok(())
        }
        async fn program_short_address(&mut self, _addr: Short) -> Result<(), NoError> {
            Ok(())
        }
        async fn query_short_address(&mut self) -> Result<Option<Short>, NoError> {
            Ok(None)
        }
        async fn settle(&mut self, _duration: Duration) {}
    }

    #[tokio::test]
    async fn search_addr_writes_all_bytes_first() {
        let mut commands = RecordingCommands::default();
        let mut search = SearchAddr::new();
        search.set(&mut commands, 0xffffff).await.unwrap();
        assert_eq!(
            commands.writes,
            vec![('h', 0xff), ('m', 0xff), ('l', 0xff)]
        );
    }

    #[tokio::test]
    async fn search_addr_rewrites_changed_bytes() {
        let mut commands = RecordingCommands::default();
        let mut search = SearchAddr::new();
        search.set(&mut commands, 0x123456).await.unwrap();
        assert_eq!(
            commands.writes,
            vec![('h', 0x12), ('m', 0x34), ('l', 0x56)]
        );

        commands.writes.clear();
        search.set(&mut commands, 0x123456).await.unwrap();
        assert_eq!(commands.writes, vec![]);

        search.set(&mut commands, 0x1234ff).await.unwrap();
        assert_eq!(commands.writes, vec![('l', 0xff)]);

        commands.writes.clear();
        search.set(&mut commands, 0x7f34ff).await.unwrap();
        assert_eq!(commands.writes, vec![('h', 0x7f)]);
    }
}
