use dali_master as dali;

use dali::common::address::Short;
use dali::common::commands::{Commands, YesNo};
use dali::control::events::EventMonitor;
use dali::control::sensors;
use dali::drivers::driver::DaliSendResult;
use dali::drivers::send_flags::PRIORITY_1;
use dali::drivers::simulator::{SimBus, SimGear, SimInput, SimInstance};
use dali::gear::address::Group;
use dali::gear::commands_102::Gear102;
use dali::gear::control::{self, ColourType};
use dali::utils::commission::{self, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;

fn reset_config() -> Config {
    Config {
        reset_addresses: true,
        first_address: 0,
    }
}

#[tokio::test]
async fn fresh_bus_assigns_all() {
    let bus = SimBus::new(13, 0);
    let mut driver = bus.driver();
    let report =
        commission::commission_family::<Gear102>(driver.as_mut(), &reset_config(), &mut |_| {})
            .await
            .unwrap();
    assert_eq!(report.assigned, 13);
    assert_eq!(report.existing, 0);
    assert_eq!(report.overflow, 0);
    assert_eq!(report.in_use, 13);
    assert!(report.devices.iter().all(|d| d.verified));
    // devices are isolated lowest random address first
    assert!(report.devices.windows(2).all(|w| w[0].long < w[1].long));

    let mut shorts: Vec<u8> = bus
        .gear_addresses()
        .into_iter()
        .map(|a| a.unwrap().value())
        .collect();
    shorts.sort();
    assert_eq!(shorts, (0..13).collect::<Vec<u8>>());
}

#[tokio::test]
async fn keep_mode_numbers_above_existing() {
    let gears = vec![
        SimGear::new().with_address(Short::new(3)),
        SimGear::new().with_address(Short::new(7)),
        SimGear::new(),
        SimGear::new(),
    ];
    let bus = SimBus::with_devices(gears, Vec::new());
    let mut driver = bus.driver();
    let report =
        commission::commission_family::<Gear102>(driver.as_mut(), &Config::default(), &mut |_| {})
            .await
            .unwrap();
    assert_eq!(report.highest_existing, Some(7));
    assert_eq!(report.assigned, 2);
    assert_eq!(report.overflow, 0);
    assert_eq!(report.in_use, 10);

    let addrs = bus.gear_addresses();
    assert_eq!(addrs[0], Some(Short::new(3)));
    assert_eq!(addrs[1], Some(Short::new(7)));
    let mut fresh: Vec<u8> = addrs[2..].iter().map(|a| a.unwrap().value()).collect();
    fresh.sort();
    assert_eq!(fresh, vec![8, 9]);
}

#[tokio::test]
async fn reset_run_keeps_stored_addresses() {
    let gears = vec![
        SimGear::new().with_address(Short::new(5)),
        SimGear::new().with_address(Short::new(9)),
        SimGear::new(),
    ];
    let bus = SimBus::with_devices(gears, Vec::new());
    let mut driver = bus.driver();
    let report =
        commission::commission_family::<Gear102>(driver.as_mut(), &reset_config(), &mut |_| {})
            .await
            .unwrap();
    assert_eq!(report.assigned, 1);
    assert_eq!(report.existing, 2);
    assert_eq!(report.highest_existing, None);
    assert_eq!(report.in_use, 3);

    let addrs = bus.gear_addresses();
    assert_eq!(addrs[0], Some(Short::new(5)));
    assert_eq!(addrs[1], Some(Short::new(9)));
    assert_eq!(addrs[2], Some(Short::new(0)));
}

struct CountingCommands<'a> {
    inner: Gear102<'a>,
    compares: u32,
}

impl Commands for CountingCommands<'_> {
    type Error = DaliSendResult;

    async fn initialise_all(&mut self) -> Result<(), DaliSendResult> {
        self.inner.initialise_all().await
    }
    async fn initialise_unaddressed(&mut self) -> Result<(), DaliSendResult> {
        self.inner.initialise_unaddressed().await
    }
    async fn terminate(&mut self) -> Result<(), DaliSendResult> {
        self.inner.terminate().await
    }
    async fn randomise(&mut self) -> Result<(), DaliSendResult> {
        self.inner.randomise().await
    }
    async fn compare(&mut self) -> Result<YesNo, DaliSendResult> {
        self.compares += 1;
        self.inner.compare().await
    }
    async fn withdraw(&mut self) -> Result<(), DaliSendResult> {
        self.inner.withdraw().await
    }
    async fn searchaddr_h(&mut self, h: u8) -> Result<(), DaliSendResult> {
        self.inner.searchaddr_h(h).await
    }
    async fn searchaddr_m(&mut self, m: u8) -> Result<(), DaliSendResult> {
        self.inner.searchaddr_m(m).await
    }
    async fn searchaddr_l(&mut self, l: u8) -> Result<(), DaliSendResult> {
        self.inner.searchaddr_l(l).await
    }
    async fn program_short_address(&mut self, addr: Short) -> Result<(), DaliSendResult> {
        self.inner.program_short_address(addr).await
    }
    async fn query_short_address(&mut self) -> Result<Option<Short>, DaliSendResult> {
        self.inner.query_short_address().await
    }
    async fn settle(&mut self, duration: Duration) {
        self.inner.settle(duration).await
    }
}

#[tokio::test]
async fn single_device_takes_24_rounds() {
    let bus = SimBus::new(1, 0);
    let mut driver = bus.driver();
    let mut commands = CountingCommands {
        inner: Gear102::with_flags(driver.as_mut(), PRIORITY_1),
        compares: 0,
    };
    let report = commission::assign_short_addresses(&mut commands, &reset_config(), &mut |_| {})
        .await
        .unwrap();
    assert_eq!(report.assigned, 1);
    // top of loop, 24 narrowing rounds, the confirmation and the
    // final all-withdrawn check
    assert_eq!(commands.compares, 1 + 24 + 1 + 1);
    assert_eq!(
        report.devices[0].long,
        bus.gear(0, |g| g.search.random_address)
    );
}

#[tokio::test]
async fn address_space_overflow() {
    let bus = SimBus::new(64, 0);
    let mut driver = bus.driver();
    let report =
        commission::commission_family::<Gear102>(driver.as_mut(), &reset_config(), &mut |_| {})
            .await
            .unwrap();
    assert_eq!(report.assigned, 63);
    assert_eq!(report.overflow, 1);
    assert_eq!(report.in_use, 63);
    assert_eq!(report.devices.len(), 64);

    let unaddressed = bus
        .gear_addresses()
        .iter()
        .filter(|a| a.is_none())
        .count();
    assert_eq!(unaddressed, 1);
}

#[tokio::test]
async fn bus_families_share_address_space() {
    let bus = SimBus::new(5, 3);
    let mut driver = bus.driver();
    let report = commission::commission_bus(driver.as_mut(), &reset_config(), &mut |_| {})
        .await
        .unwrap();
    assert_eq!(report.gear.assigned, 5);
    assert_eq!(report.input.assigned, 3);
    assert_eq!(report.input.in_use, 8);

    let mut gear: Vec<u8> = bus
        .gear_addresses()
        .into_iter()
        .map(|a| a.unwrap().value())
        .collect();
    gear.sort();
    assert_eq!(gear, (0..5).collect::<Vec<u8>>());
    let mut input: Vec<u8> = bus
        .input_addresses()
        .into_iter()
        .map(|a| a.unwrap().value())
        .collect();
    input.sort();
    assert_eq!(input, (5..8).collect::<Vec<u8>>());
}

#[tokio::test]
async fn group_membership_round_trip() {
    let bus = SimBus::with_devices(vec![SimGear::new().with_address(Short::new(0))], Vec::new());
    let mut driver = bus.driver();
    let d = driver.as_mut();
    let addr = Short::new(0);

    assert!(control::add_to_group(d, addr, Group::new(3)).await.unwrap());
    assert_eq!(control::query_groups(d, addr).await.unwrap(), 1 << 3);
    assert!(control::add_to_group(d, addr, Group::new(11)).await.unwrap());
    assert!(control::query_group_membership(d, addr, Group::new(11))
        .await
        .unwrap());
    assert!(control::remove_from_group(d, addr, Group::new(3))
        .await
        .unwrap());
    assert!(!control::query_group_membership(d, addr, Group::new(3))
        .await
        .unwrap());
}

#[tokio::test]
async fn gear_levels_and_scenes() {
    let bus = SimBus::with_devices(vec![SimGear::new().with_address(Short::new(0))], Vec::new());
    let mut driver = bus.driver();
    let d = driver.as_mut();
    let addr = Short::new(0);

    control::set_level(d, addr, 128).await.unwrap();
    assert_eq!(control::query_actual_level(d, addr).await.unwrap(), 128);
    control::turn_off(d, addr).await.unwrap();
    assert_eq!(control::query_actual_level(d, addr).await.unwrap(), 0);
    let status = control::query_status(d, addr).await.unwrap();
    assert!(!status.lamp_on());
    assert!(!status.missing_short_address());
    control::turn_on(d, addr).await.unwrap();
    assert!(control::query_status(d, addr).await.unwrap().lamp_on());

    control::set_max_level(d, addr, 200).await.unwrap();
    control::set_min_level(d, addr, 10).await.unwrap();
    assert_eq!(control::query_max_level(d, addr).await.unwrap(), 200);
    assert_eq!(control::query_min_level(d, addr).await.unwrap(), 10);
    control::set_level(d, addr, 250).await.unwrap();
    assert_eq!(control::query_actual_level(d, addr).await.unwrap(), 200);
    assert_eq!(control::query_physical_minimum(d, addr).await.unwrap(), 1);

    control::set_fade_time(d, addr, 5).await.unwrap();
    control::set_fade_rate(d, addr, 3).await.unwrap();
    assert_eq!(control::query_fade(d, addr).await.unwrap(), (5, 3));

    control::set_scene(d, addr, 3, 42).await.unwrap();
    assert_eq!(
        control::query_scene_level(d, addr, 3).await.unwrap(),
        Some(42)
    );
    control::go_to_scene(d, addr, 3).await.unwrap();
    assert_eq!(control::query_actual_level(d, addr).await.unwrap(), 42);
    control::remove_from_scene(d, addr, 3).await.unwrap();
    assert_eq!(control::query_scene_level(d, addr, 3).await.unwrap(), None);
}

#[tokio::test]
async fn short_address_moves() {
    let bus = SimBus::with_devices(vec![SimGear::new().with_address(Short::new(1))], Vec::new());
    let mut driver = bus.driver();
    let d = driver.as_mut();

    control::set_short_address(d, Short::new(1), Some(Short::new(9)))
        .await
        .unwrap();
    assert_eq!(bus.gear_addresses()[0], Some(Short::new(9)));
    control::set_short_address(d, Short::new(9), None)
        .await
        .unwrap();
    assert_eq!(bus.gear_addresses()[0], None);
}

#[tokio::test]
async fn memory_bank_reads() {
    let gears = vec![SimGear::new()
        .with_address(Short::new(0))
        .with_unit_index(4)];
    let bus = SimBus::with_devices(gears, Vec::new());
    let mut driver = bus.driver();
    let d = driver.as_mut();
    let addr = Short::new(0);

    assert_eq!(control::logical_unit_index(d, addr).await.unwrap(), 4);
    let bank = control::read_memory(d, addr, 0, 0, 0x1b).await.unwrap();
    assert_eq!(bank.len(), 0x1b);
    assert_eq!(bank[0], 0x1a);
    assert_eq!(bank[0x1a], 4);

    // reads past the end of the bank stop early
    let tail = control::read_memory(d, addr, 0, 0x19, 4).await.unwrap();
    assert_eq!(tail.len(), 2);
    // unimplemented bank
    let empty = control::read_memory(d, addr, 1, 0, 4).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn colour_control() {
    let gears = vec![
        SimGear::colour(0x02).with_address(Short::new(0)),
        SimGear::new().with_address(Short::new(1)),
    ];
    let bus = SimBus::with_devices(gears, Vec::new());
    let mut driver = bus.driver();
    let d = driver.as_mut();

    assert_eq!(control::query_device_type(d, Short::new(0)).await.unwrap(), 8);
    assert_eq!(
        control::colour_type(d, Short::new(0)).await.unwrap(),
        ColourType::ColourTemperature
    );
    assert_eq!(
        control::colour_type(d, Short::new(1)).await.unwrap(),
        ColourType::Unsupported
    );

    control::set_colour_temperature(d, Short::new(0), 4000)
        .await
        .unwrap();
    assert_eq!(bus.gear(0, |g| g.colour_temperature), Some(250));
    control::set_colour_rgb(d, Short::new(0), 10, 20, 30)
        .await
        .unwrap();
    assert_eq!(bus.gear(0, |g| g.rgb), Some([10, 20, 30]));
}

#[tokio::test]
async fn sensor_readings() {
    let instances = vec![
        SimInstance::button(),
        SimInstance::generic(5960),
        SimInstance::generic(4550),
    ];
    let inputs = vec![SimInput::with_instances(instances).with_address(Short::new(0))];
    let bus = SimBus::with_devices(Vec::new(), inputs);
    let mut driver = bus.driver();
    let d = driver.as_mut();
    let addr = Short::new(0);

    assert_eq!(sensors::device_instances(d, addr).await.unwrap(), 3);
    assert_eq!(
        sensors::instance_type(d, addr, 0).await.unwrap(),
        sensors::INSTANCE_BUTTON
    );
    assert!(sensors::instance_enabled(d, addr, 0).await.unwrap());
    sensors::disable_instance(d, addr, 0).await.unwrap();
    assert!(!sensors::instance_enabled(d, addr, 0).await.unwrap());
    sensors::enable_instance(d, addr, 0).await.unwrap();

    assert_eq!(sensors::read_input_value(d, addr, 1).await.unwrap(), 5960);
    let temperature = sensors::read_temperature(d, addr, 1).await.unwrap();
    assert!((temperature - 19.6).abs() < 0.01);
    let humidity = sensors::read_humidity(d, addr, 2).await.unwrap();
    assert!((humidity - 45.5).abs() < 0.01);

    sensors::set_event_scheme(d, addr, 0, sensors::EVENT_SCHEME_DEVICE)
        .await
        .unwrap();
    assert_eq!(
        sensors::query_event_scheme(d, addr, 0).await.unwrap(),
        sensors::EVENT_SCHEME_DEVICE
    );
    sensors::set_event_filter(d, addr, 0, 0x07).await.unwrap();
    assert_eq!(bus.input(0, |i| i.instances[0].event_filter), 0x07);
}

#[tokio::test]
async fn event_monitor_delivers_events() {
    let inputs = vec![SimInput::new().with_address(Short::new(7))];
    let bus = SimBus::with_devices(Vec::new(), inputs);
    let mut driver = bus.driver();
    sensors::set_event_scheme(
        driver.as_mut(),
        Short::new(7),
        0,
        sensors::EVENT_SCHEME_DEVICE,
    )
    .await
    .unwrap();

    let driver = Arc::new(Mutex::new(driver));
    let (monitor, mut events) = EventMonitor::attach(driver);
    assert!(bus.emit_event(0, 0, 0x102));
    let event = tokio::time::timeout(Duration::from_secs(1), events.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.device, Short::new(7));
    assert_eq!(event.instance_type, sensors::INSTANCE_BUTTON);
    assert_eq!(event.info, 0x102);

    monitor.detach();
    assert_eq!(
        tokio::time::timeout(Duration::from_secs(1), events.next())
            .await
            .unwrap(),
        None
    );
}
