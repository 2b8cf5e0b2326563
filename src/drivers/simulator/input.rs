use super::search::{programmed_address, short_address_answer, InitState, SearchState};
use crate::common::address::Short;
use crate::common::defs::{MASK, YES};
use crate::control::events::InputEvent;
use crate::control::sensors;

/// One input instance of an emulated control device.
pub struct SimInstance {
    pub instance_type: u8,
    pub enabled: bool,
    pub event_scheme: u8,
    pub event_filter: u8,
    pub resolution: u8,
    pub input_value: u16,
    latched: u8,
}

impl SimInstance {
    pub fn new(instance_type: u8) -> SimInstance {
        SimInstance {
            instance_type,
            enabled: true,
            event_scheme: 0,
            event_filter: MASK,
            resolution: 16,
            input_value: 0,
            latched: 0,
        }
    }

    pub fn button() -> SimInstance {
        let mut instance = SimInstance::new(sensors::INSTANCE_BUTTON);
        instance.resolution = 1;
        instance
    }

    pub fn occupancy() -> SimInstance {
        let mut instance = SimInstance::new(sensors::INSTANCE_OCCUPANCY);
        instance.resolution = 2;
        instance
    }

    pub fn light_sensor(value: u16) -> SimInstance {
        let mut instance = SimInstance::new(sensors::INSTANCE_LIGHT);
        instance.input_value = value;
        instance
    }

    pub fn generic(value: u16) -> SimInstance {
        let mut instance = SimInstance::new(sensors::INSTANCE_GENERIC);
        instance.input_value = value;
        instance
    }
}

/// Emulated control device with a set of input instances.
pub struct SimInput {
    pub short_address: Option<Short>,
    pub search: SearchState,
    pub groups: u32,
    pub instances: Vec<SimInstance>,
    pub dtr0: u8,
    pub dtr1: u8,
    pub dtr2: u8,
}

impl SimInput {
    /// Device with a single push button instance.
    pub fn new() -> SimInput {
        SimInput::with_instances(vec![SimInstance::button()])
    }

    pub fn with_instances(instances: Vec<SimInstance>) -> SimInput {
        SimInput {
            short_address: None,
            search: SearchState::new(),
            groups: 0,
            instances,
            dtr0: 0,
            dtr1: 0,
            dtr2: 0,
        }
    }

    pub fn with_address(mut self, addr: Short) -> SimInput {
        self.short_address = Some(addr);
        self
    }

    /// Handle one forward frame. Event frames from other devices are
    /// ignored.
    pub fn frame24(&mut self, frame: [u8; 3], twice: bool) -> Option<u8> {
        if frame[0] & 0x01 == 0 {
            return None;
        }
        if frame[0] == 0xc1 {
            return self.special(frame[1], frame[2], twice);
        }
        if !self.addressed(frame[0]) {
            return None;
        }
        if frame[1] == 0xfe {
            self.device_command(frame[2])
        } else if frame[1] & 0x80 == 0 {
            self.instance_command(frame[1], frame[2])
        } else {
            None
        }
    }

    /// Event frame for an instance, if the device would send one.
    /// Requires a short address, an enabled instance and the device
    /// event scheme.
    pub fn event(&self, instance: usize, info: u16) -> Option<[u8; 3]> {
        let short = self.short_address?;
        let instance = self.instances.get(instance)?;
        if !instance.enabled || instance.event_scheme != sensors::EVENT_SCHEME_DEVICE {
            return None;
        }
        Some(
            InputEvent {
                device: short,
                instance_type: instance.instance_type,
                info,
            }
            .frame(),
        )
    }

    fn addressed(&self, byte: u8) -> bool {
        match byte & 0xfe {
            0xfe => true,
            0xfc => self.short_address.is_none(),
            b if b & 0x80 == 0 => self.short_address.map(|s| s.value()) == Some(b >> 1),
            b if b & 0xc0 == 0x80 => self.groups & (1 << ((b >> 1) & 0x1f)) != 0,
            _ => false,
        }
    }

    fn yes(&self, answer: bool) -> Option<u8> {
        if answer {
            Some(YES)
        } else {
            None
        }
    }

    fn device_status(&self) -> u8 {
        if self.short_address.is_none() {
            0x04
        } else {
            0x00
        }
    }

    fn device_command(&mut self, opcode: u8) -> Option<u8> {
        match opcode {
            0x30 => Some(self.device_status()),
            0x33 => self.yes(self.short_address.is_none()),
            0x35 => Some(self.instances.len() as u8),
            _ => None,
        }
    }

    fn instance_command(&mut self, instance: u8, opcode: u8) -> Option<u8> {
        let dtr0 = self.dtr0;
        let instance = self.instances.get_mut(instance as usize)?;
        match opcode {
            0x62 => {
                instance.enabled = true;
                None
            }
            0x63 => {
                instance.enabled = false;
                None
            }
            0x67 => {
                if dtr0 <= sensors::EVENT_SCHEME_INSTANCE_GROUP {
                    instance.event_scheme = dtr0;
                }
                None
            }
            0x68 => {
                instance.event_filter = dtr0;
                None
            }
            0x80 => Some(instance.instance_type),
            0x81 => Some(instance.resolution),
            0x86 => Some(if instance.enabled { MASK } else { 0x00 }),
            0x8b => Some(instance.event_scheme),
            0x8c => {
                instance.latched = (instance.input_value & 0xff) as u8;
                Some((instance.input_value >> 8) as u8)
            }
            0x8d => Some(instance.latched),
            _ => None,
        }
    }

    fn initialise_selected(&self, data: u8) -> bool {
        data == 0xff
            || (data == 0x7f && self.short_address.is_none())
            || (data & 0x81 == 0x01 && self.short_address.map(|s| s.value()) == Some(data >> 1))
    }

    fn special(&mut self, selector: u8, data: u8, twice: bool) -> Option<u8> {
        match selector {
            0x00 => {
                self.search.terminate();
                None
            }
            0x01 if twice => {
                if self.initialise_selected(data) {
                    self.search.initialise();
                }
                None
            }
            0x02 if twice => {
                self.search.randomise();
                None
            }
            0x03 => self.yes(self.search.compare()),
            0x04 => {
                self.search.withdraw();
                None
            }
            0x05 => {
                self.search.search_h(data);
                None
            }
            0x06 => {
                self.search.search_m(data);
                None
            }
            0x07 => {
                self.search.search_l(data);
                None
            }
            0x08 => {
                if self.search.selected() {
                    if let Some(addr) = programmed_address(data) {
                        self.short_address = addr;
                    }
                }
                None
            }
            0x09 => self.yes(
                self.search.init != InitState::Disabled
                    && data & 0x81 == 0x01
                    && self.short_address.map(|s| s.value()) == Some(data >> 1),
            ),
            0x0a => {
                if self.search.selected() {
                    Some(short_address_answer(self.short_address))
                } else {
                    None
                }
            }
            0x30 => {
                self.dtr0 = data;
                None
            }
            0x31 => {
                self.dtr1 = data;
                None
            }
            0x32 => {
                self.dtr2 = data;
                None
            }
            _ => None,
        }
    }
}

impl Default for SimInput {
    fn default() -> SimInput {
        SimInput::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::control::cmd_defs as cmd;
    use crate::control::cmd_defs::Command;
    use crate::control::events::InputEvent;

    fn send<const A: bool, const T: bool>(input: &mut SimInput, cmd: Command<A, T>) -> Option<u8> {
        input.frame24(cmd.0, T)
    }

    #[test]
    fn commissioning_sequence() {
        let mut input = SimInput::new();
        send(&mut input, cmd::INITIALISE_UNADDRESSED());
        input.search.random_address = 0x000123;
        assert_eq!(send(&mut input, cmd::COMPARE()), Some(YES));
        send(&mut input, cmd::SEARCHADDRH(0x00));
        send(&mut input, cmd::SEARCHADDRM(0x01));
        send(&mut input, cmd::SEARCHADDRL(0x23));
        send(&mut input, cmd::PROGRAM_SHORT_ADDRESS(Short::new(9)));
        assert_eq!(input.short_address, Some(Short::new(9)));
        assert_eq!(
            send(&mut input, cmd::QUERY_SHORT_ADDRESS()),
            Some((9 << 1) | 1)
        );
        send(&mut input, cmd::WITHDRAW());
        assert_eq!(send(&mut input, cmd::COMPARE()), None);

        // an initialised device with an address answers VERIFY
        assert_eq!(
            send(&mut input, cmd::VERIFY_SHORT_ADDRESS(Short::new(9))),
            Some(YES)
        );
        send(&mut input, cmd::TERMINATE());
        assert_eq!(
            send(&mut input, cmd::VERIFY_SHORT_ADDRESS(Short::new(9))),
            None
        );
    }

    #[test]
    fn instance_queries() {
        let addr = Short::new(2);
        let mut input = SimInput::with_instances(vec![
            SimInstance::button(),
            SimInstance::light_sensor(0x1234),
        ])
        .with_address(addr);
        assert_eq!(
            send(&mut input, cmd::QUERY_NUMBER_OF_INSTANCES(addr)),
            Some(2)
        );
        assert_eq!(
            send(&mut input, cmd::QUERY_INSTANCE_TYPE(addr, 1)),
            Some(sensors::INSTANCE_LIGHT)
        );
        assert_eq!(
            send(&mut input, cmd::QUERY_INPUT_VALUE(addr, 1)),
            Some(0x12)
        );
        assert_eq!(
            send(&mut input, cmd::QUERY_INPUT_VALUE_LATCH(addr, 1)),
            Some(0x34)
        );
        // out of range instance stays silent
        assert_eq!(send(&mut input, cmd::QUERY_INSTANCE_TYPE(addr, 2)), None);
    }

    #[test]
    fn events_follow_scheme_and_enable() {
        let addr = Short::new(7);
        let mut input = SimInput::new().with_address(addr);
        assert_eq!(input.event(0, 0x102), None);

        send(&mut input, cmd::DTR0(sensors::EVENT_SCHEME_DEVICE));
        send(&mut input, cmd::SET_EVENT_SCHEME(addr, 0));
        let frame = input.event(0, 0x102).unwrap();
        let event = InputEvent::parse(&frame).unwrap();
        assert_eq!(event.device, addr);
        assert_eq!(event.instance_type, sensors::INSTANCE_BUTTON);
        assert_eq!(event.info, 0x102);

        send(&mut input, cmd::DISABLE_INSTANCE(addr, 0));
        assert_eq!(input.event(0, 0x102), None);
    }
}
