use super::search::{programmed_address, short_address_answer, InitState, SearchState};
use crate::common::address::Short;
use crate::common::defs::{MASK, YES};
use crate::gear::status;

fn default_bank0(unit_index: u8) -> Vec<u8> {
    let mut bank = vec![0u8; 0x1b];
    // byte 0 holds the number of the last addressable location
    bank[0] = 0x1a;
    bank[0x1a] = unit_index;
    bank
}

/// Emulated control gear. Queries answer `Some(byte)`, everything
/// else stays silent, like real gear.
pub struct SimGear {
    pub short_address: Option<Short>,
    pub search: SearchState,
    pub device_type: u8,
    pub actual_level: u8,
    pub last_active_level: u8,
    pub power_on_level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub physical_minimum: u8,
    /// Fade time in the high nibble, fade rate in the low.
    pub fade: u8,
    pub groups: u16,
    /// Scene levels. MASK marks scenes the gear is not part of.
    pub scenes: [u8; 16],
    pub lamp_failure: bool,
    pub dtr0: u8,
    pub dtr1: u8,
    pub dtr2: u8,
    pub memory_bank0: Vec<u8>,
    pub colour_features: u8,
    /// Active colour temperature in mirek, device type 8 only.
    pub colour_temperature: Option<u16>,
    pub rgb: Option<[u8; 3]>,
    temp_colour_temperature: Option<u16>,
    temp_rgb: Option<[u8; 3]>,
    /// Set by ENABLE DEVICE TYPE, consumed by the next frame.
    enabled_device_type: Option<u8>,
}

impl SimGear {
    pub fn new() -> SimGear {
        let physical_minimum = 0x01;
        SimGear {
            short_address: None,
            search: SearchState::new(),
            device_type: 6,
            actual_level: 0xfe,
            last_active_level: 0xfe,
            power_on_level: 0xfe,
            min_level: physical_minimum,
            max_level: 0xfe,
            physical_minimum,
            fade: 0x07,
            groups: 0,
            scenes: [MASK; 16],
            lamp_failure: false,
            dtr0: 0,
            dtr1: 0,
            dtr2: 0,
            memory_bank0: default_bank0(0),
            colour_features: 0,
            colour_temperature: None,
            rgb: None,
            temp_colour_temperature: None,
            temp_rgb: None,
            enabled_device_type: None,
        }
    }

    /// Gear implementing device type 8 colour control with the given
    /// features byte.
    pub fn colour(features: u8) -> SimGear {
        let mut gear = SimGear::new();
        gear.device_type = 8;
        gear.colour_features = features;
        gear
    }

    pub fn with_address(mut self, addr: Short) -> SimGear {
        self.short_address = Some(addr);
        self
    }

    pub fn with_unit_index(mut self, index: u8) -> SimGear {
        self.memory_bank0[0x1a] = index;
        self
    }

    /// Handle one forward frame. `twice` is true when the frame was
    /// sent as a transaction of two identical frames.
    pub fn frame16(&mut self, frame: [u8; 2], twice: bool) -> Option<u8> {
        let armed = self.enabled_device_type.take();
        if frame[0] & 0x01 == 0 {
            if self.addressed(frame[0]) {
                self.direct_level(frame[1]);
            }
            return None;
        }
        if frame[0] & 0xe0 == 0xa0 || frame[0] & 0xe0 == 0xc0 {
            return self.special(frame[0], frame[1], twice);
        }
        if self.addressed(frame[0]) {
            return self.command(frame[1], armed);
        }
        None
    }

    fn addressed(&self, byte: u8) -> bool {
        match byte >> 1 {
            a @ 0x00..=0x3f => self.short_address.map(|s| s.value()) == Some(a),
            g @ 0x40..=0x4f => self.groups & (1 << (g & 0x0f)) != 0,
            0x7e => self.short_address.is_none(),
            0x7f => true,
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

    fn set_actual(&mut self, level: u8) {
        let level = level.clamp(self.min_level, self.max_level);
        self.actual_level = level;
        self.last_active_level = level;
    }

    fn direct_level(&mut self, level: u8) {
        match level {
            0 => self.actual_level = 0,
            MASK => {}
            level => self.set_actual(level),
        }
    }

    fn status(&self) -> u8 {
        let mut s = 0;
        if self.lamp_failure {
            s |= status::LAMP_FAILURE;
        }
        if self.actual_level > 0 {
            s |= status::LAMP_ON;
        }
        if self.short_address.is_none() {
            s |= status::NO_ADDRESS;
        }
        s
    }

    fn reset(&mut self) {
        // Addresses survive a reset
        self.actual_level = 0xfe;
        self.last_active_level = 0xfe;
        self.power_on_level = 0xfe;
        self.min_level = self.physical_minimum;
        self.max_level = 0xfe;
        self.fade = 0x07;
        self.groups = 0;
        self.scenes = [MASK; 16];
    }

    fn read_memory_location(&mut self) -> Option<u8> {
        let location = self.dtr0;
        self.dtr0 = self.dtr0.wrapping_add(1);
        if self.dtr1 != 0 {
            return None;
        }
        self.memory_bank0.get(location as usize).copied()
    }

    fn command(&mut self, opcode: u8, armed: Option<u8>) -> Option<u8> {
        match opcode {
            // OFF
            0x00 => {
                self.actual_level = 0;
                None
            }
            // UP, STEP_UP
            0x01 | 0x03 => {
                if self.actual_level > 0 && self.actual_level < self.max_level {
                    self.actual_level += 1;
                    self.last_active_level = self.actual_level;
                }
                None
            }
            // DOWN, STEP_DOWN: never turns the lamp off
            0x02 | 0x04 => {
                if self.actual_level > self.min_level {
                    self.actual_level -= 1;
                    self.last_active_level = self.actual_level;
                }
                None
            }
            0x05 => {
                self.set_actual(self.max_level);
                None
            }
            0x06 => {
                self.set_actual(self.min_level);
                None
            }
            0x07 => {
                if self.actual_level > self.min_level {
                    self.actual_level -= 1;
                } else {
                    self.actual_level = 0;
                }
                None
            }
            0x08 => {
                if self.actual_level == 0 {
                    self.actual_level = self.min_level;
                } else if self.actual_level < self.max_level {
                    self.actual_level += 1;
                }
                self.last_active_level = self.actual_level;
                None
            }
            0x0a => {
                self.actual_level = self.last_active_level;
                None
            }
            0x10..=0x1f => {
                let level = self.scenes[(opcode & 0x0f) as usize];
                if level != MASK {
                    self.set_actual(level);
                }
                None
            }
            0x20 => {
                self.reset();
                None
            }
            0x2a => {
                self.max_level = match self.dtr0 {
                    MASK => 0xfe,
                    level => level.max(self.min_level),
                };
                if self.actual_level > self.max_level {
                    self.actual_level = self.max_level;
                }
                None
            }
            0x2b => {
                self.min_level = self.dtr0.clamp(self.physical_minimum, self.max_level);
                if self.actual_level > 0 && self.actual_level < self.min_level {
                    self.actual_level = self.min_level;
                }
                None
            }
            0x2d => {
                self.power_on_level = self.dtr0;
                None
            }
            0x2e => {
                self.fade = (self.fade & 0x0f) | (self.dtr0.min(15) << 4);
                None
            }
            0x2f => {
                self.fade = (self.fade & 0xf0) | self.dtr0.clamp(1, 15);
                None
            }
            0x40..=0x4f => {
                self.scenes[(opcode & 0x0f) as usize] = self.dtr0;
                None
            }
            0x50..=0x5f => {
                self.scenes[(opcode & 0x0f) as usize] = MASK;
                None
            }
            0x60..=0x6f => {
                self.groups |= 1 << (opcode & 0x0f);
                None
            }
            0x70..=0x7f => {
                self.groups &= !(1 << (opcode & 0x0f));
                None
            }
            0x80 => {
                if let Some(addr) = programmed_address(self.dtr0) {
                    self.short_address = addr;
                }
                None
            }
            0x90 => Some(self.status()),
            0x91 => Some(YES),
            0x92 => self.yes(self.lamp_failure),
            0x93 => self.yes(self.actual_level > 0),
            0x96 => self.yes(self.short_address.is_none()),
            // version 2.0
            0x97 => Some(0x08),
            0x98 => Some(self.dtr0),
            0x99 => Some(self.device_type),
            0x9a => Some(self.physical_minimum),
            0x9c => Some(self.dtr1),
            0x9d => Some(self.dtr2),
            0xa0 => Some(self.actual_level),
            0xa1 => Some(self.max_level),
            0xa2 => Some(self.min_level),
            0xa3 => Some(self.power_on_level),
            0xa5 => Some(self.fade),
            0xb0..=0xbf => Some(self.scenes[(opcode & 0x0f) as usize]),
            0xc0 => Some((self.groups & 0xff) as u8),
            0xc1 => Some((self.groups >> 8) as u8),
            0xc2 => Some((self.search.random_address >> 16) as u8),
            0xc3 => Some((self.search.random_address >> 8) as u8),
            0xc4 => Some(self.search.random_address as u8),
            0xc5 => self.read_memory_location(),
            0xe0..=0xfe if armed == Some(8) && self.device_type == 8 => self.colour_command(opcode),
            _ => None,
        }
    }

    fn colour_command(&mut self, opcode: u8) -> Option<u8> {
        match opcode {
            // ACTIVATE
            0xe2 => {
                if let Some(mirek) = self.temp_colour_temperature.take() {
                    self.colour_temperature = Some(mirek);
                }
                if let Some(rgb) = self.temp_rgb.take() {
                    self.rgb = Some(rgb);
                }
                None
            }
            0xe7 => {
                self.temp_colour_temperature = Some((self.dtr1 as u16) << 8 | self.dtr0 as u16);
                None
            }
            0xeb => {
                self.temp_rgb = Some([self.dtr0, self.dtr1, self.dtr2]);
                None
            }
            0xf9 => Some(self.colour_features),
            _ => None,
        }
    }

    fn initialise_selected(&self, data: u8) -> bool {
        data == 0x00
            || (data == 0xff && self.short_address.is_none())
            || (data & 0x81 == 0x01 && self.short_address.map(|s| s.value()) == Some(data >> 1))
    }

    fn special(&mut self, op: u8, data: u8, twice: bool) -> Option<u8> {
        match op {
            0xa1 => {
                self.search.terminate();
                None
            }
            0xa3 => {
                self.dtr0 = data;
                None
            }
            0xa5 if twice => {
                if self.initialise_selected(data) {
                    self.search.initialise();
                }
                None
            }
            0xa7 if twice => {
                self.search.randomise();
                None
            }
            0xa9 => self.yes(self.search.compare()),
            0xab => {
                self.search.withdraw();
                None
            }
            0xb1 => {
                self.search.search_h(data);
                None
            }
            0xb3 => {
                self.search.search_m(data);
                None
            }
            0xb5 => {
                self.search.search_l(data);
                None
            }
            0xb7 => {
                if self.search.selected() {
                    if let Some(addr) = programmed_address(data) {
                        self.short_address = addr;
                    }
                }
                None
            }
            0xb9 => self.yes(
                self.search.init != InitState::Disabled
                    && data & 0x81 == 0x01
                    && self.short_address.map(|s| s.value()) == Some(data >> 1),
            ),
            0xbb => {
                if self.search.selected() {
                    Some(short_address_answer(self.short_address))
                } else {
                    None
                }
            }
            0xc1 => {
                self.enabled_device_type = Some(data);
                None
            }
            0xc3 => {
                self.dtr1 = data;
                None
            }
            0xc5 => {
                self.dtr2 = data;
                None
            }
            _ => None,
        }
    }
}

impl Default for SimGear {
    fn default() -> SimGear {
        SimGear::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gear::cmd_defs as cmd;
    use crate::gear::cmd_defs::Command;

    fn send<const A: bool, const T: bool>(gear: &mut SimGear, cmd: Command<A, T>) -> Option<u8> {
        gear.frame16(cmd.0, T)
    }

    #[test]
    fn programming_needs_selection() {
        let mut gear = SimGear::new();
        send(&mut gear, cmd::INITIALISE_ALL());
        gear.search.random_address = 0x123456;
        send(&mut gear, cmd::SEARCHADDRH(0x12));
        send(&mut gear, cmd::SEARCHADDRM(0x34));
        send(&mut gear, cmd::SEARCHADDRL(0x57));
        send(&mut gear, cmd::PROGRAM_SHORT_ADDRESS(Short::new(5)));
        assert_eq!(gear.short_address, None);

        send(&mut gear, cmd::SEARCHADDRL(0x56));
        send(&mut gear, cmd::PROGRAM_SHORT_ADDRESS(Short::new(5)));
        assert_eq!(gear.short_address, Some(Short::new(5)));
        assert_eq!(
            send(&mut gear, cmd::QUERY_SHORT_ADDRESS()),
            Some((5 << 1) | 1)
        );
    }

    #[test]
    fn withdraw_outlasts_initialise() {
        let mut gear = SimGear::new();
        send(&mut gear, cmd::INITIALISE_ALL());
        gear.search.random_address = 0x000001;
        assert_eq!(send(&mut gear, cmd::COMPARE()), Some(YES));
        send(&mut gear, cmd::SEARCHADDRH(0x00));
        send(&mut gear, cmd::SEARCHADDRM(0x00));
        send(&mut gear, cmd::SEARCHADDRL(0x01));
        send(&mut gear, cmd::WITHDRAW());
        assert_eq!(send(&mut gear, cmd::COMPARE()), None);

        send(&mut gear, cmd::INITIALISE_ALL());
        assert_eq!(send(&mut gear, cmd::COMPARE()), None);

        send(&mut gear, cmd::TERMINATE());
        send(&mut gear, cmd::INITIALISE_ALL());
        assert_eq!(send(&mut gear, cmd::COMPARE()), Some(YES));
    }

    #[test]
    fn initialise_selects_by_address() {
        let mut gear = SimGear::new().with_address(Short::new(3));
        send(&mut gear, cmd::INITIALISE_UNADDRESSED());
        assert_eq!(gear.search.init, InitState::Disabled);
        send(&mut gear, cmd::INITIALISE_ADDR(Short::new(4)));
        assert_eq!(gear.search.init, InitState::Disabled);
        send(&mut gear, cmd::INITIALISE_ADDR(Short::new(3)));
        assert_eq!(gear.search.init, InitState::Enabled);
    }

    #[test]
    fn colour_commands_need_enable() {
        let addr = Short::new(0);
        let mut gear = SimGear::colour(0x02).with_address(addr);
        send(&mut gear, cmd::DTR0(0xfa));
        send(&mut gear, cmd::DTR1(0x00));
        send(&mut gear, cmd::SET_TEMP_COLOUR_TEMPERATURE(addr));
        send(&mut gear, cmd::ENABLE_DEVICE_TYPE(8));
        send(&mut gear, cmd::SET_TEMP_COLOUR_TEMPERATURE(addr));
        // not armed, the activate must be ignored
        send(&mut gear, cmd::ACTIVATE(addr));
        assert_eq!(gear.colour_temperature, None);

        send(&mut gear, cmd::ENABLE_DEVICE_TYPE(8));
        send(&mut gear, cmd::ACTIVATE(addr));
        assert_eq!(gear.colour_temperature, Some(250));
    }

    #[test]
    fn memory_reads_move_dtr0() {
        let addr = Short::new(0);
        let mut gear = SimGear::new().with_address(addr).with_unit_index(2);
        send(&mut gear, cmd::DTR1(0));
        send(&mut gear, cmd::DTR0(0x1a));
        assert_eq!(send(&mut gear, cmd::READ_MEMORY_LOCATION(addr)), Some(2));
        assert_eq!(send(&mut gear, cmd::QUERY_CONTENT_DTR0(addr)), Some(0x1b));
        // past the end of the bank: no answer, DTR0 still moves
        assert_eq!(send(&mut gear, cmd::READ_MEMORY_LOCATION(addr)), None);
        assert_eq!(send(&mut gear, cmd::QUERY_CONTENT_DTR0(addr)), Some(0x1c));
    }

    #[test]
    fn levels_and_scenes() {
        let addr = Short::new(1);
        let mut gear = SimGear::new().with_address(addr);
        gear.frame16(cmd::DAPC(addr, 100).0, false);
        assert_eq!(gear.actual_level, 100);
        send(&mut gear, cmd::OFF(addr));
        assert_eq!(gear.actual_level, 0);
        send(&mut gear, cmd::ON_AND_STEP_UP(addr));
        assert!(gear.actual_level > 0);

        send(&mut gear, cmd::DTR0(42));
        send(&mut gear, cmd::SET_SCENE(addr, 3));
        assert_eq!(gear.scenes[3], 42);
        send(&mut gear, cmd::GOTO_SCENE(addr, 3));
        assert_eq!(gear.actual_level, 42);
        send(&mut gear, cmd::REMOVE_FROM_SCENE(addr, 3));
        assert_eq!(gear.scenes[3], MASK);
    }
}
