use crate::common::address::{Long, Short};
use crate::common::defs::MASK;
use rand::Rng;

/// Initialisation state of a simulated device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InitState {
    /// Outside the initialisation period, search commands are ignored.
    Disabled,
    /// Taking part in compares.
    Enabled,
    /// Isolated and removed from further compares. Only TERMINATE
    /// clears this state, a new INITIALISE does not.
    Withdrawn,
}

/// Address search logic shared by control gear and input devices. The
/// frame encodings differ between the families but the state machine
/// does not.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub init: InitState,
    pub random_address: Long,
    pub search_address: Long,
}

impl SearchState {
    pub fn new() -> SearchState {
        SearchState {
            init: InitState::Disabled,
            random_address: 0xffffff,
            search_address: 0xffffff,
        }
    }

    /// INITIALISE addressed to this device.
    pub fn initialise(&mut self) {
        if self.init == InitState::Disabled {
            self.init = InitState::Enabled;
        }
    }

    pub fn terminate(&mut self) {
        self.init = InitState::Disabled;
    }

    pub fn randomise(&mut self) {
        if self.init != InitState::Disabled {
            self.random_address = rand::thread_rng().gen_range(0..0x0100_0000);
        }
    }

    pub fn search_h(&mut self, h: u8) {
        if self.init != InitState::Disabled {
            self.search_address = (self.search_address & 0x00ffff) | ((h as Long) << 16);
        }
    }

    pub fn search_m(&mut self, m: u8) {
        if self.init != InitState::Disabled {
            self.search_address = (self.search_address & 0xff00ff) | ((m as Long) << 8);
        }
    }

    pub fn search_l(&mut self, l: u8) {
        if self.init != InitState::Disabled {
            self.search_address = (self.search_address & 0xffff00) | l as Long;
        }
    }

    /// True if the device answers COMPARE.
    pub fn compare(&self) -> bool {
        self.init == InitState::Enabled && self.random_address <= self.search_address
    }

    /// True if the search address singles out this device.
    pub fn selected(&self) -> bool {
        self.init != InitState::Disabled && self.search_address == self.random_address
    }

    pub fn withdraw(&mut self) {
        if self.init == InitState::Enabled && self.search_address == self.random_address {
            self.init = InitState::Withdrawn;
        }
    }
}

/// Decode the data byte of PROGRAM SHORT ADDRESS and SET SHORT
/// ADDRESS. The outer `None` marks a malformed byte that must be
/// ignored, `Some(None)` clears the stored address.
pub fn programmed_address(data: u8) -> Option<Option<Short>> {
    if data & 0x81 == 0x01 {
        Some(Some(Short::new(data >> 1)))
    } else if data == MASK {
        Some(None)
    } else {
        None
    }
}

/// Answer byte for QUERY SHORT ADDRESS.
pub fn short_address_answer(short: Option<Short>) -> u8 {
    match short {
        Some(addr) => (addr.value() << 1) | 0x01,
        None => MASK,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn withdraw_only_when_selected() {
        let mut search = SearchState::new();
        search.initialise();
        search.random_address = 0x123456;
        search.search_h(0x12);
        search.search_m(0x34);
        search.search_l(0x57);
        search.withdraw();
        assert_eq!(search.init, InitState::Enabled);
        search.search_l(0x56);
        search.withdraw();
        assert_eq!(search.init, InitState::Withdrawn);
    }

    #[test]
    fn withdrawn_survives_initialise() {
        let mut search = SearchState::new();
        search.initialise();
        search.withdraw();
        assert_eq!(search.init, InitState::Withdrawn);
        search.initialise();
        assert_eq!(search.init, InitState::Withdrawn);
        assert!(!search.compare());
        search.terminate();
        search.initialise();
        assert_eq!(search.init, InitState::Enabled);
    }

    #[test]
    fn programmed_addresses() {
        assert_eq!(programmed_address(0x0b), Some(Some(Short::new(5))));
        assert_eq!(programmed_address(0xff), Some(None));
        assert_eq!(programmed_address(0x0a), None);
        assert_eq!(programmed_address(0x81), None);
    }
}
