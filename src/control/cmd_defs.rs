use crate::common::cmd_defs::AddressByte;

/// A 24 bit forward frame for control devices. `ANSWER` marks
/// queries, `TWICE` marks configuration commands that only take
/// effect when sent twice.
pub struct Command<const ANSWER: bool, const TWICE: bool>(pub [u8; 3]);

/// Instance byte addressing the device itself rather than one of its
/// instances.
const DEVICE: u8 = 0xfe;

macro_rules! cmd_type {
    () => {Command<false,false>};
    (Answer) => {Command<true,false>};
    (Twice) => {Command<false,true>};
}

macro_rules! dev_cmd_def {
    ($sym: ident, $opcode: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub fn $sym<A>(addr: A) -> cmd_type!($($attr)?)
        where
            A: Into<AddressByte>,
        {
            Command([addr.into().0, DEVICE, $opcode])
        }
    };
}

macro_rules! inst_cmd_def {
    ($sym: ident, $opcode: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub fn $sym<A>(addr: A, instance: u8) -> cmd_type!($($attr)?)
        where
            A: Into<AddressByte>,
        {
            Command([addr.into().0, instance, $opcode])
        }
    };
}

macro_rules! special_cmd_def {
    ($sym: ident, $selector: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub const fn $sym() -> cmd_type!($($attr)?) {
            Command([0xc1, $selector, 0x00])
        }
    };
}

macro_rules! special_data_cmd_def {
    ($sym: ident, $selector: expr $(,$attr: ident)?) => {
        #[allow(non_snake_case)]
        #[inline(always)]
        pub const fn $sym(data: u8) -> cmd_type!($($attr)?) {
            Command([0xc1, $selector, data])
        }
    };
}

dev_cmd_def!(QUERY_DEVICE_STATUS, 0x30, Answer);
dev_cmd_def!(QUERY_MISSING_SHORT_ADDRESS, 0x33, Answer);
dev_cmd_def!(QUERY_NUMBER_OF_INSTANCES, 0x35, Answer);

inst_cmd_def!(ENABLE_INSTANCE, 0x62, Twice);
inst_cmd_def!(DISABLE_INSTANCE, 0x63, Twice);
inst_cmd_def!(SET_EVENT_SCHEME, 0x67, Twice);
inst_cmd_def!(SET_EVENT_FILTER, 0x68, Twice);

inst_cmd_def!(QUERY_INSTANCE_TYPE, 0x80, Answer);
inst_cmd_def!(QUERY_RESOLUTION, 0x81, Answer);
inst_cmd_def!(QUERY_INSTANCE_ENABLED, 0x86, Answer);
inst_cmd_def!(QUERY_EVENT_SCHEME, 0x8b, Answer);
inst_cmd_def!(QUERY_INPUT_VALUE, 0x8c, Answer);
inst_cmd_def!(QUERY_INPUT_VALUE_LATCH, 0x8d, Answer);

special_cmd_def!(TERMINATE, 0x00);

/// INITIALISE targeting a single short address.
#[allow(non_snake_case)]
#[inline(always)]
pub fn INITIALISE_ADDR<A>(addr: A) -> Command<false, true>
where
    A: Into<AddressByte>,
{
    Command([0xc1, 0x01, addr.into().0])
}

#[allow(non_snake_case)]
#[inline(always)]
pub const fn INITIALISE_ALL() -> Command<false, true> {
    Command([0xc1, 0x01, 0xff])
}

#[allow(non_snake_case)]
#[inline(always)]
pub const fn INITIALISE_UNADDRESSED() -> Command<false, true> {
    Command([0xc1, 0x01, 0x7f])
}

special_cmd_def!(RANDOMISE, 0x02, Twice);
special_cmd_def!(COMPARE, 0x03, Answer);
special_cmd_def!(WITHDRAW, 0x04);

special_data_cmd_def!(SEARCHADDRH, 0x05);
special_data_cmd_def!(SEARCHADDRM, 0x06);
special_data_cmd_def!(SEARCHADDRL, 0x07);

/// Store a short address in the device selected by the search address.
#[allow(non_snake_case)]
#[inline(always)]
pub fn PROGRAM_SHORT_ADDRESS<A>(addr: A) -> Command<false, true>
where
    A: Into<AddressByte>,
{
    Command([0xc1, 0x08, addr.into().0])
}

#[allow(non_snake_case)]
#[inline(always)]
pub fn VERIFY_SHORT_ADDRESS<A>(addr: A) -> Command<true, false>
where
    A: Into<AddressByte>,
{
    Command([0xc1, 0x09, addr.into().0])
}

special_cmd_def!(QUERY_SHORT_ADDRESS, 0x0a, Answer);

special_data_cmd_def!(DTR0, 0x30);
special_data_cmd_def!(DTR1, 0x31);
special_data_cmd_def!(DTR2, 0x32);
