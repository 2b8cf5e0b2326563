use super::cmd_defs::AddressByte;
use core::ops::RangeInclusive;
use core::str::FromStr;

/// Addresses as shown to users, normally 1 based.
pub trait DisplayValue {
    fn display_value(&self) -> u8;
    fn from_display_value<A>(value: A) -> Result<Self, AddressError>
    where
        A: TryInto<u8>,
        Self: Sized;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressError {
    NotShort,
    NotGroup,
    InvalidAddress,
}

impl std::fmt::Display for AddressError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AddressError::NotShort => write!(fmt, "Not a short address"),
            AddressError::NotGroup => write!(fmt, "Not a group address"),
            AddressError::InvalidAddress => write!(fmt, "Invalid address"),
        }
    }
}

impl std::error::Error for AddressError {}

/// Short (individual) address, 0..=63 on the bus. Displayed 1 based.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Short(u8);

impl Short {
    const DISPLAY_RANGE: RangeInclusive<u8> = 1..=64;

    pub fn new(a: u8) -> Short {
        assert!(a < 64);
        Short(a)
    }

    /// Address as used on the bus, 0..=63
    pub fn value(&self) -> u8 {
        self.0
    }

    fn convert_display_value<A>(a: A) -> Result<u8, AddressError>
    where
        A: TryInto<u8>,
    {
        let Ok(a) = a.try_into() else {
            return Err(AddressError::InvalidAddress);
        };
        if !Self::DISPLAY_RANGE.contains(&a) {
            return Err(AddressError::InvalidAddress);
        }
        Ok(a - Self::DISPLAY_RANGE.start())
    }
}

impl DisplayValue for Short {
    fn display_value(&self) -> u8 {
        self.0 + Self::DISPLAY_RANGE.start()
    }

    fn from_display_value<A>(a: A) -> Result<Short, AddressError>
    where
        A: TryInto<u8>,
    {
        Self::convert_display_value(a).map(Short)
    }
}

impl From<Short> for AddressByte {
    fn from(short: Short) -> AddressByte {
        AddressByte((short.0 << 1) | 1)
    }
}

/// `None` encodes MASK, used when clearing a stored address.
impl From<Option<Short>> for AddressByte {
    fn from(short_or_mask: Option<Short>) -> AddressByte {
        match short_or_mask {
            Some(addr) => AddressByte::from(addr),
            None => AddressByte(0xff),
        }
    }
}

impl std::fmt::Display for Short {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.display_value().fmt(fmt)
    }
}

impl FromStr for Short {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u8::from_str(s).map_or(Err(AddressError::InvalidAddress), |a| {
            Self::from_display_value(a)
        })
    }
}

impl<const MAX_GROUP: u8> TryFrom<AddressImpl<MAX_GROUP>> for Short {
    type Error = AddressError;
    fn try_from(addr: AddressImpl<MAX_GROUP>) -> Result<Short, Self::Error> {
        if let AddressImpl::Short(s) = addr {
            Ok(s)
        } else {
            Err(AddressError::NotShort)
        }
    }
}

/// Random (search) address, 24 bits used.
pub type Long = u32;

/// Group address. The group count differs between device families,
/// use the aliases in the family modules.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GroupImpl<const MAX: u8>(u8);

impl<const MAX: u8> GroupImpl<MAX> {
    const DISPLAY_RANGE: RangeInclusive<u8> = 1..=MAX;

    pub fn new(a: u8) -> GroupImpl<MAX> {
        assert!(a < MAX);
        GroupImpl(a)
    }

    /// Group number as used in command opcodes, 0 based.
    pub fn value(&self) -> u8 {
        self.0
    }

    fn convert_display_value<A>(a: A) -> Result<u8, AddressError>
    where
        A: TryInto<u8>,
    {
        let Ok(a) = a.try_into() else {
            return Err(AddressError::InvalidAddress);
        };
        if !Self::DISPLAY_RANGE.contains(&a) {
            return Err(AddressError::InvalidAddress);
        }
        Ok(a - Self::DISPLAY_RANGE.start())
    }
}

impl<const MAX: u8> DisplayValue for GroupImpl<MAX> {
    fn display_value(&self) -> u8 {
        self.0 + Self::DISPLAY_RANGE.start()
    }

    fn from_display_value<A>(a: A) -> Result<GroupImpl<MAX>, AddressError>
    where
        A: TryInto<u8>,
    {
        Self::convert_display_value(a).map(GroupImpl)
    }
}

impl<const MAX: u8> From<GroupImpl<MAX>> for AddressByte {
    fn from(group: GroupImpl<MAX>) -> AddressByte {
        AddressByte((group.0 << 1) | 0x81)
    }
}

impl<const MAX: u8> std::fmt::Display for GroupImpl<MAX> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(fmt)
    }
}

impl<const MAX: u8> FromStr for GroupImpl<MAX> {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u8::from_str(s).map_or(Err(AddressError::InvalidAddress), |a| {
            Self::from_display_value(a)
        })
    }
}

impl<const MAX_GROUP: u8> TryFrom<AddressImpl<MAX_GROUP>> for GroupImpl<MAX_GROUP> {
    type Error = AddressError;
    fn try_from(addr: AddressImpl<MAX_GROUP>) -> Result<GroupImpl<MAX_GROUP>, Self::Error> {
        if let AddressImpl::Group(g) = addr {
            Ok(g)
        } else {
            Err(AddressError::NotGroup)
        }
    }
}

/// Any destination a forward frame can be sent to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressImpl<const MAX_GROUP: u8> {
    Short(Short),
    Group(GroupImpl<MAX_GROUP>),
    Broadcast,
    BroadcastUnaddressed,
}

impl<const MAX_GROUP: u8> AddressImpl<MAX_GROUP> {
    /// Parse the first byte of a forward frame. The command/level bit
    /// is ignored.
    pub fn from_bus_address(bus: u8) -> Result<AddressImpl<MAX_GROUP>, AddressError> {
        match bus >> 1 {
            a @ 0x00..=0x3f => Ok(AddressImpl::Short(Short::new(a))),
            g @ 0x40..=0x5f if (g & 0x1f) < MAX_GROUP => {
                Ok(AddressImpl::Group(GroupImpl::new(g & 0x1f)))
            }
            0x7e => Ok(AddressImpl::BroadcastUnaddressed),
            0x7f => Ok(AddressImpl::Broadcast),
            _ => Err(AddressError::InvalidAddress),
        }
    }

    /// Parse the single byte logical form: 0x00..=0x3f for short
    /// addresses, 0x80 | group for groups, 0xff for broadcast.
    pub fn from_logical(logical: u8) -> Result<AddressImpl<MAX_GROUP>, AddressError> {
        match logical {
            a @ 0x00..=0x3f => Ok(AddressImpl::Short(Short::new(a))),
            0xff => Ok(AddressImpl::Broadcast),
            g if g & 0x80 != 0 && (g & 0x7f) < MAX_GROUP => {
                Ok(AddressImpl::Group(GroupImpl::new(g & 0x7f)))
            }
            _ => Err(AddressError::InvalidAddress),
        }
    }

    /// The single byte logical form of this address.
    pub fn logical_address(&self) -> u8 {
        match self {
            AddressImpl::Short(s) => s.value(),
            AddressImpl::Group(g) => 0x80 | g.value(),
            AddressImpl::Broadcast => 0xff,
            AddressImpl::BroadcastUnaddressed => 0xfd,
        }
    }
}

impl<const MAX_GROUP: u8> From<Short> for AddressImpl<MAX_GROUP> {
    fn from(a: Short) -> Self {
        AddressImpl::Short(a)
    }
}

impl<const MAX_GROUP: u8> From<GroupImpl<MAX_GROUP>> for AddressImpl<MAX_GROUP> {
    fn from(a: GroupImpl<MAX_GROUP>) -> Self {
        AddressImpl::Group(a)
    }
}

impl<const MAX_GROUP: u8> PartialEq<Short> for AddressImpl<MAX_GROUP> {
    fn eq(&self, other: &Short) -> bool {
        matches!(self, AddressImpl::Short(a) if a == other)
    }
}

impl<const MAX_GROUP: u8> PartialEq<GroupImpl<MAX_GROUP>> for AddressImpl<MAX_GROUP> {
    fn eq(&self, other: &GroupImpl<MAX_GROUP>) -> bool {
        matches!(self, AddressImpl::Group(a) if a == other)
    }
}

impl<const MAX_GROUP: u8> From<AddressImpl<MAX_GROUP>> for AddressByte {
    fn from(addr: AddressImpl<MAX_GROUP>) -> AddressByte {
        match addr {
            AddressImpl::Short(a) => a.into(),
            AddressImpl::Group(a) => a.into(),
            AddressImpl::Broadcast => AddressByte(0xff),
            AddressImpl::BroadcastUnaddressed => AddressByte(0xfd),
        }
    }
}

impl<const MAX_GROUP: u8> std::fmt::Display for AddressImpl<MAX_GROUP> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AddressImpl::Short(a) => write!(fmt, "{}", a),
            AddressImpl::Group(g) => write!(fmt, "G{}", g.display_value()),
            AddressImpl::Broadcast => write!(fmt, "Broadcast"),
            AddressImpl::BroadcastUnaddressed => write!(fmt, "Broadcast unaddressed"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    type Address = AddressImpl<16>;
    type Group = GroupImpl<16>;

    #[test]
    fn short_conversions() {
        let s = Short::new(5);
        assert_eq!(s.display_value(), 6);
        assert_eq!(AddressByte::from(s).0, 0x0b);
        assert_eq!(AddressByte::from(s).direct().0, 0x0a);
        assert_eq!(Short::from_display_value(64).unwrap(), Short::new(63));
        assert!(Short::from_display_value(0).is_err());
        assert!(Short::from_display_value(65).is_err());
        assert_eq!("6".parse::<Short>().unwrap(), Short::new(5));
    }

    #[test]
    fn group_conversions() {
        let g = Group::new(3);
        assert_eq!(AddressByte::from(g).0, 0x87);
        assert_eq!(Address::from(g).logical_address(), 0x83);
        assert_eq!(Address::from_logical(0x83).unwrap(), Address::Group(g));
        assert!(Group::from_display_value(17).is_err());
    }

    #[test]
    fn bus_addresses() {
        assert_eq!(
            Address::from_bus_address(0x0b).unwrap(),
            Address::Short(Short::new(5))
        );
        assert_eq!(
            Address::from_bus_address(0x87).unwrap(),
            Address::Group(Group::new(3))
        );
        assert_eq!(Address::from_bus_address(0xff).unwrap(), Address::Broadcast);
        assert_eq!(
            Address::from_bus_address(0xfd).unwrap(),
            Address::BroadcastUnaddressed
        );
        assert!(Address::from_bus_address(0xb1).is_err());
    }

    #[test]
    fn broadcast_bytes() {
        assert_eq!(AddressByte::from(Address::Broadcast).0, 0xff);
        assert_eq!(AddressByte::from(Address::Broadcast).direct().0, 0xfe);
        assert_eq!(Address::Broadcast.logical_address(), 0xff);
        assert_eq!(Address::from_logical(0xff).unwrap(), Address::Broadcast);
    }
}
