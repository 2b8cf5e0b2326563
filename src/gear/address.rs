use crate::common::address::{AddressImpl, GroupImpl};

pub use crate::common::address::Short;

/// Control gear have 16 groups.
pub type Group = GroupImpl<16>;
pub type Address = AddressImpl<16>;

#[cfg(test)]
mod test {
    use super::{Address, Group, Short};
    use crate::common::address::DisplayValue;
    use crate::common::cmd_defs::AddressByte;

    #[test]
    fn short_addresses() {
        let a = Short::new(1);
        let b = Address::from(a);
        assert_eq!(b, Short::new(1));
        assert_eq!(b, Address::from_bus_address(0x02).unwrap());

        let b = Address::from(Short::new(63));
        assert_eq!(b, Address::from_bus_address(0x3f << 1).unwrap());
        assert_eq!(Short::try_from(b).unwrap(), Short::new(63));
    }

    #[test]
    fn group_addresses() {
        let b = Address::from(Group::new(0));
        assert_eq!(b, Group::new(0));
        assert_eq!(b, Address::from_bus_address(0x80).unwrap());
        assert_eq!(AddressByte::from(b).0, 0x81);

        let a = Group::from_display_value(16).unwrap();
        let b = Address::from(a);
        assert_eq!(b, Group::new(15));
        assert_eq!(b, Address::from_bus_address(0x9e).unwrap());
        assert_eq!(Group::try_from(b).unwrap(), Group::new(15));

        // Group 16 and up only exists for control devices
        assert!(Address::from_bus_address(0xa1).is_err());
    }
}
