use crate::common::address::Short;
use std::error::Error;
use std::fmt;

// Addresses handed out by next_free. Address 63 may exist on the bus
// but is never allocated, so one slot stays free for manual use.
const ASSIGNABLE: u8 = 63;

#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateAddress(pub Short);

impl fmt::Display for DuplicateAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Short address {} already in use", self.0)
    }
}

impl Error for DuplicateAddress {}

/// Tracks which short addresses are in use during a commissioning run.
/// Addresses are only ever added; a new run starts from a fresh pool.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressPool(u64);

impl AddressPool {
    pub fn new() -> AddressPool {
        AddressPool(0)
    }

    pub fn mark_assigned(&mut self, addr: Short) -> Result<(), DuplicateAddress> {
        let bit = 1u64 << addr.value();
        if self.0 & bit != 0 {
            return Err(DuplicateAddress(addr));
        }
        self.0 |= bit;
        Ok(())
    }

    pub fn is_assigned(&self, addr: Short) -> bool {
        self.0 & (1u64 << addr.value()) != 0
    }

    /// Lowest address not yet assigned, or `None` when all allocatable
    /// slots are taken.
    pub fn next_free(&self) -> Option<Short> {
        (0..ASSIGNABLE)
            .find(|b| self.0 & (1u64 << b) == 0)
            .map(Short::new)
    }

    /// Take the lowest free address out of the pool.
    pub fn allocate(&mut self) -> Option<Short> {
        let addr = self.next_free()?;
        self.0 |= 1u64 << addr.value();
        Some(addr)
    }

    /// Mark every address below `limit` as in use.
    pub fn seed_below(&mut self, limit: u8) {
        if limit >= 64 {
            self.0 = u64::MAX;
        } else {
            self.0 |= (1u64 << limit) - 1;
        }
    }

    /// Mark `addr` and every address below it as in use.
    pub fn seed_through(&mut self, addr: Short) {
        self.seed_below(addr.value() + 1);
    }

    pub fn count(&self) -> u8 {
        self.0.count_ones() as u8
    }
}

#[cfg(test)]
mod test {
    use super::AddressPool;
    use crate::common::address::Short;

    #[test]
    fn sequential_allocation() {
        let mut pool = AddressPool::new();
        for a in 0..63 {
            let next = pool.next_free().unwrap();
            assert_eq!(next, Short::new(a));
            pool.mark_assigned(next).unwrap();
        }
        assert_eq!(pool.next_free(), None);
        assert_eq!(pool.count(), 63);
        assert!(!pool.is_assigned(Short::new(63)));
    }

    #[test]
    fn duplicates_rejected() {
        let mut pool = AddressPool::new();
        pool.mark_assigned(Short::new(5)).unwrap();
        assert!(pool.mark_assigned(Short::new(5)).is_err());
        assert!(pool.is_assigned(Short::new(5)));
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn allocation_skips_marked() {
        let mut pool = AddressPool::new();
        pool.mark_assigned(Short::new(0)).unwrap();
        pool.mark_assigned(Short::new(2)).unwrap();
        assert_eq!(pool.next_free(), Some(Short::new(1)));
        pool.mark_assigned(Short::new(1)).unwrap();
        assert_eq!(pool.next_free(), Some(Short::new(3)));
    }

    #[test]
    fn allocate_takes_lowest() {
        let mut pool = AddressPool::new();
        assert_eq!(pool.allocate(), Some(Short::new(0)));
        assert_eq!(pool.allocate(), Some(Short::new(1)));
        pool.seed_below(62);
        assert_eq!(pool.allocate(), Some(Short::new(62)));
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn seeding() {
        let mut pool = AddressPool::new();
        pool.seed_below(5);
        assert_eq!(pool.count(), 5);
        assert_eq!(pool.next_free(), Some(Short::new(5)));

        let mut pool = AddressPool::new();
        pool.seed_through(Short::new(9));
        assert!(pool.is_assigned(Short::new(9)));
        assert!(!pool.is_assigned(Short::new(10)));
        assert_eq!(pool.next_free(), Some(Short::new(10)));
    }
}
