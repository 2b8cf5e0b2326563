const PRIORITY_MASK: u16 = 0x07;
const PRIORITY_SHIFT: u32 = u16::trailing_zeros(PRIORITY_MASK);

const SEND_TWICE_BIT: u16 = 0x08;
const EXPECT_ANSWER_BIT: u16 = 0x10;

pub const PRIORITY_1: Flags = Priority(1);
pub const PRIORITY_2: Flags = Priority(2);
pub const PRIORITY_3: Flags = Priority(3);
pub const PRIORITY_4: Flags = Priority(4);
pub const PRIORITY_5: Flags = Priority(5);
/// Request an answer to the frame
pub const EXPECT_ANSWER: Flags = ExpectAnswer(true);
/// Send the frame twice, as required for configuration commands
pub const SEND_TWICE: Flags = SendTwice(true);
pub const NO_FLAG: Flags = Combined(0);
pub const PRIORITY_DEFAULT: Flags = PRIORITY_5;

/// Options for a single send transaction. Combine with `|`, where the
/// right hand side replaces any overlapping option on the left.
#[derive(Debug, Clone)]
pub enum Flags {
    Empty,
    Priority(u16),
    SendTwice(bool),
    ExpectAnswer(bool),
    Combined(u16),
}

use Flags::*;

impl Flags {
    const fn bits(&self) -> u16 {
        match *self {
            Empty => 0,
            Priority(p) => (p & PRIORITY_MASK) << PRIORITY_SHIFT,
            SendTwice(true) => SEND_TWICE_BIT,
            SendTwice(false) => 0,
            ExpectAnswer(true) => EXPECT_ANSWER_BIT,
            ExpectAnswer(false) => 0,
            Combined(b) => b,
        }
    }

    pub const fn send_twice(&self) -> bool {
        (self.bits() & SEND_TWICE_BIT) != 0
    }

    pub const fn expect_answer(&self) -> bool {
        (self.bits() & EXPECT_ANSWER_BIT) != 0
    }

    /// Transaction priority 1..=5, where 1 is the highest.
    pub const fn priority(&self) -> u16 {
        let p = (self.bits() & PRIORITY_MASK) >> PRIORITY_SHIFT;
        if 1 <= p && p <= 5 {
            p
        } else {
            5
        }
    }
}

impl std::ops::BitOr<Flags> for Flags {
    type Output = Self;
    fn bitor(self, other: Flags) -> Self::Output {
        let b = self.bits();
        let masked = match other {
            Empty => b,
            Priority(_) => b & !PRIORITY_MASK,
            SendTwice(_) => b & !SEND_TWICE_BIT,
            ExpectAnswer(_) => b & !EXPECT_ANSWER_BIT,
            Combined(_) => b,
        };
        Combined(masked | other.bits())
    }
}

impl std::ops::BitOrAssign<Flags> for Flags {
    fn bitor_assign(&mut self, other: Flags) {
        *self = self.clone() | other;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn combine() {
        let f = NO_FLAG | SEND_TWICE | EXPECT_ANSWER;
        assert!(f.send_twice());
        assert!(f.expect_answer());
        assert_eq!(f.priority(), 5);

        let f = PRIORITY_2 | SendTwice(false);
        assert_eq!(f.priority(), 2);
        assert!(!f.send_twice());
    }

    #[test]
    fn replace_priority() {
        let f = PRIORITY_1 | PRIORITY_3;
        assert_eq!(f.priority(), 3);
        let mut f = PRIORITY_4;
        f |= PRIORITY_2 | EXPECT_ANSWER;
        assert_eq!(f.priority(), 2);
        assert!(f.expect_answer());
        assert!(!f.send_twice());
    }
}
