use std::{cmp::Ordering, fmt, ops::Add};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialNumber(u32);

impl SerialNumber {
    pub const ZERO: SerialNumber = SerialNumber(0);

    /// Serial of the first zone ever emitted for an origin.
    ///
    /// Some secondaries treat a serial of 0 specially, so numbering starts at 1.
    pub const FIRST: SerialNumber = SerialNumber(1);

    pub fn get(&self) -> u32 {
        self.0
    }

    /// The serial that follows this one.
    ///
    /// Wraps per RFC 1982 but never yields 0: `u32::MAX` is followed by 1.
    pub fn next(self) -> SerialNumber {
        match self + SerialNumber(1) {
            SerialNumber::ZERO => SerialNumber::FIRST,
            next => next,
        }
    }
}

impl From<u32> for SerialNumber {
    fn from(value: u32) -> Self {
        SerialNumber(value)
    }
}

impl From<SerialNumber> for u32 {
    fn from(value: SerialNumber) -> Self {
        value.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Serial Number Addition, see RFC 1982, section 3.1
///
/// The result is a wrapping add.
impl Add for SerialNumber {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.wrapping_add(rhs.0))
    }
}

/// Serial Number Comparison, see RFC 1982, section 3.2
impl PartialOrd for SerialNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        const SERIAL_BITS_HALF: u32 = 1 << (u32::BITS - 1);

        let i1 = self.0;
        let i2 = other.0;

        if i1 == i2 {
            Some(Ordering::Equal)
        } else if (i1 < i2 && (i2 - i1) < SERIAL_BITS_HALF)
            || (i1 > i2 && (i1 - i2) > SERIAL_BITS_HALF)
        {
            Some(Ordering::Less)
        } else if (i1 < i2 && (i2 - i1) > SERIAL_BITS_HALF)
            || (i1 > i2 && (i1 - i2) < SERIAL_BITS_HALF)
        {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}
