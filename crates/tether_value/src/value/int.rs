//! Script integer.
//!
//! Backed by `i128` so that every host integer kind, signed or unsigned, up
//! to 64 bits fits without loss in either direction.

use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Int(i128);

impl Int {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(value: i128) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn raw(self) -> i128 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn to_i64(self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }

    pub fn to_u64(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// Nearest `f64`; lossy above 2^53 in magnitude.
    #[allow(clippy::cast_precision_loss, reason = "documented lossy widening")]
    pub fn to_f64(self) -> f64 {
        self.0 as f64
    }
}

macro_rules! impl_from_native_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Int {
                #[inline]
                fn from(value: $t) -> Self {
                    Int(i128::from(value))
                }
            }
        )*
    };
}

impl_from_native_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl From<isize> for Int {
    fn from(value: isize) -> Self {
        // isize is at most 64 bits on every supported target
        Int(value as i128)
    }
}

impl From<usize> for Int {
    fn from(value: usize) -> Self {
        Int(value as i128)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
