//! Virtual simulation time.
//!
//! This module defines the strong time type shared by the scheduler, initiators and targets.
//! It provides the following:
//! 1. **Resolution:** Time is counted in picoseconds so nanosecond latencies stay exact.
//! 2. **Arithmetic:** Checked and saturating helpers plus `Add`/`Sub` operators.
//! 3. **Display:** Human-readable formatting with the largest unit that divides the value.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::Serialize;

const PS_PER_NS: u64 = 1_000;
const PS_PER_US: u64 = 1_000_000;
const PS_PER_MS: u64 = 1_000_000_000;

/// A point in, or a span of, virtual simulation time.
///
/// Stored as an unsigned picosecond count; negative durations cannot be represented.
/// Serializes as the raw picosecond count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero (also the empty duration).
    pub const ZERO: Self = Self(0);

    /// Largest representable time.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a time value from picoseconds.
    #[inline(always)]
    pub const fn from_ps(ps: u64) -> Self {
        Self(ps)
    }

    /// Creates a time value from nanoseconds, saturating on overflow.
    #[inline(always)]
    pub const fn from_ns(ns: u64) -> Self {
        Self(ns.saturating_mul(PS_PER_NS))
    }

    /// Creates a time value from microseconds, saturating on overflow.
    #[inline(always)]
    pub const fn from_us(us: u64) -> Self {
        Self(us.saturating_mul(PS_PER_US))
    }

    /// Returns the raw picosecond count.
    #[inline(always)]
    pub const fn as_ps(self) -> u64 {
        self.0
    }

    /// Returns the value in nanoseconds as a float (for reporting only).
    pub fn as_ns_f64(self) -> f64 {
        self.0 as f64 / PS_PER_NS as f64
    }

    /// Returns `true` for the zero duration.
    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Adds two times, returning `None` on overflow.
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Adds two times, clamping at [`SimTime::MAX`].
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Subtracts `rhs`, clamping at zero.
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Add for SimTime {
    type Output = Self;

    /// Saturating addition; the virtual clock never wraps.
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl Sub for SimTime {
    type Output = Self;

    /// Saturating subtraction; durations are never negative.
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ps = self.0;
        if ps == 0 {
            write!(f, "0 s")
        } else if ps % PS_PER_MS == 0 {
            write!(f, "{} ms", ps / PS_PER_MS)
        } else if ps % PS_PER_US == 0 {
            write!(f, "{} us", ps / PS_PER_US)
        } else if ps % PS_PER_NS == 0 {
            write!(f, "{} ns", ps / PS_PER_NS)
        } else {
            write!(f, "{ps} ps")
        }
    }
}
