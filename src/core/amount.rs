//! 6-Decimal Fixed-Point Money
//!
//! Every balance, stake, pool and payout is an [`Amount`]: an unsigned count
//! of micro-units (1 unit = 1_000_000 micro-units, matching a 6-decimal
//! stablecoin). All arithmetic is integer-only.
//!
//! ## Splits
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  amount × bps / 10_000        (floor, u128 intermediate)    │
//! │  amount × part / whole        (floor, u128 intermediate)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Floors never overshoot, so callers that need exact conservation hand the
//! remainder to a deterministic recipient.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Number of decimal places (6).
pub const AMOUNT_DECIMALS: u32 = 6;

/// Micro-units per whole unit (1_000_000).
pub const MICROS_PER_UNIT: u64 = 1_000_000;

/// Basis-point denominator (100% = 10_000 bps).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Unsigned 6-decimal fixed-point amount.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Create from raw micro-units.
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create from whole units (5 → 5.000000).
    ///
    /// Saturates instead of overflowing.
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        Self(units.saturating_mul(MICROS_PER_UNIT))
    }

    /// Raw micro-units.
    #[inline]
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// True if zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    #[inline]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction.
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Saturating subtraction.
    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Portion of this amount expressed in basis points (floor).
    #[inline]
    pub fn bps(self, bps: u16) -> Self {
        self.mul_div(bps as u64, BPS_DENOMINATOR)
    }

    /// `self * part / whole`, floored. Returns zero when `whole` is zero.
    ///
    /// The result never exceeds `self` when `part <= whole`.
    #[inline]
    pub fn mul_div(self, part: u64, whole: u64) -> Self {
        if whole == 0 {
            return Self::ZERO;
        }
        let wide = (self.0 as u128) * (part as u128) / (whole as u128);
        Self(wide as u64)
    }

    /// Sum an iterator of amounts, `None` on overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(iter: I) -> Option<Self> {
        iter.into_iter().try_fold(Self::ZERO, |acc, a| acc.checked_add(a))
    }
}

impl Add for Amount {
    type Output = Self;

    /// Saturating; use [`Amount::checked_add`] where overflow must be reported.
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / MICROS_PER_UNIT, self.0 % MICROS_PER_UNIT)
    }
}

// =============================================================================
// TESTS
// =============================================================================
