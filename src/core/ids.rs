//! Identifiers and Value Types
//!
//! Small copyable types shared by every component: participant addresses,
//! round and request identifiers, picks, nonces and provider randomness.
//! All implement `Ord` so they can key `BTreeMap`s with deterministic
//! iteration order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Absolute time in seconds, supplied by the caller's environment.
pub type Timestamp = u64;

/// Position of a commitment within one player's per-round commitment list.
pub type CommitIndex = usize;

/// Largest valid pick (inclusive).
pub const PICK_MAX: u16 = 999;

/// Number of distinct picks / winning numbers (0..=999).
pub const PICK_RANGE: u16 = PICK_MAX + 1;

// =============================================================================
// ADDRESS
// =============================================================================

/// 20-byte account identity (players, treasury, provider, engine custody).
///
/// Serializes as a `0x`-prefixed hex string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0; 20]);

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Address whose every byte is `byte`. Handy for fixtures.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Short form for log fields (first four bytes).
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

/// Failure parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Wrong number of bytes.
    #[error("expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(bytes.len()))?;
        Ok(Self(arr))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

// =============================================================================
// ROUND / REQUEST IDS
// =============================================================================

/// Sequential round identifier, starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoundId(pub u64);

impl RoundId {
    /// The first round ever created.
    pub const FIRST: Self = Self(1);

    /// Next id in sequence.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier returned by the randomness provider for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

// =============================================================================
// PICKS
// =============================================================================

/// A player's number, validated to lie in `[0, 999]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Pick(u16);

impl Pick {
    /// Validate a raw value. `None` for anything above 999.
    pub fn new(value: u16) -> Option<Self> {
        (value <= PICK_MAX).then_some(Self(value))
    }

    /// Raw value.
    #[inline]
    pub fn value(self) -> u16 {
        self.0
    }

    /// Last two decimal digits.
    #[inline]
    pub fn last_two(self) -> u16 {
        self.0 % 100
    }

    /// Last decimal digit.
    #[inline]
    pub fn last_digit(self) -> u16 {
        self.0 % 10
    }
}

impl TryFrom<u16> for Pick {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(value)
    }
}

impl From<Pick> for u16 {
    fn from(pick: Pick) -> Self {
        pick.0
    }
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// The drawn number. Same domain as [`Pick`].
pub type WinningNumber = Pick;

// =============================================================================
// NONCE / RANDOM WORD
// =============================================================================

/// 256-bit big-endian secret mixed into a commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Nonce(pub [u8; 32]);

impl Nonce {
    /// Create from raw big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<u64> for Nonce {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl From<u128> for Nonce {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

/// 256-bit big-endian value delivered by the randomness provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RandomWord(pub [u8; 32]);

impl RandomWord {
    /// Create from raw big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Exact `self mod modulus` over all 256 bits.
    pub fn modulo(&self, modulus: u16) -> u16 {
        if modulus == 0 {
            return 0;
        }
        let m = modulus as u32;
        self.0
            .iter()
            .fold(0u32, |acc, &byte| (acc * 256 + byte as u32) % m) as u16
    }

    /// Winning number derived from this word (`word mod 1000`).
    pub fn winning_number(&self) -> WinningNumber {
        Pick(self.modulo(PICK_RANGE))
    }
}

impl From<u64> for RandomWord {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

// =============================================================================
// TESTS
// =============================================================================
