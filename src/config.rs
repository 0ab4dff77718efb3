//! Engine Configuration
//!
//! Stake size, fee and pool splits, the identities the engine acts as and
//! pays to, and the policy for prize tiers nobody won. Values come from
//! [`Default`], from `LOTTO_*` environment variables, or from JSON.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::amount::{Amount, BPS_DENOMINATOR};
use crate::core::ids::Address;

/// Default stake per commitment: 5.000000 units.
pub const DEFAULT_STAKE: Amount = Amount::from_units(5);

/// Default protocol fee: 10%.
pub const DEFAULT_FEE_BPS: u16 = 1_000;

/// Default pool split (tier 1, tier 2, tier 3): 70% / 15% / 5%.
pub const DEFAULT_POOL_BPS: [u16; 3] = [7_000, 1_500, 500];

/// Reveal deadline offset for rounds created without an explicit reveal time.
pub const DEFAULT_LEGACY_REVEAL_OFFSET_SECS: u64 = 4 * 60 * 60;

/// What happens to a tier-2 or tier-3 pool when nobody lands in that tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTierPolicy {
    /// Sent to the treasury together with the fee.
    #[default]
    Treasury,
    /// Rolled into the same tier of the next created round.
    CarryForward,
}

impl FromStr for EmptyTierPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "treasury" => Ok(Self::Treasury),
            "carry_forward" | "carry-forward" | "carryforward" => Ok(Self::CarryForward),
            other => Err(ConfigError::Invalid {
                key: "LOTTO_EMPTY_TIER_POLICY",
                value: other.to_string(),
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("invalid value for {key}: {value}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Raw value.
        value: String,
    },

    /// Fee plus pools do not cover exactly 100%.
    #[error("fee and pool bps sum to {0}, expected 10000")]
    BpsSum(u64),

    /// Stake of zero.
    #[error("stake must be non-zero")]
    ZeroStake,

    /// JSON decoding failed.
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LottoConfig {
    /// Custody address the engine holds stakes under.
    pub engine_address: Address,
    /// Chain / deployment id bound into reveal authorizations.
    pub chain_id: u64,
    /// Identity allowed to configure the randomness provider.
    pub admin: Address,
    /// Recipient of fees and unclaimed empty-tier pools.
    pub treasury: Address,
    /// Stake pulled per commitment.
    pub stake: Amount,
    /// Protocol fee in basis points. Informational: the fee actually taken is
    /// whatever the pools leave over.
    pub fee_bps: u16,
    /// Pool share of total deposits per tier, in basis points.
    pub pool_bps: [u16; 3],
    /// Reveal window length for two-argument round creation.
    pub legacy_reveal_offset_secs: u64,
    /// Treatment of empty tier-2 / tier-3 pools.
    pub empty_tier_policy: EmptyTierPolicy,
}

impl Default for LottoConfig {
    fn default() -> Self {
        Self {
            engine_address: Address::repeat_byte(0xEE),
            chain_id: 1,
            admin: Address::ZERO,
            treasury: Address::ZERO,
            stake: DEFAULT_STAKE,
            fee_bps: DEFAULT_FEE_BPS,
            pool_bps: DEFAULT_POOL_BPS,
            legacy_reveal_offset_secs: DEFAULT_LEGACY_REVEAL_OFFSET_SECS,
            empty_tier_policy: EmptyTierPolicy::Treasury,
        }
    }
}

impl LottoConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Recognized: `LOTTO_ENGINE_ADDRESS`, `LOTTO_CHAIN_ID`, `LOTTO_ADMIN`,
    /// `LOTTO_TREASURY`, `LOTTO_STAKE_MICROS`, `LOTTO_FEE_BPS`,
    /// `LOTTO_POOL_BPS` (comma separated), `LOTTO_LEGACY_REVEAL_OFFSET_SECS`,
    /// `LOTTO_EMPTY_TIER_POLICY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("LOTTO_ENGINE_ADDRESS") {
            config.engine_address = parse_var("LOTTO_ENGINE_ADDRESS", &v)?;
        }
        if let Some(v) = lookup("LOTTO_CHAIN_ID") {
            config.chain_id = parse_var("LOTTO_CHAIN_ID", &v)?;
        }
        if let Some(v) = lookup("LOTTO_ADMIN") {
            config.admin = parse_var("LOTTO_ADMIN", &v)?;
        }
        if let Some(v) = lookup("LOTTO_TREASURY") {
            config.treasury = parse_var("LOTTO_TREASURY", &v)?;
        }
        if let Some(v) = lookup("LOTTO_STAKE_MICROS") {
            config.stake = Amount::from_micros(parse_var("LOTTO_STAKE_MICROS", &v)?);
        }
        if let Some(v) = lookup("LOTTO_FEE_BPS") {
            config.fee_bps = parse_var("LOTTO_FEE_BPS", &v)?;
        }
        if let Some(v) = lookup("LOTTO_POOL_BPS") {
            config.pool_bps = parse_pool_bps(&v)?;
        }
        if let Some(v) = lookup("LOTTO_LEGACY_REVEAL_OFFSET_SECS") {
            config.legacy_reveal_offset_secs = parse_var("LOTTO_LEGACY_REVEAL_OFFSET_SECS", &v)?;
        }
        if let Some(v) = lookup("LOTTO_EMPTY_TIER_POLICY") {
            config.empty_tier_policy = v.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that fee and pools cover exactly 100% and the stake is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.fee_bps as u64 + self.pool_bps.iter().map(|b| *b as u64).sum::<u64>();
        if sum != BPS_DENOMINATOR {
            return Err(ConfigError::BpsSum(sum));
        }
        if self.stake.is_zero() {
            return Err(ConfigError::ZeroStake);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_pool_bps(value: &str) -> Result<[u16; 3], ConfigError> {
    let invalid = || ConfigError::Invalid {
        key: "LOTTO_POOL_BPS",
        value: value.to_string(),
    };

    let parts = value
        .split(',')
        .map(|p| p.trim().parse::<u16>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    <[u16; 3]>::try_from(parts).map_err(|_| invalid())
}
