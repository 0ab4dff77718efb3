//! Domain-Separated Digests
//!
//! Every digest the engine compares or signs is SHA-256 over a domain
//! separator followed by fixed-width big-endian fields. The field order is
//! part of the format: clients computing commitments or reveal
//! authorizations off-engine must feed the same sequence.

use sha2::{Digest, Sha256};

use super::ids::{Address, Nonce};

/// Digest output type (256 bits / 32 bytes).
pub type Digest32 = [u8; 32];

/// Incremental hasher with typed, fixed-width updates.
pub struct DigestBuilder {
    hasher: Sha256,
}

impl DigestBuilder {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(bytes);
        self
    }

    /// Update with a u16 value (big-endian).
    #[inline]
    pub fn update_u16(&mut self, value: u16) -> &mut Self {
        self.hasher.update(value.to_be_bytes());
        self
    }

    /// Update with a u64 value (big-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(value.to_be_bytes());
        self
    }

    /// Update with an address (20 bytes).
    #[inline]
    pub fn update_address(&mut self, address: &Address) -> &mut Self {
        self.hasher.update(address.as_bytes());
        self
    }

    /// Update with a nonce (32 bytes).
    #[inline]
    pub fn update_nonce(&mut self, nonce: &Nonce) -> &mut Self {
        self.hasher.update(nonce.as_bytes());
        self
    }

    /// Finalize and return the digest.
    pub fn finalize(self) -> Digest32 {
        self.hasher.finalize().into()
    }
}

/// Hex form of a digest for log fields.
pub fn digest_hex(digest: &Digest32) -> String {
    hex::encode(digest)
}

// =============================================================================
// TESTS
// =============================================================================
