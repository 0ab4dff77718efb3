//! Signature Recovery Interface
//!
//! Delegated reveals carry a signature over a
//! [`RevealAuthorization`](crate::proof::RevealAuthorization) digest. The
//! engine only needs one primitive: recover the identity that produced a
//! signature over a digest. Key scheme and encoding belong to the
//! implementation.

use crate::core::hash::Digest32;
use crate::core::ids::Address;

/// Recovers a signer identity from a digest and signature.
pub trait SignerRecovery {
    /// Identity that signed `digest`, or `None` if the signature is malformed
    /// or does not verify.
    fn recover_signer(&self, digest: &Digest32, signature: &[u8]) -> Option<Address>;
}

impl<F> SignerRecovery for F
where
    F: Fn(&Digest32, &[u8]) -> Option<Address>,
{
    fn recover_signer(&self, digest: &Digest32, signature: &[u8]) -> Option<Address> {
        self(digest, signature)
    }
}
