//! Commit-reveal secret commitments.
//!
//! A depositor publishes `SecretHash` at deposit time. The recipient later
//! reveals the secret; the ledger recomputes the digest with the recipient
//! identity mixed in, so a secret observed in flight cannot be replayed by a
//! different claimant.
//!
//! Canonical digest input:
//!
//! ```text
//! RecipientBound:       sha256("lockbox:commit:v1:" || secret || recipient)
//! RecipientAndIdBound:  sha256("lockbox:commit:v2:" || secret || recipient || id_be)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{COMMITMENT_DOMAIN_V1, COMMITMENT_DOMAIN_V2};
use crate::{AccountId, EscrowId};

/// 32-byte commitment to a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretHash(pub [u8; 32]);

impl SecretHash {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// How the secret is bound into the commitment.
///
/// Fixed for the lifetime of a ledger: switching schemes would orphan every
/// commitment published under the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentScheme {
    /// `secret || recipient`. The same pair opens any record with that
    /// recipient and that commitment.
    RecipientBound,
    /// `secret || recipient || id`. A revealed secret opens exactly one record.
    #[default]
    RecipientAndIdBound,
}

impl CommitmentScheme {
    /// Compute the commitment a depositor must publish for record `id`.
    ///
    /// `id` is ignored under [`CommitmentScheme::RecipientBound`].
    #[must_use]
    pub fn commit(self, secret: &[u8], recipient: &AccountId, id: EscrowId) -> SecretHash {
        let mut hasher = Sha256::new();
        match self {
            Self::RecipientBound => {
                hasher.update(COMMITMENT_DOMAIN_V1);
                hasher.update(secret);
                hasher.update(recipient.as_bytes());
            }
            Self::RecipientAndIdBound => {
                hasher.update(COMMITMENT_DOMAIN_V2);
                hasher.update(secret);
                hasher.update(recipient.as_bytes());
                hasher.update(id.0.to_be_bytes());
            }
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        SecretHash(out)
    }

    /// Does `secret` open `expected` for this recipient and record?
    #[must_use]
    pub fn verify(
        self,
        expected: &SecretHash,
        secret: &[u8],
        recipient: &AccountId,
        id: EscrowId,
    ) -> bool {
        self.commit(secret, recipient, id) == *expected
    }
}
