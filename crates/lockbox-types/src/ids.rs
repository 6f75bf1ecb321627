//! Identifiers used throughout Lockbox.
//!
//! Record identifiers are a monotonically increasing `u64` starting at 1.
//! Party and asset identities are opaque 32-byte handles; the all-zero
//! value is the null identity and is never a valid party or asset.

use std::fmt;

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EscrowId
// ---------------------------------------------------------------------------

/// Identifier of a custody record. Append-only, starts at 1, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EscrowId(pub u64);

impl fmt::Display for EscrowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "escrow:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Identity of a party (sender, recipient, administrator, custody holder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    /// The null identity.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive an identity from an ed25519 public key.
    #[must_use]
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// Opaque handle to a fungible asset held on an external token ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TokenId(pub [u8; 32]);

impl TokenId {
    /// The null token handle.
    pub const ZERO: Self = Self([0u8; 32]);

    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Handle derived from a human-readable symbol (e.g. `"USDT"`).
    ///
    /// The symbol is right-padded with zeros; symbols longer than 32 bytes
    /// are truncated.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Self {
        let mut bytes = [0u8; 32];
        let src = symbol.as_bytes();
        let len = src.len().min(32);
        bytes[..len].copy_from_slice(&src[..len]);
        Self(bytes)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token:{}", hex::encode(&self.0[..8]))
    }
}

/// Random identities for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    /// A fresh identity backed by a newly generated ed25519 key.
    pub fn random() -> Self {
        let key = ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng);
        Self::from_verifying_key(&key.verifying_key())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_id_orders_and_displays() {
        assert!(EscrowId(3) < EscrowId(4));
        assert_eq!(EscrowId(7).to_string(), "escrow:7");
    }

    #[test]
    fn zero_identity_detected() {
        assert!(AccountId::ZERO.is_zero());
        assert!(!AccountId::from_bytes([1u8; 32]).is_zero());
        assert!(TokenId::ZERO.is_zero());
    }

    #[test]
    fn random_accounts_are_distinct_and_non_zero() {
        let a = AccountId::random();
        let b = AccountId::random();
        assert_ne!(a, b);
        assert!(!a.is_zero());
    }

    #[test]
    fn account_from_verifying_key_matches_key_bytes() {
        let key = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
        let vk = key.verifying_key();
        assert_eq!(AccountId::from_verifying_key(&vk).as_bytes(), &vk.to_bytes());
    }

    #[test]
    fn token_from_symbol_pads() {
        let t = TokenId::from_symbol("USDT");
        assert_eq!(&t.0[..4], b"USDT");
        assert!(t.0[4..].iter().all(|b| *b == 0));
        assert!(!t.is_zero());
        assert!(TokenId::from_symbol("").is_zero());
    }

    #[test]
    fn display_prefixes() {
        assert_eq!(EscrowId(9).to_string(), "escrow:9");
        assert!(AccountId::from_bytes([0xab; 32]).to_string().starts_with("acct:abab"));
        assert!(TokenId::from_symbol("ETH").to_string().starts_with("token:455448"));
    }

    #[test]
    fn serde_roundtrips() {
        let id = EscrowId(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: EscrowId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let acct = AccountId::random();
        let json = serde_json::to_string(&acct).unwrap();
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(acct, back);
    }
}
