//! Configuration for a Lockbox ledger instance.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, CommitmentScheme, LockboxError, Result};

/// Configuration for a single ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Initial holder of the administrator role (fee beneficiary).
    pub admin: AccountId,
    /// The ledger's own holder identity on every token ledger.
    pub custody_account: AccountId,
    /// Fee taken on claim, in basis points.
    #[serde(default)]
    pub fee_bps: u16,
    /// Minimum distance between record creation and deadline.
    #[serde(default = "default_min_lock_secs")]
    pub min_lock_secs: i64,
    /// How secrets are bound into commitments.
    #[serde(default)]
    pub commitment: CommitmentScheme,
}

fn default_min_lock_secs() -> i64 {
    constants::DEFAULT_MIN_LOCK_SECS
}

impl LedgerConfig {
    /// Config with default fee (0), lock window and commitment scheme.
    #[must_use]
    pub fn new(admin: AccountId, custody_account: AccountId) -> Self {
        Self {
            admin,
            custody_account,
            fee_bps: 0,
            min_lock_secs: constants::DEFAULT_MIN_LOCK_SECS,
            commitment: CommitmentScheme::default(),
        }
    }

    #[must_use]
    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    #[must_use]
    pub fn with_commitment(mut self, commitment: CommitmentScheme) -> Self {
        self.commitment = commitment;
        self
    }

    #[must_use]
    pub fn with_min_lock_secs(mut self, secs: i64) -> Self {
        self.min_lock_secs = secs;
        self
    }

    /// Minimum lock window as a duration.
    ///
    /// # Errors
    /// Returns `Configuration` if `min_lock_secs` is not a representable
    /// duration.
    pub fn min_lock(&self) -> Result<Duration> {
        Duration::try_seconds(self.min_lock_secs).ok_or_else(|| {
            LockboxError::Configuration(format!(
                "min_lock_secs {} is out of range",
                self.min_lock_secs
            ))
        })
    }

    /// Check every field is within range.
    pub fn validate(&self) -> Result<()> {
        if self.admin.is_zero() {
            return Err(LockboxError::Configuration(
                "admin must not be the null identity".to_string(),
            ));
        }
        if self.custody_account.is_zero() {
            return Err(LockboxError::Configuration(
                "custody_account must not be the null identity".to_string(),
            ));
        }
        if self.fee_bps > constants::MAX_FEE_BPS {
            return Err(LockboxError::FeeOutOfRange {
                fee_bps: self.fee_bps,
                max_bps: constants::MAX_FEE_BPS,
            });
        }
        if self.min_lock_secs <= 0 || self.min_lock_secs > constants::MAX_MIN_LOCK_SECS {
            return Err(LockboxError::Configuration(format!(
                "min_lock_secs must be in 1..={}, got {}",
                constants::MAX_MIN_LOCK_SECS,
                self.min_lock_secs
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LedgerConfig {
        LedgerConfig::new(AccountId::from_bytes([1; 32]), AccountId::from_bytes([2; 32]))
    }

    #[test]
    fn defaults() {
        let c = cfg();
        assert_eq!(c.fee_bps, 0);
        assert_eq!(c.min_lock().unwrap(), Duration::seconds(60));
        assert_eq!(c.commitment, CommitmentScheme::RecipientAndIdBound);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn fee_above_max_rejected() {
        let err = cfg().with_fee_bps(10_001).validate().unwrap_err();
        assert!(matches!(err, LockboxError::FeeOutOfRange { fee_bps: 10_001, .. }));
        assert!(cfg().with_fee_bps(10_000).validate().is_ok());
    }

    #[test]
    fn null_identities_rejected() {
        let mut c = cfg();
        c.admin = AccountId::ZERO;
        assert!(matches!(c.validate(), Err(LockboxError::Configuration(_))));

        let mut c = cfg();
        c.custody_account = AccountId::ZERO;
        assert!(matches!(c.validate(), Err(LockboxError::Configuration(_))));
    }

    #[test]
    fn non_positive_lock_rejected() {
        assert!(cfg().with_min_lock_secs(0).validate().is_err());
        assert!(cfg().with_min_lock_secs(-5).validate().is_err());
    }

    #[test]
    fn oversized_lock_rejected() {
        let max = constants::MAX_MIN_LOCK_SECS;
        assert!(cfg().with_min_lock_secs(max).validate().is_ok());
        for secs in [max + 1, 10_000_000_000_000, i64::MAX] {
            assert!(matches!(
                cfg().with_min_lock_secs(secs).validate(),
                Err(LockboxError::Configuration(_))
            ));
        }
        assert!(matches!(
            cfg().with_min_lock_secs(i64::MAX).min_lock(),
            Err(LockboxError::Configuration(_))
        ));
    }

    #[test]
    fn json_roundtrip_and_defaults() {
        let c = cfg().with_fee_bps(250);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(LedgerConfig::from_json_str(&json).unwrap(), c);

        // Optional fields fall back to defaults.
        let mut v: serde_json::Value = serde_json::from_str(&json).unwrap();
        let obj = v.as_object_mut().unwrap();
        obj.remove("fee_bps");
        obj.remove("min_lock_secs");
        obj.remove("commitment");
        let back = LedgerConfig::from_json_str(&v.to_string()).unwrap();
        assert_eq!(back.fee_bps, 0);
        assert_eq!(back.min_lock_secs, 60);
    }

    #[test]
    fn invalid_json_is_serialization_error() {
        let err = LedgerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, LockboxError::Serialization(_)));
    }
}
