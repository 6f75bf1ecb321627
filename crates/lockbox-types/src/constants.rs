//! System-wide constants for the Lockbox custody ledger.

/// Fee rates are expressed in basis points out of this denominator.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Upper bound for the configured fee rate (100%).
pub const MAX_FEE_BPS: u16 = 10_000;

/// Default minimum lock window between record creation and deadline.
pub const DEFAULT_MIN_LOCK_SECS: i64 = 60;

/// Upper bound for the configured minimum lock window (ten years).
pub const MAX_MIN_LOCK_SECS: i64 = 10 * 365 * 86_400;

/// Domain tag for recipient-bound secret commitments.
pub const COMMITMENT_DOMAIN_V1: &[u8] = b"lockbox:commit:v1:";

/// Domain tag for commitments bound to recipient and record identifier.
pub const COMMITMENT_DOMAIN_V2: &[u8] = b"lockbox:commit:v2:";
