//! Error types for the Lockbox custody ledger.
//!
//! All errors use the `LB_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by failure class:
//! - 1xx: Input validation
//! - 2xx: Authorization
//! - 3xx: Temporal
//! - 4xx: State conflict
//! - 5xx: Arithmetic
//! - 6xx: External collaborator
//! - 7xx: Concurrency
//! - 9xx: General / internal
//!
//! Every variant is a checked rejection of a single operation. None of them
//! leaves a partial record, a partial payout, or a held guard behind.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{CustodyState, EscrowId, TokenId};

/// Central error enum for all Lockbox operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockboxError {
    // =================================================================
    // Input Validation (1xx)
    // =================================================================
    /// A party or token identity was the null identity.
    #[error("LB_ERR_100: Null identity supplied for {field}")]
    NullIdentity { field: &'static str },

    /// The nominal deposit amount was zero.
    #[error("LB_ERR_101: Amount must be greater than zero")]
    ZeroAmount,

    /// The secret commitment was all zeros.
    #[error("LB_ERR_102: Secret hash must be non-zero")]
    ZeroSecretHash,

    /// The deadline leaves less than the minimum lock window.
    #[error("LB_ERR_103: Deadline {deadline} is before earliest allowed {earliest}")]
    DeadlineTooSoon {
        deadline: DateTime<Utc>,
        earliest: DateTime<Utc>,
    },

    /// Fee rate above 10000 basis points.
    #[error("LB_ERR_104: Fee {fee_bps} bps exceeds maximum {max_bps} bps")]
    FeeOutOfRange { fee_bps: u16, max_bps: u16 },

    /// No token collaborator is registered under this handle.
    #[error("LB_ERR_105: Unknown token: {0}")]
    UnknownToken(TokenId),

    /// A token collaborator is already registered under this handle.
    #[error("LB_ERR_106: Token already registered: {0}")]
    TokenAlreadyRegistered(TokenId),

    // =================================================================
    // Authorization (2xx)
    // =================================================================
    /// Caller of `claim` is not the record's recipient.
    #[error("LB_ERR_200: Caller is not the recipient of {0}")]
    NotRecipient(EscrowId),

    /// Caller of `refund` is not the record's sender.
    #[error("LB_ERR_201: Caller is not the sender of {0}")]
    NotSender(EscrowId),

    /// The revealed secret does not open the stored commitment.
    #[error("LB_ERR_202: Invalid secret for {0}")]
    InvalidSecret(EscrowId),

    /// Caller does not hold the administrator role.
    #[error("LB_ERR_203: Unauthorized: caller is not the administrator")]
    Unauthorized,

    // =================================================================
    // Temporal (3xx)
    // =================================================================
    /// Claim attempted after the deadline.
    #[error("LB_ERR_300: Deadline {deadline} passed (now {now})")]
    DeadlinePassed {
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Refund attempted at or before the deadline.
    #[error("LB_ERR_301: Not expired: deadline {deadline} (now {now})")]
    NotExpired {
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    // =================================================================
    // State Conflict (4xx)
    // =================================================================
    /// The record already reached `Claimed` or `Refunded`.
    #[error("LB_ERR_400: {id} is already terminal ({state})")]
    AlreadyTerminal { id: EscrowId, state: CustodyState },

    /// No record exists under this identifier.
    #[error("LB_ERR_401: Record not found: {0}")]
    RecordNotFound(EscrowId),

    // =================================================================
    // Arithmetic (5xx)
    // =================================================================
    /// `amount_received * fee_bps` does not fit the native integer width.
    #[error("LB_ERR_500: Fee computation overflow: amount {amount} x {fee_bps} bps")]
    FeeOverflow { amount: u128, fee_bps: u16 },

    /// An accounting sum overflowed.
    #[error("LB_ERR_501: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // External Collaborator (6xx)
    // =================================================================
    /// The token collaborator reported failure or returned malformed data.
    #[error("LB_ERR_600: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// The custody balance decreased across a transfer-in.
    #[error("LB_ERR_601: Balance invariant violation: before {before}, after {after}")]
    BalanceInvariantViolation { before: u128, after: u128 },

    /// The transfer-in credited nothing to custody.
    #[error("LB_ERR_602: Zero receipt: transfer credited nothing to custody")]
    ZeroReceipt,

    /// Custody holds less than the ledger owes.
    #[error("LB_ERR_603: Solvency violation: {reason}")]
    SolvencyViolation { reason: String },

    // =================================================================
    // Concurrency (7xx)
    // =================================================================
    /// A state-changing call was attempted while another was in progress.
    #[error("LB_ERR_700: Reentrant call rejected")]
    Reentrant,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Invalid configuration.
    #[error("LB_ERR_900: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("LB_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Coarse failure class, used by callers deciding whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    InputValidation,
    Authorization,
    Temporal,
    StateConflict,
    Arithmetic,
    ExternalCollaborator,
    Concurrency,
    Internal,
}

impl LockboxError {
    /// The failure class this error belongs to.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::NullIdentity { .. }
            | Self::ZeroAmount
            | Self::ZeroSecretHash
            | Self::DeadlineTooSoon { .. }
            | Self::FeeOutOfRange { .. }
            | Self::UnknownToken(_)
            | Self::TokenAlreadyRegistered(_) => ErrorClass::InputValidation,
            Self::NotRecipient(_)
            | Self::NotSender(_)
            | Self::InvalidSecret(_)
            | Self::Unauthorized => ErrorClass::Authorization,
            Self::DeadlinePassed { .. } | Self::NotExpired { .. } => ErrorClass::Temporal,
            Self::AlreadyTerminal { .. } | Self::RecordNotFound(_) => ErrorClass::StateConflict,
            Self::FeeOverflow { .. } | Self::AmountOverflow => ErrorClass::Arithmetic,
            Self::TransferFailed { .. }
            | Self::BalanceInvariantViolation { .. }
            | Self::ZeroReceipt
            | Self::SolvencyViolation { .. } => ErrorClass::ExternalCollaborator,
            Self::Reentrant => ErrorClass::Concurrency,
            Self::Configuration(_) | Self::Serialization(_) => ErrorClass::Internal,
        }
    }

    /// Whether resubmitting the same call later could succeed.
    ///
    /// Only collaborator hiccups and re-entry rejections qualify; every
    /// other class is a property of the request or of the record.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransferFailed { .. } | Self::ZeroReceipt | Self::Reentrant
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LockboxError>;

impl From<serde_json::Error> for LockboxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
