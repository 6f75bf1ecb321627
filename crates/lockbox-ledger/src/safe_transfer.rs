//! Safe-transfer boundary.
//!
//! Normalises every [`CallReturn`] shape a token may produce into a single
//! `Result<()>`:
//!
//! | Token answer              | Outcome                   |
//! |---------------------------|---------------------------|
//! | fault                     | `TransferFailed`          |
//! | `Empty`                   | success                   |
//! | `Bool(true)`              | success                   |
//! | `Bool(false)`             | `TransferFailed`          |
//! | `Raw` 32-byte word == 1   | success                   |
//! | `Raw` 32-byte word == 0   | `TransferFailed`          |
//! | any other `Raw`           | `TransferFailed` (malformed) |

use lockbox_types::{AccountId, CallReturn, LockboxError, Result, Token, TokenFault};

/// Decode a token answer strictly.
pub fn check_return(ret: std::result::Result<CallReturn, TokenFault>) -> Result<()> {
    match ret {
        Err(fault) => Err(LockboxError::TransferFailed {
            reason: fault.to_string(),
        }),
        Ok(CallReturn::Empty | CallReturn::Bool(true)) => Ok(()),
        Ok(CallReturn::Bool(false)) => Err(LockboxError::TransferFailed {
            reason: "token returned false".to_string(),
        }),
        Ok(CallReturn::Raw(data)) => decode_bool_word(&data),
    }
}

fn decode_bool_word(data: &[u8]) -> Result<()> {
    if data.len() != 32 || data[..31].iter().any(|b| *b != 0) {
        return Err(LockboxError::TransferFailed {
            reason: format!("malformed return data ({} bytes)", data.len()),
        });
    }
    match data[31] {
        1 => Ok(()),
        0 => Err(LockboxError::TransferFailed {
            reason: "token returned false".to_string(),
        }),
        other => Err(LockboxError::TransferFailed {
            reason: format!("malformed boolean word: {other:#04x}"),
        }),
    }
}

/// Read `holder`'s balance, mapping faults to `TransferFailed`.
pub fn balance_of(token: &dyn Token, holder: &AccountId) -> Result<u128> {
    token
        .balance_of(holder)
        .map_err(|fault| LockboxError::TransferFailed {
            reason: format!("balance query failed: {fault}"),
        })
}

pub fn safe_transfer_in(
    token: &dyn Token,
    from: &AccountId,
    to: &AccountId,
    amount: u128,
) -> Result<()> {
    check_return(token.transfer_in(from, to, amount))
}

pub fn safe_transfer_out(
    token: &dyn Token,
    from: &AccountId,
    to: &AccountId,
    amount: u128,
) -> Result<()> {
    check_return(token.transfer_out(from, to, amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(last: u8) -> Vec<u8> {
        let mut w = vec![0u8; 32];
        w[31] = last;
        w
    }

    #[test]
    fn empty_and_true_succeed() {
        assert!(check_return(Ok(CallReturn::Empty)).is_ok());
        assert!(check_return(Ok(CallReturn::Bool(true))).is_ok());
        assert!(check_return(Ok(CallReturn::Raw(word(1)))).is_ok());
    }

    #[test]
    fn false_fails() {
        assert!(matches!(
            check_return(Ok(CallReturn::Bool(false))),
            Err(LockboxError::TransferFailed { .. })
        ));
        assert!(check_return(Ok(CallReturn::Raw(word(0)))).is_err());
    }

    #[test]
    fn fault_fails_with_reason() {
        let err = check_return(Err(TokenFault("paused".into()))).unwrap_err();
        assert_eq!(
            err,
            LockboxError::TransferFailed {
                reason: "paused".into()
            }
        );
    }

    #[test]
    fn malformed_data_fails() {
        assert!(check_return(Ok(CallReturn::Raw(vec![1]))).is_err());
        assert!(check_return(Ok(CallReturn::Raw(word(2)))).is_err());
        let mut dirty = word(1);
        dirty[0] = 0xff;
        assert!(check_return(Ok(CallReturn::Raw(dirty))).is_err());
        assert!(check_return(Ok(CallReturn::Raw(Vec::new()))).is_err());
    }
}
