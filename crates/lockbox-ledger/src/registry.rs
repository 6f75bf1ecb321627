//! Token collaborator registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lockbox_types::{LockboxError, Result, Token, TokenId};

/// Maps token handles to the collaborators that move them.
#[derive(Clone, Default)]
pub struct TokenRegistry {
    tokens: HashMap<TokenId, Arc<dyn Token>>,
}

impl TokenRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration for construction time.
    ///
    /// # Errors
    /// See [`TokenRegistry::register`].
    pub fn with(mut self, id: TokenId, token: Arc<dyn Token>) -> Result<Self> {
        self.register(id, token)?;
        Ok(self)
    }

    /// # Errors
    /// - `NullIdentity` for the zero handle
    /// - `TokenAlreadyRegistered` if `id` is taken
    pub fn register(&mut self, id: TokenId, token: Arc<dyn Token>) -> Result<()> {
        if id.is_zero() {
            return Err(LockboxError::NullIdentity { field: "token" });
        }
        if self.tokens.contains_key(&id) {
            return Err(LockboxError::TokenAlreadyRegistered(id));
        }
        self.tokens.insert(id, token);
        Ok(())
    }

    /// # Errors
    /// Returns `UnknownToken` if nothing is registered under `id`.
    pub fn get(&self, id: &TokenId) -> Result<Arc<dyn Token>> {
        self.tokens
            .get(id)
            .cloned()
            .ok_or(LockboxError::UnknownToken(*id))
    }

    #[must_use]
    pub fn contains(&self, id: &TokenId) -> bool {
        self.tokens.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tokens.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_types::{MemoryToken, ReturnStyle};

    #[test]
    fn register_and_get() {
        let usdt = TokenId::from_symbol("USDT");
        let reg = TokenRegistry::new()
            .with(usdt, Arc::new(MemoryToken::new(ReturnStyle::Bool)))
            .unwrap();
        assert!(reg.contains(&usdt));
        assert!(reg.get(&usdt).is_ok());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn unknown_token() {
        let reg = TokenRegistry::new();
        let eth = TokenId::from_symbol("ETH");
        assert_eq!(reg.get(&eth).err(), Some(LockboxError::UnknownToken(eth)));
    }

    #[test]
    fn duplicate_and_null_rejected() {
        let usdt = TokenId::from_symbol("USDT");
        let mut reg = TokenRegistry::new();
        reg.register(usdt, Arc::new(MemoryToken::new(ReturnStyle::Void)))
            .unwrap();
        assert_eq!(
            reg.register(usdt, Arc::new(MemoryToken::new(ReturnStyle::Void))),
            Err(LockboxError::TokenAlreadyRegistered(usdt))
        );
        assert!(matches!(
            reg.register(TokenId::ZERO, Arc::new(MemoryToken::new(ReturnStyle::Void))),
            Err(LockboxError::NullIdentity { .. })
        ));
    }
}
