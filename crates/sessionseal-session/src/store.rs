//! Session token store.
//!
//! Write: tokens → canonical schema → JSON → encrypt(keyring, ctx = {sessionId}) → backend
//! Read:  backend → decrypt(keyring, ctx = {sessionId}) → JSON → canonical schema

use std::sync::Arc;

use serde::Serialize;
use sessionseal_crypto::{decrypt, encrypt, CryptoError, EncryptionContext, Keyring};
use zeroize::Zeroize;

use crate::backend::SessionBackend;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::tokens::{Session, Tokens};

/// Encryption context key binding a blob to its owning session.
pub const SESSION_ID_CONTEXT_KEY: &str = "sessionId";

fn session_context(session: &Session) -> EncryptionContext {
    EncryptionContext::from([(SESSION_ID_CONTEXT_KEY.to_string(), session.id.clone())])
}

pub struct SessionTokenStore<B> {
    keyring: Arc<Keyring>,
    backend: B,
}

impl<B: SessionBackend> SessionTokenStore<B> {
    pub fn new(keyring: Arc<Keyring>, backend: B) -> Self {
        Self { keyring, backend }
    }

    /// Build the store from startup configuration. Fails before serving
    /// anything if production key material is missing or invalid.
    pub fn from_config(config: &SessionConfig, backend: B) -> Result<Self, SessionError> {
        let keyring = config.keyring()?;
        Ok(Self::new(Arc::new(keyring), backend))
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Encrypt and store `tokens` for `session`, replacing any previous value.
    ///
    /// Only `idToken`, `accessToken` and `refreshToken` are kept; any other
    /// fields in `tokens` are discarded. A value that serializes to `null`
    /// (e.g. `None::<Tokens>`) removes the stored tokens instead.
    pub async fn set_tokens<T>(&self, session: &Session, tokens: &T) -> Result<(), SessionError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(tokens)?;
        if value.is_null() {
            return self.delete_tokens(session).await;
        }
        let canonical: Tokens = serde_json::from_value(value)?;
        let mut serialized = serde_json::to_string(&canonical)?;
        let encrypted = encrypt(&self.keyring, &serialized, Some(&session_context(session)));
        serialized.zeroize();

        self.backend.store(&session.id, encrypted?).await?;
        tracing::debug!(session_id = %session.id, "stored encrypted tokens");
        Ok(())
    }

    /// Decrypt and return the tokens stored for `session`, or `None` if there
    /// are none.
    ///
    /// Any cryptographic failure, including a blob bound to a different
    /// session id, is returned as an error; check
    /// [`SessionError::is_authentication_failure`].
    pub async fn get_tokens(&self, session: &Session) -> Result<Option<Tokens>, SessionError> {
        let Some(blob) = self.backend.load(&session.id).await? else {
            return Ok(None);
        };

        let mut plaintext = match decrypt(&self.keyring, &blob, Some(&session_context(session))) {
            Ok(plaintext) => plaintext,
            Err(CryptoError::ContextMismatch) => {
                tracing::warn!(
                    session_id = %session.id,
                    "stored tokens are bound to a different session"
                );
                return Err(CryptoError::ContextMismatch.into());
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id, error = %e, "failed to decrypt stored tokens");
                return Err(e.into());
            }
        };
        let tokens = serde_json::from_str::<Tokens>(&plaintext);
        plaintext.zeroize();
        Ok(Some(tokens?))
    }

    /// Remove any stored tokens for `session`. Idempotent; same as setting
    /// `None`.
    pub async fn delete_tokens(&self, session: &Session) -> Result<(), SessionError> {
        self.backend.remove(&session.id).await?;
        tracing::debug!(session_id = %session.id, "deleted tokens");
        Ok(())
    }
}
