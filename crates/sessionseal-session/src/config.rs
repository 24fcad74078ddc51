//! Startup configuration and keyring construction.

use std::fmt;

use sessionseal_crypto::{random_key, Keyring, KEY_LENGTH_BITS};

use crate::error::SessionError;

/// Environment variable holding the `name=base64url(key)&...` param string.
/// The first key encrypts; all keys, in order, are tried for decryption.
pub const ENCRYPTION_KEYS_VAR: &str = "SESSION_ENCRYPTION_KEYS";

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "APP_ENV";

/// Key name used for the ephemeral key outside production.
pub const EPHEMERAL_KEY_NAME: &str = "RANDOM";

#[derive(Clone, Default)]
pub struct SessionConfig {
    /// Production mode makes configured key material mandatory.
    pub production: bool,
    pub encryption_keys: Option<String>,
}

impl SessionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let production = lookup(ENVIRONMENT_VAR).is_some_and(|env| env == "production");
        let encryption_keys = lookup(ENCRYPTION_KEYS_VAR).filter(|keys| !keys.trim().is_empty());
        Self {
            production,
            encryption_keys,
        }
    }

    /// Build the active keyring.
    ///
    /// In production, missing key material is fatal and checked before any
    /// key is parsed or generated. Outside production, a single random key
    /// is generated; anything encrypted with it is unreadable after restart.
    pub fn keyring(&self) -> Result<Keyring, SessionError> {
        match (&self.encryption_keys, self.production) {
            (Some(keys), _) => Ok(Keyring::from_param_string(keys)?),
            (None, true) => Err(SessionError::MissingProductionKeys),
            (None, false) => {
                tracing::warn!(
                    "{} not set; using an ephemeral key, sessions will not survive a restart",
                    ENCRYPTION_KEYS_VAR
                );
                let params = format!("{}={}", EPHEMERAL_KEY_NAME, random_key(KEY_LENGTH_BITS / 8)?);
                Ok(Keyring::from_param_string(&params)?)
            }
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("production", &self.production)
            .field(
                "encryption_keys",
                &self.encryption_keys.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn production_flag() {
        assert!(SessionConfig::from_lookup(lookup(&[("APP_ENV", "production")])).production);
        assert!(!SessionConfig::from_lookup(lookup(&[("APP_ENV", "dev")])).production);
        assert!(!SessionConfig::from_lookup(lookup(&[])).production);
    }

    #[test]
    fn empty_keys_are_unset() {
        let config = SessionConfig::from_lookup(lookup(&[("SESSION_ENCRYPTION_KEYS", " ")]));
        assert!(config.encryption_keys.is_none());
    }

    #[test]
    fn production_requires_keys() {
        let config = SessionConfig {
            production: true,
            encryption_keys: None,
        };
        let err = config.keyring().unwrap_err();
        assert!(matches!(err, SessionError::MissingProductionKeys));
        assert!(err.to_string().contains("SESSION_ENCRYPTION_KEYS required in production"));
    }

    #[test]
    fn production_with_keys() {
        let config = SessionConfig {
            production: true,
            encryption_keys: Some(format!("a={}", random_key(32).unwrap())),
        };
        assert_eq!(config.keyring().unwrap().key_names(), ["a"]);
    }

    #[test]
    fn production_with_bad_keys_is_fatal() {
        let config = SessionConfig {
            production: true,
            encryption_keys: Some(format!("a={}", random_key(8).unwrap())),
        };
        assert!(config.keyring().unwrap_err().to_string().contains("invalid key size"));
    }

    #[test]
    fn development_falls_back_to_ephemeral_key() {
        let keyring = SessionConfig::default().keyring().unwrap();
        assert_eq!(keyring.key_names(), [EPHEMERAL_KEY_NAME]);
    }

    #[test]
    fn debug_redacts_keys() {
        let config = SessionConfig {
            production: false,
            encryption_keys: Some("a=c2VjcmV0".into()),
        };
        assert!(!format!("{:?}", config).contains("c2VjcmV0"));
    }
}
