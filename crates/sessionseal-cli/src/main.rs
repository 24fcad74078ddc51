//! Session encryption key tooling.
//!
//! # Usage
//!
//! ```bash
//! # Generate a key configuration (first key encrypts)
//! sessionseal keygen --name 2024-06 --name 2024-01
//!
//! # Validate the configuration in the environment
//! SESSION_ENCRYPTION_KEYS=... APP_ENV=production sessionseal check
//!
//! # Show which key wrapped a stored blob, and its context
//! sessionseal inspect <base64 message>
//! ```

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sessionseal_crypto::{random_key, EncryptedMessage, KEY_LENGTH_BITS};
use sessionseal_session::{SessionConfig, ENCRYPTION_KEYS_VAR};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Session token encryption tooling
#[derive(Parser, Debug)]
#[command(name = "sessionseal")]
#[command(about = "Generate and validate session encryption keys")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh SESSION_ENCRYPTION_KEYS value
    Keygen {
        /// Key names, in rotation order (first encrypts)
        #[arg(long = "name", default_value = "a")]
        names: Vec<String>,
    },
    /// Build the keyring from the environment and report its key names
    Check,
    /// Show the cleartext header of an encrypted message
    Inspect {
        /// Base64 encrypted message
        message: String,
    },
}

fn keygen(names: &[String]) -> Result<String, Box<dyn std::error::Error>> {
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    for name in names {
        params.append_pair(name, &random_key(KEY_LENGTH_BITS / 8)?);
    }
    Ok(params.finish())
}

fn check(out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let config = SessionConfig::from_env();
    tracing::debug!(?config, "loaded configuration");
    if config.encryption_keys.is_none() && !config.production {
        tracing::warn!("{} is not set", ENCRYPTION_KEYS_VAR);
    }
    let keyring = config.keyring()?;
    writeln!(
        out,
        "ok: {} key(s), encrypting with \"{}\", decrypting with [{}]",
        keyring.len(),
        keyring.generator().name(),
        keyring.key_names().join(", ")
    )?;
    Ok(())
}

fn inspect(message: &str, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let message = EncryptedMessage::parse(message)?;
    let header = message.header();
    writeln!(out, "version: {}", header.v)?;
    writeln!(out, "suite: {:#06x}", header.suite)?;
    for key in &header.keys {
        writeln!(out, "wrapped under: {}:{}", key.ns, key.name)?;
    }
    for (key, value) in &header.ctx {
        writeln!(out, "context: {}={}", key, value)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mut out = std::io::stdout().lock();
    let result = match &args.command {
        Command::Keygen { names } => keygen(names).and_then(|params| {
            writeln!(out, "{}", params)?;
            Ok(())
        }),
        Command::Check => check(&mut out),
        Command::Inspect { message } => inspect(message, &mut out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use sessionseal_crypto::{encrypt, EncryptionContext, Keyring};

    use super::*;

    #[test]
    fn keygen_output_builds_a_keyring() {
        let params = keygen(&["new".to_string(), "old".to_string()]).unwrap();
        let keyring = Keyring::from_param_string(&params).unwrap();
        assert_eq!(keyring.key_names(), ["new", "old"]);
    }

    #[test]
    fn keygen_encodes_awkward_names() {
        let params = keygen(&["a&b=c".to_string()]).unwrap();
        let keyring = Keyring::from_param_string(&params).unwrap();
        assert_eq!(keyring.key_names(), ["a&b=c"]);
    }

    #[test]
    fn inspect_reports_key_and_context() {
        let keyring = Keyring::from_param_string(&keygen(&["k1".to_string()]).unwrap()).unwrap();
        let context = EncryptionContext::from([("sessionId".to_string(), "abc".to_string())]);
        let message = encrypt(&keyring, "secret", Some(&context)).unwrap();

        let mut out = Vec::new();
        inspect(&message, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("wrapped under: N:k1"));
        assert!(out.contains("context: sessionId=abc"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn inspect_rejects_garbage() {
        assert!(inspect("nope", &mut Vec::new()).is_err());
    }
}
