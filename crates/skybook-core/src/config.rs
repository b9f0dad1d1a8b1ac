//! Environment-driven configuration.
//!
//! All values are read from `SKYBOOK_*` environment variables and validated
//! at load time, then threaded through the application as explicit structs.
//! Nothing here is process-global.
//!
//! | Variable                               | Default    | Notes                         |
//! |----------------------------------------|------------|-------------------------------|
//! | `SKYBOOK_PORT`                         | `4040`     |                               |
//! | `SKYBOOK_DATABASE_URL`                 | (none)     | SQLite URL; in-memory if unset|
//! | `SKYBOOK_SESSION_SECRET`               | (required) | at least 32 bytes             |
//! | `SKYBOOK_SESSION_LIFETIME`             | `1h`       | humantime format              |
//! | `SKYBOOK_REGISTRATION_TOKEN_LIFETIME`  | `15m`      | humantime format              |
//! | `SKYBOOK_RP_NAME`                      | `Skybook`  | human-readable RP title       |
//! | `SKYBOOK_RP_ID`                        | `localhost`| WebAuthn relying-party id     |
//! | `SKYBOOK_RP_ORIGIN`                    | (required) | must be a valid URL           |

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,

    /// SQLite database URL. In-memory stores are used when absent.
    pub database_url: Option<String>,

    /// Session token settings.
    pub session: SessionConfig,

    /// How long a registration token can be used before it expires.
    pub registration_token_lifetime: Duration,

    /// WebAuthn relying-party settings.
    pub relying_party: RelyingParty,
}

/// Session token settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Signing secret. Enforced to be at least [`MIN_SECRET_LEN`] bytes.
    pub secret: String,

    /// How long an issued session stays valid.
    pub lifetime: Duration,
}

/// WebAuthn relying-party identity.
///
/// `id` and `origin` must match what the browser reports byte-for-byte or
/// every ceremony verification fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelyingParty {
    /// Human-readable title shown by authenticators.
    pub name: String,
    /// Relying-party identifier (a registrable domain suffix of the origin).
    pub id: String,
    /// Expected web origin of ceremony responses.
    pub origin: String,
}

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {name}")]
    MissingVar { name: &'static str },

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    /// The session secret is shorter than the enforced minimum.
    #[error("session secret must be at least {MIN_SECRET_LEN} bytes")]
    SecretTooShort,

    /// The relying-party origin is not a valid URL.
    #[error("relying-party origin is not a valid URL: {0}")]
    InvalidOrigin(String),
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match get("SKYBOOK_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                name: "SKYBOOK_PORT",
                reason: e.to_string(),
            })?,
            None => 4040,
        };

        let secret = get("SKYBOOK_SESSION_SECRET").ok_or(ConfigError::MissingVar {
            name: "SKYBOOK_SESSION_SECRET",
        })?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let session_lifetime = parse_duration(&get, "SKYBOOK_SESSION_LIFETIME", "1h")?;
        let registration_token_lifetime =
            parse_duration(&get, "SKYBOOK_REGISTRATION_TOKEN_LIFETIME", "15m")?;

        let origin = get("SKYBOOK_RP_ORIGIN").ok_or(ConfigError::MissingVar {
            name: "SKYBOOK_RP_ORIGIN",
        })?;
        url::Url::parse(&origin).map_err(|e| ConfigError::InvalidOrigin(e.to_string()))?;

        let relying_party = RelyingParty {
            name: get("SKYBOOK_RP_NAME").unwrap_or_else(|| "Skybook".to_string()),
            id: get("SKYBOOK_RP_ID").unwrap_or_else(|| "localhost".to_string()),
            origin,
        };

        Ok(Self {
            port,
            database_url: get("SKYBOOK_DATABASE_URL"),
            session: SessionConfig {
                secret,
                lifetime: session_lifetime,
            },
            registration_token_lifetime,
            relying_party,
        })
    }
}

fn parse_duration(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<Duration, ConfigError> {
    let raw = get(name).unwrap_or_else(|| default.to_string());
    humantime::parse_duration(&raw).map_err(|e| ConfigError::InvalidValue {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        HashMap::from([
            (
                "SKYBOOK_SESSION_SECRET",
                "0123456789abcdef0123456789abcdef".to_string(),
            ),
            ("SKYBOOK_RP_ORIGIN", "https://booking.example.com".to_string()),
        ])
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.port, 4040);
        assert_eq!(config.session.lifetime, Duration::from_secs(3600));
        assert_eq!(config.registration_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.relying_party.id, "localhost");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let mut env = base_env();
        env.remove("SKYBOOK_SESSION_SECRET");
        assert!(matches!(
            load(&env),
            Err(ConfigError::MissingVar {
                name: "SKYBOOK_SESSION_SECRET"
            })
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut env = base_env();
        env.insert("SKYBOOK_SESSION_SECRET", "too-short".to_string());
        assert!(matches!(load(&env), Err(ConfigError::SecretTooShort)));
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let mut env = base_env();
        env.insert("SKYBOOK_RP_ORIGIN", "not a url".to_string());
        assert!(matches!(load(&env), Err(ConfigError::InvalidOrigin(_))));
    }

    #[test]
    fn test_lifetimes_parsed_as_humantime() {
        let mut env = base_env();
        env.insert("SKYBOOK_SESSION_LIFETIME", "30m".to_string());
        env.insert("SKYBOOK_REGISTRATION_TOKEN_LIFETIME", "2h".to_string());
        let config = load(&env).unwrap();
        assert_eq!(config.session.lifetime, Duration::from_secs(1800));
        assert_eq!(
            config.registration_token_lifetime,
            Duration::from_secs(7200)
        );
    }

    #[test]
    fn test_bad_duration_rejected() {
        let mut env = base_env();
        env.insert("SKYBOOK_SESSION_LIFETIME", "soon".to_string());
        assert!(matches!(
            load(&env),
            Err(ConfigError::InvalidValue {
                name: "SKYBOOK_SESSION_LIFETIME",
                ..
            })
        ));
    }
}
