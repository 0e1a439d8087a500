//! Configuration for the book-review API
//!
//! Loads settings from environment variables, after an optional `.env` file
//! has been applied by the binary.

use std::env;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub jwt: JwtSettings,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Signing secrets for the two token kinds
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns `None` for unset keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let access_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        let refresh_secret =
            lookup("JWT_REFRESH_SECRET").context("JWT_REFRESH_SECRET must be set")?;

        if access_secret.trim().is_empty() || refresh_secret.trim().is_empty() {
            bail!("JWT secrets must not be empty");
        }
        if access_secret == refresh_secret {
            bail!("JWT_SECRET and JWT_REFRESH_SECRET must differ");
        }

        let port = match lookup("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("SERVER_PORT is not a valid port: {}", raw))?,
            None => 4000,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => bail!("LOG_FORMAT must be `json` or `pretty`, got `{}`", other),
        };

        Ok(Settings {
            server: ServerSettings {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            jwt: JwtSettings {
                access_secret,
                refresh_secret,
            },
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("JWT_SECRET", "access"),
            ("JWT_REFRESH_SECRET", "refresh"),
        ]))
        .unwrap();

        assert_eq!(settings.server.addr(), "0.0.0.0:4000");
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("JWT_SECRET", "access"),
            ("JWT_REFRESH_SECRET", "refresh"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "8080"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(settings.server.addr(), "127.0.0.1:8080");
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_secrets_are_required_and_distinct() {
        assert!(Settings::from_lookup(lookup(&[("JWT_SECRET", "access")])).is_err());
        assert!(Settings::from_lookup(lookup(&[
            ("JWT_SECRET", "same"),
            ("JWT_REFRESH_SECRET", "same"),
        ]))
        .is_err());
        assert!(Settings::from_lookup(lookup(&[
            ("JWT_SECRET", " "),
            ("JWT_REFRESH_SECRET", "refresh"),
        ]))
        .is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let jwt = JwtSettings {
            access_secret: "s3cr3t".to_string(),
            refresh_secret: "r3fr3sh".to_string(),
        };
        let debug = format!("{:?}", jwt);
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("r3fr3sh"));
    }
}
