use std::env;
use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::auth::JwtConfig;

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_MINUTES: i64 = 60 * 24 * 365;

/// Error raised while reading configuration from the environment.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Web API settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub server_host: String,
    pub server_port: u16,
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DB_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DB_URL"))?;

        let secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let algorithm = parse_algorithm(lookup("JWT_ALGORITHM").as_deref().unwrap_or("HS256"))?;

        let expiration_minutes: i64 = lookup("JWT_EXPIRATION")
            .ok_or(ConfigError::Missing("JWT_EXPIRATION"))
            .and_then(|raw| parse_number("JWT_EXPIRATION", &raw))?;
        if !(1..=MAX_TOKEN_MINUTES).contains(&expiration_minutes) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION",
                reason: format!("must be between 1 and {} minutes", MAX_TOKEN_MINUTES),
            });
        }
        let expiration = chrono::Duration::try_minutes(expiration_minutes).ok_or_else(|| {
            ConfigError::Invalid {
                key: "JWT_EXPIRATION",
                reason: "out of range".into(),
            }
        })?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            database_max_connections: lookup("DB_MAX_CONNECTIONS")
                .map(|raw| parse_number("DB_MAX_CONNECTIONS", &raw))
                .transpose()?
                .unwrap_or(5),
            jwt: JwtConfig::new(secret, algorithm, expiration),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: lookup("SERVER_PORT")
                .map(|raw| parse_number("SERVER_PORT", &raw))
                .transpose()?
                .unwrap_or(8000),
            allowed_origins,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}{}", self.server_host, self.server_port, API_PREFIX)
    }
}

/// Ticket CLI settings.
#[derive(Debug, Clone)]
pub struct TicketConfig {
    pub output_dir: String,
    pub chrome_path: Option<String>,
    pub printer_vendor_id: u16,
    pub printer_product_id: u16,
    /// Zero disables the timeout.
    pub printer_timeout: Duration,
}

impl TicketConfig {
    pub const DEFAULT_VENDOR_ID: u16 = 0x0416;
    pub const DEFAULT_PRODUCT_ID: u16 = 0x5011;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            output_dir: lookup("TICKET_OUTPUT_DIR").unwrap_or_else(|| "ticket/generated".into()),
            chrome_path: lookup("CHROME_PATH").filter(|path| !path.is_empty()),
            printer_vendor_id: lookup("PRINTER_VENDOR_ID")
                .map(|raw| parse_usb_id("PRINTER_VENDOR_ID", &raw))
                .transpose()?
                .unwrap_or(Self::DEFAULT_VENDOR_ID),
            printer_product_id: lookup("PRINTER_PRODUCT_ID")
                .map(|raw| parse_usb_id("PRINTER_PRODUCT_ID", &raw))
                .transpose()?
                .unwrap_or(Self::DEFAULT_PRODUCT_ID),
            printer_timeout: lookup("PRINTER_TIMEOUT_MS")
                .map(|raw| parse_number::<u64>("PRINTER_TIMEOUT_MS", &raw))
                .transpose()?
                .map(Duration::from_millis)
                .unwrap_or(Duration::ZERO),
        })
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

/// Accepts `0x0416`, `0X0416` or plain decimal.
fn parse_usb_id(key: &'static str, raw: &str) -> Result<u16, ConfigError> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

/// Only HMAC algorithms work with a shared secret.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::Invalid {
            key: "JWT_ALGORITHM",
            reason: format!("unsupported algorithm {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DB_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("JWT_EXPIRATION", "30"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt.algorithm(), Algorithm::HS256);
        assert_eq!(config.jwt.expiration(), chrono::Duration::minutes(30));
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.server_url(), "http://127.0.0.1:8000/api/v1");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://fallback"),
            ("JWT_SECRET", "secret"),
            ("JWT_ALGORITHM", "hs512"),
            ("JWT_EXPIRATION", "15"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("ALLOWED_ORIGINS", "http://localhost:5173, https://tickets.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://fallback");
        assert_eq!(config.jwt.algorithm(), Algorithm::HS512);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:5173", "https://tickets.example.com"]
        );
    }

    #[test]
    fn test_config_rejects_missing_and_invalid_values() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("JWT_SECRET", "s"), ("JWT_EXPIRATION", "5")]))
                .unwrap_err(),
            ConfigError::Missing("DB_URL")
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("DB_URL", "x"), ("JWT_EXPIRATION", "5")]))
                .unwrap_err(),
            ConfigError::Missing("JWT_SECRET")
        );
        assert!(matches!(
            Config::from_lookup(lookup_from(&[
                ("DB_URL", "x"),
                ("JWT_SECRET", "s"),
                ("JWT_EXPIRATION", "0"),
            ])),
            Err(ConfigError::Invalid { key: "JWT_EXPIRATION", .. })
        ));
        for huge in ["9223372036854775807", "1000000000000", "525601"] {
            assert!(matches!(
                Config::from_lookup(lookup_from(&[
                    ("DB_URL", "x"),
                    ("JWT_SECRET", "s"),
                    ("JWT_EXPIRATION", huge),
                ])),
                Err(ConfigError::Invalid { key: "JWT_EXPIRATION", .. })
            ));
        }
        let longest = Config::from_lookup(lookup_from(&[
            ("DB_URL", "x"),
            ("JWT_SECRET", "s"),
            ("JWT_EXPIRATION", "525600"),
        ]))
        .unwrap();
        assert!(crate::auth::issue_token("a@example.com", &longest.jwt).is_ok());
        assert!(matches!(
            Config::from_lookup(lookup_from(&[
                ("DB_URL", "x"),
                ("JWT_SECRET", "s"),
                ("JWT_EXPIRATION", "5"),
                ("JWT_ALGORITHM", "RS256"),
            ])),
            Err(ConfigError::Invalid { key: "JWT_ALGORITHM", .. })
        ));
    }

    #[test]
    fn test_ticket_config() {
        let defaults = TicketConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(defaults.output_dir, "ticket/generated");
        assert_eq!(defaults.printer_vendor_id, 0x0416);
        assert_eq!(defaults.printer_product_id, 0x5011);
        assert_eq!(defaults.printer_timeout, Duration::ZERO);
        assert!(defaults.chrome_path.is_none());

        let custom = TicketConfig::from_lookup(lookup_from(&[
            ("PRINTER_VENDOR_ID", "0x04B8"),
            ("PRINTER_PRODUCT_ID", "3605"),
            ("PRINTER_TIMEOUT_MS", "2500"),
            ("CHROME_PATH", "/usr/bin/chromium"),
        ]))
        .unwrap();
        assert_eq!(custom.printer_vendor_id, 0x04B8);
        assert_eq!(custom.printer_product_id, 3605);
        assert_eq!(custom.printer_timeout, Duration::from_millis(2500));
        assert_eq!(custom.chrome_path.as_deref(), Some("/usr/bin/chromium"));

        assert!(TicketConfig::from_lookup(lookup_from(&[("PRINTER_VENDOR_ID", "0xZZ")])).is_err());
    }
}
