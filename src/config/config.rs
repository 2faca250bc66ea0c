use dotenv::dotenv;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_ACCESS_TOKEN_EXPIRES_IN: &str = "15m";
const DEFAULT_REFRESH_TOKEN_EXPIRES_IN: &str = "7d";
const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGODB_DATABASE: &str = "travel";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TRUSTED_PROXY_IP: &str = "127.0.0.1";
const DEFAULT_RATE_LIMIT_PER_SECOND: u64 = 10;
const DEFAULT_RATE_LIMIT_BURST: u32 = 5;

/// Ten years, in seconds. Longer lifetimes are a configuration mistake.
pub const MAX_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

lazy_static! {
    static ref DURATION_RE: Regex = Regex::new(r"^(\d+)\s*([smhd]?)$").unwrap();
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    SharedSecret,
    #[error("REFRESH_TOKEN_EXPIRES_IN must be longer than ACCESS_TOKEN_EXPIRES_IN")]
    RefreshNotLonger,
    #[error("{0} must not exceed ten years")]
    TooLong(&'static str),
}

/// Signing secrets and lifetimes (seconds) for the token issuer.
#[derive(Clone)]
pub struct TokenConfig {
    pub access_token_secret: String,
    pub access_token_max_age: i64,
    pub refresh_token_secret: String,
    pub refresh_token_max_age: i64,
    /// Upper bound on how long a session may be renewed through refreshes.
    /// `None` allows unlimited sliding renewal.
    pub session_max_age: Option<i64>,
}

// Secrets stay out of logs.
impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("access_token_secret", &"<redacted>")
            .field("access_token_max_age", &self.access_token_max_age)
            .field("refresh_token_secret", &"<redacted>")
            .field("refresh_token_max_age", &self.refresh_token_max_age)
            .field("session_max_age", &self.session_max_age)
            .finish()
    }
}

impl TokenConfig {
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.trim().is_empty() {
            return Err(ConfigError::Empty("ACCESS_TOKEN_SECRET"));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(ConfigError::Empty("REFRESH_TOKEN_SECRET"));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ConfigError::SharedSecret);
        }
        let lifetimes = [
            ("ACCESS_TOKEN_EXPIRES_IN", Some(self.access_token_max_age)),
            ("REFRESH_TOKEN_EXPIRES_IN", Some(self.refresh_token_max_age)),
            ("SESSION_MAX_AGE", self.session_max_age),
        ];
        for (key, lifetime) in lifetimes {
            match lifetime {
                Some(secs) if secs <= 0 => {
                    return Err(ConfigError::Invalid {
                        key,
                        value: secs.to_string(),
                    })
                }
                Some(secs) if secs > MAX_LIFETIME_SECS => return Err(ConfigError::TooLong(key)),
                _ => {}
            }
        }
        if self.refresh_token_max_age <= self.access_token_max_age {
            return Err(ConfigError::RefreshNotLonger);
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub tokens: TokenConfig,
    pub trusted_reverse_proxy_ip: IpAddr,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let tokens = TokenConfig {
            access_token_secret: required(&lookup, "ACCESS_TOKEN_SECRET")?,
            access_token_max_age: duration(
                &lookup,
                "ACCESS_TOKEN_EXPIRES_IN",
                DEFAULT_ACCESS_TOKEN_EXPIRES_IN,
            )?,
            refresh_token_secret: required(&lookup, "REFRESH_TOKEN_SECRET")?,
            refresh_token_max_age: duration(
                &lookup,
                "REFRESH_TOKEN_EXPIRES_IN",
                DEFAULT_REFRESH_TOKEN_EXPIRES_IN,
            )?,
            session_max_age: match present(&lookup, "SESSION_MAX_AGE") {
                Some(raw) => Some(parse_duration(&raw).ok_or(ConfigError::Invalid {
                    key: "SESSION_MAX_AGE",
                    value: raw,
                })?),
                None => None,
            },
        };
        tokens.check()?;

        Ok(Config {
            host: present(&lookup, "HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parsed(&lookup, "PORT", DEFAULT_PORT)?,
            mongodb_uri: present(&lookup, "MONGODB_URI")
                .unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
            mongodb_database: present(&lookup, "MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string()),
            tokens,
            trusted_reverse_proxy_ip: parsed(
                &lookup,
                "TRUSTED_PROXY_IP",
                IpAddr::from_str(DEFAULT_TRUSTED_PROXY_IP).map_err(|_| ConfigError::Invalid {
                    key: "TRUSTED_PROXY_IP",
                    value: DEFAULT_TRUSTED_PROXY_IP.to_string(),
                })?,
            )?,
            rate_limit_per_second: parsed(
                &lookup,
                "RATE_LIMIT_PER_SECOND",
                DEFAULT_RATE_LIMIT_PER_SECOND,
            )?,
            rate_limit_burst: parsed(&lookup, "RATE_LIMIT_BURST", DEFAULT_RATE_LIMIT_BURST)?,
        })
    }
}

/// Parses `900`, `900s`, `15m`, `12h` or `7d` into seconds.
pub fn parse_duration(raw: &str) -> Option<i64> {
    let caps = DURATION_RE.captures(raw.trim())?;
    let amount: i64 = caps[1].parse().ok()?;
    let unit = match &caps[2] {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };
    amount.checked_mul(unit).filter(|secs| *secs > 0)
}

fn present<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(ConfigError::Empty(key)),
        None => Err(ConfigError::Missing(key)),
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match present(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn duration<F>(lookup: &F, key: &'static str, default: &str) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = present(lookup, key).unwrap_or_else(|| default.to_string());
    parse_duration(&raw).ok_or(ConfigError::Invalid { key, value: raw })
}
