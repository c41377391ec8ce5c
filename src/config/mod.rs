//! Configuration management for the login core
//!
//! Loads configuration from environment variables. The nonce expiry window
//! is an ISO-8601 duration string (`PT10M` by default) to stay compatible
//! with existing deployments that configure it that way.

use std::env;

use chrono::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid ISO-8601 duration: {0}")]
    InvalidDuration(String),
}

/// Default human-readable message presented to the wallet signer. The
/// verifier rebuilds the message from the same template, so signer and
/// verifier must agree on it byte for byte.
pub const DEFAULT_CHALLENGE_TEMPLATE: &str = "Login with code: {nonce}";

/// Default nonce expiry window
pub const DEFAULT_NONCE_EXPIRY: &str = "PT10M";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL for the nonce store
    pub database_url: String,

    /// How long an issued nonce stays live before a fresh one is minted
    pub nonce_expiry: Duration,

    /// Challenge message template; `{nonce}` is replaced with the code
    pub challenge_template: String,

    /// Log level (RUST_LOG)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let nonce_expiry = parse_iso8601_duration(
            &env::var("NONCE_EXPIRY").unwrap_or_else(|_| DEFAULT_NONCE_EXPIRY.to_string()),
        )?;

        let challenge_template = env::var("CHALLENGE_TEMPLATE")
            .unwrap_or_else(|_| DEFAULT_CHALLENGE_TEMPLATE.to_string());

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            database_url,
            nonce_expiry,
            challenge_template,
            log_level,
        })
    }
}

/// Parse a subset of ISO-8601 durations: `P[nW][nD][T[nH][nM][nS]]`.
///
/// Calendar units (years, months) are rejected since they have no fixed
/// length in seconds.
pub fn parse_iso8601_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());

    let body = input.strip_prefix('P').ok_or_else(invalid)?;
    if body.is_empty() {
        return Err(invalid());
    }

    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) if !time.is_empty() => (date, time),
        Some(_) => return Err(invalid()),
        None => (body, ""),
    };

    let seconds = parse_components(date_part, &[('W', 604_800), ('D', 86_400)])
        .and_then(|date_seconds| {
            let time_seconds = parse_components(time_part, &[('H', 3_600), ('M', 60), ('S', 1)])?;
            date_seconds.checked_add(time_seconds).ok_or(())
        })
        .map_err(|_| invalid())?;

    Duration::try_seconds(seconds).ok_or_else(invalid)
}

/// Sum up `<number><unit>` pairs; units must appear in the given order, each
/// at most once.
fn parse_components(part: &str, units: &[(char, i64)]) -> Result<i64, ()> {
    let mut total = 0i64;
    let mut number = String::new();
    let mut next_unit = 0;

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
            continue;
        }

        let index = units[next_unit..]
            .iter()
            .position(|&(unit, _)| unit == ch)
            .ok_or(())?
            + next_unit;

        if number.is_empty() {
            return Err(());
        }

        let value: i64 = number.parse().map_err(|_| ())?;
        total = value
            .checked_mul(units[index].1)
            .and_then(|component| total.checked_add(component))
            .ok_or(())?;
        number.clear();
        next_unit = index + 1;
    }

    // Trailing digits without a unit
    if !number.is_empty() {
        return Err(());
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(
            parse_iso8601_duration("PT10M").unwrap(),
            Duration::minutes(10)
        );
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!(
            parse_iso8601_duration("PT30S").unwrap(),
            Duration::seconds(30)
        );
    }

    #[test]
    fn test_parse_combined() {
        assert_eq!(
            parse_iso8601_duration("PT1H5M").unwrap(),
            Duration::minutes(65)
        );
        assert_eq!(
            parse_iso8601_duration("P1DT12H").unwrap(),
            Duration::hours(36)
        );
        assert_eq!(parse_iso8601_duration("P2W").unwrap(), Duration::weeks(2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_iso8601_duration("").is_err());
        assert!(parse_iso8601_duration("P").is_err());
        assert!(parse_iso8601_duration("PT").is_err());
        assert!(parse_iso8601_duration("10M").is_err());
        assert!(parse_iso8601_duration("PT10").is_err());
        assert!(parse_iso8601_duration("PTM").is_err());
        assert!(parse_iso8601_duration("PT5X").is_err());
        // Months are calendar units, not supported
        assert!(parse_iso8601_duration("P1M").is_err());
        // Units out of order
        assert!(parse_iso8601_duration("PT5S3M").is_err());
    }

    #[test]
    fn test_parse_rejects_overflow_instead_of_panicking() {
        // Multiplication overflow
        assert!(parse_iso8601_duration("P9999999999999999W").is_err());
        // Addition overflow across components
        assert!(parse_iso8601_duration("P9223372036854775807DT9223372036854775807S").is_err());
        // Parses as i64 but exceeds what a Duration can hold
        assert!(parse_iso8601_duration("PT9223372036854775807S").is_err());
        // Too many digits for i64 at all
        assert!(parse_iso8601_duration("P99999999999999999999D").is_err());
    }

    #[test]
    fn test_default_template_contains_placeholder() {
        assert!(DEFAULT_CHALLENGE_TEMPLATE.contains("{nonce}"));
    }
}
