//! Environment variable loading utilities
//!
//! Helper functions for loading and parsing environment variables with proper error handling.

use crate::error::{Result, ToolError};
use regex::{Captures, Regex};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Load an environment variable as a string
///
/// # Returns
///
/// * `Ok(Some(value))` if variable exists
/// * `Ok(None)` if variable doesn't exist
/// * `Err` if variable exists but has invalid UTF-8
pub fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ToolError::Config(format!(
            "Environment variable {} contains invalid UTF-8",
            key
        ))),
    }
}

/// Look up `key` through `lookup` and parse it.
///
/// `lookup` is normally [`get_env`]; tests pass a closure over a map.
///
/// # Example
///
/// ```rust,ignore
/// let port: Option<u16> = get_env_parse(get_env, "CONDUCTOR_PORT")?;
/// ```
pub fn get_env_parse<T, F>(lookup: F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<Option<String>>,
{
    match lookup(key)? {
        Some(val) => {
            let parsed = val.trim().parse::<T>().map_err(|e| {
                ToolError::Config(format!(
                    "Failed to parse environment variable {}: {}",
                    key, e
                ))
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

fn env_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}")
            .expect("env reference pattern is a valid regex")
    })
}

/// Expand `${VAR}` and `${VAR:default}` references in a string.
///
/// An unset variable without a default is left as written, so a missing
/// secret shows up verbatim in diagnostics instead of becoming empty.
///
/// ```rust,ignore
/// let key = expand_env_vars("${OPENAI_API_KEY}");
/// let base = expand_env_vars("${OLLAMA_HOST:http://localhost:11434}");
/// ```
pub fn expand_env_vars(value: &str) -> String {
    if !value.contains("${") {
        return value.to_string();
    }

    env_ref_pattern()
        .replace_all(value, |caps: &Captures<'_>| match env::var(&caps[1]) {
            Ok(v) => v,
            Err(_) => caps
                .get(2)
                .map(|d| d.as_str().to_string())
                .unwrap_or_else(|| caps[0].to_string()),
        })
        .into_owned()
}
