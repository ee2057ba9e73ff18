use anyhow::{anyhow, Result};
use std::{env, str::FromStr};

/// Read a variable that must be present.
pub fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| anyhow!("{} environment variable not set", name))
}

pub fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn or_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

/// Parse a variable, falling back to `default` when unset or malformed.
pub fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    match optional(name) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring malformed {}={}", name, raw);
            default
        }),
        None => default,
    }
}
