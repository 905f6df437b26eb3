//! Environment-driven server configuration.

use crate::error::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Listen address variable.
pub const ADDR_VAR: &str = "INKROOM_ADDR";
/// Comma-separated `token=user` pairs accepted at the handshake.
pub const TOKENS_VAR: &str = "INKROOM_TOKENS";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Session token to user id.
    pub tokens: HashMap<String, String>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: raw_addr.clone(),
                source,
            })?;
        let tokens = match lookup(TOKENS_VAR) {
            Some(raw) => parse_tokens(&raw)?,
            None => HashMap::new(),
        };
        Ok(Self { addr, tokens })
    }
}

/// Parse `token=user,token=user`. Blank entries are skipped.
pub fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((token, user)) if !token.trim().is_empty() && !user.trim().is_empty() => {
                Ok((token.trim().to_string(), user.trim().to_string()))
            }
            _ => Err(ConfigError::InvalidToken(entry.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn test_reads_addr_and_tokens() {
        let vars = [
            (ADDR_VAR, "127.0.0.1:9000"),
            (TOKENS_VAR, "abc=alice, def=bob,"),
        ];
        let config = ServerConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.tokens.get("abc").map(String::as_str), Some("alice"));
        assert_eq!(config.tokens.get("def").map(String::as_str), Some("bob"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[(ADDR_VAR, "nowhere")])),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            parse_tokens("abc=alice,orphan"),
            Err(ConfigError::InvalidToken(entry)) if entry == "orphan"
        ));
        assert!(parse_tokens("=alice").is_err());
    }
}
