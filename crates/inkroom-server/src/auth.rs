//! Session token verification at the WebSocket handshake.

use std::collections::HashMap;

/// Resolves a session token to the user it was issued to.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<String>;
}

/// Verifier backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    pub fn from_pairs<T, U>(pairs: impl IntoIterator<Item = (T, U)>) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(token, user)| (token.into(), user.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_verifier() {
        let verifier = StaticTokenVerifier::from_pairs([("t1", "alice")]);
        assert_eq!(verifier.verify("t1").as_deref(), Some("alice"));
        assert_eq!(verifier.verify("t2"), None);
        assert_eq!(verifier.verify(""), None);
        assert!(StaticTokenVerifier::default().is_empty());
    }
}
