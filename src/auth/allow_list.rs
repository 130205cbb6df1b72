use std::collections::HashSet;

/// Raised whenever a presented credential is not on the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid token")]
pub struct InvalidToken;

/// Static set of accepted bearer tokens.
///
/// Tokens are opaque and compared by exact equality. An empty list accepts
/// nothing, so an unset `ALLOWED_TOKENS` locks the action route.
#[derive(Debug, Clone, Default)]
pub struct TokenAllowList {
    tokens: HashSet<String>,
}

impl TokenAllowList {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    /// Entries are split on `,` and kept verbatim (no trimming).
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn verify<'a>(&self, token: &'a str) -> Result<&'a str, InvalidToken> {
        if !token.is_empty() && self.tokens.contains(token) {
            Ok(token)
        } else {
            Err(InvalidToken)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}
