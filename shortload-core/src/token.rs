//! Tokens and the immutable pool they are sampled from

use std::fmt;
use std::sync::Arc;

/// Opaque identifier issued by the target service
///
/// Backed by `Arc<str>`, so handing a token to a request is a refcount bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(Arc<str>);

impl Token {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Ordered collection of tokens built once during setup
///
/// There is no mutating API: once built, a pool is only ever read, which is
/// what lets every virtual user share one `Arc<TokenPool>` without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPool {
    tokens: Vec<Token>,
}

impl TokenPool {
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Pick a token uniformly at random, with replacement
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Option<&Token> {
        if self.tokens.is_empty() {
            return None;
        }
        self.tokens.get(rng.usize(..self.tokens.len()))
    }
}

impl FromIterator<Token> for TokenPool {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}
