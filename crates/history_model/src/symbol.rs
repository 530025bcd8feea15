use std::fmt;

pub const MAX_SYMBOL_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("Empty symbol")]
    Empty,
    #[error("Symbol longer than 5 characters: {0}")]
    TooLong(String),
    #[error("Symbol contains non alphanumeric characters: {0}")]
    InvalidCharacters(String),
}

/// Validated uppercase ticker, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Checks `ticker` is 1 to 5 ASCII alphanumeric characters as given,
    /// surrounding whitespace included, and uppercases it.
    pub fn parse(ticker: &str) -> Result<Symbol, SymbolError> {
        if ticker.is_empty() {
            return Err(SymbolError::Empty);
        }
        if ticker.chars().count() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong(ticker.to_string()));
        }
        if !ticker.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SymbolError::InvalidCharacters(ticker.to_string()));
        }
        Ok(Symbol(ticker.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
