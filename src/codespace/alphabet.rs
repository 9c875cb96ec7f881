//! Symbols usable in any code position

use std::collections::HashSet;

use crate::error::{CouponForgeError, Result};

/// Symbols that are easy to confuse with one another when read aloud or printed
pub const AMBIGUOUS_SYMBOLS: &[char] = &['0', '1', 'I', 'O'];

/// Uppercase letters and digits minus the ambiguous set (32 symbols)
const STANDARD_SYMBOLS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Ordered set of distinct code symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// The fixed alphabet used for issued codes
    pub fn standard() -> Self {
        Self {
            symbols: STANDARD_SYMBOLS.to_vec(),
        }
    }

    /// Build a custom alphabet, enforcing the same rules as the standard one
    pub fn from_symbols(symbols: impl IntoIterator<Item = char>) -> Result<Self> {
        let symbols: Vec<char> = symbols.into_iter().collect();

        if symbols.len() < 2 {
            return Err(CouponForgeError::validation(format!(
                "alphabet needs at least 2 symbols, got {}",
                symbols.len()
            )));
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        for &symbol in &symbols {
            if AMBIGUOUS_SYMBOLS.contains(&symbol) {
                return Err(CouponForgeError::validation(format!(
                    "alphabet contains ambiguous symbol '{}'",
                    symbol
                )));
            }
            if symbol.is_whitespace() || symbol.is_control() {
                return Err(CouponForgeError::validation(format!(
                    "alphabet contains unprintable symbol {:?}",
                    symbol
                )));
            }
            if !seen.insert(symbol) {
                return Err(CouponForgeError::validation(format!(
                    "alphabet contains '{}' more than once",
                    symbol
                )));
            }
        }

        Ok(Self { symbols })
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Alphabet size, the radix of the counter
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_alphabet() {
        let alphabet = Alphabet::standard();
        assert_eq!(alphabet.len(), 32);

        let unique: HashSet<char> = alphabet.symbols().iter().copied().collect();
        assert_eq!(unique.len(), alphabet.len());

        for ambiguous in AMBIGUOUS_SYMBOLS {
            assert!(!alphabet.contains(*ambiguous));
        }
        assert_eq!(Alphabet::standard(), Alphabet::default());
    }

    #[test]
    fn test_custom_alphabet() {
        let alphabet = Alphabet::from_symbols("ABC".chars()).unwrap();
        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.symbols(), &['A', 'B', 'C']);
    }

    #[test]
    fn test_rejects_bad_alphabets() {
        assert!(Alphabet::from_symbols("A".chars()).is_err());
        assert!(Alphabet::from_symbols("ABA".chars()).is_err());
        assert!(Alphabet::from_symbols("AB0".chars()).is_err());
        assert!(Alphabet::from_symbols("AB O".chars()).is_err());
        assert!(Alphabet::from_symbols("A B".chars()).is_err());
    }
}
