use crate::{
    Result,
    constants::{column_bit, row_bit},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matrix position of each symbol value, consistent with `KEY_LAYOUT`.
const SYMBOL_POSITIONS: [(usize, usize); 16] = [
    (3, 1), // 0
    (0, 0), // 1
    (0, 1), // 2
    (0, 2), // 3
    (1, 0), // 4
    (1, 1), // 5
    (1, 2), // 6
    (2, 0), // 7
    (2, 1), // 8
    (2, 2), // 9
    (0, 3), // A
    (1, 3), // B
    (2, 3), // C
    (3, 3), // D
    (3, 0), // E (*)
    (3, 2), // F (#)
];

/// One keypad symbol (0-15, printed as `0`-`9` and `A`-`F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Symbol(u8);

impl Symbol {
    /// Create a symbol from its numeric value.
    ///
    /// # Errors
    /// Returns `Error::InvalidSymbol` if the value is greater than 15.
    pub fn new(value: u8) -> Result<Self> {
        if value > 0x0F {
            return Err(Error::InvalidSymbol { value });
        }
        Ok(Symbol(value))
    }

    /// Create a symbol from its printed character (hex digit, case-insensitive).
    ///
    /// # Errors
    /// Returns `Error::InvalidSymbolChar` if the character is not a hex digit.
    pub fn from_char(c: char) -> Result<Self> {
        c.to_digit(16)
            .map(|d| Symbol(d as u8))
            .ok_or(Error::InvalidSymbolChar(c))
    }

    /// Get the raw symbol value.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Printed character of the symbol (uppercase).
    #[must_use]
    pub fn to_char(&self) -> char {
        char::from_digit(u32::from(self.0), 16)
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('?')
    }

    /// Returns `true` for the decimal digits 0-9.
    #[must_use]
    pub fn is_digit(&self) -> bool {
        self.0 <= 9
    }

    /// Matrix position `(row, column)` of this symbol on the keypad.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        SYMBOL_POSITIONS[usize::from(self.0)]
    }

    /// Pattern byte read when this key is pressed while its row is driven.
    ///
    /// # Examples
    ///
    /// ```
    /// use keygate_core::Symbol;
    ///
    /// assert_eq!(Symbol::from_char('1').unwrap().pattern(), 0x88);
    /// assert_eq!(Symbol::from_char('D').unwrap().pattern(), 0x11);
    /// ```
    #[must_use]
    pub fn pattern(&self) -> u8 {
        let (row, column) = self.position();
        (column_bit(column) << 4) | row_bit(row)
    }
}

impl TryFrom<u8> for Symbol {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Symbol::new(value)
    }
}

impl From<Symbol> for u8 {
    fn from(symbol: Symbol) -> u8 {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parse a string of printed symbols, e.g. `"1234"` or `"a5c0"`.
///
/// # Errors
/// Returns `Error::InvalidSymbolChar` on the first non hex digit character.
pub fn parse_symbols(text: &str) -> Result<Vec<Symbol>> {
    text.chars().map(Symbol::from_char).collect()
}

/// Format symbols back into their printed form.
#[must_use]
pub fn format_symbols(symbols: &[Symbol]) -> String {
    symbols.iter().map(Symbol::to_char).collect()
}

/// One captured keystroke.
///
/// A pattern that does not match any key (two keys pressed at once, a
/// glitch on the column lines) is still a keystroke, recorded as
/// `Undecodable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Keystroke {
    Symbol(Symbol),
    Undecodable,
}

impl Keystroke {
    /// The decoded symbol, if any.
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Keystroke::Symbol(s) => Some(*s),
            Keystroke::Undecodable => None,
        }
    }

    /// Returns `true` if the pattern could not be decoded.
    #[inline]
    #[must_use]
    pub fn is_undecodable(&self) -> bool {
        matches!(self, Keystroke::Undecodable)
    }
}

impl From<Symbol> for Keystroke {
    fn from(symbol: Symbol) -> Self {
        Keystroke::Symbol(symbol)
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Keystroke::Symbol(s) => write!(f, "{s}"),
            Keystroke::Undecodable => write!(f, "?"),
        }
    }
}

/// Why an attempt was denied.
///
/// All reasons render identically on the device; the distinction only
/// exists for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UnknownId,
    BadPassword,
    Locked,
    Timeout,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DenyReason::UnknownId => write!(f, "unknown id"),
            DenyReason::BadPassword => write!(f, "bad password"),
            DenyReason::Locked => write!(f, "locked"),
            DenyReason::Timeout => write!(f, "timeout"),
        }
    }
}

/// Result of an identity-verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Grant,
    Deny(DenyReason),
}

impl Outcome {
    /// Returns `true` if access was granted.
    #[inline]
    #[must_use]
    pub fn is_grant(self) -> bool {
        matches!(self, Outcome::Grant)
    }

    /// The denial reason, if access was denied.
    #[inline]
    #[must_use]
    pub fn deny_reason(self) -> Option<DenyReason> {
        match self {
            Outcome::Grant => None,
            Outcome::Deny(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Grant => write!(f, "Grant"),
            Outcome::Deny(reason) => write!(f, "Deny({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('0', 0)]
    #[case('9', 9)]
    #[case('a', 10)]
    #[case('F', 15)]
    fn test_symbol_from_char(#[case] input: char, #[case] expected: u8) {
        let symbol = Symbol::from_char(input).unwrap();
        assert_eq!(symbol.as_u8(), expected);
        assert_eq!(symbol.to_char(), input.to_ascii_uppercase());
    }

    #[rstest]
    #[case('G')]
    #[case('*')]
    #[case(' ')]
    fn test_symbol_from_char_invalid(#[case] input: char) {
        assert!(matches!(
            Symbol::from_char(input),
            Err(Error::InvalidSymbolChar(c)) if c == input
        ));
    }

    #[test]
    fn test_symbol_range() {
        assert!(Symbol::new(15).is_ok());
        assert!(matches!(
            Symbol::new(16),
            Err(Error::InvalidSymbol { value: 16 })
        ));
        assert!(Symbol::new(9).unwrap().is_digit());
        assert!(!Symbol::new(10).unwrap().is_digit());
    }

    #[rstest]
    #[case('1', (0, 0), 0x88)]
    #[case('A', (0, 3), 0x18)]
    #[case('5', (1, 1), 0x44)]
    #[case('C', (2, 3), 0x12)]
    #[case('E', (3, 0), 0x81)]
    #[case('0', (3, 1), 0x41)]
    fn test_symbol_position_and_pattern(
        #[case] legend: char,
        #[case] position: (usize, usize),
        #[case] pattern: u8,
    ) {
        let symbol = Symbol::from_char(legend).unwrap();
        assert_eq!(symbol.position(), position);
        assert_eq!(symbol.pattern(), pattern);
    }

    #[test]
    fn test_positions_match_layout() {
        for value in 0..16 {
            let symbol = Symbol::new(value).unwrap();
            let (row, column) = symbol.position();
            assert_eq!(
                crate::constants::KEY_LAYOUT[row][column],
                symbol.to_char()
            );
        }
    }

    #[test]
    fn test_parse_and_format_symbols() {
        let symbols = parse_symbols("a5C0").unwrap();
        assert_eq!(symbols.len(), 4);
        assert_eq!(format_symbols(&symbols), "A5C0");
        assert!(parse_symbols("12x4").is_err());
    }

    #[test]
    fn test_keystroke_accessors() {
        let key = Keystroke::from(Symbol::new(7).unwrap());
        assert_eq!(key.symbol(), Some(Symbol::new(7).unwrap()));
        assert!(!key.is_undecodable());
        assert_eq!(Keystroke::Undecodable.symbol(), None);
        assert_eq!(Keystroke::Undecodable.to_string(), "?");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Grant.to_string(), "Grant");
        assert_eq!(
            Outcome::Deny(DenyReason::BadPassword).to_string(),
            "Deny(bad password)"
        );
        assert!(Outcome::Grant.is_grant());
        assert_eq!(
            Outcome::Deny(DenyReason::Timeout).deny_reason(),
            Some(DenyReason::Timeout)
        );
    }

    #[test]
    fn test_symbol_serialization() {
        let symbol = Symbol::new(12).unwrap();
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "12");
        let back: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symbol);
        assert!(serde_json::from_str::<Symbol>("16").is_err());
    }
}
