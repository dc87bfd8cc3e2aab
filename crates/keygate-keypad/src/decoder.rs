//! Pattern byte to symbol decoding.
//!
//! The decoder is a fixed lookup table from the one-hot row/column pattern
//! captured on a column edge to the keypad symbol. Any other pattern (no
//! column, several columns, several rows) decodes to
//! [`Keystroke::Undecodable`].

use keygate_core::{Keystroke, Symbol};

/// Stateless keypad decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDecoder;

impl KeyDecoder {
    /// Decode a pattern byte (column nibble high, row nibble low).
    ///
    /// # Examples
    ///
    /// ```
    /// use keygate_core::Keystroke;
    /// use keygate_keypad::KeyDecoder;
    ///
    /// assert_eq!(KeyDecoder::decode(0x88).to_string(), "1");
    /// assert_eq!(KeyDecoder::decode(0x41).to_string(), "0");
    /// assert_eq!(KeyDecoder::decode(0xC8), Keystroke::Undecodable);
    /// ```
    #[must_use]
    pub fn decode(pattern: u8) -> Keystroke {
        let value = match pattern {
            // row 0: 1 2 3 A
            0x88 => 0x1,
            0x48 => 0x2,
            0x28 => 0x3,
            0x18 => 0xA,
            // row 1: 4 5 6 B
            0x84 => 0x4,
            0x44 => 0x5,
            0x24 => 0x6,
            0x14 => 0xB,
            // row 2: 7 8 9 C
            0x82 => 0x7,
            0x42 => 0x8,
            0x22 => 0x9,
            0x12 => 0xC,
            // row 3: * 0 # D
            0x81 => 0xE,
            0x41 => 0x0,
            0x21 => 0xF,
            0x11 => 0xD,
            _ => return Keystroke::Undecodable,
        };
        Symbol::new(value).map_or(Keystroke::Undecodable, Keystroke::Symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x88, '1')]
    #[case(0x18, 'A')]
    #[case(0x44, '5')]
    #[case(0x22, '9')]
    #[case(0x81, 'E')]
    #[case(0x41, '0')]
    #[case(0x21, 'F')]
    #[case(0x11, 'D')]
    fn test_decode_known_patterns(#[case] pattern: u8, #[case] legend: char) {
        assert_eq!(
            KeyDecoder::decode(pattern),
            Keystroke::Symbol(Symbol::from_char(legend).unwrap())
        );
    }

    #[rstest]
    #[case(0x00)] // nothing pressed
    #[case(0x08)] // row without column
    #[case(0x80)] // column without row
    #[case(0xA8)] // two columns on row 0
    #[case(0x8C)] // one column, two rows
    #[case(0xFF)]
    fn test_decode_rejects_other_patterns(#[case] pattern: u8) {
        assert_eq!(KeyDecoder::decode(pattern), Keystroke::Undecodable);
    }

    #[test]
    fn test_decode_inverts_symbol_pattern() {
        for value in 0..16 {
            let symbol = Symbol::new(value).unwrap();
            assert_eq!(KeyDecoder::decode(symbol.pattern()), Keystroke::Symbol(symbol));
        }
    }

    #[test]
    fn test_exactly_sixteen_patterns_decode() {
        let decodable = (0..=u8::MAX)
            .filter(|&pattern| !KeyDecoder::decode(pattern).is_undecodable())
            .count();
        assert_eq!(decodable, 16);
    }
}
