/// One decoded symbol of the inbound stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// Field separator
    Separator,
    /// Hex digit, as its value 0..=15
    Nibble(u8),
}

impl Symbol {
    /// Classify a raw symbol; `None` if it is neither the separator nor `0-9A-F`
    pub fn classify(raw: u8, separator: u8) -> Option<Self> {
        if raw == separator {
            return Some(Symbol::Separator);
        }
        match raw {
            b'0'..=b'9' => Some(Symbol::Nibble(raw - b'0')),
            b'A'..=b'F' => Some(Symbol::Nibble(raw - b'A' + 10)),
            _ => None,
        }
    }
}

/// Hex digit symbol for a nibble value (only the low 4 bits are used)
pub fn nibble_symbol(nibble: u8) -> u8 {
    b"0123456789ABCDEF"[(nibble & 0x0F) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Symbol::classify(b'/', b'/'), Some(Symbol::Separator));
        assert_eq!(Symbol::classify(b'0', b'/'), Some(Symbol::Nibble(0)));
        assert_eq!(Symbol::classify(b'9', b'/'), Some(Symbol::Nibble(9)));
        assert_eq!(Symbol::classify(b'A', b'/'), Some(Symbol::Nibble(10)));
        assert_eq!(Symbol::classify(b'F', b'/'), Some(Symbol::Nibble(15)));

        // Lowercase is not part of the alphabet
        assert_eq!(Symbol::classify(b'a', b'/'), None);
        assert_eq!(Symbol::classify(b'G', b'/'), None);
        assert_eq!(Symbol::classify(b',', b'/'), None);
        assert_eq!(Symbol::classify(b',', b','), Some(Symbol::Separator));
    }

    #[test]
    fn test_nibble_symbol() {
        for value in 0..16u8 {
            let symbol = nibble_symbol(value);
            assert_eq!(Symbol::classify(symbol, b'/'), Some(Symbol::Nibble(value)));
        }
    }
}
