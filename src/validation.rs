//! Input predicates applied to raw console text before it reaches the ledger.

use crate::domain::{Money, Pin};

/// A number that is zero or more. Zero passes here and is rejected by the
/// ledger itself with a proper message.
pub fn is_valid_amount(input: &str) -> bool {
    Money::from_decimal_str(input).is_some_and(|amount| !amount.is_negative())
}

pub fn is_valid_pin(input: &str) -> bool {
    Pin::parse(input).is_ok()
}

pub fn is_valid_string(input: &str) -> bool {
    !input.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts() {
        assert!(is_valid_amount("0"));
        assert!(is_valid_amount("40"));
        assert!(is_valid_amount("12.345"));
        assert!(is_valid_amount(" 7 "));
        assert!(!is_valid_amount("-1"));
        assert!(!is_valid_amount("abc"));
        assert!(!is_valid_amount(""));
    }

    #[test]
    fn pins() {
        assert!(is_valid_pin("0000"));
        assert!(!is_valid_pin("000"));
        assert!(!is_valid_pin("00000"));
        assert!(!is_valid_pin("12ab"));
    }

    #[test]
    fn strings() {
        assert!(is_valid_string("bob"));
        assert!(is_valid_string(" x "));
        assert!(!is_valid_string(""));
        assert!(!is_valid_string(" \t "));
    }
}
