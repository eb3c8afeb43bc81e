//! Identifier validation shared by the domain model, aliases and config.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .unwrap_or_else(|e| panic!("identifier pattern is invalid: {}", e));
}

/// Check that `name` is a plain identifier (letters, digits, underscore; no leading digit).
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("e"));
        assert!(is_identifier("_tmp1"));
        assert!(is_identifier("Person"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a.b"));
        assert!(!is_identifier("orders#2"));
        assert!(!is_identifier("a b"));
    }
}
