//! Label-identifier validation and the reserved-word set.

use dlx::Opcode;
use util::EnumFromStr;

/// A valid label identifier starts with a letter or underscore (length >= 2
/// when it starts with underscore), and contains only letters, digits and
/// underscores thereafter.
pub fn is_valid_label_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        Some('_') => {
            if name.chars().count() < 2 {
                return false;
            }
        }
        _ => return false,
    }
    name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn int_register_id(upper: &str) -> Option<u8> {
    register_id(upper, 'R')
}

pub(crate) fn float_register_id(upper: &str) -> Option<u8> {
    register_id(upper, 'F')
}

fn register_id(upper: &str, prefix: char) -> Option<u8> {
    let digits = upper.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let id: u32 = digits.parse().ok()?;
    if id <= 31 {
        Some(id as u8)
    } else {
        None
    }
}

/// Reserved words: every opcode mnemonic, `R0..R31`, `F0..F31`, and `FPSR`.
/// `name` is matched case-insensitively.
pub fn is_reserved_identifier(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper == "FPSR"
        || Opcode::from_str(&upper).is_ok()
        || int_register_id(&upper).is_some()
        || float_register_id(&upper).is_some()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_ordinary_identifiers() {
        assert!(is_valid_label_identifier("loop"));
        assert!(is_valid_label_identifier("_loop"));
        assert!(is_valid_label_identifier("loop_1"));
    }

    #[test]
    fn rejects_short_underscore_only_and_leading_digit() {
        assert!(!is_valid_label_identifier("_"));
        assert!(!is_valid_label_identifier("1loop"));
        assert!(!is_valid_label_identifier(""));
    }

    #[test]
    fn reserved_words_cover_opcodes_and_registers() {
        assert!(is_reserved_identifier("add"));
        assert!(is_reserved_identifier("R0"));
        assert!(is_reserved_identifier("r31"));
        assert!(is_reserved_identifier("f2"));
        assert!(is_reserved_identifier("fpsr"));
        assert!(!is_reserved_identifier("loop"));
    }

    #[test]
    fn register_id_rejects_out_of_range_and_non_numeric() {
        assert_eq!(int_register_id("R32"), None);
        assert_eq!(int_register_id("RX"), None);
        assert_eq!(int_register_id("R5"), Some(5));
    }
}
