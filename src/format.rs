//! Field formatting and syntax checks for free-text inputs.

use std::sync::LazyLock;

use regex::Regex;

/// `local@domain.tld` shape: no whitespace, exactly one `@`, a dot after it.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

fn digits_of(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Mask a phone number as `(XXX) XXX-XXXX`, progressively as digits arrive.
///
/// Non-digits are discarded and anything past ten digits is dropped.
pub fn format_phone_number(value: &str) -> String {
    let digits = digits_of(value);
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => {
            let end = digits.len().min(10);
            format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..end])
        }
    }
}

/// Mask a dollar amount as `$12,345`. Returns an empty string when no digits are present.
pub fn format_currency(value: &str) -> String {
    let digits = digits_of(value);
    if digits.is_empty() {
        return String::new();
    }

    let trimmed = digits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };

    let mut grouped = String::with_capacity(trimmed.len() + trimmed.len() / 3 + 1);
    for (i, c) in trimmed.chars().enumerate() {
        if i > 0 && (trimmed.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${grouped}")
}

/// Light email syntax validation.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_full_number() {
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
    }

    #[test]
    fn phone_partial_numbers() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("55"), "55");
        assert_eq!(format_phone_number("555"), "555");
        assert_eq!(format_phone_number("5551"), "(555) 1");
        assert_eq!(format_phone_number("555123"), "(555) 123");
        assert_eq!(format_phone_number("5551234"), "(555) 123-4");
    }

    #[test]
    fn phone_strips_punctuation_and_extra_digits() {
        assert_eq!(format_phone_number("(555) 123-4567"), "(555) 123-4567");
        assert_eq!(format_phone_number("+1 555.123.45678"), "(155) 512-3456");
        assert_eq!(format_phone_number("555123456789"), "(555) 123-4567");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency("25000"), "$25,000");
        assert_eq!(format_currency("$1,234,567"), "$1,234,567");
        assert_eq!(format_currency("999"), "$999");
        assert_eq!(format_currency("0042"), "$42");
        assert_eq!(format_currency("000"), "$0");
    }

    #[test]
    fn currency_without_digits_is_empty() {
        assert_eq!(format_currency(""), "");
        assert_eq!(format_currency("abc"), "");
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("jane x@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("jane@@x.com"));
        assert!(!is_valid_email(""));
    }
}
