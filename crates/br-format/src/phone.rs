//! Brazilian phone number formatting.

/// Country calling code for Brazil.
pub const BRAZIL_COUNTRY_CODE: &str = "55";

/// Keep only the ASCII digits of `input`.
pub fn normalize_phone_digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Punctuate a phone number progressively as digits are typed.
///
/// Produces `(DD) NNNNN-NNNN` once all 11 digits are present, with
/// intermediate shapes for shorter input. More than 11 digits are
/// returned unformatted.
pub fn format_phone_for_display(input: &str) -> String {
    let digits = normalize_phone_digits(input);

    match digits.len() {
        0..=2 => digits,
        3..=6 => format!("({}) {}", &digits[..2], &digits[2..]),
        7..=10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        _ => digits,
    }
}

/// Convert a local phone number to E.164 (`+<country code><digits>`).
pub fn to_e164(input: &str, country_code: &str) -> String {
    let country = normalize_phone_digits(country_code);
    format!("+{}{}", country, normalize_phone_digits(input))
}

/// A phone number is valid when it has 10 (landline) or 11 (mobile) digits.
pub fn is_phone_valid(input: &str) -> bool {
    matches!(normalize_phone_digits(input).len(), 10 | 11)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_digits() {
        assert_eq!(normalize_phone_digits("(11) 99999-9999"), "11999999999");
        assert_eq!(normalize_phone_digits("+55 11 9"), "55119");
        assert_eq!(normalize_phone_digits("abc"), "");
        assert_eq!(normalize_phone_digits(""), "");
    }

    #[test]
    fn test_format_phone_each_digit_count() {
        let full = "11987654321";
        let expected = [
            "",
            "1",
            "11",
            "(11) 9",
            "(11) 98",
            "(11) 987",
            "(11) 9876",
            "(11) 9876-5",
            "(11) 9876-54",
            "(11) 9876-543",
            "(11) 9876-5432",
            "(11) 98765-4321",
        ];

        for (count, shape) in expected.iter().enumerate() {
            assert_eq!(
                format_phone_for_display(&full[..count]),
                *shape,
                "digit count {}",
                count
            );
        }
    }

    #[test]
    fn test_format_phone_ignores_existing_punctuation() {
        assert_eq!(format_phone_for_display("(11) 98765-4321"), "(11) 98765-4321");
        assert_eq!(format_phone_for_display("11 3456 7890"), "(11) 3456-7890");
    }

    #[test]
    fn test_format_phone_too_long_is_raw() {
        assert_eq!(format_phone_for_display("119876543210"), "119876543210");
        assert_eq!(format_phone_for_display("+55 (11) 98765-4321"), "5511987654321");
    }

    #[test]
    fn test_format_phone_is_stable() {
        let once = format_phone_for_display("1198765");
        assert_eq!(format_phone_for_display(&once), once);
    }

    #[test]
    fn test_to_e164() {
        assert_eq!(to_e164("11999999999", BRAZIL_COUNTRY_CODE), "+5511999999999");
        assert_eq!(to_e164("(11) 99999-9999", "55"), "+5511999999999");
        assert_eq!(to_e164("11999999999", "+55"), "+5511999999999");
    }

    #[test]
    fn test_to_e164_round_trips_with_normalize() {
        for digits in ["1133334444", "11999999999", "2"] {
            assert_eq!(
                normalize_phone_digits(&to_e164(digits, BRAZIL_COUNTRY_CODE)),
                format!("{}{}", BRAZIL_COUNTRY_CODE, digits)
            );
        }
    }

    #[test]
    fn test_is_phone_valid() {
        assert!(!is_phone_valid(""));
        assert!(!is_phone_valid("119999999"));
        assert!(is_phone_valid("1133334444"));
        assert!(is_phone_valid("11999999999"));
        assert!(is_phone_valid("(11) 99999-9999"));
        assert!(!is_phone_valid("119999999999"));
    }
}
