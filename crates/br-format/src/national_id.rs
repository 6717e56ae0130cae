//! CPF (Brazilian national id) formatting.

/// Number of digits in a CPF.
pub const NATIONAL_ID_LENGTH: usize = 11;

/// Keep only the ASCII digits of `input`.
pub fn normalize_national_id(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Punctuate a CPF progressively into `NNN.NNN.NNN-NN`.
///
/// More than 11 digits are returned unformatted.
pub fn format_national_id_for_display(input: &str) -> String {
    let digits = normalize_national_id(input);

    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        10..=NATIONAL_ID_LENGTH => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        ),
        _ => digits,
    }
}

/// Only the digit count is checked; check digits are not verified.
pub fn is_national_id_valid(input: &str) -> bool {
    normalize_national_id(input).len() == NATIONAL_ID_LENGTH
}
