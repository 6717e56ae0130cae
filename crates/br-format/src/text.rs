//! Free-text field cleanup.

/// Length of the SMS verification code.
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Trim leading and trailing whitespace, keeping inner spacing as typed.
pub fn clean_name(input: &str) -> String {
    input.trim().to_string()
}

/// Keep the digits of a verification code, truncated to `max_len`.
pub fn normalize_verification_code(input: &str, max_len: usize) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(max_len)
        .collect()
}
