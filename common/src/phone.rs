//! Phone numbers are stored in a digits-only canonical form so that
//! formatting differences never create duplicate clients.

/// Normalizes a phone number to its canonical digits-only form.
///
/// Strips every non-digit character, then drops a leading US country
/// code from 11-digit numbers, so `(714) 555-0100`, `714-555-0100` and
/// `17145550100` all normalize to `7145550100`.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

/// Returns the trailing 10 digits of a number, used to match inbound
/// message senders against stored clients regardless of country-code
/// prefixes added by the messaging gateway.
pub fn last_ten_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 10 {
        digits[digits.len() - 10..].to_string()
    } else {
        digits
    }
}

/// Renders a canonical number in E.164 form for the messaging gateway.
/// Ten-digit numbers are assumed to be US.
pub fn to_e164(canonical: &str) -> String {
    if canonical.len() == 10 {
        format!("+1{}", canonical)
    } else {
        format!("+{}", canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_format_insensitive() {
        assert_eq!(normalize("(714) 555-0100"), "7145550100");
        assert_eq!(normalize("714-555-0100"), "7145550100");
        assert_eq!(normalize("17145550100"), "7145550100");
        assert_eq!(normalize("+1 714 555 0100"), "7145550100");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize("(714) 555-0100");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_keeps_non_us_lengths() {
        assert_eq!(normalize("5550100"), "5550100");
        assert_eq!(normalize("447145550100"), "447145550100");
    }

    #[test]
    fn to_e164_assumes_us_for_ten_digits() {
        assert_eq!(to_e164("7145550100"), "+17145550100");
        assert_eq!(to_e164("447145550100"), "+447145550100");
    }

    #[test]
    fn last_ten_digits_drops_country_code() {
        assert_eq!(last_ten_digits("+17145550100"), "7145550100");
        assert_eq!(last_ten_digits("7145550100"), "7145550100");
        assert_eq!(last_ten_digits("555-0100"), "5550100");
    }
}
