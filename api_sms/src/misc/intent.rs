/// What an inbound message is asking for. Anything outside the confirm
/// vocabulary is Unknown: it is logged for manual review and causes no
/// state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Confirm,
    Unknown,
}

pub fn parse(body: &str) -> Intent {
    let normalized: String = body
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    match normalized.as_str() {
        "yes" | "y" | "confirm" | "confirmed" | "c" | "ok" | "okay" | "1" => Intent::Confirm,
        _ => Intent::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_keywords_parse() {
        for body in ["yes", "YES", " Yes ", "y", "C", "confirm", "Confirmed", "ok", "OKAY", "1", "Yes!"] {
            assert_eq!(parse(body), Intent::Confirm, "body: {:?}", body);
        }
    }

    #[test]
    fn everything_else_is_unknown() {
        for body in ["no", "cancel", "reschedule please", "", "yess", "2", "call me"] {
            assert_eq!(parse(body), Intent::Unknown, "body: {:?}", body);
        }
    }
}
