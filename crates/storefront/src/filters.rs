//! Text helpers for listings.

use chrono::{DateTime, Utc};

/// Title length shown in product cards.
pub const CARD_TITLE_CHARS: usize = 30;

/// Description length shown in product cards.
pub const CARD_DESCRIPTION_CHARS: usize = 60;

/// Cut `text` to `max_chars` characters, appending `...` when shortened.
///
/// Counts characters, not bytes, so multi-byte text is never split.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{head}...")
}

/// Calendar date as `dd/mm/yyyy`.
#[must_use]
pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Classic Shirt", 30), "Classic Shirt");
        assert_eq!(truncate_text("abcdef", 6), "abcdef");
        assert_eq!(truncate_text("abcdefg", 6), "abcdef...");
        assert_eq!(truncate_text("", 3), "");
    }

    #[test]
    fn test_truncate_text_multibyte() {
        assert_eq!(truncate_text("Camiseta Básica Algodão", 14), "Camiseta Básic...");
        assert_eq!(truncate_text("ããã", 2), "ãã...");
    }

    #[test]
    fn test_format_date() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 12, 0, 0).single();
        assert_eq!(at.map(|at| format_date(&at)).as_deref(), Some("07/03/2025"));
    }
}
