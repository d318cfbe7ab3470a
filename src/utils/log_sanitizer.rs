// ============================================================================
// Log Sanitization
// ============================================================================
//
// Questions and generated SQL are user-influenced text. Before they reach the
// logs they are flattened to one line, stripped of ANSI escape sequences and
// control characters, and truncated.
//
// ============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters kept from logged user input
const MAX_LOG_LENGTH: usize = 200;

static ANSI_ESCAPE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap());

/// Sanitize user input for safe logging
///
/// ```
/// use servicedesk_insights::utils::log_sanitizer::sanitize_for_log;
///
/// assert_eq!(
///     sanitize_for_log("open requests\nINFO: fake entry"),
///     "open requests INFO: fake entry"
/// );
/// assert_eq!(sanitize_for_log("test\x1b[31mred\x1b[0m"), "testred");
/// ```
pub fn sanitize_for_log(input: &str) -> String {
    let no_ansi = ANSI_ESCAPE_REGEX.replace_all(input, "");

    let cleaned: String = no_ansi
        .chars()
        .filter_map(|c| match c {
            '\n' | '\r' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    match cleaned.char_indices().nth(MAX_LOG_LENGTH) {
        Some((cut, _)) => format!("{}...", &cleaned[..cut]),
        None => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_removes_newlines() {
        let result = sanitize_for_log("revenue by city\r\nINFO: Fake log entry");
        assert!(!result.contains('\n'));
        assert!(!result.contains('\r'));
        assert_eq!(result, "revenue by city  INFO: Fake log entry");
    }

    #[test]
    fn test_sanitize_removes_ansi_and_control_chars() {
        assert_eq!(sanitize_for_log("test\x1b[31mred text\x1b[0m"), "testred text");
        assert_eq!(sanitize_for_log("test\x00\x01\x02data\x7f"), "testdata");
    }

    #[test]
    fn test_sanitize_replaces_tabs() {
        assert_eq!(sanitize_for_log("city\tcount"), "city count");
    }

    #[test]
    fn test_sanitize_truncates_long_strings() {
        let result = sanitize_for_log(&"a".repeat(300));
        assert_eq!(result.len(), MAX_LOG_LENGTH + 3);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let result = sanitize_for_log(&"é".repeat(250));
        assert_eq!(result.chars().count(), MAX_LOG_LENGTH + 3);
    }

    #[test]
    fn test_sanitize_preserves_sql() {
        let sql = "SELECT city, COUNT(*) FROM locations WHERE state = 'TX' GROUP BY city";
        assert_eq!(sanitize_for_log(sql), sql);
    }
}
