/// Pulls the SQL statement out of a free-text completion
///
/// Order of preference:
/// 1. the first ```sql fenced block
/// 2. the first fenced block of any language
/// 3. the raw text, minus leading conversational phrases and any trailing
///    explanation paragraph

use once_cell::sync::Lazy;
use regex::Regex;

static SQL_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```[ \t]*sql\b[ \t]*\r?\n?(.*?)```").unwrap());

static ANY_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").unwrap());

static CONVERSATIONAL_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:sure|certainly|of course|okay|ok|absolutely|great)\b[!,.]*\s*|^\s*here(?:'s| is) (?:the|your|an?) (?:\w+ )*?(?:sql|query|statement)[^:\n]*:\s*|^\s*(?:sql|query)\s*:\s*",
    )
    .unwrap()
});

static PARAGRAPH_BREAK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());

// A paragraph that opens like this still belongs to the statement
static SQL_CONTINUATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:[(),]|(?:select|from|where|group|order|having|limit|offset|join|left|right|inner|outer|full|cross|union|intersect|except)\b)",
    )
    .unwrap()
});

static STATEMENT_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:select|with)\b").unwrap());

/// Returns `None` when nothing resembling a statement is left.
pub fn extract_sql(completion: &str) -> Option<String> {
    let candidate = if let Some(caps) = SQL_FENCE_REGEX.captures(completion) {
        caps.get(1).map_or("", |m| m.as_str()).to_string()
    } else if let Some(caps) = ANY_FENCE_REGEX.captures(completion) {
        caps.get(1).map_or("", |m| m.as_str()).to_string()
    } else {
        strip_conversation(completion)
    };

    let sql = candidate.trim().trim_end_matches(';').trim_end();
    if sql.is_empty() {
        None
    } else {
        Some(sql.to_string())
    }
}

fn strip_conversation(text: &str) -> String {
    let mut remaining = text.trim();

    // Prefixes can stack: "Sure! Here is the SQL query:"
    while let Some(found) = CONVERSATIONAL_PREFIX_REGEX.find(remaining) {
        if found.as_str().is_empty() {
            break;
        }
        remaining = remaining[found.end()..].trim_start();
    }

    if let Some(start) = STATEMENT_START_REGEX.find(remaining) {
        remaining = &remaining[start.start()..];
    }

    // The statement ends at its first `;`, or at the first paragraph that
    // reads as prose rather than SQL
    if let Some(end) = remaining.find(';') {
        remaining = &remaining[..end];
    }

    let mut paragraphs = PARAGRAPH_BREAK_REGEX.split(remaining);
    let mut statement = paragraphs.next().unwrap_or_default().trim().to_string();
    for paragraph in paragraphs {
        if !SQL_CONTINUATION_REGEX.is_match(paragraph) {
            break;
        }
        statement.push('\n');
        statement.push_str(paragraph.trim());
    }

    statement
}
