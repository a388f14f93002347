//! Error fingerprinting
//!
//! The fingerprint collapses volatile parts of a message so recurring errors
//! with different payloads land in one bucket: digit runs always become a
//! placeholder, and quoted literals become one when they carry digits (a
//! quoted identifier like 'name' stays, so structurally different errors at
//! the same location keep separate buckets). The source location is appended
//! because identical messages from different call sites are different bugs.

use diag_types::domains::events::{ErrorEvent, ErrorFingerprint};

/// Derive the deduplication key for an event
pub fn fingerprint_event(event: &ErrorEvent) -> ErrorFingerprint {
    let file = event.source_file.as_deref().unwrap_or("<unknown>");
    let line = event.line.unwrap_or(0);
    ErrorFingerprint(format!(
        "{}@{}:{}",
        normalize_message(&event.message),
        file,
        line
    ))
}

/// Collapse volatile literals in a message
pub fn normalize_message(message: &str) -> String {
    collapse_digit_runs(&collapse_volatile_quotes(message))
}

/// Replace quoted literals containing digits with a placeholder
fn collapse_volatile_quotes(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let chars: Vec<char> = message.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' || c == '"' {
            if let Some(close) = chars[i + 1..].iter().position(|&other| other == c) {
                let literal: String = chars[i + 1..i + 1 + close].iter().collect();
                if literal.chars().any(|ch| ch.is_ascii_digit()) {
                    out.push(c);
                    out.push_str("<str>");
                    out.push(c);
                } else {
                    out.push(c);
                    out.push_str(&literal);
                    out.push(c);
                }
                i += close + 2;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

/// Replace maximal digit runs with a placeholder
fn collapse_digit_runs(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut in_run = false;

    for c in message.chars() {
        if c.is_ascii_digit() {
            if !in_run {
                out.push_str("<num>");
                in_run = true;
            }
        } else {
            in_run = false;
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_runs_collapse() {
        assert_eq!(
            normalize_message("Request failed with status 503 after 3000ms"),
            "Request failed with status <num> after <num>ms"
        );
    }

    #[test]
    fn test_identifier_quotes_are_kept() {
        assert_eq!(
            normalize_message("Cannot read property 'name' of undefined"),
            "Cannot read property 'name' of undefined"
        );
    }

    #[test]
    fn test_volatile_quotes_collapse() {
        assert_eq!(
            normalize_message("File 'report_1234.pdf' not found"),
            "File '<str>' not found"
        );
        assert_eq!(
            normalize_message("Session \"a1b2c3\" expired"),
            "Session \"<str>\" expired"
        );
    }

    #[test]
    fn test_unterminated_quote_left_alone() {
        assert_eq!(normalize_message("it's fine"), "it's fine");
    }

    #[test]
    fn test_fingerprint_includes_location() {
        let a = fingerprint_event(&ErrorEvent::new("boom", 0).with_source("a.js", 10));
        let b = fingerprint_event(&ErrorEvent::new("boom", 0).with_source("b.js", 10));
        let c = fingerprint_event(&ErrorEvent::new("boom", 0).with_source("a.js", 10));
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_fingerprint_is_idempotent_across_payloads() {
        let a = fingerprint_event(
            &ErrorEvent::new("Timeout after 3000ms", 0).with_source("net.js", 7),
        );
        let b = fingerprint_event(
            &ErrorEvent::new("Timeout after 5000ms", 99).with_source("net.js", 7),
        );
        assert_eq!(a, b);
    }
}
