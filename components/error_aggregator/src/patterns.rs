//! Rule-based error diagnosis
//!
//! String-containment heuristics mapping a message onto a likely cause and a
//! matching suggested fix. Deliberately coarse; anything unrecognized is
//! reported as unknown rather than guessed at.

/// Likely cause and suggested fix for an error message
pub fn diagnose(message: &str) -> (String, String) {
    let lowered = message.to_lowercase();

    if lowered.contains("undefined") || lowered.contains("null") {
        return (
            "reference error".to_string(),
            "Guard the access with a null/undefined check before dereferencing".to_string(),
        );
    }

    if lowered.contains("network") || lowered.contains("fetch") {
        return (
            "network failure".to_string(),
            "Verify the endpoint is reachable and add retry handling for transient failures"
                .to_string(),
        );
    }

    (
        "unknown".to_string(),
        "Inspect the stack trace at the recorded source location".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_errors() {
        assert_eq!(
            diagnose("Cannot read property 'x' of undefined").0,
            "reference error"
        );
        assert_eq!(diagnose("TypeError: null is not an object").0, "reference error");
    }

    #[test]
    fn test_network_failures() {
        assert_eq!(diagnose("Failed to fetch").0, "network failure");
        assert_eq!(diagnose("NetworkError when attempting a request").0, "network failure");
    }

    #[test]
    fn test_unknown_fallback() {
        let (cause, fix) = diagnose("Maximum call stack size exceeded");
        assert_eq!(cause, "unknown");
        assert!(!fix.is_empty());
    }
}
