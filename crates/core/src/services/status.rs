//! Complaint status codes and display names.

/// Status code: freshly submitted.
pub const NEW: &str = "NEW";
/// Status code: acknowledged.
pub const OPEN: &str = "OPEN";
/// Status code: being worked on.
pub const IN_PROGRESS: &str = "IN_PROGRESS";
/// Status code: awaiting review.
pub const UNDER_REVIEW: &str = "UNDER_REVIEW";
/// Status code: resolved.
pub const RESOLVED: &str = "RESOLVED";
/// Status code: closed.
pub const CLOSED: &str = "CLOSED";
/// Status code: escalated to an authority.
pub const ESCALATED: &str = "ESCALATED";

/// Status codes that end a complaint's lifecycle.
pub const CLOSED_CODES: [&str; 2] = [RESOLVED, CLOSED];

/// Human-readable name for a status code.
///
/// Unknown codes fall back to the code itself, so ad-hoc statuses still
/// render.
#[must_use]
pub fn display_for_code(code: &str) -> String {
    match code {
        NEW => "New".to_string(),
        OPEN => "Open".to_string(),
        IN_PROGRESS => "In Progress".to_string(),
        UNDER_REVIEW => "Under Review".to_string(),
        RESOLVED => "Resolved".to_string(),
        CLOSED => "Closed".to_string(),
        ESCALATED => "Escalated".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(display_for_code("NEW"), "New");
        assert_eq!(display_for_code("IN_PROGRESS"), "In Progress");
        assert_eq!(display_for_code("UNDER_REVIEW"), "Under Review");
        assert_eq!(display_for_code("ESCALATED"), "Escalated");
    }

    #[test]
    fn test_unknown_code_falls_back_to_itself() {
        assert_eq!(display_for_code("ON_HOLD"), "ON_HOLD");
    }
}
