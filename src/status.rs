use crate::models::ResultRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single result, inferred from its output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Incomplete,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Success => "success",
            Status::Incomplete => "incomplete",
            Status::Error => "error",
        };
        f.write_str(label)
    }
}

/// Classify a result by its output content
pub fn classify(record: &ResultRecord) -> Status {
    classify_content(record.output_content.as_deref())
}

/// Classify raw output content; first matching rule wins
pub fn classify_content(content: Option<&str>) -> Status {
    match content {
        None => Status::Incomplete,
        Some(text) if text.trim().is_empty() => Status::Incomplete,
        Some(text) if text.contains("error") || text.contains("Error") => Status::Error,
        Some(_) => Status::Success,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(content: Option<&str>) -> ResultRecord {
        ResultRecord {
            id: "r1".to_string(),
            output_content: content.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_and_missing_are_incomplete() {
        assert_eq!(classify(&record_with(None)), Status::Incomplete);
        assert_eq!(classify(&record_with(Some(""))), Status::Incomplete);
        assert_eq!(classify(&record_with(Some("   "))), Status::Incomplete);
        assert_eq!(classify(&record_with(Some("\n\t"))), Status::Incomplete);
    }

    #[test]
    fn test_error_markers() {
        assert_eq!(classify(&record_with(Some("Error: timeout"))), Status::Error);
        assert_eq!(classify(&record_with(Some("an error occurred"))), Status::Error);
        assert_eq!(classify(&record_with(Some("  Error  "))), Status::Error);
    }

    #[test]
    fn test_error_match_is_case_sensitive() {
        assert_eq!(classify(&record_with(Some("ERROR"))), Status::Success);
    }

    #[test]
    fn test_success() {
        assert_eq!(classify(&record_with(Some("All good"))), Status::Success);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let record = record_with(Some("Error: timeout"));
        assert_eq!(classify(&record), classify(&record));
        assert_eq!(record.output_content.as_deref(), Some("Error: timeout"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::Incomplete.to_string(), "incomplete");
        assert_eq!(serde_json::to_string(&Status::Error).unwrap(), "\"error\"");
    }
}
