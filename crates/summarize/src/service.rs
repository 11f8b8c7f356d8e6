use crate::error::{Result, SummarizeError};
use async_trait::async_trait;
use regsum_outline::Summary;

/// Remote summarizer.
///
/// Implementations return the raw response content; [`parse_summary`] turns it into
/// a [`Summary`]. Errors returned here are treated as transient and retried.
#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Summarize `text`, located at breadcrumb `position` in the document
    async fn summarize(&self, position: &str, text: &str) -> Result<String>;
}

/// Parse a service response into a [`Summary`]
pub fn parse_summary(raw: &str) -> Result<Summary> {
    serde_json::from_str(raw.trim()).map_err(|err| SummarizeError::malformed(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_response() {
        let raw = r#"{
            "summary": "Developers must publish APIs.",
            "changesFromProposal": "- Deadline moved",
            "keyPointsByAudience": [{"audience": "ehr-developer", "point": "You must publish."}]
        }"#;
        let summary = parse_summary(raw).unwrap();
        assert_eq!(summary.summary, "Developers must publish APIs.");
        assert_eq!(summary.changes_from_proposal.as_deref(), Some("- Deadline moved"));
        assert_eq!(
            summary.key_points_by_audience.unwrap()[0].audience,
            "ehr-developer"
        );
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let summary = parse_summary(r#"{"summary": "Short."}"#).unwrap();
        assert_eq!(summary, Summary::new("Short."));
    }

    #[test]
    fn test_malformed_responses() {
        for raw in ["not json", "{}", r#"{"summary": 3}"#, ""] {
            assert!(
                matches!(parse_summary(raw), Err(SummarizeError::MalformedResponse(_))),
                "accepted {raw:?}"
            );
        }
    }
}
