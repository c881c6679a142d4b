use serde::Serialize;

use crate::release::artifact::FetchResult;
use crate::release::error::FetchError;

/// Final result of resolving one application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ResolutionOutcome {
    Success(FetchResult),
    #[serde(rename_all = "camelCase")]
    SourceUnavailable { detail: String },
    #[serde(rename_all = "camelCase")]
    ParseFailure { detail: String },
    NoCompatibleArtifact,
    #[serde(rename_all = "camelCase")]
    StaleRelease {
        age_in_days: i64,
        threshold_in_days: i64,
    },
}

impl ResolutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionOutcome::Success(_))
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ResolutionOutcome::Success(_) => "success",
            ResolutionOutcome::SourceUnavailable { .. } => "source_unavailable",
            ResolutionOutcome::ParseFailure { .. } => "parse_failure",
            ResolutionOutcome::NoCompatibleArtifact => "no_compatible_artifact",
            ResolutionOutcome::StaleRelease { .. } => "stale_release",
        }
    }
}

impl From<FetchError> for ResolutionOutcome {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Unavailable(detail) => ResolutionOutcome::SourceUnavailable { detail },
            FetchError::Parse(detail) => ResolutionOutcome::ParseFailure { detail },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stale_release_serializes_with_tag_and_camel_case_fields() {
        let outcome = ResolutionOutcome::StaleRelease {
            age_in_days: 10,
            threshold_in_days: 7,
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"outcome": "staleRelease", "ageInDays": 10, "thresholdInDays": 7})
        );
    }

    #[test]
    fn fetch_errors_map_to_distinct_outcomes() {
        assert_eq!(
            ResolutionOutcome::from(FetchError::Unavailable("HTTP 503".to_string())),
            ResolutionOutcome::SourceUnavailable {
                detail: "HTTP 503".to_string()
            }
        );
        assert_eq!(
            ResolutionOutcome::from(FetchError::Parse("missing tag_name".to_string())),
            ResolutionOutcome::ParseFailure {
                detail: "missing tag_name".to_string()
            }
        );
    }
}
