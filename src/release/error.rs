use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Failure of a single upstream integration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure, timeout or non-success status. Transient.
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// The upstream answered, but the expected data could not be located.
    #[error("Parse failure: {0}")]
    Parse(String),
}

impl From<TransportError> for FetchError {
    fn from(e: TransportError) -> Self {
        FetchError::Unavailable(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    #[error("No numeric run in version text: {0:?}")]
    NoNumericRun(String),

    #[error("Version component out of range in {0:?}")]
    ComponentOverflow(String),
}

impl From<VersionParseError> for FetchError {
    fn from(e: VersionParseError) -> Self {
        FetchError::Parse(e.to_string())
    }
}
