//! Error types for collaborator calls and trip planning.

/// Failure talking to a geocoding or routing provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} environment variable is not set")]
    MissingToken(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid provider base URL '{0}'")]
    InvalidUrl(String),

    #[error("{operation} failed with status {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("no results for '{0}'")]
    NoResults(String),

    #[error("no route found for the given coordinates")]
    NoRoute,

    #[error("at least two coordinates are required for routing, got {0}")]
    TooFewCoordinates(usize),
}

/// Errors surfaced by [`crate::planner::plan_trip`].
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Caller input rejected before the engine runs.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A geocoding or routing provider could not answer.
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] ProviderError),
}

pub type Result<T> = core::result::Result<T, PlanError>;
