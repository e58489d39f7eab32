use thiserror::Error;

/// Errors surfaced to the dashboard.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashError {
    /// An aggregate was requested over a view with no usable values.
    #[error("no data for {column}")]
    EmptyView { column: &'static str },

    /// The dataset could not be loaded at startup.
    #[error("failed to load dataset from {origin}: {reason}")]
    Configuration { origin: String, reason: String },
}

impl DashError {
    /// Wrap a loader failure. The full `anyhow` context chain is kept in `reason`.
    pub fn configuration(origin: impl Into<String>, err: &anyhow::Error) -> Self {
        DashError::Configuration {
            origin: origin.into(),
            reason: format!("{err:#}"),
        }
    }
}

pub type DashResult<T> = Result<T, DashError>;
