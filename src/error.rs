//! Error types shared across the crate.

use thiserror::Error;

/// Errors raised while building a recorder or setting up logging.
///
/// Observation calls never return these: they are recorded at startup,
/// where the caller is expected to abort.
#[derive(Debug, Error)]
pub enum Error {
    /// The metrics backend rejected an instrument descriptor.
    #[error("invalid instrument `{metric}`: {source}")]
    Instrument {
        metric: String,
        #[source]
        source: prometheus::Error,
    },

    /// The registry refused the instrument, usually because the name is taken.
    #[error("failed to register `{metric}`: {source}")]
    Registration {
        metric: String,
        #[source]
        source: prometheus::Error,
    },

    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("failed to install tracing subscriber: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
