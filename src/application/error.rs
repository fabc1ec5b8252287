//! Run level error taxonomy
//!
//! Every variant aborts the run; nothing is persisted after an error.

use thiserror::Error;

use crate::domain::services::FetchError;
use crate::infrastructure::authenticator::AuthenticationError;
use crate::infrastructure::parsing::ParsingError;

#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[source] AuthenticationError),

    #[error("Failed to fetch {what}: {source}")]
    Fetch {
        what: String,
        #[source]
        source: FetchError,
    },

    #[error("Unusable page {url}: {source}")]
    Page {
        url: String,
        #[source]
        source: ParsingError,
    },

    #[error("Order entry {index} could not be parsed: {source}")]
    OrderParse {
        index: usize,
        #[source]
        source: ParsingError,
    },

    #[error("Order {number} has no invoice link on {detail_url}")]
    MissingInvoice { number: String, detail_url: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Saving bills failed: {0}")]
    Storage(String),
}

impl ConnectorError {
    pub fn fetch(what: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            what: what.into(),
            source,
        }
    }

    /// True when the portal rejected the credentials or the login page was unusable.
    /// An unreachable login page is a [`Fetch`](Self::Fetch) error instead.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }
}

impl From<AuthenticationError> for ConnectorError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::Fetch(source) => Self::fetch("login", source),
            other => Self::AuthenticationFailed(other),
        }
    }
}
