//! Parsing error types for scraped order data
//!
//! Every variant carries the offending text so a layout change on the
//! vendor side shows up in the logs with enough context to fix the selector
//! or parser that broke.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("Invalid order date in '{text}': expected a trailing DD.MM.YYYY token")]
    InvalidDate { text: String },

    #[error("Invalid order amount in '{text}': {reason}")]
    InvalidAmount { text: String, reason: String },

    #[error("Invalid currency in '{text}': '{found}' is not a currency symbol")]
    InvalidCurrency { text: String, found: String },

    #[error("No order number found in '{text}'")]
    MissingOrderNumber { text: String },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Required field '{field}' not found in HTML")]
    RequiredFieldMissing {
        field: String,
        context: Option<String>,
    },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },

    #[error("No form matching '{selector}' on {url}")]
    FormNotFound { selector: String, url: String },
}

impl ParsingError {
    /// Create a required field missing error with context
    pub fn required_field_missing(field: &str, context: Option<&str>) -> Self {
        Self::RequiredFieldMissing {
            field: field.to_string(),
            context: context.map(|s| s.to_string()),
        }
    }

    pub fn invalid_amount(text: &str, reason: &str) -> Self {
        Self::InvalidAmount {
            text: text.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Name of the order field this error concerns, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidDate { .. } => Some("date"),
            Self::InvalidAmount { .. } => Some("amount"),
            Self::InvalidCurrency { .. } => Some("currency"),
            Self::MissingOrderNumber { .. } => Some("number"),
            Self::RequiredFieldMissing { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
