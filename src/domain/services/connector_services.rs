//! Collaborator traits used by the bill connector
//!
//! The connector itself only sequences work; moving bytes over HTTP and
//! storing invoices are delegated to implementations of these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::account::AccountFields;
use crate::domain::bill::BillRecord;

/// Transport level failure of a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP request to {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("HTTP error {status}: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },
}

/// Response of a form submission.
///
/// The status is informational only; callers decide success from the body.
#[derive(Debug, Clone)]
pub struct FormResponse {
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    pub body: String,
}

/// Raw downloaded file
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// HTTP + HTML fetch collaborator
///
/// Implementations keep a cookie session across calls.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page and return its body; non-success statuses are errors
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;

    /// POST url-encoded form fields; any HTTP status is returned as-is
    async fn submit_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<FormResponse, FetchError>;

    /// GET a binary resource
    async fn download(&self, url: &str) -> Result<Download, FetchError>;
}

/// Options forwarded to the persistence collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOptions {
    pub identifiers: Vec<String>,
    #[serde(rename = "contentType")]
    pub content_type: String,
}

impl SaveOptions {
    pub fn pdf_for_vendor(vendor: &str) -> Self {
        Self {
            identifiers: vec![vendor.to_string()],
            content_type: "application/pdf".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub saved: usize,
    /// Bills whose filename was already stored
    pub skipped: usize,
}

/// Persistence collaborator (`saveBills` equivalent)
#[async_trait]
pub trait BillSaver: Send + Sync {
    async fn save_bills(
        &self,
        bills: &[BillRecord],
        fields: &AccountFields,
        options: &SaveOptions,
    ) -> anyhow::Result<SaveSummary>;
}
