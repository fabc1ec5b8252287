//! Order data scraped from the order history and detail pages

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One entry of the order-history page, exactly as scraped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(rename = "rawDateText")]
    pub raw_date_text: String,
    #[serde(rename = "rawAmountText")]
    pub raw_amount_text: String,
    #[serde(rename = "rawNumberText")]
    pub raw_number_text: String,
    /// Absolute URL of the order detail page
    #[serde(rename = "detailLink")]
    pub detail_link: String,
}

/// Typed view of an [`OrderSummary`].
///
/// `amount` is never negative and `currency` is a single currency symbol;
/// the field parsers reject anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOrder {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub currency: char,
    pub number: String,
    #[serde(rename = "detailLink")]
    pub detail_link: String,
}

/// Result of inspecting a detail page for its invoice download link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceLink {
    /// Absolute URL of the invoice PDF
    Found(String),
    /// The page was fetched and parsed but carries no invoice link
    Missing,
}

impl InvoiceLink {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Found(url) => Some(url),
            Self::Missing => None,
        }
    }
}
