//! Bill records handed to the persistence collaborator

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Schema version stamped into every record's metadata
pub const BILL_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillMetadata {
    /// Wall-clock time the record was assembled
    #[serde(rename = "importDate")]
    pub import_date: DateTime<Utc>,
    pub version: u32,
}

/// Final output record, one per invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    pub vendor: String,
    pub date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: char,
    pub fileurl: String,
    pub filename: String,
    pub metadata: BillMetadata,
}

impl BillRecord {
    /// Compare two records ignoring `metadata.import_date`
    pub fn same_content(&self, other: &Self) -> bool {
        self.vendor == other.vendor
            && self.date == other.date
            && self.amount == other.amount
            && self.currency == other.currency
            && self.fileurl == other.fileurl
            && self.filename == other.filename
            && self.metadata.version == other.metadata.version
    }
}
