//! Bill record assembly and filename derivation

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::bill::{BillMetadata, BillRecord, BILL_SCHEMA_VERSION};
use crate::domain::order::ParsedOrder;

pub struct RecordAssembler {
    vendor: String,
}

impl RecordAssembler {
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
        }
    }

    /// `{YYYY-MM-DD}_{vendor}_{amount:.2}{currency}_{number}.pdf`
    ///
    /// Deterministic for a given order; the order number keeps same-day,
    /// same-amount orders apart.
    pub fn bill_filename(&self, order: &ParsedOrder) -> String {
        format!(
            "{}_{}_{}{}_{}.pdf",
            order.date.format("%Y-%m-%d"),
            sanitize_component(&self.vendor),
            format_amount(order.amount),
            order.currency,
            sanitize_component(&order.number),
        )
    }

    pub fn assemble(&self, order: &ParsedOrder, fileurl: &str, import_date: DateTime<Utc>) -> BillRecord {
        BillRecord {
            vendor: self.vendor.clone(),
            date: order.date,
            amount: order.amount,
            currency: order.currency,
            fileurl: fileurl.to_string(),
            filename: self.bill_filename(order),
            metadata: BillMetadata {
                import_date,
                version: BILL_SCHEMA_VERSION,
            },
        }
    }
}

/// Amount with exactly two decimal digits
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Path separators would turn a filename into a path
fn sanitize_component(value: &str) -> String {
    value.replace(['/', '\\'], "-")
}
