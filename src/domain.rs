//! Domain module - orders, bills and the collaborator seams

pub mod account;
pub mod bill;
pub mod order;
pub mod services;

pub use account::AccountFields;
pub use bill::{BillMetadata, BillRecord, BILL_SCHEMA_VERSION};
pub use order::{InvoiceLink, OrderSummary, ParsedOrder};
