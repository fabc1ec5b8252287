//! Application layer
//!
//! Sequences sign-in, order list scraping, detail page expansion and record
//! assembly, and hands the result to the persistence collaborator.

pub mod bill_connector;
pub mod error;
pub mod order_detail_expander;
pub mod record_assembler;

pub use bill_connector::{BillConnector, RunReport};
pub use error::ConnectorError;
pub use order_detail_expander::{ExpandedOrder, OrderDetailExpander};
pub use record_assembler::RecordAssembler;
