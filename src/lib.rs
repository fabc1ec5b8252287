//! Thomann bills connector
//!
//! Signs in to the thomann.de customer portal, reads the order history,
//! resolves the invoice PDF of every order and stores the bills locally.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the entry points used by the binary and integration tests
pub use application::{BillConnector, ConnectorError, RunReport};
pub use domain::{AccountFields, BillRecord};
pub use infrastructure::{AppConfig, ConfigManager, FileBillStore, HttpClient};
