//! Infrastructure layer: HTTP transport, HTML parsing, sign-in, bill storage,
//! configuration and logging

pub mod authenticator;
pub mod bill_repository;
pub mod config;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod simple_http_client;

// Re-export commonly used items
pub use authenticator::{AuthenticationError, FormAuthenticator};
pub use bill_repository::FileBillStore;
pub use config::{thomann, AppConfig, ConfigManager};
pub use logging::init_logging_with_config;
pub use parsing::{OrderDetailParser, OrderListParser, ParsingError, ParsingResult};
pub use simple_http_client::{HttpClient, HttpClientConfig};
