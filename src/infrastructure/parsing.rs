//! HTML parsing for the order-history and order-detail pages
//!
//! Selectors are compiled once from [`SelectorConfig`]; field extraction goes
//! through the declarative [`scrape`] routine and the pure parsers in
//! [`field_parsers`].

pub mod config;
pub mod context;
pub mod field_parsers;
pub mod order_detail_parser;
pub mod order_list_parser;
pub mod scrape;

pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use config::{LoginSelectors, OrderDetailSelectors, OrderListSelectors, SelectorConfig};
pub use context::ParseContext;
pub use order_detail_parser::OrderDetailParser;
pub use order_list_parser::OrderListParser;

use scraper::Html;

/// Parser over an already-parsed document
pub trait ContextualParser {
    type Output;

    /// Parse HTML with contextual information
    fn parse_with_context(&self, html: &Html, context: &ParseContext) -> ParsingResult<Self::Output>;

    /// Parse a raw response body.
    ///
    /// `Html` is not `Send`, so async callers parse through this method and
    /// never hold the document across an await point.
    fn parse_body(&self, body: &str, context: &ParseContext) -> ParsingResult<Self::Output> {
        let html = Html::parse_document(body);
        self.parse_with_context(&html, context)
    }
}
