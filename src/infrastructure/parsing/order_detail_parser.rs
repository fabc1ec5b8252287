//! Order detail page parser: locates the invoice download link

use scraper::{Html, Selector};
use tracing::debug;

use super::scrape::compile_selector;
use super::{ContextualParser, OrderDetailSelectors, ParseContext, ParsingResult};
use crate::domain::order::InvoiceLink;

pub struct OrderDetailParser {
    invoice_link: Selector,
}

impl OrderDetailParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&OrderDetailSelectors::default())
    }

    pub fn with_config(selectors: &OrderDetailSelectors) -> ParsingResult<Self> {
        Ok(Self {
            invoice_link: compile_selector(&selectors.invoice_link)?,
        })
    }
}

impl ContextualParser for OrderDetailParser {
    type Output = InvoiceLink;

    fn parse_with_context(&self, html: &Html, context: &ParseContext) -> ParsingResult<Self::Output> {
        let mut links = html.select(&self.invoice_link);
        let Some(href) = links.next().and_then(|a| a.value().attr("href")) else {
            debug!("No invoice link on {}", context.url);
            return Ok(InvoiceLink::Missing);
        };

        let extra = links.count();
        if extra > 0 {
            debug!("{} additional invoice links on {}, using the first", extra, context.url);
        }

        Ok(InvoiceLink::Found(context.resolve_url(href)?))
    }
}
