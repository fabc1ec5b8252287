//! Order detail expansion
//!
//! Fetches the detail page of every parsed order and looks up its invoice
//! link. Results keep the order of the input list regardless of how many
//! pages are in flight.

use std::sync::Arc;

use futures::{stream, StreamExt, TryStreamExt};
use tracing::debug;

use crate::application::error::ConnectorError;
use crate::domain::order::{InvoiceLink, ParsedOrder};
use crate::domain::services::PageFetcher;
use crate::infrastructure::parsing::{ContextualParser, OrderDetailParser, ParseContext};

/// A parsed order together with what its detail page said about the invoice
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedOrder {
    pub order: ParsedOrder,
    pub invoice: InvoiceLink,
}

pub struct OrderDetailExpander<F: PageFetcher + ?Sized> {
    fetcher: Arc<F>,
    parser: OrderDetailParser,
    max_concurrent: usize,
}

impl<F: PageFetcher + ?Sized> OrderDetailExpander<F> {
    pub fn new(fetcher: Arc<F>, parser: OrderDetailParser, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            parser,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Expand every order, stopping at the first failed fetch.
    ///
    /// With `max_concurrent == 1` no detail page after the failing one is
    /// requested.
    pub async fn expand(&self, orders: Vec<ParsedOrder>) -> Result<Vec<ExpandedOrder>, ConnectorError> {
        debug!(
            "Expanding {} orders, {} detail pages at a time",
            orders.len(),
            self.max_concurrent
        );

        stream::iter(orders)
            .map(|order| self.expand_one(order))
            .buffered(self.max_concurrent)
            .try_collect()
            .await
    }

    async fn expand_one(&self, order: ParsedOrder) -> Result<ExpandedOrder, ConnectorError> {
        let url = order.detail_link.as_str();
        let body = self
            .fetcher
            .fetch_page(url)
            .await
            .map_err(|e| ConnectorError::fetch(format!("detail page of order {}", order.number), e))?;

        let invoice = self
            .parser
            .parse_body(&body, &ParseContext::new(url))
            .map_err(|source| ConnectorError::Page {
                url: url.to_string(),
                source,
            })?;

        debug!("Order {}: {:?}", order.number, invoice);
        Ok(ExpandedOrder { order, invoice })
    }
}
