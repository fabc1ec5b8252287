//! Order-history page parser
//!
//! Turns every order summary block into an [`OrderSummary`]. A block with a
//! missing field fails on its own without affecting its siblings.

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::scrape::{compile_selector, normalize_whitespace, scrape, FieldSpec};
use super::{ContextualParser, OrderListSelectors, ParseContext, ParsingResult};
use crate::domain::order::OrderSummary;

const DATE: &str = "date";
const NUMBER: &str = "number";
const AMOUNT: &str = "amount";
const DETAILS: &str = "details";

/// Parser for the order-history page
pub struct OrderListParser {
    order_entry: Selector,
    fields: Vec<FieldSpec>,
}

impl OrderListParser {
    /// Create parser with default selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&OrderListSelectors::default())
    }

    /// Create parser with custom selector configuration
    pub fn with_config(selectors: &OrderListSelectors) -> ParsingResult<Self> {
        Ok(Self {
            order_entry: compile_selector(&selectors.order_entry)?,
            fields: vec![
                FieldSpec::text(DATE, &selectors.date)?.with_transform(normalize_whitespace),
                FieldSpec::text(NUMBER, &selectors.number)?.with_transform(normalize_whitespace),
                FieldSpec::text(AMOUNT, &selectors.sum)?.with_transform(normalize_whitespace),
                FieldSpec::attr(DETAILS, &selectors.details_link, "href")?,
            ],
        })
    }
}

impl ContextualParser for OrderListParser {
    /// One result per order entry, in page order
    type Output = Vec<ParsingResult<OrderSummary>>;

    fn parse_with_context(&self, html: &Html, context: &ParseContext) -> ParsingResult<Self::Output> {
        let records = scrape(html, &self.order_entry, &self.fields);
        if records.is_empty() {
            warn!("No order entries found on {}", context.url);
        } else {
            debug!("Found {} order entries on {}", records.len(), context.url);
        }

        Ok(records
            .iter()
            .map(|record| -> ParsingResult<OrderSummary> {
                let href = record.require(DETAILS, "order entry")?;
                Ok(OrderSummary {
                    raw_date_text: record.require(DATE, "order entry")?.to_string(),
                    raw_amount_text: record.require(AMOUNT, "order entry")?.to_string(),
                    raw_number_text: record.require(NUMBER, "order entry")?.to_string(),
                    detail_link: context.resolve_url(href)?,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::parsing::ParsingError;

    const ORDER_LIST: &str = r#"
        <html><body>
          <div class="order-entry">
            <div class="order-date">Order placed 05.03.2021</div>
            <div class="order-nr">Order no 123456</div>
            <div class="order-sum">Total: 123,45€</div>
            <div class="details"><a href="/intl/mythomann_order.html?id=123456">Details</a></div>
          </div>
          <div class="order-entry">
            <div class="order-date">
              Order placed
              17.11.2022
            </div>
            <div class="order-nr">Order no 654321</div>
            <div class="order-sum">Total: 1.299,00 €</div>
            <div class="details"><a href="https://www.thomann.de/intl/mythomann_order.html?id=654321">Details</a></div>
          </div>
          <div class="order-entry">
            <div class="order-date">Order placed 01.01.2020</div>
            <div class="order-nr">Order no 111</div>
            <div class="order-sum">Total: 5,00€</div>
          </div>
        </body></html>
    "#;

    fn context() -> ParseContext {
        ParseContext::new("https://www.thomann.de/intl/mythomann_orderlist.html")
    }

    #[test]
    fn test_parser_creation() {
        assert!(OrderListParser::new().is_ok());
    }

    #[test]
    fn extracts_every_order_entry() {
        let parser = OrderListParser::new().unwrap();
        let orders = parser.parse_body(ORDER_LIST, &context()).unwrap();
        assert_eq!(orders.len(), 3);

        let first = orders[0].as_ref().unwrap();
        assert_eq!(first.raw_date_text, "Order placed 05.03.2021");
        assert_eq!(first.raw_number_text, "Order no 123456");
        assert_eq!(first.raw_amount_text, "Total: 123,45€");
        assert_eq!(
            first.detail_link,
            "https://www.thomann.de/intl/mythomann_order.html?id=123456"
        );

        let second = orders[1].as_ref().unwrap();
        assert_eq!(second.raw_date_text, "Order placed 17.11.2022");
        assert_eq!(second.raw_amount_text, "Total: 1.299,00 €");
    }

    #[test]
    fn entry_without_details_link_fails_alone() {
        let parser = OrderListParser::new().unwrap();
        let orders = parser.parse_body(ORDER_LIST, &context()).unwrap();

        assert!(orders[0].is_ok());
        assert!(orders[1].is_ok());
        assert!(matches!(
            &orders[2],
            Err(ParsingError::RequiredFieldMissing { field, .. }) if field == "details"
        ));
    }

    #[test]
    fn page_without_orders_yields_nothing() {
        let parser = OrderListParser::new().unwrap();
        let orders = parser
            .parse_body("<html><body><p>No orders yet</p></body></html>", &context())
            .unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn custom_selectors_are_honoured() {
        let selectors = OrderListSelectors {
            order_entry: "tr.order".to_string(),
            date: "td.d".to_string(),
            number: "td.n".to_string(),
            sum: "td.s".to_string(),
            details_link: "td.l a".to_string(),
        };
        let parser = OrderListParser::with_config(&selectors).unwrap();
        let html = r#"<table><tr class="order"><td class="d">on 02.02.2022</td><td class="n">No 9</td>
            <td class="s">Sum: 3,50£</td><td class="l"><a href="o/9">x</a></td></tr></table>"#;

        let orders = parser.parse_body(html, &context()).unwrap();
        let order = orders[0].as_ref().unwrap();
        assert_eq!(order.raw_number_text, "No 9");
        assert_eq!(order.detail_link, "https://www.thomann.de/intl/o/9");
    }
}
