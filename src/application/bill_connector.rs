//! Bill connector run
//!
//! One run signs in, reads the order history, resolves every order's invoice
//! link, assembles the bill records and, when asked to, hands them to the
//! persistence collaborator. Any fetch failure aborts the run before
//! anything is saved.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::error::ConnectorError;
use crate::application::order_detail_expander::{ExpandedOrder, OrderDetailExpander};
use crate::application::record_assembler::RecordAssembler;
use crate::domain::account::AccountFields;
use crate::domain::bill::BillRecord;
use crate::domain::order::{InvoiceLink, OrderSummary, ParsedOrder};
use crate::domain::services::{BillSaver, PageFetcher, SaveOptions};
use crate::infrastructure::authenticator::FormAuthenticator;
use crate::infrastructure::config::{AppConfig, MalformedOrderPolicy, MissingInvoicePolicy, RunConfig, VendorConfig};
use crate::infrastructure::parsing::field_parsers::parse_order_summary;
use crate::infrastructure::parsing::{
    ContextualParser, OrderDetailParser, OrderListParser, ParseContext, ParsingResult,
};

/// Outcome of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub bills: Vec<BillRecord>,
    pub saved: usize,
    pub skipped: usize,
}

pub struct BillConnector<F: PageFetcher + ?Sized> {
    fetcher: Arc<F>,
    vendor: VendorConfig,
    run: RunConfig,
    authenticator: FormAuthenticator,
    list_parser: OrderListParser,
    expander: OrderDetailExpander<F>,
    assembler: RecordAssembler,
}

impl<F: PageFetcher + ?Sized> BillConnector<F> {
    pub fn new(config: &AppConfig, fetcher: Arc<F>) -> Result<Self, ConnectorError> {
        config
            .validate()
            .map_err(|e| ConnectorError::Configuration(format!("{:#}", e)))?;

        let selectors = &config.selectors;
        let invalid_selector = |e: crate::infrastructure::parsing::ParsingError| {
            ConnectorError::Configuration(e.to_string())
        };

        let authenticator =
            FormAuthenticator::new(&config.vendor.login_url, &selectors.login).map_err(invalid_selector)?;
        let list_parser = OrderListParser::with_config(&selectors.order_list).map_err(invalid_selector)?;
        let detail_parser =
            OrderDetailParser::with_config(&selectors.order_detail).map_err(invalid_selector)?;

        Ok(Self {
            expander: OrderDetailExpander::new(
                Arc::clone(&fetcher),
                detail_parser,
                config.run.detail_max_concurrent,
            ),
            fetcher,
            vendor: config.vendor.clone(),
            run: config.run.clone(),
            authenticator,
            list_parser,
            assembler: RecordAssembler::new(config.vendor.name.as_str()),
        })
    }

    /// Sign in and collect the bill records of every order on the history page
    pub async fn fetch_bills(&self, fields: &AccountFields) -> Result<Vec<BillRecord>, ConnectorError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("bill_run", %run_id, vendor = %self.vendor.name);
        self.collect_bills(fields).instrument(span).await
    }

    /// [`fetch_bills`](Self::fetch_bills) followed by persistence
    pub async fn run(&self, fields: &AccountFields, saver: &dyn BillSaver) -> Result<RunReport, ConnectorError> {
        let bills = self.fetch_bills(fields).await?;

        info!("Saving data");
        let options = SaveOptions::pdf_for_vendor(&self.vendor.name);
        let summary = saver
            .save_bills(&bills, fields, &options)
            .await
            .map_err(|e| ConnectorError::Storage(format!("{:#}", e)))?;

        Ok(RunReport {
            bills,
            saved: summary.saved,
            skipped: summary.skipped,
        })
    }

    async fn collect_bills(&self, fields: &AccountFields) -> Result<Vec<BillRecord>, ConnectorError> {
        info!("Authenticating ...");
        self.authenticator
            .authenticate(self.fetcher.as_ref(), fields)
            .await?;
        info!("Successfully logged in");

        info!("Fetching the list of documents");
        let list_url = self.vendor.orders_list_url.as_str();
        let body = self
            .fetcher
            .fetch_page(list_url)
            .await
            .map_err(|e| ConnectorError::fetch("order list", e))?;

        info!("Parsing list of documents");
        let entries = self
            .list_parser
            .parse_body(&body, &ParseContext::new(list_url))
            .map_err(|source| ConnectorError::Page {
                url: list_url.to_string(),
                source,
            })?;
        let orders = self.parse_orders(entries)?;
        info!("{} orders to expand", orders.len());

        let expanded = self.expander.expand(orders).await?;
        let bills = self.assemble(expanded)?;
        info!("📄 {} bills ready", bills.len());
        Ok(bills)
    }

    fn parse_orders(&self, entries: Vec<ParsingResult<OrderSummary>>) -> Result<Vec<ParsedOrder>, ConnectorError> {
        let mut orders = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match entry.and_then(|summary| parse_order_summary(&summary)) {
                Ok(order) => orders.push(order),
                Err(source) => match self.run.on_malformed_order {
                    MalformedOrderPolicy::Abort => {
                        return Err(ConnectorError::OrderParse { index, source });
                    }
                    MalformedOrderPolicy::Skip => {
                        warn!("Skipping order entry {}: {}", index, source);
                    }
                },
            }
        }
        Ok(orders)
    }

    fn assemble(&self, expanded: Vec<ExpandedOrder>) -> Result<Vec<BillRecord>, ConnectorError> {
        let import_date = Utc::now();
        let mut bills = Vec::with_capacity(expanded.len());

        for ExpandedOrder { order, invoice } in expanded {
            match invoice {
                InvoiceLink::Found(url) => bills.push(self.assembler.assemble(&order, &url, import_date)),
                InvoiceLink::Missing => match self.run.on_missing_invoice {
                    MissingInvoicePolicy::Fail => {
                        return Err(ConnectorError::MissingInvoice {
                            number: order.number,
                            detail_url: order.detail_link,
                        });
                    }
                    MissingInvoicePolicy::Skip => {
                        warn!("Order {} has no invoice yet, skipping", order.number);
                    }
                },
            }
        }
        Ok(bills)
    }
}
