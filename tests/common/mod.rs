#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use thomann_bills_lib::domain::services::{Download, FetchError, FormResponse, PageFetcher};
use thomann_bills_lib::AppConfig;

pub const LOGIN_URL: &str = "https://www.thomann.de/intl/mythomann_login.html";
pub const ORDERS_URL: &str = "https://www.thomann.de/intl/mythomann_orders.html";

pub const LOGIN_PAGE: &str = r#"<html><body>
  <form method="post" action="/intl/mythomann_login.html?do=login">
    <input type="hidden" name="csrf" value="tok123">
    <input type="text" name="uname">
    <input type="password" name="passw">
    <input type="submit" value="Login">
  </form>
</body></html>"#;

pub const LOGGED_IN_PAGE: &str =
    r#"<html><body><a href="/logout"><svg class="rs-icon-cc-sb-logout"></svg></a></body></html>"#;

pub const LOGIN_FAILED_PAGE: &str = r#"<html><body><p class="error">Wrong password</p></body></html>"#;

pub fn order_entry(date: &str, number: &str, sum: &str, id: &str) -> String {
    format!(
        r#"<div class="order-entry">
             <div class="order-date">Order date {date}</div>
             <div class="order-nr">Order number {number}</div>
             <div class="order-sum">Total: {sum}</div>
             <div class="details"><a href="/intl/mythomann_order.html?id={id}">Details</a></div>
           </div>"#
    )
}

pub fn order_list(entries: &[String]) -> String {
    format!("<html><body>{}</body></html>", entries.concat())
}

pub fn detail_url(id: &str) -> String {
    format!("https://www.thomann.de/intl/mythomann_order.html?id={id}")
}

pub fn detail_page(invoice_href: Option<&str>) -> String {
    match invoice_href {
        Some(href) => format!(
            r#"<div class="orderdata"><a class="tr-link-pdf" href="{href}">Invoice</a></div>"#
        ),
        None => r#"<div class="orderdata"><p>Invoice not yet available</p></div>"#.to_string(),
    }
}

/// Canned responses keyed by URL; every request is recorded
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, Result<String, FetchError>>,
    form_body: String,
    downloads: HashMap<String, Download>,
    requests: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Login page served and accepted
    pub fn signed_in() -> Self {
        Self::new()
            .with_page(LOGIN_URL, LOGIN_PAGE)
            .with_form_response(LOGGED_IN_PAGE)
    }

    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn with_failure(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    pub fn with_form_response(mut self, body: impl Into<String>) -> Self {
        self.form_body = body.into();
        self
    }

    pub fn with_download(mut self, url: &str, content_type: Option<&str>, bytes: &[u8]) -> Self {
        self.downloads.insert(
            url.to_string(),
            Download {
                content_type: content_type.map(str::to_string),
                bytes: bytes.to_vec(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn requested(&self, url: &str) -> bool {
        self.requests().iter().any(|u| u == url)
    }

    fn record(&self, url: &str) {
        self.requests.lock().unwrap().push(url.to_string());
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.record(url);
        self.pages.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
        })
    }

    async fn submit_form(&self, url: &str, fields: &[(String, String)]) -> Result<FormResponse, FetchError> {
        self.record(url);
        self.submitted.lock().unwrap().push((url.to_string(), fields.to_vec()));
        Ok(FormResponse {
            status: 200,
            final_url: url.to_string(),
            body: self.form_body.clone(),
        })
    }

    async fn download(&self, url: &str) -> Result<Download, FetchError> {
        self.record(url);
        self.downloads.get(url).cloned().ok_or_else(|| FetchError::HttpStatus {
            status: 404,
            url: url.to_string(),
        })
    }
}

/// Default configuration pointed at the mock URLs
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.vendor.login_url = LOGIN_URL.to_string();
    config.vendor.orders_list_url = ORDERS_URL.to_string();
    config
}
