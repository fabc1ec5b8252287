//! Form based sign-in
//!
//! Loads the login page, fills the login form (keeping hidden inputs such as
//! CSRF tokens), submits it and checks the returned page for the marker that
//! only an authenticated session shows. The HTTP status of the submission is
//! not trusted; only the marker counts.

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::account::AccountFields;
use crate::domain::services::{FetchError, PageFetcher};
use crate::infrastructure::parsing::scrape::compile_selector;
use crate::infrastructure::parsing::{LoginSelectors, ParseContext, ParsingError, ParsingResult};

#[derive(Error, Debug)]
pub enum AuthenticationError {
    #[error("Login request failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Login page could not be used: {0}")]
    LoginPage(#[from] ParsingError),

    #[error("Login rejected: expected exactly one '{marker}' element, found {found} (HTTP {status})")]
    Rejected {
        marker: String,
        found: usize,
        status: u16,
    },
}

/// Filled-in login form ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

impl LoginForm {
    fn set(&mut self, name: &str, value: &str) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(field) => field.1 = value.to_string(),
            None => self.fields.push((name.to_string(), value.to_string())),
        }
    }
}

pub struct FormAuthenticator {
    login_url: String,
    selectors: LoginSelectors,
    form: Selector,
    inputs: Selector,
    logged_in_marker: Selector,
}

impl FormAuthenticator {
    pub fn new(login_url: &str, selectors: &LoginSelectors) -> ParsingResult<Self> {
        Ok(Self {
            login_url: login_url.to_string(),
            selectors: selectors.clone(),
            form: compile_selector(&selectors.form)?,
            inputs: compile_selector("input[name]")?,
            logged_in_marker: compile_selector(&selectors.logged_in_marker)?,
        })
    }

    /// Sign in once; no retries
    pub async fn authenticate<F>(&self, fetcher: &F, fields: &AccountFields) -> Result<(), AuthenticationError>
    where
        F: PageFetcher + ?Sized,
    {
        let login_page = fetcher.fetch_page(&self.login_url).await?;
        let form = self.fill_login_form(&login_page, fields)?;
        debug!("Submitting login form with {} fields to {}", form.fields.len(), form.action);

        let response = fetcher.submit_form(&form.action, &form.fields).await?;
        let found = self.count_markers(&response.body);
        if found != 1 {
            warn!(
                "Login marker '{}' matched {} elements (HTTP {})",
                self.selectors.logged_in_marker, found, response.status
            );
            return Err(AuthenticationError::Rejected {
                marker: self.selectors.logged_in_marker.clone(),
                found,
                status: response.status,
            });
        }

        info!("Login accepted at {}", response.final_url);
        Ok(())
    }

    /// Locate the login form and merge the credentials into its inputs
    pub fn fill_login_form(&self, login_page: &str, fields: &AccountFields) -> ParsingResult<LoginForm> {
        let html = Html::parse_document(login_page);
        let form = html
            .select(&self.form)
            .next()
            .ok_or_else(|| ParsingError::FormNotFound {
                selector: self.selectors.form.clone(),
                url: self.login_url.clone(),
            })?;

        let action = match form.value().attr("action").map(str::trim) {
            Some(action) if !action.is_empty() => {
                ParseContext::new(self.login_url.as_str()).resolve_url(action)?
            }
            _ => self.login_url.clone(),
        };

        let mut login_form = LoginForm {
            action,
            fields: Vec::new(),
        };
        for input in form.select(&self.inputs) {
            let input = input.value();
            let kind = input.attr("type").unwrap_or("text").to_ascii_lowercase();
            let keep = match kind.as_str() {
                "submit" | "button" | "image" | "file" | "reset" => false,
                "checkbox" | "radio" => input.attr("checked").is_some(),
                _ => true,
            };
            if let (true, Some(name)) = (keep, input.attr("name")) {
                login_form.set(name, input.attr("value").unwrap_or_default());
            }
        }

        login_form.set(&self.selectors.username_field, &fields.login);
        login_form.set(&self.selectors.password_field, &fields.password);
        Ok(login_form)
    }

    fn count_markers(&self, body: &str) -> usize {
        Html::parse_document(body).select(&self.logged_in_marker).count()
    }
}
