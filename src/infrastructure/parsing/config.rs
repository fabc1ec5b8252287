//! CSS selectors for the vendor's pages
//!
//! Centralized so a markup change on the vendor side is a config edit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub login: LoginSelectors,
    pub order_list: OrderListSelectors,
    pub order_detail: OrderDetailSelectors,
}

/// Login form and the marker proving an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginSelectors {
    pub form: String,
    /// Form field name receiving the login
    pub username_field: String,
    /// Form field name receiving the password
    pub password_field: String,
    /// Exactly one element must match after a successful login
    pub logged_in_marker: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            form: "form[method='post']".to_string(),
            username_field: "uname".to_string(),
            password_field: "passw".to_string(),
            logged_in_marker: "svg.rs-icon-cc-sb-logout".to_string(),
        }
    }
}

/// Order-history page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderListSelectors {
    /// Root of one order summary block
    pub order_entry: String,
    pub date: String,
    pub number: String,
    /// Holds both the amount and the currency symbol
    pub sum: String,
    pub details_link: String,
}

impl Default for OrderListSelectors {
    fn default() -> Self {
        Self {
            order_entry: ".order-entry".to_string(),
            date: ".order-date".to_string(),
            number: ".order-nr".to_string(),
            sum: ".order-sum".to_string(),
            details_link: ".details a".to_string(),
        }
    }
}

/// Order detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDetailSelectors {
    pub invoice_link: String,
}

impl Default for OrderDetailSelectors {
    fn default() -> Self {
        Self {
            invoice_link: ".orderdata a.tr-link-pdf".to_string(),
        }
    }
}
