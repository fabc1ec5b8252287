//! Text field parsers for the order-history page
//!
//! Each function maps one scraped text fragment to a typed value. They are
//! tied to the exact wording of the vendor's page, so every layout detail
//! lives in exactly one function here.

use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::{ParsingError, ParsingResult};
use crate::domain::order::{OrderSummary, ParsedOrder};

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}\.\d{2}\.\d{4}$").expect("invalid regex: date token"));

static PLAIN_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("invalid regex: plain decimal"));

/// Parse the trailing `DD.MM.YYYY` token, e.g. `"Order placed 05.03.2021"`.
///
/// The result is a UTC calendar date without time of day.
pub fn parse_date(text: &str) -> ParsingResult<NaiveDate> {
    let invalid = || ParsingError::InvalidDate {
        text: text.to_string(),
    };

    let token = text.split_whitespace().last().ok_or_else(invalid)?;
    if !DATE_TOKEN.is_match(token) {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(token, "%d.%m.%Y").map_err(|_| invalid())
}

/// Parse the amount between the first `:` and the trailing currency symbol,
/// e.g. `"Total: 123,45€"` gives `123.45`.
///
/// Comma is the decimal separator. When a comma is present, dots are
/// thousands separators and are dropped (`"1.234,56€"` gives `1234.56`).
pub fn parse_amount(text: &str) -> ParsingResult<Decimal> {
    let trimmed = text.trim();
    let colon = trimmed
        .find(':')
        .ok_or_else(|| ParsingError::invalid_amount(text, "missing ':' before the amount"))?;

    let tail = trimmed[colon + 1..].trim();
    let suffix = tail
        .chars()
        .last()
        .ok_or_else(|| ParsingError::invalid_amount(text, "nothing after ':'"))?;
    if suffix.is_ascii_digit() {
        return Err(ParsingError::invalid_amount(text, "missing currency suffix"));
    }

    let number: String = tail[..tail.len() - suffix.len_utf8()]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let normalized = if number.contains(',') {
        number.replace('.', "").replace(',', ".")
    } else {
        number
    };

    if !PLAIN_DECIMAL.is_match(&normalized) {
        return Err(ParsingError::invalid_amount(
            text,
            &format!("'{}' is not a non-negative decimal number", normalized),
        ));
    }

    Decimal::from_str(&normalized).map_err(|e| ParsingError::invalid_amount(text, &e.to_string()))
}

/// Return the last non-whitespace character, which must be a currency symbol
pub fn parse_currency(text: &str) -> ParsingResult<char> {
    match text.trim().chars().last() {
        Some(symbol) if is_currency_symbol(symbol) => Ok(symbol),
        found => Err(ParsingError::InvalidCurrency {
            text: text.to_string(),
            found: found.map(String::from).unwrap_or_default(),
        }),
    }
}

/// Return the last whitespace-separated token, e.g. `"Order no 123456"` gives `"123456"`
pub fn parse_order_number(text: &str) -> ParsingResult<String> {
    text.split_whitespace()
        .last()
        .map(str::to_string)
        .ok_or_else(|| ParsingError::MissingOrderNumber {
            text: text.to_string(),
        })
}

/// Run all field parsers over one scraped order summary
pub fn parse_order_summary(summary: &OrderSummary) -> ParsingResult<ParsedOrder> {
    Ok(ParsedOrder {
        date: parse_date(&summary.raw_date_text)?,
        amount: parse_amount(&summary.raw_amount_text)?,
        currency: parse_currency(&summary.raw_amount_text)?,
        number: parse_order_number(&summary.raw_number_text)?,
        detail_link: summary.detail_link.clone(),
    })
}

/// `$`, `¢`, `£`, `¤`, `¥` and the Unicode "Currency Symbols" block
pub fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '¢' | '£' | '¤' | '¥' | '\u{20A0}'..='\u{20CF}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("Order placed 05.03.2021", 2021, 3, 5)]
    #[case("05.03.2021", 2021, 3, 5)]
    #[case("  Bestelldatum:\n   31.12.2019  ", 2019, 12, 31)]
    #[case("Order date\u{a0}29.02.2020", 2020, 2, 29)]
    fn parses_trailing_date_token(
        #[case] text: &str,
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
    ) {
        assert_eq!(parse_date(text).unwrap(), NaiveDate::from_ymd_opt(y, m, d).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("Order placed")]
    #[case("Order placed 2021-03-05")]
    #[case("Order placed 5.3.2021")]
    #[case("Order placed 31.02.2021")]
    #[case("Order placed 05.13.2021")]
    #[case("05.03.2021 by mail")]
    fn rejects_malformed_dates(#[case] text: &str) {
        assert!(matches!(parse_date(text), Err(ParsingError::InvalidDate { .. })));
    }

    #[rstest]
    #[case("Total: 123,45€", "123.45")]
    #[case("  Total: 9,99 €  ", "9.99")]
    #[case("Total: 1.234,56€", "1234.56")]
    #[case("Summe: 1\u{a0}099,00€", "1099.00")]
    #[case("Total: 42£", "42")]
    #[case("Total: 19.90$", "19.90")]
    fn parses_amounts(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(parse_amount(text).unwrap(), dec(expected));
    }

    #[rstest]
    #[case("Total 123,45€")]
    #[case("Total:")]
    #[case("Total: €")]
    #[case("Total: 123,45")]
    #[case("Total: -12,00€")]
    #[case("Total: abc€")]
    #[case("Order total: incl. VAT: 5,00€")]
    fn rejects_malformed_amounts(#[case] text: &str) {
        assert!(matches!(parse_amount(text), Err(ParsingError::InvalidAmount { .. })));
    }

    #[test]
    fn amount_without_colon_names_the_problem() {
        let err = parse_amount("Total 123,45€").unwrap_err();
        assert!(err.to_string().contains("missing ':'"));
    }

    #[rstest]
    #[case("Total: 123,45€", '€')]
    #[case("Total: 123,45 €   ", '€')]
    #[case("Total: 10.00$", '$')]
    #[case("Total: 10,00£", '£')]
    #[case("Total: 10,00₽", '₽')]
    fn parses_currency_symbol(#[case] text: &str, #[case] expected: char) {
        assert_eq!(parse_currency(text).unwrap(), expected);
    }

    #[rstest]
    #[case("Total: 123,45")]
    #[case("Total: 123,45 EUR")]
    #[case("   ")]
    fn rejects_non_currency_suffix(#[case] text: &str) {
        assert!(matches!(parse_currency(text), Err(ParsingError::InvalidCurrency { .. })));
    }

    #[rstest]
    #[case("Order no 123456", "123456")]
    #[case("Order no 123456  ", "123456")]
    #[case("Bestellnr.\n 987-654", "987-654")]
    #[case("123456", "123456")]
    fn parses_order_number(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(parse_order_number(text).unwrap(), expected);
    }

    fn summary(date: &str, amount: &str, number: &str) -> OrderSummary {
        OrderSummary {
            raw_date_text: date.to_string(),
            raw_amount_text: amount.to_string(),
            raw_number_text: number.to_string(),
            detail_link: "https://www.thomann.de/intl/mythomann_order.html?id=1".to_string(),
        }
    }

    #[test]
    fn parses_complete_summary() {
        let order = parse_order_summary(&summary(
            "Order placed 05.03.2021",
            "Total: 123,45€",
            "Order no 123456",
        ))
        .unwrap();

        assert_eq!(order.date, NaiveDate::from_ymd_opt(2021, 3, 5).unwrap());
        assert_eq!(order.amount, dec("123.45"));
        assert_eq!(order.currency, '€');
        assert_eq!(order.number, "123456");
        assert_eq!(order.detail_link, "https://www.thomann.de/intl/mythomann_order.html?id=1");
    }

    #[test]
    fn summary_reports_first_bad_field() {
        let err = parse_order_summary(&summary("Order placed soon", "Total: 1,00€", "No 1")).unwrap_err();
        assert_eq!(err.field(), Some("date"));

        let err = parse_order_summary(&summary("05.03.2021", "Total: 1,00 EUR", "No 1")).unwrap_err();
        assert_eq!(err.field(), Some("amount"));
    }

    #[test]
    fn blank_order_number_is_an_error() {
        assert!(matches!(
            parse_order_number(" \n "),
            Err(ParsingError::MissingOrderNumber { .. })
        ));
    }
}
