//! Declarative field extraction
//!
//! A scrape request is a root selector plus a list of [`FieldSpec`]s. Every
//! element matching the root yields one [`ScrapedRecord`], with each field
//! looked up inside that element.

use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{ParsingError, ParsingResult};

/// Pure post-processing applied to an extracted value
pub type FieldTransform = fn(&str) -> String;

/// How to extract one named field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    selector: Selector,
    /// Read this attribute instead of the element text
    pub attr: Option<String>,
    pub transform: Option<FieldTransform>,
}

impl FieldSpec {
    /// Text content of the first element matching `selector`
    pub fn text(name: &'static str, selector: &str) -> ParsingResult<Self> {
        Ok(Self {
            name,
            selector: compile_selector(selector)?,
            attr: None,
            transform: None,
        })
    }

    /// Attribute `attr` of the first element matching `selector`
    pub fn attr(name: &'static str, selector: &str, attr: &str) -> ParsingResult<Self> {
        Ok(Self {
            attr: Some(attr.to_string()),
            ..Self::text(name, selector)?
        })
    }

    pub fn with_transform(mut self, transform: FieldTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    fn extract(&self, scope: &ElementRef) -> Option<String> {
        let element = scope.select(&self.selector).next()?;
        let raw = match &self.attr {
            Some(attr) => element.value().attr(attr)?.to_string(),
            None => element_text(&element),
        };
        let value = match self.transform {
            Some(transform) => transform(&raw),
            None => raw.trim().to_string(),
        };
        Some(value).filter(|v| !v.is_empty())
    }
}

/// Fields extracted from one root element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedRecord {
    fields: HashMap<&'static str, String>,
}

impl ScrapedRecord {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get) but a missing field is an error
    pub fn require(&self, name: &str, context: &str) -> ParsingResult<&str> {
        self.get(name)
            .ok_or_else(|| ParsingError::required_field_missing(name, Some(context)))
    }
}

/// Apply `specs` to every element matching `root`
pub fn scrape(html: &Html, root: &Selector, specs: &[FieldSpec]) -> Vec<ScrapedRecord> {
    html.select(root)
        .enumerate()
        .map(|(index, element)| {
            let mut record = ScrapedRecord::default();
            for spec in specs {
                match spec.extract(&element) {
                    Some(value) => {
                        record.fields.insert(spec.name, value);
                    }
                    None => debug!("Field '{}' not found in element {}", spec.name, index),
                }
            }
            record
        })
        .collect()
}

pub fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// Collapse runs of whitespace (including line breaks) into single spaces
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
