//! Domain services
//!
//! Seams to the outside world: page transport and bill persistence.

pub mod connector_services;

pub use connector_services::{
    BillSaver, Download, FetchError, FormResponse, PageFetcher, SaveOptions, SaveSummary,
};
