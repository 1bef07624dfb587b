//! garimpo — product-page scraper for Brazilian marketplace listings.
//!
//! Scrapes AliExpress, Amazon, Mercado Livre, Shein and Shopee product
//! pages through one generic extraction engine driven by per-store
//! selector profiles, downloads the product gallery (images, direct
//! and HLS videos), captures a localized HTML snapshot, and reduces
//! duplicate images by normalized pixel hashing.

pub mod cli;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod media;
pub mod normalize;
pub mod output;
pub mod platform;
pub mod record;
pub mod scrape;
pub mod selector;

pub use error::{GarimpoError, Result};
