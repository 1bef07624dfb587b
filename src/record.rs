//! Extracted product data model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// A price split into integer and decimal parts, both kept as strings
/// so "absent" can be represented without losing the display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Price {
    pub integer: String,
    pub decimal: String,
}

impl Price {
    /// Default for a missing current price: R$0,00.
    pub fn zero() -> Self {
        Price {
            integer: "0".to_string(),
            decimal: "00".to_string(),
        }
    }

    /// Default for a missing original (pre-discount) price.
    pub fn unavailable() -> Self {
        Price {
            integer: "N/A".to_string(),
            decimal: "N/A".to_string(),
        }
    }

    pub fn new(integer: impl Into<String>, decimal: impl Into<String>) -> Self {
        Price {
            integer: integer.into(),
            decimal: decimal.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.integer != "N/A"
    }

    /// Brazilian display form, e.g. "49,90".
    pub fn display(&self) -> String {
        if self.is_available() {
            format!("{},{}", self.integer, self.decimal)
        } else {
            "N/A".to_string()
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        if !self.is_available() {
            return None;
        }
        format!("{}.{}", self.integer, self.decimal).parse().ok()
    }
}

/// Name used when no selector rule located a product title.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

const INTERNATIONAL_PREFIX: &str = "International - ";

/// Description used when nothing usable was found on the page.
pub const NO_DESCRIPTION: &str = "No description available";

/// Everything extracted from one product page, plus the artifacts the
/// run wrote to disk.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRecord {
    pub platform: String,
    pub url: String,
    pub name: String,
    pub current_price: Price,
    pub old_price: Price,
    pub discount: String,
    pub description: String,
    pub specifications: BTreeMap<String, String>,
    pub international: bool,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub downloaded_files: Vec<PathBuf>,
}

impl ProductRecord {
    pub fn new(platform: impl Into<String>, url: impl Into<String>) -> Self {
        ProductRecord {
            platform: platform.into(),
            url: url.into(),
            name: UNKNOWN_PRODUCT.to_string(),
            current_price: Price::zero(),
            old_price: Price::unavailable(),
            discount: "N/A".to_string(),
            description: NO_DESCRIPTION.to_string(),
            specifications: BTreeMap::new(),
            international: false,
            image_urls: Vec::new(),
            video_urls: Vec::new(),
            downloaded_files: Vec::new(),
        }
    }

    pub fn has_name(&self) -> bool {
        let base = self
            .name
            .strip_prefix(INTERNATIONAL_PREFIX)
            .unwrap_or(&self.name);
        base != UNKNOWN_PRODUCT
    }

    /// Prefix the name to flag an international (import) listing.
    /// Applying it twice does not stack the prefix.
    pub fn mark_international(&mut self) {
        self.international = true;
        if !self.name.starts_with(INTERNATIONAL_PREFIX) {
            self.name = format!("{INTERNATIONAL_PREFIX}{}", self.name);
        }
    }
}
