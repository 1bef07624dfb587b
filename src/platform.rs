//! Supported stores and their extraction profiles.
//!
//! Each store gets one declarative [`PlatformProfile`]: ordered
//! selector tables for every field plus the handful of hooks that
//! genuinely differ between stores (price layout, import detection,
//! hi-res URL rewrites, media host). The extraction engine itself is
//! platform-agnostic; see `extract.rs`.

use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::selector::SelectorRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    AliExpress,
    Amazon,
    MercadoLivre,
    Shein,
    Shopee,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::AliExpress,
        Platform::Amazon,
        Platform::MercadoLivre,
        Platform::Shein,
        Platform::Shopee,
    ];

    /// Identify the store from a product URL by host substring.
    pub fn detect(url: &str) -> Option<Platform> {
        let lower = url.to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.profile().url_markers.iter().any(|m| lower.contains(m)))
    }

    pub fn profile(&self) -> &'static PlatformProfile {
        match self {
            Platform::AliExpress => &ALIEXPRESS,
            Platform::Amazon => &AMAZON,
            Platform::MercadoLivre => &MERCADO_LIVRE,
            Platform::Shein => &SHEIN,
            Platform::Shopee => &SHOPEE,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().label)
    }
}

/// Whether an explicit discount badge or the computed percentage wins
/// when both are derivable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountPriority {
    ComputedFirst,
    BadgeFirst,
}

/// How a price renders in the markup.
#[derive(Debug, Clone)]
pub enum PriceLayout {
    /// Integer and cents appear as one text run ("R$ 49,90").
    Inline,
    /// Integer and cents live in separate child elements of the
    /// matched container, with no textual separator between them.
    SplitFractionCents {
        fraction: &'static str,
        cents: &'static str,
    },
}

/// Where a store keeps its specification rows.
#[derive(Debug, Clone)]
pub struct SpecTable {
    pub container_rules: Vec<SelectorRule>,
    pub row: SelectorRule,
    pub label: SelectorRule,
    pub value: SelectorRule,
}

pub struct PlatformProfile {
    pub platform: Platform,
    /// Display name, also the output-directory prefix.
    pub label: &'static str,
    /// Storefront phrase for the description template ("na Shein").
    pub storefront_phrase: &'static str,
    /// Host substrings that map a URL to this store.
    pub url_markers: &'static [&'static str],

    pub name_rules: Vec<SelectorRule>,
    pub current_price_rules: Vec<SelectorRule>,
    pub old_price_rules: Vec<SelectorRule>,
    pub discount_rules: Vec<SelectorRule>,
    pub description_rules: Vec<SelectorRule>,
    pub gallery_rules: Vec<SelectorRule>,
    /// Customer-review image strip, scanned in addition to the gallery.
    pub review_rules: Vec<SelectorRule>,
    /// Attributes probed on gallery `<img>` tags, in priority order.
    pub image_attrs: &'static [&'static str],
    /// Gallery images are announced as `<link rel="preload">` tags
    /// before the canonical link (Shein).
    pub preload_gallery: bool,

    pub specs: Option<SpecTable>,
    /// Elements scanned for an import-declaration phrase.
    pub shipping_rules: Vec<SelectorRule>,
    pub import_phrases: &'static [&'static str],
    /// Exact image URL of a foreign-seller badge (Amazon).
    pub foreign_badge_url: Option<&'static str>,
    /// Specification labels naming the product's country of origin.
    pub origin_labels: &'static [&'static str],

    pub price_layout: PriceLayout,
    pub discount_priority: DiscountPriority,
    /// Substring rewrites that upgrade thumbnail URLs to full size.
    pub hires_substitutions: &'static [(&'static str, &'static str)],
    /// Base prepended to host-relative media paths instead of the
    /// page URL (CDN on a different host than the storefront).
    pub media_host: Option<&'static str>,
}

static ALIEXPRESS: Lazy<PlatformProfile> = Lazy::new(|| PlatformProfile {
    platform: Platform::AliExpress,
    label: "AliExpress",
    storefront_phrase: "no AliExpress",
    url_markers: &["aliexpress"],
    name_rules: vec![
        SelectorRule::new("h1").attr("data-pl", "product-title"),
        SelectorRule::new("h1"),
        SelectorRule::new("div").attr_pattern("class", r".*product.*title.*"),
    ],
    current_price_rules: vec![
        SelectorRule::new("div").attr("class", "price-default--currentWrap--A_MNgCG"),
        SelectorRule::new("span").attr("class", "price-default--current--F8OlYIo"),
        SelectorRule::new("span").attr_pattern("class", r".*price.*"),
    ],
    old_price_rules: vec![
        SelectorRule::new("span").attr("class", "price-default--original--CWcHOit"),
        SelectorRule::new("div").attr_pattern("class", r".*price.*original.*"),
        SelectorRule::new("span").attr_pattern("class", r".*old.*price.*"),
    ],
    // No explicit discount element; always computed from the prices.
    discount_rules: vec![],
    description_rules: vec![
        SelectorRule::new("div").attr("id", "product-description"),
        SelectorRule::new("div").attr_pattern("class", r".*description.*"),
    ],
    gallery_rules: vec![
        SelectorRule::new("div").attr("class", "slider--wrap--dfLgmYD"),
        SelectorRule::new("div").attr_pattern("class", r".*slider--wrap.*"),
        SelectorRule::new("div").attr_pattern("class", r".*gallery.*"),
    ],
    review_rules: vec![SelectorRule::new("div").attr("class", "filter--bottom--12yws12")],
    image_attrs: &["src", "data-src"],
    preload_gallery: false,
    specs: Some(SpecTable {
        container_rules: vec![
            SelectorRule::new("div").attr("class", "specification--list--GZuXzRX"),
            SelectorRule::new("div").attr_pattern("class", r"specification--list"),
        ],
        row: SelectorRule::new("div").attr_pattern("class", r"specification--line"),
        label: SelectorRule::new("div").attr_pattern("class", r"specification--title"),
        value: SelectorRule::new("div").attr_pattern("class", r"specification--desc"),
    }),
    shipping_rules: vec![
        SelectorRule::new("div").attr("class", "vat-installment--item--Fgco36c"),
        SelectorRule::new("div").attr_pattern("class", r".*shipping.*"),
    ],
    import_phrases: &["imposto de importação", "international"],
    foreign_badge_url: None,
    origin_labels: &["país de origem", "country of origin", "origem"],
    price_layout: PriceLayout::Inline,
    discount_priority: DiscountPriority::ComputedFirst,
    hires_substitutions: &[],
    media_host: None,
});

static AMAZON: Lazy<PlatformProfile> = Lazy::new(|| PlatformProfile {
    platform: Platform::Amazon,
    label: "Amazon",
    storefront_phrase: "na Amazon",
    url_markers: &["amazon", "amzn"],
    name_rules: vec![
        SelectorRule::new("span").attr("id", "productTitle"),
        SelectorRule::new("h1").attr("id", "title"),
        SelectorRule::new("h1"),
    ],
    current_price_rules: vec![
        SelectorRule::new("span")
            .attr("class", "a-price aok-align-center reinventPricePriceToPayMargin priceToPay"),
        SelectorRule::new("span").attr_pattern("class", r".*priceToPay.*"),
        SelectorRule::new("span").attr_pattern("class", r".*a-price.*"),
    ],
    old_price_rules: vec![
        SelectorRule::new("span").attr("class", "a-price a-text-price"),
        SelectorRule::new("span").attr_pattern("class", r".*a-text-price.*"),
        SelectorRule::new("span").attr_pattern("class", r".*list.*price.*"),
    ],
    discount_rules: vec![
        SelectorRule::new("span").attr(
            "class",
            "a-size-large a-color-price savingPriceOverride aok-align-center \
             reinventPriceSavingsPercentageMargin savingsPercentage",
        ),
        SelectorRule::new("span").attr_pattern("class", r".*savingsPercentage.*"),
        SelectorRule::new("span").attr_pattern("class", r".*discount.*"),
    ],
    description_rules: vec![
        SelectorRule::new("div").attr("class", "a-section a-spacing-large bucket"),
        SelectorRule::new("div").attr("id", "feature-bullets"),
        SelectorRule::new("div").attr_pattern("class", r".*description.*"),
    ],
    gallery_rules: vec![
        SelectorRule::new("div").attr("id", "altImages"),
        SelectorRule::new("div").attr_pattern("class", r".*imageThumb.*"),
    ],
    review_rules: vec![],
    image_attrs: &["data-old-hires", "src", "data-src"],
    preload_gallery: false,
    specs: Some(SpecTable {
        container_rules: vec![
            SelectorRule::new("table").attr("id", "productDetails_techSpec_section_1"),
            SelectorRule::new("div").attr("id", "prodDetails"),
        ],
        row: SelectorRule::new("tr"),
        label: SelectorRule::new("th").attr("class", "prodDetSectionEntry"),
        value: SelectorRule::new("td").attr("class", "prodDetAttrValue"),
    }),
    shipping_rules: vec![SelectorRule::new("div").attr_pattern("id", r"deliveryBlock")],
    import_phrases: &["vendedor internacional"],
    foreign_badge_url: Some(
        "https://m.media-amazon.com/images/G/32/foreignseller/Foreign_Seller_Badge_v2._CB403622375_.png",
    ),
    origin_labels: &["país de origem", "country of origin"],
    price_layout: PriceLayout::Inline,
    discount_priority: DiscountPriority::BadgeFirst,
    hires_substitutions: &[],
    media_host: None,
});

static MERCADO_LIVRE: Lazy<PlatformProfile> = Lazy::new(|| PlatformProfile {
    platform: Platform::MercadoLivre,
    label: "MercadoLivre",
    storefront_phrase: "no Mercado Livre",
    url_markers: &["mercadolivre", "mercadolibre"],
    name_rules: vec![
        SelectorRule::new("h1").attr("class", "ui-pdp-title"),
        SelectorRule::new("*").attr("class", "ui-pdp-title"),
    ],
    current_price_rules: vec![
        SelectorRule::new("span")
            .attr_pattern("class", r"andes-money-amount.*andes-money-amount--superscript-36"),
        SelectorRule::new("span").attr_pattern("class", r"andes-money-amount"),
    ],
    old_price_rules: vec![
        SelectorRule::new("span")
            .attr_pattern("class", r"andes-money-amount.*andes-money-amount--superscript-16"),
        SelectorRule::new("s").attr_pattern("class", r"andes-money-amount"),
    ],
    discount_rules: vec![SelectorRule::new("span").attr_pattern(
        "class",
        r"andes-money-amount__discount.*ui-pdp-family--SEMIBOLD.*ui-pdp-color--GREEN",
    )],
    description_rules: vec![
        SelectorRule::new("p").attr("class", "ui-pdp-description__content"),
        SelectorRule::new("*").attr("class", "ui-pdp-description__content"),
    ],
    gallery_rules: vec![
        SelectorRule::new("div").attr_pattern("class", r"ui-pdp-gallery"),
        SelectorRule::new("figure").attr_pattern("class", r"ui-pdp-gallery__wrapper"),
    ],
    review_rules: vec![],
    image_attrs: &["data-zoom", "src", "data-src"],
    preload_gallery: false,
    specs: Some(SpecTable {
        container_rules: vec![
            SelectorRule::new("table").attr_pattern("class", r"andes-table"),
        ],
        row: SelectorRule::new("tr"),
        label: SelectorRule::new("th"),
        value: SelectorRule::new("td"),
    }),
    shipping_rules: vec![SelectorRule::new("p").attr_pattern("class", r"ui-pdp-media__title")],
    import_phrases: &["compra internacional"],
    foreign_badge_url: None,
    origin_labels: &["país de origem", "country of origin"],
    price_layout: PriceLayout::SplitFractionCents {
        fraction: "andes-money-amount__fraction",
        cents: "andes-money-amount__cents",
    },
    discount_priority: DiscountPriority::ComputedFirst,
    hires_substitutions: &[],
    media_host: None,
});

static SHEIN: Lazy<PlatformProfile> = Lazy::new(|| PlatformProfile {
    platform: Platform::Shein,
    label: "Shein",
    storefront_phrase: "na Shein",
    url_markers: &["shein"],
    name_rules: vec![
        SelectorRule::new("span").attr("class", "fsp-element"),
        SelectorRule::new("h1").attr("class", "fsp-element"),
        SelectorRule::new("h1").attr_pattern("class", r".*product.*title.*"),
        SelectorRule::new("h1"),
    ],
    current_price_rules: vec![
        SelectorRule::new("div").attr("id", "productMainPriceId"),
        SelectorRule::new("div").attr("class", "productPrice__main"),
        SelectorRule::new("span").attr_pattern("class", r".*price.*current.*"),
        SelectorRule::new("div").attr_pattern("class", r".*price.*"),
    ],
    old_price_rules: vec![
        SelectorRule::new("p").attr("class", "productEstimatedTagNewRetail__retail"),
        SelectorRule::new("div").attr("class", "productDiscountInfo__retail"),
        SelectorRule::new("span").attr_pattern("class", r".*price.*original.*"),
        SelectorRule::new("del"),
    ],
    discount_rules: vec![
        SelectorRule::new("div").attr("class", "productEstimatedTagNew__percent"),
        SelectorRule::new("div").attr("class", "productDiscountPercent"),
        SelectorRule::new("span").attr_pattern("class", r".*discount.*"),
        SelectorRule::new("span").attr_pattern("class", r".*percent.*"),
    ],
    description_rules: vec![
        SelectorRule::new("div").attr("class", "product-intro__attr-list-text"),
        SelectorRule::new("div").attr("class", "product-intro__attr-des"),
        SelectorRule::new("div").attr("class", "product-intro__attr-wrap"),
        SelectorRule::new("div").attr_pattern("class", r".*description.*"),
        SelectorRule::new("p").attr_pattern("class", r".*description.*"),
    ],
    gallery_rules: vec![
        SelectorRule::new("ul").attr_pattern("class", r"thumbs-picture.*one-picture__thumbs"),
        SelectorRule::new("ul").attr("class", "thumbs-picture"),
        SelectorRule::new("div").attr_pattern("class", r".*gallery.*"),
    ],
    review_rules: vec![],
    image_attrs: &["src", "data-src", "data-before-crop-src"],
    preload_gallery: true,
    specs: None,
    shipping_rules: vec![
        SelectorRule::new("div").attr("class", "product-intro__size-radio"),
        SelectorRule::new("div").attr_pattern("class", r".*shipping.*radio.*"),
        SelectorRule::new("div").attr_pattern("class", r".*envio.*"),
    ],
    import_phrases: &["international"],
    foreign_badge_url: None,
    origin_labels: &["país de origem", "country of origin"],
    price_layout: PriceLayout::Inline,
    discount_priority: DiscountPriority::ComputedFirst,
    hires_substitutions: &[("_thumbnail_220x293", "_thumbnail_900x")],
    media_host: None,
});

static SHOPEE: Lazy<PlatformProfile> = Lazy::new(|| PlatformProfile {
    platform: Platform::Shopee,
    label: "Shopee",
    storefront_phrase: "na Shopee",
    url_markers: &["shopee"],
    name_rules: vec![
        SelectorRule::new("div").attr("class", "vR6K3w"),
        SelectorRule::new("div").attr_pattern("class", r".*product.*name.*"),
        SelectorRule::new("h1"),
    ],
    current_price_rules: vec![
        SelectorRule::new("div").attr("class", "IZPeQz").attr("class", "B67UQ0"),
        SelectorRule::new("div").attr_pattern("class", r".*price.*current.*"),
        SelectorRule::new("span").attr_pattern("class", r".*price.*"),
    ],
    old_price_rules: vec![
        SelectorRule::new("div").attr("class", "ZA5sW5"),
        SelectorRule::new("div").attr_pattern("class", r".*price.*original.*"),
        SelectorRule::new("span").attr_pattern("class", r".*old.*price.*"),
    ],
    discount_rules: vec![
        SelectorRule::new("div").attr("class", "vms4_3"),
        SelectorRule::new("span").attr_pattern("class", r".*discount.*"),
        SelectorRule::new("div").attr_pattern("class", r".*sale.*badge.*"),
    ],
    description_rules: vec![
        SelectorRule::new("div").attr("class", "e8lZp3"),
        SelectorRule::new("div").attr_pattern("class", r".*description.*"),
        SelectorRule::new("section").attr_pattern("class", r".*description.*"),
    ],
    gallery_rules: vec![
        SelectorRule::new("div").attr("class", "airUhU"),
        SelectorRule::new("div").attr_pattern("class", r".*gallery.*"),
    ],
    review_rules: vec![],
    image_attrs: &["src", "data-src"],
    preload_gallery: false,
    specs: None,
    shipping_rules: vec![SelectorRule::new("div").attr("class", "VJOnTD")],
    import_phrases: &["produto internacional"],
    foreign_badge_url: None,
    origin_labels: &["país de origem", "country of origin"],
    price_layout: PriceLayout::Inline,
    discount_priority: DiscountPriority::ComputedFirst,
    hires_substitutions: &[],
    media_host: Some("https://down-br.img.susercontent.com"),
});
