//! Field extractors.
//!
//! One pure function per product attribute, all driven by the
//! per-store selector tables in [`crate::platform`]. Extraction never
//! fails: a field that cannot be located falls back to its documented
//! default, so one broken selector never aborts a scrape.

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

use crate::platform::{DiscountPriority, PlatformProfile, PriceLayout, SpecTable};
use crate::record::{Price, NO_DESCRIPTION};
use crate::selector::{element_text, resolve, resolve_all, resolve_text, SelectorRule};

/// Minimum length for a description candidate; shorter matches are
/// usually stray labels picked up by a generic fallback rule.
const MIN_DESCRIPTION_CHARS: usize = 10;

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d.,]*)[,.](\d{2})(\D|$)").expect("Invalid price regex"));

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,3})\s*%").expect("Invalid percent regex"));

static VIDEO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'<>\\]+?(?:\.(?:mp4|webm|mov)|\.m3u8)"#)
        .expect("Invalid video URL regex")
});

static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("Invalid img selector"));

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link").expect("Invalid link selector"));

static VIDEO_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("video").expect("Invalid video selector"));

static SOURCE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("source").expect("Invalid source selector"));

static JSON_SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/json"]"#).expect("Invalid script selector")
});

/// Raw product name, or `None` when no rule matched anything usable.
pub fn extract_name(doc: &Html, profile: &PlatformProfile) -> Option<String> {
    resolve_text(doc, &profile.name_rules).into_option()
}

/// Split a price out of arbitrary text: digits (with optional
/// thousands separators), a `,` or `.`, then exactly two cents digits.
pub fn parse_price(text: &str) -> Option<Price> {
    // Cents often render in their own element, so the flattened text
    // can carry spaces inside the number.
    let squeezed: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let caps = PRICE_RE.captures(&squeezed)?;
    let integer: String = caps[1].chars().filter(char::is_ascii_digit).collect();
    if integer.is_empty() {
        return None;
    }
    Some(Price::new(integer, caps[2].to_string()))
}

fn price_from_element(element: &ElementRef, layout: &PriceLayout) -> Option<Price> {
    match layout {
        PriceLayout::Inline => parse_price(&element_text(element)),
        PriceLayout::SplitFractionCents { fraction, cents } => {
            let fraction_rule = SelectorRule::new("*").attr("class", *fraction);
            let cents_rule = SelectorRule::new("*").attr("class", *cents);
            let integer: String = fraction_rule
                .find_under(element)
                .map(|el| element_text(&el))?
                .chars()
                .filter(char::is_ascii_digit)
                .collect();
            if integer.is_empty() {
                return None;
            }
            let decimal = cents_rule
                .find_under(element)
                .map(|el| {
                    element_text(&el)
                        .chars()
                        .filter(char::is_ascii_digit)
                        .collect::<String>()
                })
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "00".to_string());
            Some(Price::new(integer, decimal))
        }
    }
}

/// Current price, defaulting to R$0,00 when absent or unparseable.
pub fn extract_current_price(doc: &Html, profile: &PlatformProfile) -> Price {
    resolve(doc, &profile.current_price_rules)
        .and_then(|el| price_from_element(&el, &profile.price_layout))
        .unwrap_or_else(Price::zero)
}

/// Pre-discount price, defaulting to N/A when the store shows none.
pub fn extract_old_price(doc: &Html, profile: &PlatformProfile) -> Price {
    resolve(doc, &profile.old_price_rules)
        .and_then(|el| price_from_element(&el, &profile.price_layout))
        .unwrap_or_else(Price::unavailable)
}

fn computed_discount(old: &Price, current: &Price) -> Option<String> {
    let old = old.as_f64()?;
    let current = current.as_f64()?;
    // Old price of zero would divide by zero; no old price, no discount.
    if old <= 0.0 || current >= old {
        return None;
    }
    let percent = ((old - current) / old * 100.0).round() as i64;
    Some(format!("{percent}%"))
}

fn badge_discount(doc: &Html, rules: &[SelectorRule]) -> Option<String> {
    let text = resolve_text(doc, rules).into_option()?;
    let caps = PERCENT_RE.captures(&text)?;
    Some(format!("{}%", &caps[1]))
}

/// Discount percentage as `"<n>%"`, or `"N/A"`.
///
/// Whether the computed value or the on-page badge wins is a profile
/// decision; Amazon's badge reflects promotions the list price misses.
pub fn extract_discount(doc: &Html, profile: &PlatformProfile, old: &Price, current: &Price) -> String {
    let computed = computed_discount(old, current);
    let badge = badge_discount(doc, &profile.discount_rules);
    match profile.discount_priority {
        DiscountPriority::ComputedFirst => computed.or(badge),
        DiscountPriority::BadgeFirst => badge.or(computed),
    }
    .unwrap_or_else(|| "N/A".to_string())
}

/// Cleaned product description, or the documented default.
///
/// Rules are tried one by one and a match shorter than
/// [`MIN_DESCRIPTION_CHARS`] falls through to the next rule, unlike
/// other fields where the first matched element always wins.
pub fn extract_description(doc: &Html, profile: &PlatformProfile) -> String {
    for rule in &profile.description_rules {
        if let Some(element) = rule.find_in(doc) {
            let text = element_text(&element);
            if text.chars().count() > MIN_DESCRIPTION_CHARS {
                let cleaned = crate::normalize::clean_description(&text);
                return crate::normalize::sentence_case(&cleaned);
            }
        }
    }
    NO_DESCRIPTION.to_string()
}

/// Label/value specification rows. Rows missing either cell are
/// skipped; a repeated label keeps the last value seen.
pub fn extract_specifications(doc: &Html, profile: &PlatformProfile) -> BTreeMap<String, String> {
    let mut specs = BTreeMap::new();
    let Some(SpecTable {
        container_rules,
        row,
        label,
        value,
    }) = &profile.specs
    else {
        return specs;
    };
    let Some(container) = resolve(doc, container_rules) else {
        return specs;
    };
    for row_el in row.find_all_under(&container) {
        let Some(label_el) = label.find_under(&row_el) else {
            continue;
        };
        let Some(value_el) = value.find_under(&row_el) else {
            continue;
        };
        let key = element_text(&label_el);
        let val = element_text(&value_el);
        if !key.is_empty() {
            specs.insert(key, val);
        }
    }
    specs
}

fn non_brazil_origin(value: &str) -> bool {
    let lower = value.to_lowercase();
    !lower.is_empty() && !lower.contains("brasil") && !lower.contains("brazil")
}

/// Whether the listing ships from abroad.
///
/// Checks, in order: the store's foreign-seller badge image, an
/// import-declaration phrase in the store's marked elements, and a
/// country-of-origin specification row with a non-Brazil value.
/// Ambiguity always resolves to domestic.
pub fn detect_international(
    doc: &Html,
    profile: &PlatformProfile,
    specs: &BTreeMap<String, String>,
) -> bool {
    if let Some(badge_url) = profile.foreign_badge_url {
        if doc
            .select(&IMG_SELECTOR)
            .any(|img| img.value().attr("src") == Some(badge_url))
        {
            return true;
        }
    }

    for rule in &profile.shipping_rules {
        for element in rule.find_all_in(doc) {
            let mut haystack = element_text(&element).to_lowercase();
            if let Some(aria) = element.value().attr("aria-label") {
                haystack.push(' ');
                haystack.push_str(&aria.to_lowercase());
            }
            if profile.import_phrases.iter().any(|p| haystack.contains(p)) {
                return true;
            }
            // Detail rows label the origin inline rather than in a
            // specs table; the value sits next to the label text.
            for origin_label in profile.origin_labels {
                if let Some(rest) = haystack.split(*origin_label).nth(1) {
                    if non_brazil_origin(rest.trim_matches([':', ' '])) {
                        return true;
                    }
                }
            }
        }
    }

    specs.iter().any(|(key, value)| {
        let key = key.to_lowercase();
        profile.origin_labels.iter().any(|l| key.contains(l)) && non_brazil_origin(value)
    })
}

fn apply_hires(url: &str, profile: &PlatformProfile) -> String {
    let mut out = url.to_string();
    for (needle, replacement) in profile.hires_substitutions {
        if out.contains(needle) {
            out = out.replace(needle, replacement);
        }
    }
    out
}

/// Resolve a raw media reference to something downloadable.
///
/// `base` is the page URL in online mode; in offline mode it is absent
/// and relative paths are kept as-is so they can be copied from disk.
pub fn normalize_media_url(raw: &str, base: Option<&str>, profile: &PlatformProfile) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") || raw.contains("placeholder") {
        return None;
    }
    let upgraded = apply_hires(raw, profile);
    if let Some(rest) = upgraded.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if upgraded.starts_with("http://") || upgraded.starts_with("https://") {
        return Some(upgraded);
    }
    match base {
        Some(base) => {
            // The media CDN lives on a different host than the
            // storefront, so relative paths join against it instead of
            // the page URL.
            if let Some(host) = profile.media_host {
                let path = upgraded.trim_start_matches('/');
                return Some(format!("{host}/{path}"));
            }
            Url::parse(base).ok()?.join(&upgraded).ok().map(|u| u.to_string())
        }
        // Offline: keep relative references so they can be copied from
        // next to the HTML file.
        None => Some(upgraded),
    }
}

fn preload_image_urls(doc: &Html) -> Vec<String> {
    // Product gallery images are announced as preload hints ahead of
    // the canonical link; preloads after it belong to recommendations.
    let mut urls = Vec::new();
    for link in doc.select(&LINK_SELECTOR) {
        match link.value().attr("rel") {
            Some("canonical") => break,
            Some("preload") if link.value().attr("as") == Some("image") => {
                if let Some(href) = link.value().attr("href") {
                    urls.push(href.to_string());
                }
            }
            _ => {}
        }
    }
    urls
}

/// Gallery image URLs in document order, deduplicated by exact string.
pub fn find_image_urls(doc: &Html, profile: &PlatformProfile, base: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |raw: &str, urls: &mut Vec<String>| {
        if let Some(url) = normalize_media_url(raw, base, profile) {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    };

    if profile.preload_gallery {
        let preloads = preload_image_urls(doc);
        if !preloads.is_empty() {
            for raw in &preloads {
                push(raw, &mut urls);
            }
            return urls;
        }
    }

    for rules in [&profile.gallery_rules, &profile.review_rules] {
        for container in resolve_all(doc, rules) {
            for img in container.select(&IMG_SELECTOR) {
                for attr in profile.image_attrs {
                    if let Some(raw) = img.value().attr(attr) {
                        push(raw, &mut urls);
                        break;
                    }
                }
            }
        }
    }
    urls
}

fn video_from_json(value: &Value) -> Option<String> {
    const VIDEO_KEYS: [&str; 6] = ["video", "videoUrl", "video_url", "url", "src", "source"];
    match value {
        Value::Object(map) => {
            for key in VIDEO_KEYS {
                if let Some(Value::String(s)) = map.get(key) {
                    if s.contains(".mp4") || s.contains(".m3u8") {
                        return Some(s.clone());
                    }
                }
            }
            map.values().find_map(video_from_json)
        }
        Value::Array(items) => items.iter().find_map(video_from_json),
        _ => None,
    }
}

/// Video URLs from `<video>`/`<source>` elements, embedded JSON blobs,
/// and a last-resort scan of the raw HTML for video-extension URLs.
pub fn find_video_urls(doc: &Html, raw_html: &str, profile: &PlatformProfile, base: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    let mut push = |raw: &str, urls: &mut Vec<String>| {
        if let Some(url) = normalize_media_url(raw, base, profile) {
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }
    };

    for video in doc.select(&VIDEO_SELECTOR) {
        if let Some(src) = video.value().attr("src") {
            push(src, &mut urls);
        }
        for source in video.select(&SOURCE_SELECTOR) {
            if let Some(src) = source.value().attr("src") {
                push(src, &mut urls);
            }
        }
    }

    for script in doc.select(&JSON_SCRIPT_SELECTOR) {
        let text: String = script.text().collect();
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            if let Some(url) = video_from_json(&value) {
                push(&url, &mut urls);
            }
        }
    }

    if urls.is_empty() {
        for m in VIDEO_URL_RE.find_iter(raw_html) {
            push(m.as_str(), &mut urls);
        }
    }
    urls
}
