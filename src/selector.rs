//! Fallback selector resolution.
//!
//! Store markup churns constantly, so every field is located by an
//! ordered list of [`SelectorRule`]s tried in sequence. Earlier rules
//! are the current markup; later ones are older layouts kept as
//! fallbacks. Resolution stops at the first rule that matches.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// How a single attribute is matched against a candidate element.
#[derive(Debug, Clone)]
pub enum AttrMatcher {
    /// Attribute value equals the needle, or (for space-separated
    /// attributes like `class`) contains it as a whole token.
    Exact(&'static str),
    /// Attribute value matches a case-insensitive regex.
    Pattern(Regex),
}

impl AttrMatcher {
    fn matches(&self, value: &str) -> bool {
        match self {
            AttrMatcher::Exact(needle) => {
                value == *needle || value.split_whitespace().any(|tok| tok == *needle)
            }
            AttrMatcher::Pattern(re) => re.is_match(value),
        }
    }
}

/// One candidate location for a field: a tag name plus attribute
/// constraints that must all hold.
#[derive(Debug, Clone)]
pub struct SelectorRule {
    tag: Selector,
    attrs: Vec<(&'static str, AttrMatcher)>,
}

impl SelectorRule {
    /// Rules are built at startup from static tables, so a bad tag
    /// name is a programming error.
    pub fn new(tag: &'static str) -> Self {
        SelectorRule {
            tag: Selector::parse(tag).expect("Invalid tag selector"),
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: &'static str) -> Self {
        self.attrs.push((name, AttrMatcher::Exact(value)));
        self
    }

    pub fn attr_pattern(mut self, name: &'static str, pattern: &'static str) -> Self {
        let re = Regex::new(&format!("(?i){pattern}")).expect("Invalid attribute pattern");
        self.attrs.push((name, AttrMatcher::Pattern(re)));
        self
    }

    fn matches(&self, element: &ElementRef) -> bool {
        self.attrs.iter().all(|(name, matcher)| {
            element
                .value()
                .attr(name)
                .is_some_and(|value| matcher.matches(value))
        })
    }

    /// First element in document order satisfying this rule.
    pub fn find_in<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        doc.select(&self.tag).find(|el| self.matches(el))
    }

    /// All elements satisfying this rule, in document order.
    pub fn find_all_in<'a>(&self, doc: &'a Html) -> Vec<ElementRef<'a>> {
        doc.select(&self.tag).filter(|el| self.matches(el)).collect()
    }

    /// First descendant of `root` satisfying this rule.
    pub fn find_under<'a>(&self, root: &ElementRef<'a>) -> Option<ElementRef<'a>> {
        root.select(&self.tag).find(|el| self.matches(el))
    }

    /// All descendants of `root` satisfying this rule, in document order.
    pub fn find_all_under<'a>(&self, root: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        root.select(&self.tag).filter(|el| self.matches(el)).collect()
    }
}

/// Outcome of resolving a field's rule list against a document.
///
/// "Element found but empty" and "no element at all" are distinct: an
/// empty price node means the store rendered no price, while a missing
/// node usually means the next fallback rule should have fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    Found(String),
    Empty,
    Missing,
}

impl TextMatch {
    pub fn into_option(self) -> Option<String> {
        match self {
            TextMatch::Found(text) => Some(text),
            TextMatch::Empty | TextMatch::Missing => None,
        }
    }
}

/// Resolve an ordered rule list to its first matching element.
pub fn resolve<'a>(doc: &'a Html, rules: &[SelectorRule]) -> Option<ElementRef<'a>> {
    rules.iter().find_map(|rule| rule.find_in(doc))
}

/// Resolve a rule list and extract the matched element's text.
///
/// The first rule that matches an element wins even when that element
/// has no text; later rules are only consulted when no element matched.
pub fn resolve_text(doc: &Html, rules: &[SelectorRule]) -> TextMatch {
    match resolve(doc, rules) {
        Some(element) => {
            let text = element_text(&element);
            if text.is_empty() {
                TextMatch::Empty
            } else {
                TextMatch::Found(text)
            }
        }
        None => TextMatch::Missing,
    }
}

/// All elements matched by the first rule that matches anything.
pub fn resolve_all<'a>(doc: &'a Html, rules: &[SelectorRule]) -> Vec<ElementRef<'a>> {
    for rule in rules {
        let found = rule.find_all_in(doc);
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

static INNER_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Concatenated, whitespace-collapsed text of an element's subtree.
pub fn element_text(element: &ElementRef) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    INNER_WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn first_matching_rule_wins() {
        let html = doc(r#"<h1 class="old-title">Old</h1><h1 data-pl="product-title">New</h1>"#);
        let rules = vec![
            SelectorRule::new("h1").attr("data-pl", "product-title"),
            SelectorRule::new("h1").attr("class", "old-title"),
        ];
        assert_eq!(resolve_text(&html, &rules), TextMatch::Found("New".into()));
    }

    #[test]
    fn falls_back_when_primary_rule_misses() {
        let html = doc(r#"<h1 class="old-title">Old</h1>"#);
        let rules = vec![
            SelectorRule::new("h1").attr("data-pl", "product-title"),
            SelectorRule::new("h1").attr("class", "old-title"),
        ];
        assert_eq!(resolve_text(&html, &rules), TextMatch::Found("Old".into()));
    }

    #[test]
    fn exact_class_matches_token_in_class_list() {
        let html = doc(r#"<div class="price main highlighted">49,90</div>"#);
        let rules = vec![SelectorRule::new("div").attr("class", "price")];
        assert_eq!(resolve_text(&html, &rules), TextMatch::Found("49,90".into()));
    }

    #[test]
    fn pattern_matching_is_case_insensitive() {
        let html = doc(r#"<span class="ProductPrice-Current">R$ 10,00</span>"#);
        let rules = vec![SelectorRule::new("span").attr_pattern("class", "productprice")];
        assert!(matches!(resolve_text(&html, &rules), TextMatch::Found(_)));
    }

    #[test]
    fn empty_element_is_distinct_from_missing() {
        let html = doc(r#"<span class="price"></span>"#);
        let price_rules = vec![SelectorRule::new("span").attr("class", "price")];
        let other_rules = vec![SelectorRule::new("span").attr("class", "nothing")];
        assert_eq!(resolve_text(&html, &price_rules), TextMatch::Empty);
        assert_eq!(resolve_text(&html, &other_rules), TextMatch::Missing);
    }

    #[test]
    fn empty_match_does_not_fall_through_to_later_rules() {
        let html = doc(r#"<span class="price"></span><span class="fallback">9,99</span>"#);
        let rules = vec![
            SelectorRule::new("span").attr("class", "price"),
            SelectorRule::new("span").attr("class", "fallback"),
        ];
        assert_eq!(resolve_text(&html, &rules), TextMatch::Empty);
    }

    #[test]
    fn resolve_all_returns_every_match_of_one_rule() {
        let html = doc(r#"<img class="g" src="a"/><img class="g" src="b"/><img class="h" src="c"/>"#);
        let rules = vec![
            SelectorRule::new("img").attr("class", "g"),
            SelectorRule::new("img").attr("class", "h"),
        ];
        let found = resolve_all(&html, &rules);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn element_text_flattens_nested_markup() {
        let html = doc("<div><b>R$</b>\n   <span>49</span>,<span>90</span></div>");
        let rules = vec![SelectorRule::new("div")];
        assert_eq!(
            resolve_text(&html, &rules),
            TextMatch::Found("R$ 49 , 90".into())
        );
    }
}
