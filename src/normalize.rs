//! Text normalization for product names and descriptions.
//!
//! Every function here is pure and idempotent: running a value through
//! the same normalizer twice yields the first result unchanged, so
//! directory names stay stable across repeated runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length (in characters) of a normalized product name.
pub const MAX_NAME_CHARS: usize = 80;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Characters that cannot appear in a directory name on common filesystems.
const INVALID_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Normalize a raw product name into a stable, filesystem-safe form.
///
/// Collapses whitespace, optionally title-cases, replaces invalid
/// characters and spaces with underscores, and truncates to
/// [`MAX_NAME_CHARS`] characters. Truncation happens last so the
/// result never ends mid-replacement.
pub fn normalize_name(raw: &str, title_case_names: bool) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw.trim(), " ");
    let cased = if title_case_names {
        title_case(&collapsed)
    } else {
        collapsed.to_string()
    };
    let mut out = String::with_capacity(cased.len());
    let mut last_underscore = false;
    for c in cased.chars() {
        let mapped = if c.is_whitespace() || INVALID_NAME_CHARS.contains(&c) || c.is_control() {
            '_'
        } else {
            c
        };
        if mapped == '_' && last_underscore {
            continue;
        }
        last_underscore = mapped == '_';
        out.push(mapped);
    }
    let trimmed = out.trim_matches('_');
    let truncated: String = trimmed.chars().take(MAX_NAME_CHARS).collect();
    // Truncation can land on an underscore; strip it so re-normalizing
    // the result is a no-op.
    truncated.trim_end_matches('_').to_string()
}

/// Case-map one character, keeping it unchanged when the mapping is
/// not one-to-one (`ß` uppercases to "SS"); recasing must never change
/// the character count.
fn recase_single(mut mapped: impl Iterator<Item = char>, original: char) -> char {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => c,
        _ => original,
    }
}

/// Uppercase every letter that follows a non-letter, lowercase the rest.
///
/// Unlike word-splitting title casers this treats any non-letter as a
/// boundary, which keeps it idempotent on names that already contain
/// underscores ("Wireless_Mouse" stays "Wireless_Mouse").
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_boundary = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_boundary {
                out.push(recase_single(c.to_uppercase(), c));
            } else {
                out.push(recase_single(c.to_lowercase(), c));
            }
            at_boundary = false;
        } else {
            out.push(c);
            at_boundary = true;
        }
    }
    out
}

/// Re-case free text so each sentence starts with a capital letter and
/// the rest is lowercase. Sentence boundaries are `.`, `!` and `?`.
///
/// Only letter case changes; the character count is preserved.
pub fn sentence_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_sentence_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_sentence_start {
                out.push(recase_single(c.to_uppercase(), c));
                at_sentence_start = false;
            } else {
                out.push(recase_single(c.to_lowercase(), c));
            }
        } else {
            if matches!(c, '.' | '!' | '?') {
                at_sentence_start = true;
            }
            out.push(c);
        }
    }
    out
}

static BOLD_MARKDOWN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("Invalid bold regex"));

static EXTRA_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("Invalid newline regex"));

/// Clean a scraped description: strip markdown bold markers, clamp
/// blank-line runs to one, and trim each line. Casing is left to
/// [`sentence_case`].
pub fn clean_description(raw: &str) -> String {
    let without_bold = BOLD_MARKDOWN.replace_all(raw, "$1");
    let clamped = EXTRA_NEWLINES.replace_all(&without_bold, "\n\n");
    let mut lines: Vec<&str> = Vec::new();
    for line in clamped.lines() {
        let line = line.trim();
        // Single blank lines separate paragraphs; runs collapse.
        if !line.is_empty() || lines.last().is_some_and(|l| !l.is_empty()) {
            lines.push(line);
        }
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_replaces_spaces_and_invalid_chars() {
        assert_eq!(normalize_name("Wireless Mouse", false), "Wireless_Mouse");
        assert_eq!(normalize_name("A/B: C?", false), "A_B_C");
    }

    #[test]
    fn normalize_name_collapses_whitespace_first() {
        assert_eq!(normalize_name("  Foo \t\n  Bar  ", false), "Foo_Bar");
    }

    #[test]
    fn normalize_name_truncates_to_80_chars() {
        let long = "x".repeat(200);
        let name = normalize_name(&long, false);
        assert_eq!(name.chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn normalize_name_is_idempotent() {
        let cases = [
            "  Wireless   Mouse 2.4GHz ",
            "ÉPICO/produto: melhor * oferta",
            &"very long name ".repeat(20),
        ];
        for raw in cases {
            let once = normalize_name(raw, true);
            let twice = normalize_name(&once, true);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn title_case_handles_underscores() {
        assert_eq!(title_case("wireless mouse"), "Wireless Mouse");
        assert_eq!(title_case("Wireless_Mouse"), "Wireless_Mouse");
        assert_eq!(title_case("GAMER pro-X"), "Gamer Pro-X");
    }

    #[test]
    fn sentence_case_recases_each_sentence() {
        assert_eq!(
            sentence_case("GREAT mouse. WORKS well! really? yes"),
            "Great mouse. Works well! Really? Yes"
        );
    }

    #[test]
    fn sentence_case_preserves_char_count() {
        let text = "UM produto ÓTIMO. não há igual!";
        assert_eq!(sentence_case(text).chars().count(), text.chars().count());
    }

    #[test]
    fn sentence_case_skips_length_changing_case_maps() {
        // ß uppercases to "SS" and İ lowercases to two chars; both must
        // pass through untouched so the count stays stable.
        let text = "ße boa. İyi produto.";
        let cased = sentence_case(text);
        assert_eq!(cased, "ße boa. İyi produto.");
        assert_eq!(cased.chars().count(), text.chars().count());
    }

    #[test]
    fn clean_description_strips_bold_and_clamps_blank_lines() {
        assert_eq!(
            clean_description("**Destaque** do produto\n\n\n\n  detalhes  "),
            "Destaque do produto\n\ndetalhes"
        );
    }

    #[test]
    fn clean_description_then_sentence_case() {
        let cleaned = clean_description("GREAT mouse. WORKS well!");
        assert_eq!(sentence_case(&cleaned), "Great mouse. Works well!");
    }
}
