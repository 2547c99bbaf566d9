use std::sync::LazyLock;

use regex::Regex;

use super::extractors::{extract_form, title_case, DASH_RUN};
use super::lexicon::Lexicon;
use super::types::DEFAULT_FORM;

/// A display-ready medicine name plus the form resolved while cleaning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedName {
    pub name: String,
    pub form: String,
}

/// Noise removed from a captured name, applied in this order.
/// Each pattern is replaced with the paired string and the result trimmed.
/// A `KEYWORD | ...` column remnant is cut afterwards with the lexicon's
/// column keywords.
static NOISE_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        // Dosing codes anywhere: 1-0-0-0, 1---0---1, 1–0–1
        (
            format!(r"[\d/]+\s*{DASH_RUN}\s*[\d/]+(?:\s*{DASH_RUN}\s*[\d/]+)*"),
            "",
        ),
        // Single-value markers: -----1-----
        (r"-{2,}\d+-{2,}".to_string(), ""),
        // Duration: 15 days, 7days
        (r"(?i)\s*\d+\s*(?:days?|weeks?|months?)".to_string(), ""),
        // Pack size: 15'S, 10 S
        (r"\s+\d+\s*'?\s*[Ss](?:\s|$)".to_string(), " "),
        // Frequency phrase and everything after it
        (r"(?i)\s*(once|twice|three|four)\s*(a\s*day|daily|times?).*$".to_string(), ""),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(&pattern).expect("valid regex"), replacement))
    .collect()
});

static TRAILING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\d{1,2}\s*$").expect("valid regex"));

/// Turn a raw captured name into a display name and resolve its form.
///
/// Form priority: explicit type prefix, then a form keyword found in the
/// name, then the tablet default.
pub fn clean_medicine_name(raw: &str, type_prefix: Option<&str>, lexicon: &Lexicon) -> CleanedName {
    let mut name = raw.trim().to_string();
    for (regex, replacement) in NOISE_RULES.iter() {
        name = regex.replace_all(&name, *replacement).trim().to_string();
    }
    let patterns = lexicon.form_patterns();
    name = patterns.strip_column_remnant(&name);

    // Must run before the trailing keyword is cut off.
    let form_in_name = extract_form(&name, lexicon);

    let without_form = patterns.strip_trailing_keyword(&name);
    let without_number = strip_trailing_short_number(&without_form);
    let display = without_number
        .trim_end_matches([',', '.', '|', '@'])
        .to_string();

    let form = match (type_prefix, form_in_name) {
        (Some(prefix), _) => lexicon.form_for_prefix(prefix),
        (None, Some(form)) => form,
        (None, None) => DEFAULT_FORM.to_string(),
    };

    let name = if display.is_empty() {
        title_case(&name)
    } else {
        title_case(&display)
    };

    CleanedName { name, form }
}

/// Drop a trailing 1-2 digit token ("Crocin 2" becomes "Crocin") while
/// keeping strengths like "Dolo 650". A short number that directly follows
/// a digit or dash across a single space is kept ("1-0 1").
fn strip_trailing_short_number(name: &str) -> String {
    let Some(m) = TRAILING_NUMBER_RE.find(name) else {
        return name.to_string();
    };
    let start = m.start();
    let blocked = name[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit() || c == '-');
    let gap = m.as_str().len() - m.as_str().trim_start().len();
    if blocked && gap < 2 {
        return name.to_string();
    }
    name[..start].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str, prefix: Option<&str>) -> CleanedName {
        clean_medicine_name(raw, prefix, Lexicon::builtin())
    }

    #[test]
    fn strips_dosing_duration_and_pack_size() {
        let cleaned = clean("DOLO 650 1-0-1 5 days 15'S", None);
        assert_eq!(cleaned.name, "Dolo 650");
        assert_eq!(cleaned.form, "Oral Tablet");
    }

    #[test]
    fn strips_single_value_marker() {
        assert_eq!(clean("SHELCAL-----1-----", None).name, "Shelcal");
    }

    #[test]
    fn strips_frequency_phrase_and_tail() {
        assert_eq!(clean("Crocin Once a day after food", None).name, "Crocin");
        assert_eq!(clean("Telma H Twicedaily", None).name, "Telma H");
    }

    #[test]
    fn strips_form_column_remnant() {
        let cleaned = clean("PAN D TABLET | Once a day", None);
        assert_eq!(cleaned.name, "Pan D");
        assert_eq!(cleaned.form, "Oral Tablet");
    }

    #[test]
    fn form_keyword_in_name_resolves_form() {
        let cleaned = clean("VOLINI PAIN RELIEF GEL", None);
        assert_eq!(cleaned.name, "Volini Pain Relief");
        assert_eq!(cleaned.form, "Gel");
    }

    #[test]
    fn type_prefix_wins_over_keyword() {
        let cleaned = clean("OMEZ 200 TABLET", Some("cap"));
        assert_eq!(cleaned.name, "Omez 200");
        assert_eq!(cleaned.form, "Capsule");
    }

    #[test]
    fn unknown_prefix_defaults_to_tablet() {
        assert_eq!(clean("Something", Some("xyz")).form, "Oral Tablet");
    }

    #[test]
    fn trailing_short_number_removed_long_kept() {
        assert_eq!(clean("Crocin 2", None).name, "Crocin");
        assert_eq!(clean("Dolo 650", None).name, "Dolo 650");
    }

    #[test]
    fn trailing_number_after_digit_is_kept() {
        assert_eq!(strip_trailing_short_number("Abc 5 12"), "Abc 5 12");
        assert_eq!(strip_trailing_short_number("Abc 5  12"), "Abc 5");
        assert_eq!(strip_trailing_short_number("Abc 12"), "Abc");
    }

    #[test]
    fn trailing_punctuation_removed() {
        assert_eq!(clean("Azithral 500,", None).name, "Azithral 500");
        assert_eq!(clean("Zerodol SP.|", None).name, "Zerodol Sp");
    }

    #[test]
    fn strips_dosing_code_with_long_dashes() {
        assert_eq!(clean("DOLO 650 1\u{2013}0\u{2013}1", None).name, "Dolo 650");
        assert_eq!(clean("ZERODOL SP 1\u{2014}0\u{2014}0\u{2014}0", None).name, "Zerodol Sp");
        // Dots stay: they are decimal points in strengths.
        assert_eq!(clean("Glimisave 0.5", None).name, "Glimisave 0.5");
    }

    #[test]
    fn custom_keywords_strip_and_resolve() {
        let lexicon = Lexicon::from_json_str(r#"{"forms": {"lotion": "Lotion"}}"#).unwrap();
        let cleaned = clean_medicine_name("Calamine LOTION", None, &lexicon);
        assert_eq!(cleaned.name, "Calamine");
        assert_eq!(cleaned.form, "Lotion");
        let cleaned = clean_medicine_name("Calamine LOTION | twice", None, &lexicon);
        assert_eq!(cleaned.name, "Calamine");
    }

    #[test]
    fn only_form_keyword_falls_back_to_raw_text() {
        let cleaned = clean("GEL", None);
        assert_eq!(cleaned.name, "Gel");
        assert_eq!(cleaned.form, "Gel");
    }
}
