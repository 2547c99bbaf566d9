//! Field extractors: independent, side-effect-free recognizers for the
//! individual facts a prescription line can carry.
//!
//! Each cascade is an ordered table evaluated top to bottom; the first entry
//! that matches decides the result.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::lexicon::Lexicon;
use super::types::{DoseFrequency, Timing};

/// Dash-like separators in dosing codes: hyphen, dot, en/em dash and the
/// C1 code points they turn into when cp1252 text is mis-decoded.
const SEP: &str = r"[-.\x{2013}\x{2014}\x{96}\x{97}]+";

/// Dash-only run of the same separators, for places where a dot would
/// split a decimal strength.
pub const DASH_RUN: &str = r"[-\x{2013}\x{2014}\x{96}\x{97}]+";

/// A recognized morning-noon-evening-night style dosing code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DosingPattern {
    pub frequency: DoseFrequency,
    /// Sum of the slot values, e.g. `1-0-1/2` gives 1.5.
    pub units_per_day: f64,
}

struct DosingRule {
    regex: Regex,
    handler: fn(&Captures) -> DosingPattern,
}

static DOSING_RULES: LazyLock<Vec<DosingRule>> = LazyLock::new(|| {
    let token = r"([\d/]+)";
    let four = format!(
        r"{token}\s*{SEP}\s*{token}\s*{SEP}\s*{token}\s*{SEP}\s*{token}"
    );
    let three = format!(r"{token}\s*{SEP}\s*{token}\s*{SEP}\s*{token}");
    vec![
        DosingRule {
            regex: Regex::new(&four).expect("valid regex"),
            handler: slots_to_pattern,
        },
        DosingRule {
            regex: Regex::new(&three).expect("valid regex"),
            handler: slots_to_pattern,
        },
        DosingRule {
            regex: Regex::new(r"-{2,}\s*(\d+)\s*-{2,}").expect("valid regex"),
            handler: |caps| DosingPattern {
                frequency: DoseFrequency::OnceDaily,
                units_per_day: parse_dose_token(&caps[1]),
            },
        },
    ]
});

fn slots_to_pattern(caps: &Captures) -> DosingPattern {
    let values: Vec<f64> = caps
        .iter()
        .skip(1)
        .flatten()
        .map(|m| parse_dose_token(m.as_str()))
        .collect();
    let taken = values.iter().filter(|v| **v > 0.0).count();
    DosingPattern {
        frequency: DoseFrequency::from_slot_count(taken),
        units_per_day: values.iter().sum(),
    }
}

/// Parse a dosing slot: an integer, a decimal or a fraction `a/b`.
/// Digits from other scripts (`١`, `१`) count like their ASCII forms.
/// Anything unparseable (or a zero denominator) counts as 0.
pub fn parse_dose_token(token: &str) -> f64 {
    let folded = fold_digits(token.trim());
    let token = folded.as_str();
    if token.contains('/') {
        let mut parts = token.split('/');
        let numerator = parts.next().and_then(|p| p.parse::<f64>().ok());
        let denominator = parts.next().and_then(|p| p.parse::<f64>().ok());
        return match (numerator, denominator) {
            (Some(n), Some(d)) if d != 0.0 => n / d,
            _ => 0.0,
        };
    }
    token.parse::<f64>().unwrap_or(0.0)
}

/// Zero code points of the decimal digit blocks seen in transcriptions:
/// Arabic-Indic, Extended Arabic-Indic, the Indic scripts from Devanagari
/// to Malayalam, Thai and fullwidth.
const DIGIT_ZEROS: &[u32] = &[
    0x0660, 0x06F0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66, 0x0CE6,
    0x0D66, 0x0E50, 0xFF10,
];

fn fold_digits(token: &str) -> String {
    token
        .chars()
        .map(|c| {
            let code = c as u32;
            DIGIT_ZEROS
                .iter()
                .find(|&&zero| (zero..zero + 10).contains(&code))
                .and_then(|&zero| char::from_digit(code - zero, 10))
                .unwrap_or(c)
        })
        .collect()
}

/// Find a dosing code (4 slots, then 3 slots, then a `--N--` marker).
pub fn extract_dosing(text: &str) -> Option<DosingPattern> {
    DOSING_RULES
        .iter()
        .find_map(|rule| rule.regex.captures(text).map(|caps| (rule.handler)(&caps)))
}

/// Normalized (space-free, lower-case) phrase keys, checked in order.
const TIMING_KEYS: &[(&str, Timing)] = &[
    ("beforefood", Timing::BeforeFood),
    ("beforemeal", Timing::BeforeFood),
    ("beforebreakfast", Timing::BeforeFood),
    ("beforebreak", Timing::BeforeFood),
    ("afterfood", Timing::AfterFood),
    ("aftermeal", Timing::AfterFood),
    ("afterlunch", Timing::AfterFood),
    ("afterdinner", Timing::AfterFood),
    ("withfood", Timing::WithFood),
    ("withmeal", Timing::WithFood),
    ("emptystomach", Timing::EmptyStomach),
    ("localapplication", Timing::LocalApplication),
];

/// Second pass over the raw text, tolerant of tabs and line breaks.
static TIMING_PHRASES: LazyLock<Vec<(Regex, Timing)>> = LazyLock::new(|| {
    [
        (r"(?i)before\s+food", Timing::BeforeFood),
        (r"(?i)after\s+food", Timing::AfterFood),
        (r"(?i)after\s+lunch", Timing::AfterFood),
        (r"(?i)with\s+food", Timing::WithFood),
        (r"(?i)empty\s+stomach", Timing::EmptyStomach),
        (r"(?i)local\s+application", Timing::LocalApplication),
    ]
    .into_iter()
    .map(|(pattern, timing)| (Regex::new(pattern).expect("valid regex"), timing))
    .collect()
});

const FREQUENCY_KEYS: &[(&str, DoseFrequency)] = &[
    ("onceaday", DoseFrequency::OnceDaily),
    ("oncedaily", DoseFrequency::OnceDaily),
    ("twiceaday", DoseFrequency::TwiceDaily),
    ("twicedaily", DoseFrequency::TwiceDaily),
    ("threetimesaday", DoseFrequency::ThreeTimesDaily),
    ("fourtimesaday", DoseFrequency::FourTimesDaily),
];

/// Lower-case and drop spaces so OCR-merged or split words compare equal.
fn normalize_phrase(text: &str) -> String {
    text.to_lowercase().replace(' ', "")
}

pub fn extract_timing(text: &str) -> Option<Timing> {
    let normalized = normalize_phrase(text);
    TIMING_KEYS
        .iter()
        .find(|(key, _)| normalized.contains(key))
        .map(|(_, timing)| *timing)
        .or_else(|| {
            TIMING_PHRASES
                .iter()
                .find(|(regex, _)| regex.is_match(text))
                .map(|(_, timing)| *timing)
        })
}

/// Explicit frequency phrase ("twice a day", "Oncedaily").
pub fn extract_frequency_phrase(text: &str) -> Option<DoseFrequency> {
    let normalized = normalize_phrase(text);
    FREQUENCY_KEYS
        .iter()
        .find(|(key, _)| normalized.contains(key))
        .map(|(_, freq)| *freq)
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(days?|weeks?|months?)").expect("valid regex")
});

/// "Continue for 10 days" gives "10 Days".
pub fn extract_duration(text: &str) -> Option<String> {
    DURATION_RE
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], title_case(&caps[2])))
}

static TOTAL_QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Tot|Total)\s*:?\s*(\d+)\s*(Tab|Cap|Tabs?|Caps?|ML)").expect("valid regex")
});

/// Pack size like `15'S`. Two digits minimum; `1S` is usually OCR noise.
static PACK_SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2,})\s*['S\x{2019}s]+\b").expect("valid regex")
});

pub fn extract_quantity(text: &str) -> Option<String> {
    if let Some(caps) = TOTAL_QUANTITY_RE.captures(text) {
        return Some(format!("{} {}", &caps[1], title_case(&caps[2])));
    }
    PACK_SIZE_RE
        .captures(text)
        .map(|caps| format!("{} Tabs", &caps[1]))
}

static STRENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+\.?\d*)\s*(mg|mcg|g|ml|iu|gm)").expect("valid regex")
});

/// First strength in the text, unit upper-cased: "500mg" gives "500 MG".
pub fn extract_dosage_strength(text: &str) -> Option<String> {
    STRENGTH_RE
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], caps[2].to_uppercase()))
}

/// "Contains: Paracetamol (650 mg)" style ingredient line.
static CONTAINS_DOSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)contains?\s*:?\s*\w[\w\s]*?\((\d+\.?\d*)\s*(mg|mcg|g|ml|gm|%\s*W/W)\)")
        .expect("valid regex")
});

pub fn extract_contains_dosage(text: &str) -> Option<String> {
    CONTAINS_DOSAGE_RE
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], caps[2].to_uppercase()))
}

/// First whole-word form keyword, mapped through the lexicon's form table.
pub fn extract_form(text: &str, lexicon: &Lexicon) -> Option<String> {
    lexicon
        .form_patterns()
        .find_name_keyword(text)
        .map(|keyword| resolve_form_keyword(keyword, lexicon))
}

/// A `TABLET | Once a day` column marker from pharmacy tables.
pub fn extract_form_column(text: &str, lexicon: &Lexicon) -> Option<String> {
    lexicon
        .form_patterns()
        .find_column_keyword(text)
        .map(|keyword| resolve_form_keyword(keyword, lexicon))
}

fn resolve_form_keyword(keyword: &str, lexicon: &Lexicon) -> String {
    lexicon
        .form_for(keyword)
        .map(str::to_string)
        .unwrap_or_else(|| title_case(keyword))
}

/// Upper-case the first letter of every alphabetic run and lower-case the
/// rest: "DOLO 650" gives "Dolo 650", "pan-d" gives "Pan-D".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
