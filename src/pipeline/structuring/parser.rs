//! Structured entry parser for numbered prescriptions.
//!
//! Walks the transcription line by line. A numbered line opens a medicine
//! entry; the lines that follow are collected into its block until the next
//! entry starts or input ends, at which point the block is mined for the
//! fields the trigger line did not carry.

use std::sync::LazyLock;

use regex::Regex;

use super::extractors::{
    extract_contains_dosage, extract_dosage_strength, extract_dosing, extract_duration,
    extract_form_column, extract_frequency_phrase, extract_quantity, extract_timing,
};
use super::lexicon::Lexicon;
use super::name_cleaner::clean_medicine_name;
use super::types::{
    defaults, icons, FieldConfidence, MedicineCandidate, DEFAULT_FORM, UNKNOWN_CATEGORY,
};

/// Names shorter than this are never committed.
const MIN_NAME_CHARS: usize = 2;

/// Leading tokens that mark headers and signatures, not medicines.
const SHORT_TOKENS: &[&str] = &["m", "r", "rx", "id", "dr"];

/// What a numbered line contributed when it opened an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryTrigger {
    pub name: String,
    /// Lower-cased abbreviation such as "tab" or "cap".
    pub type_prefix: Option<String>,
}

struct EntryPattern {
    label: &'static str,
    regex: Regex,
    accept: fn(&str, &Lexicon) -> bool,
}

/// Entry detection after the lexicon's type-prefix pattern (`1) TAB. DOLO
/// 650`), highest priority first. The first pattern whose regex matches
/// decides: either the line opens an entry or it does not.
static NUMBERED_PATTERNS: LazyLock<Vec<EntryPattern>> = LazyLock::new(|| {
    vec![
        // 1 PAN 40 TABLET   1-0-0-0   (name stops at the dosing column)
        EntryPattern {
            label: "tabular",
            regex: Regex::new(
                r"^(\d+)\s*[)\.\]\s]\s*(?P<name>[A-Z][A-Za-z\s\d',\.\-]*?)(?:\s{2,}\d\s*[-\.]\s*\d|\s{2,}-{2,}\d+-{2,}|\s*$)",
            )
            .expect("valid regex"),
            accept: accept_tabular_name,
        },
        // 4. VOLINI PAIN RELIEF GEL: apply locally
        EntryPattern {
            label: "generic",
            regex: Regex::new(r"^(\d+)\s*[)\.\]\s]\s*(?P<name>[A-Z][A-Za-z\s\d',\.\-]+)")
                .expect("valid regex"),
            accept: accept_generic_name,
        },
    ]
});

fn starts_like_boilerplate(name: &str, lexicon: &Lexicon) -> bool {
    let first = name
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();
    lexicon.is_stop_word(&first) || SHORT_TOKENS.contains(&first.as_str())
}

fn accept_tabular_name(name: &str, lexicon: &Lexicon) -> bool {
    !starts_like_boilerplate(name, lexicon) && name.chars().count() >= 3
}

fn accept_any(_: &str, _: &Lexicon) -> bool {
    true
}

fn accept_generic_name(name: &str, lexicon: &Lexicon) -> bool {
    if !accept_tabular_name(name, lexicon) {
        return false;
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    let stop_words = words.iter().filter(|w| lexicon.is_stop_word(w)).count();
    stop_words * 2 <= words.len()
}

/// Decide whether a (trimmed, non-noise) line opens a new medicine entry.
pub fn detect_entry(line: &str, lexicon: &Lexicon) -> Option<EntryTrigger> {
    let type_prefixed = lexicon
        .form_patterns()
        .type_prefix_entry()
        .map(|regex| ("type_prefix", regex, accept_any as fn(&str, &Lexicon) -> bool));
    let patterns = type_prefixed.into_iter().chain(
        NUMBERED_PATTERNS
            .iter()
            .map(|p| (p.label, &p.regex, p.accept)),
    );

    for (label, regex, accept) in patterns {
        let Some(caps) = regex.captures(line) else {
            continue;
        };
        let name = caps.name("name").map_or("", |m| m.as_str()).trim();
        if !accept(name, lexicon) {
            tracing::trace!(pattern = label, "numbered line rejected");
            return None;
        }
        return Some(EntryTrigger {
            name: name.to_string(),
            type_prefix: caps.name("prefix").map(|m| m.as_str().to_lowercase()),
        });
    }
    None
}

static DOSING_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^m\s*[-\.]\s*n\s*[-\.]\s*e\s*[-\.]\s*n").expect("valid regex")
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]+").expect("valid regex"));

/// Lines that never open an entry: too short, an `M-N-E-N` column header,
/// nothing but stop words, an ingredient ("Contains: ...") line, or no
/// letters at all.
pub fn is_noise_line(line: &str, lexicon: &Lexicon) -> bool {
    let lower = line.trim().to_lowercase();
    if lower.chars().count() < 2 {
        return true;
    }
    if DOSING_HEADER_RE.is_match(&lower) {
        return true;
    }
    let mut words = WORD_RE.find_iter(&lower).peekable();
    if words.peek().is_some() && words.all(|w| lexicon.is_stop_word(w.as_str())) {
        return true;
    }
    if lower.starts_with("contains") {
        return true;
    }
    !line.chars().any(char::is_alphabetic)
}

enum ParserState {
    NoActiveEntry,
    AccumulatingBlock {
        entry: MedicineCandidate,
        block: Vec<String>,
    },
}

/// Line-driven state machine. Feed lines, then `finish` to flush the last
/// open entry.
pub struct StructuredParser<'a> {
    lexicon: &'a Lexicon,
    state: ParserState,
    committed: Vec<MedicineCandidate>,
}

impl<'a> StructuredParser<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            state: ParserState::NoActiveEntry,
            committed: Vec::new(),
        }
    }

    pub fn feed_line(&mut self, raw_line: &str) {
        let line = raw_line.trim();
        if line.is_empty() {
            return;
        }

        if is_noise_line(line, self.lexicon) {
            self.append_to_block(line);
            return;
        }

        match detect_entry(line, self.lexicon) {
            Some(trigger) => {
                self.flush();
                let entry = open_entry(line, &trigger, self.lexicon);
                self.state = ParserState::AccumulatingBlock {
                    entry,
                    block: vec![line.to_string()],
                };
            }
            None => self.append_to_block(line),
        }
    }

    /// Flush the open entry (if any) and return everything committed.
    pub fn finish(mut self) -> Vec<MedicineCandidate> {
        self.flush();
        self.committed
    }

    fn append_to_block(&mut self, line: &str) {
        if let ParserState::AccumulatingBlock { block, .. } = &mut self.state {
            block.push(line.to_string());
        }
    }

    fn flush(&mut self) {
        let state = std::mem::replace(&mut self.state, ParserState::NoActiveEntry);
        if let ParserState::AccumulatingBlock { mut entry, block } = state {
            process_block(&mut entry, &block, self.lexicon);
            if entry.name.chars().count() >= MIN_NAME_CHARS {
                self.committed.push(entry);
            } else {
                tracing::debug!(name = %entry.name, "dropping entry with too short a name");
            }
        }
    }
}

/// Run the structured parser over a whole transcription.
pub fn parse_structured(text: &str, lexicon: &Lexicon) -> Vec<MedicineCandidate> {
    let mut parser = StructuredParser::new(lexicon);
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

fn icon_for(type_prefix: Option<&str>, form: &str) -> &'static str {
    if type_prefix.is_some_and(|p| p.contains("cap")) {
        icons::CAPSULE
    } else if form == "Inhaler" {
        icons::SPRAY
    } else if form == "Injectable" {
        icons::NEEDLE
    } else {
        icons::PILL
    }
}

/// Seed a new entry from its trigger line.
fn open_entry(line: &str, trigger: &EntryTrigger, lexicon: &Lexicon) -> MedicineCandidate {
    let type_prefix = trigger.type_prefix.as_deref();
    let cleaned = clean_medicine_name(&trigger.name, type_prefix, lexicon);
    let known = lexicon.lookup(&trigger.name);

    let frequency = extract_dosing(line)
        .map(|d| d.frequency)
        .or_else(|| extract_frequency_phrase(line))
        .map(|f| f.as_str().to_string())
        .unwrap_or_default();

    let name_confidence = if known.is_some() { 0.95 } else { 0.80 };

    MedicineCandidate {
        icon: icon_for(type_prefix, &cleaned.form).to_string(),
        name: cleaned.name,
        dosage: extract_dosage_strength(&trigger.name),
        pharmaceutical_form: cleaned.form,
        category: known
            .map(|k| k.category.clone())
            .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        frequency,
        timing: extract_timing(line).map(|t| t.as_str().to_string()),
        duration: extract_duration(&trigger.name).unwrap_or_default(),
        quantity: extract_quantity(&trigger.name).unwrap_or_default(),
        confidence: FieldConfidence::structured(name_confidence),
    }
}

/// Fill the entry's missing fields from its accumulated block.
fn process_block(entry: &mut MedicineCandidate, block: &[String], lexicon: &Lexicon) {
    let text = block.join(" ");

    if entry.frequency.is_empty() {
        if let Some(dosing) = extract_dosing(&text) {
            entry.frequency = dosing.frequency.as_str().to_string();
            entry.confidence.frequency = 0.9;
        }
    }
    // Written-out frequency beats a dosing-code guess.
    if let Some(phrase) = extract_frequency_phrase(&text) {
        entry.frequency = phrase.as_str().to_string();
        entry.confidence.frequency = 0.95;
    }
    if entry.frequency.is_empty() {
        entry.frequency = defaults::FREQUENCY.to_string();
    }

    if entry.timing.is_none() {
        entry.timing = extract_timing(&text).map(|t| t.as_str().to_string());
    }
    if entry.duration.is_empty() {
        entry.duration = extract_duration(&text).unwrap_or_default();
    }
    if entry.quantity.is_empty() {
        entry.quantity = extract_quantity(&text).unwrap_or_default();
    }

    if entry.dosage.is_none() {
        if let Some(dosage) = extract_contains_dosage(&text) {
            entry.dosage = Some(dosage);
            entry.confidence.dosage = 0.9;
        } else if let Some(dosage) = extract_dosage_strength(&text) {
            entry.dosage = Some(dosage);
            entry.confidence.dosage = 0.7;
        }
    }

    // A column marker may refine a generic form, but never demotes a gel
    // that was recognized from the name.
    if let Some(form) = extract_form_column(&text, lexicon) {
        if entry.pharmaceutical_form == DEFAULT_FORM && !entry.name.to_lowercase().contains("gel") {
            entry.pharmaceutical_form = form;
        }
    }

    entry.confidence.recompute_overall();
}
