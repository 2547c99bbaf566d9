//! Lookup tables shared by every parsing stage: the known-medicine registry,
//! the pharmaceutical-form keyword table, the form-keyword patterns compiled
//! from it and the stop-word set.
//!
//! A `Lexicon` is built once (built-in tables or a JSON file) and only read
//! afterwards, so one instance can be shared across concurrent scans.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::form_patterns::{FormPatterns, FormRoles};
use super::types::{icons, DEFAULT_FORM};
use super::LexiconError;

/// A known medicine. `name_key` is matched as a lower-case substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name_key: String,
    pub form: String,
    pub icon: String,
    pub category: String,
}

/// Immutable lookup tables consumed by the parser.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Iteration order is significant: lookups return the first containing key.
    medicines: Vec<RegistryEntry>,
    forms: HashMap<String, String>,
    form_patterns: FormPatterns,
    stop_words: HashSet<String>,
}

/// Built-in registry: (name key, form, icon, category).
const BUILTIN_MEDICINES: &[(&str, &str, &str, &str)] = &[
    ("amoxicillin", "Oral Tablet", "pill", "antibiotic"),
    ("azithromycin", "Oral Tablet", "pill", "antibiotic"),
    ("ciprofloxacin", "Oral Tablet", "pill", "antibiotic"),
    ("doxycycline", "Capsule", "capsule", "antibiotic"),
    ("metronidazole", "Oral Tablet", "pill", "antibiotic"),
    ("cephalexin", "Capsule", "capsule", "antibiotic"),
    ("clindamycin", "Capsule", "capsule", "antibiotic"),
    ("levofloxacin", "Oral Tablet", "pill", "antibiotic"),
    ("cefixime", "Oral Tablet", "pill", "antibiotic"),
    ("crosine", "Oral Tablet", "pill", "antibiotic"),
    ("lisinopril", "Oral Tablet", "pill", "cardiovascular"),
    ("amlodipine", "Oral Tablet", "pill", "cardiovascular"),
    ("losartan", "Oral Tablet", "pill", "cardiovascular"),
    ("atorvastatin", "Oral Tablet", "pill", "cardiovascular"),
    ("metoprolol", "Oral Tablet", "pill", "cardiovascular"),
    ("warfarin", "Oral Tablet", "pill", "cardiovascular"),
    ("clopidogrel", "Oral Tablet", "pill", "cardiovascular"),
    ("enalapril", "Oral Tablet", "pill", "cardiovascular"),
    ("valsartan", "Oral Tablet", "pill", "cardiovascular"),
    ("simvastatin", "Oral Tablet", "pill", "cardiovascular"),
    ("metformin", "Oral Tablet", "pill", "diabetes"),
    ("glipizide", "Oral Tablet", "pill", "diabetes"),
    ("insulin", "Injectable", "needle", "diabetes"),
    ("sitagliptin", "Oral Tablet", "pill", "diabetes"),
    ("pioglitazone", "Oral Tablet", "pill", "diabetes"),
    ("ibuprofen", "Oral Tablet", "pill", "pain"),
    ("paracetamol", "Oral Tablet", "pill", "pain"),
    ("acetaminophen", "Oral Tablet", "pill", "pain"),
    ("aspirin", "Oral Tablet", "pill", "pain"),
    ("naproxen", "Oral Tablet", "pill", "pain"),
    ("diclofenac", "Oral Tablet", "pill", "pain"),
    ("tramadol", "Capsule", "capsule", "pain"),
    ("valdecoxib", "Oral Tablet", "pill", "pain"),
    ("aceclofenac", "Oral Tablet", "pill", "pain"),
    ("omeprazole", "Capsule", "capsule", "gi"),
    ("pantoprazole", "Oral Tablet", "pill", "gi"),
    ("ranitidine", "Oral Tablet", "pill", "gi"),
    ("domperidone", "Oral Tablet", "pill", "gi"),
    ("ondansetron", "Oral Tablet", "pill", "gi"),
    ("cetirizine", "Oral Tablet", "pill", "allergy"),
    ("loratadine", "Oral Tablet", "pill", "allergy"),
    ("montelukast", "Oral Tablet", "pill", "respiratory"),
    ("salbutamol", "Inhaler", "spray", "respiratory"),
    ("fluticasone", "Inhaler", "spray", "respiratory"),
    ("levothyroxine", "Oral Tablet", "pill", "thyroid"),
    ("prednisone", "Oral Tablet", "pill", "steroid"),
    ("prednisolone", "Oral Tablet", "pill", "steroid"),
    ("dexamethasone", "Oral Tablet", "pill", "steroid"),
    ("vitamin d3", "Capsule", "capsule", "supplement"),
    ("vitamin d", "Capsule", "capsule", "supplement"),
    ("vitamin c", "Oral Tablet", "pill", "supplement"),
    ("vitamin b12", "Oral Tablet", "pill", "supplement"),
    ("folic acid", "Oral Tablet", "pill", "supplement"),
    ("calcium", "Oral Tablet", "pill", "supplement"),
    ("iron", "Oral Tablet", "pill", "supplement"),
    ("multivitamin", "Oral Tablet", "pill", "supplement"),
    ("supradyn", "Oral Tablet", "pill", "supplement"),
    ("sertraline", "Oral Tablet", "pill", "mental_health"),
    ("fluoxetine", "Capsule", "capsule", "mental_health"),
    ("escitalopram", "Oral Tablet", "pill", "mental_health"),
    ("alprazolam", "Oral Tablet", "pill", "mental_health"),
    ("diazepam", "Oral Tablet", "pill", "mental_health"),
    ("volini", "Gel", "pill", "pain"),
    ("hifenac", "Oral Tablet", "pill", "pain"),
    ("pan", "Oral Tablet", "pill", "gi"),
    ("combiflam", "Oral Tablet", "pill", "pain"),
    ("crocin", "Oral Tablet", "pill", "pain"),
    ("dolo", "Oral Tablet", "pill", "pain"),
    ("shelcal", "Oral Tablet", "pill", "supplement"),
    ("ecosprin", "Oral Tablet", "pill", "cardiovascular"),
    ("thyronorm", "Oral Tablet", "pill", "thyroid"),
    ("telma", "Oral Tablet", "pill", "cardiovascular"),
    ("glycomet", "Oral Tablet", "pill", "diabetes"),
];

/// Form keywords and type abbreviations mapped to display forms.
const BUILTIN_FORMS: &[(&str, &str)] = &[
    ("tab", "Oral Tablet"),
    ("tablet", "Oral Tablet"),
    ("tablets", "Oral Tablet"),
    ("cap", "Capsule"),
    ("capsule", "Capsule"),
    ("capsules", "Capsule"),
    ("syp", "Syrup"),
    ("syrup", "Syrup"),
    ("inj", "Injectable"),
    ("injection", "Injectable"),
    ("oint", "Ointment"),
    ("ointment", "Ointment"),
    ("gel", "Gel"),
    ("drop", "Eye/Ear Drops"),
    ("drops", "Eye/Ear Drops"),
    ("cream", "Cream"),
    ("susp", "Suspension"),
    ("suspension", "Suspension"),
    ("sol", "Solution"),
    ("solution", "Solution"),
    ("inh", "Inhaler"),
    ("inhaler", "Inhaler"),
    ("spray", "Spray"),
];

/// Abbreviations recognized right after an entry number.
const BUILTIN_TYPE_PREFIXES: &[&str] = &[
    "tab", "cap", "syp", "inj", "oint", "gel", "drop", "cream", "susp", "sol", "inh",
];

/// Whole-word form keywords inside a name.
const BUILTIN_NAME_KEYWORDS: &[&str] = &[
    "tablet", "capsule", "syrup", "drop", "gel", "cream", "injection", "ointment",
    "inhaler", "spray", "suspension",
];

const BUILTIN_TRAILING_KEYWORDS: &[&str] = &[
    "tablet", "capsule", "syrup", "gel", "cream", "drop", "injection", "ointment",
    "inhaler", "spray",
];

const BUILTIN_COLUMN_KEYWORDS: &[&str] =
    &["tablet", "capsule", "drop", "gel", "cream", "syrup", "injection"];

/// Words that mark a line or captured name as prescription boilerplate.
const BUILTIN_STOP_WORDS: &[&str] = &[
    "medicine", "medication", "prescribed", "dosage", "duration", "details",
    "name", "address", "click", "order", "note", "instruction", "substitution",
    "allowed", "applicable", "wherever", "morning", "noon", "evening", "night",
    "contains", "orally", "local", "application", "take",
];

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(|| Lexicon {
    medicines: builtin_medicines(),
    forms: builtin_forms(),
    form_patterns: FormPatterns::compile(&builtin_form_roles()).expect("valid regex"),
    stop_words: builtin_stop_words(),
});

fn builtin_medicines() -> Vec<RegistryEntry> {
    BUILTIN_MEDICINES
        .iter()
        .map(|&(name_key, form, icon, category)| RegistryEntry {
            name_key: name_key.into(),
            form: form.into(),
            icon: icon.into(),
            category: category.into(),
        })
        .collect()
}

fn builtin_forms() -> HashMap<String, String> {
    BUILTIN_FORMS
        .iter()
        .map(|&(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn builtin_form_roles() -> FormRoles {
    FormRoles {
        type_prefixes: owned(BUILTIN_TYPE_PREFIXES),
        name_keywords: owned(BUILTIN_NAME_KEYWORDS),
        trailing_keywords: owned(BUILTIN_TRAILING_KEYWORDS),
        column_keywords: owned(BUILTIN_COLUMN_KEYWORDS),
    }
}

/// Keyword roles for a JSON lexicon. Explicit lists win; a custom form
/// table otherwise lends every key to every role; with neither, the
/// built-in roles apply.
fn resolve_form_roles(
    custom_forms: Option<&HashMap<String, String>>,
    type_prefixes: Option<Vec<String>>,
    form_keywords: Option<Vec<String>>,
) -> FormRoles {
    let builtin = builtin_form_roles();
    let table_keys = custom_forms.map(|forms| {
        let mut keys: Vec<String> = forms.keys().cloned().collect();
        keys.sort();
        keys
    });

    let type_prefixes = type_prefixes
        .or_else(|| table_keys.clone())
        .unwrap_or_else(|| builtin.type_prefixes.clone());
    match form_keywords.or(table_keys) {
        Some(keywords) => FormRoles::uniform(type_prefixes, keywords),
        None => FormRoles {
            type_prefixes,
            ..builtin
        },
    }
}

fn normalize_keywords(words: Option<Vec<String>>) -> Option<Vec<String>> {
    words.map(|words| {
        words
            .into_iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    })
}

fn builtin_stop_words() -> HashSet<String> {
    BUILTIN_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

/// On-disk shape. Omitted sections fall back to the built-in tables.
#[derive(Debug, Deserialize)]
struct LexiconFile {
    medicines: Option<Vec<RegistryEntry>>,
    forms: Option<HashMap<String, String>>,
    type_prefixes: Option<Vec<String>>,
    form_keywords: Option<Vec<String>>,
    stop_words: Option<Vec<String>>,
}

impl Lexicon {
    /// Process-wide built-in tables.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    /// Parse a lexicon from JSON. Keys are lower-cased; registry order is kept.
    pub fn from_json_str(json: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = serde_json::from_str(json)?;

        let medicines = match file.medicines {
            Some(entries) => normalize_medicines(entries)?,
            None => builtin_medicines(),
        };

        let custom_forms = match file.forms {
            Some(forms) => {
                let mut normalized = HashMap::with_capacity(forms.len());
                for (keyword, form) in forms {
                    let keyword = keyword.trim().to_lowercase();
                    if keyword.is_empty() || form.trim().is_empty() {
                        return Err(LexiconError::Invalid(
                            "form table entries need a keyword and a form".into(),
                        ));
                    }
                    normalized.insert(keyword, form.trim().to_string());
                }
                Some(normalized)
            }
            None => None,
        };
        let roles = resolve_form_roles(
            custom_forms.as_ref(),
            normalize_keywords(file.type_prefixes),
            normalize_keywords(file.form_keywords),
        );
        let form_patterns = FormPatterns::compile(&roles)?;
        let forms = custom_forms.unwrap_or_else(builtin_forms);

        let stop_words = match file.stop_words {
            Some(words) => words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            None => builtin_stop_words(),
        };

        Ok(Self {
            medicines,
            forms,
            form_patterns,
            stop_words,
        })
    }

    /// Load a lexicon JSON file.
    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Registry entries in lookup order.
    pub fn medicines(&self) -> &[RegistryEntry] {
        &self.medicines
    }

    /// First registry entry whose key is contained in `name` (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<&RegistryEntry> {
        let lower = name.to_lowercase();
        self.medicines
            .iter()
            .find(|entry| lower.contains(entry.name_key.as_str()))
    }

    /// Registry entry whose key equals `name` exactly (case-insensitive).
    pub fn lookup_exact(&self, name: &str) -> Option<&RegistryEntry> {
        let lower = name.trim().to_lowercase();
        self.medicines.iter().find(|entry| entry.name_key == lower)
    }

    /// Display form for a keyword or abbreviation ("tab", "DROP", ...).
    pub fn form_for(&self, keyword: &str) -> Option<&str> {
        self.forms
            .get(&keyword.to_lowercase())
            .map(String::as_str)
    }

    /// Form-keyword regexes compiled for this lexicon.
    pub fn form_patterns(&self) -> &FormPatterns {
        &self.form_patterns
    }

    /// Form for an explicit type prefix; unmapped prefixes read as tablets.
    pub fn form_for_prefix(&self, prefix: &str) -> String {
        self.form_for(prefix).unwrap_or(DEFAULT_FORM).to_string()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }
}

impl RegistryEntry {
    /// Icon falls back to a pill when the entry leaves it blank.
    pub fn icon_or_default(&self) -> &str {
        if self.icon.is_empty() {
            icons::PILL
        } else {
            &self.icon
        }
    }
}

fn normalize_medicines(entries: Vec<RegistryEntry>) -> Result<Vec<RegistryEntry>, LexiconError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let name_key = entry.name_key.trim().to_lowercase();
        if name_key.is_empty() {
            return Err(LexiconError::Invalid("medicine entry with empty name_key".into()));
        }
        if entry.form.trim().is_empty() {
            return Err(LexiconError::Invalid(format!(
                "medicine '{name_key}' has no form"
            )));
        }
        if !seen.insert(name_key.clone()) {
            return Err(LexiconError::Invalid(format!(
                "duplicate medicine key '{name_key}'"
            )));
        }
        out.push(RegistryEntry {
            name_key,
            form: entry.form.trim().to_string(),
            icon: entry.icon.trim().to_string(),
            category: entry.category.trim().to_string(),
        });
    }
    Ok(out)
}
