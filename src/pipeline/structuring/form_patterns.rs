//! Form-keyword regexes compiled from a lexicon's keyword lists.
//!
//! Every place the parser looks for a pharmaceutical form ("1) TAB. ...",
//! "... GEL", "TABLET | ...") goes through these, so a lexicon that adds a
//! keyword changes recognition without touching the extractors.

use regex::Regex;

/// Which keywords play which part when reading a line. Keywords are
/// matched case-insensitively and need not appear in the form table;
/// unmapped ones resolve to a default or a title-cased keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRoles {
    /// Abbreviations right after an entry number: `1) TAB. Dolo`.
    pub type_prefixes: Vec<String>,
    /// Whole words inside a name that reveal its form.
    pub name_keywords: Vec<String>,
    /// Keywords cut from the end of a display name.
    pub trailing_keywords: Vec<String>,
    /// Keywords heading a `TABLET | Once a day` column.
    pub column_keywords: Vec<String>,
}

impl FormRoles {
    /// One keyword list for the in-name, trailing and column roles.
    pub fn uniform(type_prefixes: Vec<String>, keywords: Vec<String>) -> Self {
        Self {
            type_prefixes,
            name_keywords: keywords.clone(),
            trailing_keywords: keywords.clone(),
            column_keywords: keywords,
        }
    }
}

/// Compiled per-lexicon patterns. A role with no keywords never matches.
#[derive(Debug, Clone)]
pub struct FormPatterns {
    type_prefix_entry: Option<Regex>,
    name_keyword: Option<Regex>,
    trailing: Option<Regex>,
    column: Option<Regex>,
    column_remnant: Option<Regex>,
}

/// Escaped alternation, longest keyword first so "tablet" beats "tab".
fn alternation(keywords: &[String]) -> Option<String> {
    let mut keys: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    keys.dedup();
    if keys.is_empty() {
        return None;
    }
    Some(
        keys.iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

fn compile(
    keywords: &[String],
    template: impl Fn(&str) -> String,
) -> Result<Option<Regex>, regex::Error> {
    alternation(keywords)
        .map(|alt| Regex::new(&template(&alt)))
        .transpose()
}

impl FormPatterns {
    pub fn compile(roles: &FormRoles) -> Result<Self, regex::Error> {
        Ok(Self {
            type_prefix_entry: compile(&roles.type_prefixes, |alt| {
                format!(r"(?i)^(\d+)\s*[)\.\]]\s*(?P<prefix>{alt})[\.\s,]+(?P<name>.+)")
            })?,
            name_keyword: compile(&roles.name_keywords, |alt| format!(r"(?i)\b({alt})\b"))?,
            trailing: compile(&roles.trailing_keywords, |alt| format!(r"(?i)\s*({alt})\s*$"))?,
            column: compile(&roles.column_keywords, |alt| format!(r"(?i)({alt})\s*\|"))?,
            column_remnant: compile(&roles.column_keywords, |alt| {
                format!(r"(?i)\s*({alt})\s*\|.*$")
            })?,
        })
    }

    /// Entry line opened by a type abbreviation, with `prefix` and `name`
    /// capture groups.
    pub fn type_prefix_entry(&self) -> Option<&Regex> {
        self.type_prefix_entry.as_ref()
    }

    /// First whole-word form keyword in `text`.
    pub fn find_name_keyword<'t>(&self, text: &'t str) -> Option<&'t str> {
        first_keyword(self.name_keyword.as_ref(), text)
    }

    /// Keyword of the first `KEYWORD |` column marker in `text`.
    pub fn find_column_keyword<'t>(&self, text: &'t str) -> Option<&'t str> {
        first_keyword(self.column.as_ref(), text)
    }

    /// `name` without a trailing form keyword, trimmed.
    pub fn strip_trailing_keyword(&self, name: &str) -> String {
        strip(self.trailing.as_ref(), name)
    }

    /// `name` without a `KEYWORD | ...` column remnant, trimmed.
    pub fn strip_column_remnant(&self, name: &str) -> String {
        strip(self.column_remnant.as_ref(), name)
    }
}

fn first_keyword<'t>(regex: Option<&Regex>, text: &'t str) -> Option<&'t str> {
    regex?.captures(text)?.get(1).map(|m| m.as_str())
}

fn strip(regex: Option<&Regex>, text: &str) -> String {
    match regex {
        Some(regex) => regex.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}
