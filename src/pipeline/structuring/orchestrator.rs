use std::sync::Arc;

use super::fallback::parse_keyword_fallback;
use super::finalize::finalize_candidates;
use super::lexicon::Lexicon;
use super::parser::parse_structured;
use super::types::ScanResult;
use crate::pipeline::extraction::{select_best_candidate, TextSource};

pub const NO_TEXT_MESSAGE: &str =
    "No text could be extracted from the prescription. Please add medicines manually.";

pub const NO_MEDICINES_MESSAGE: &str = "No recognized medicines found in the text.";

/// Which parser produced the medicines of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    Structured,
    KeywordFallback,
}

impl ScanStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::KeywordFallback => "keyword_fallback",
        }
    }
}

/// Orchestrates the prescription scan:
/// select transcription → structured parse → keyword fallback → finalize
///
/// Stateless between calls; one scanner can serve any number of threads.
#[derive(Debug, Clone)]
pub struct PrescriptionScanner {
    lexicon: Arc<Lexicon>,
}

impl PrescriptionScanner {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Scanner over the built-in lexicon.
    pub fn with_builtin_lexicon() -> Self {
        Self::new(Arc::new(Lexicon::builtin().clone()))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Parse one transcription into medicine candidates. Never fails:
    /// missing text and unrecognized text are reported through `message`.
    pub fn scan(&self, text: &str) -> ScanResult {
        if text.trim().is_empty() {
            tracing::debug!("Empty transcription, nothing to parse");
            return ScanResult::empty(text, NO_TEXT_MESSAGE);
        }

        let (strategy, mut medicines) = match parse_structured(text, &self.lexicon) {
            found if !found.is_empty() => (ScanStrategy::Structured, found),
            _ => (
                ScanStrategy::KeywordFallback,
                parse_keyword_fallback(text, &self.lexicon),
            ),
        };

        finalize_candidates(&mut medicines);

        tracing::debug!(
            chars = text.chars().count(),
            strategy = strategy.as_str(),
            medicines = medicines.len(),
            "Prescription scan complete"
        );

        if medicines.is_empty() {
            return ScanResult::empty(text, NO_MEDICINES_MESSAGE);
        }
        ScanResult::with_medicines(text, medicines)
    }

    /// Acquire candidate transcriptions, keep the most prescription-like one
    /// and scan it.
    pub fn scan_source(&self, source: &dyn TextSource) -> ScanResult {
        let candidates = source.produce_candidate_texts();
        let best = select_best_candidate(&candidates[..]);
        tracing::debug!(
            candidates = candidates.len(),
            selected_chars = best.chars().count(),
            "Transcription selected"
        );
        self.scan(&best)
    }
}

impl Default for PrescriptionScanner {
    fn default() -> Self {
        Self::with_builtin_lexicon()
    }
}
