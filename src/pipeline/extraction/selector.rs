//! Picks the most prescription-like transcription among several recognition
//! passes over the same image.

use std::sync::LazyLock;

use regex::Regex;

/// Transcriptions this short (after trimming) are treated as failed passes.
const MIN_CANDIDATE_CHARS: usize = 20;

const ENTRY_MARKER_WEIGHT: usize = 50;
const KEYWORD_WEIGHT: usize = 30;
const DOSING_TRIPLET_WEIGHT: usize = 40;

const PRESCRIPTION_KEYWORDS: &[&str] = &[
    "tab", "cap", "tablet", "capsule", "mg", "daily", "food", "days", "contains",
];

/// "1)", "2.", "3]" numbering.
static ENTRY_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*[).\]]\s*").expect("valid regex"));

/// "1-0-1", "1.1.0".
static DOSING_TRIPLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\s*[-\.]\s*\d\s*[-\.]\s*\d").expect("valid regex"));

/// Higher means more likely to be a readable prescription.
pub fn score_candidate(text: &str) -> usize {
    let lower = text.to_lowercase();
    let keyword_hits: usize = PRESCRIPTION_KEYWORDS
        .iter()
        .map(|keyword| lower.matches(keyword).count())
        .sum();

    text.chars().count()
        + ENTRY_MARKER_RE.find_iter(text).count() * ENTRY_MARKER_WEIGHT
        + keyword_hits * KEYWORD_WEIGHT
        + DOSING_TRIPLET_RE.find_iter(text).count() * DOSING_TRIPLET_WEIGHT
}

/// Best-scoring candidate, first one winning ties. Returns an empty string
/// when no candidate is long enough to be worth parsing.
pub fn select_best_candidate<S: AsRef<str>>(candidates: &[S]) -> String {
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates.iter().map(AsRef::as_ref) {
        if candidate.trim().chars().count() <= MIN_CANDIDATE_CHARS {
            continue;
        }
        let score = score_candidate(candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((text, score)) => {
            tracing::debug!(score, chars = text.chars().count(), "Selected transcription");
            text.to_string()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_counts_every_signal() {
        // One entry marker, "tab" and "mg" hits, one dosing triplet.
        let text = "1) TAB X 5 mg 1-0-1 ab";
        let expected = text.chars().count() + 50 + 2 * 30 + 40;
        assert_eq!(score_candidate(text), expected);
    }

    #[test]
    fn overlapping_keywords_each_count() {
        // "tablet" also contains "tab".
        assert_eq!(score_candidate("tablet"), 6 + 2 * 30);
    }

    #[test]
    fn short_candidates_are_discarded() {
        let candidates = ["   short text here   ".to_string(), "x".repeat(20)];
        assert_eq!(select_best_candidate(&candidates[..]), "");
        assert_eq!(select_best_candidate::<&str>(&[]), "");
    }

    #[test]
    fn structured_text_beats_longer_noise() {
        let noise = "Lorem ipsum dolor sit amet consectetur adipiscing elit sed do";
        let rx = "1) TAB. DOLO 650 1-0-1 5 days after food";
        assert_eq!(select_best_candidate(&[noise, rx][..]), rx);
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let a = "abcdefghijklmnopqrstuvwxyz";
        let b = "zyxwvutsrqponmlkjihgfedcba";
        assert_eq!(score_candidate(a), score_candidate(b));
        assert_eq!(select_best_candidate(&[a, b][..]), a);
    }

    #[test]
    fn owned_candidates_are_accepted() {
        let candidates = vec!["metformin 500 mg twice a day".to_string()];
        assert_eq!(select_best_candidate(&candidates[..]), candidates[0]);
    }
}
