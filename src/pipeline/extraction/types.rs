use super::ExtractionError;

/// One recognition configuration over one source image (allows mocking for tests).
/// The engine behind it is external; the scanner only sees the transcription.
pub trait RecognitionPass {
    /// Short label for logs, e.g. "psm6-binary".
    fn label(&self) -> &str;

    fn recognize(&self) -> Result<String, ExtractionError>;
}

/// Produces every candidate transcription of a single prescription.
pub trait TextSource {
    fn produce_candidate_texts(&self) -> Vec<String>;
}

/// Transcriptions that were already produced elsewhere.
impl TextSource for Vec<String> {
    fn produce_candidate_texts(&self) -> Vec<String> {
        self.clone()
    }
}

impl TextSource for [String] {
    fn produce_candidate_texts(&self) -> Vec<String> {
        self.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precomputed_texts_are_returned_in_order() {
        let texts = vec!["first".to_string(), "second".to_string()];
        assert_eq!(texts.produce_candidate_texts(), texts);
        assert_eq!(texts[..1].produce_candidate_texts(), vec!["first".to_string()]);
    }
}
