use rayon::prelude::*;

use super::types::{RecognitionPass, TextSource};
use super::ExtractionError;

/// Runs several recognition passes over the same prescription in parallel.
/// Uses trait objects for the passes, enabling dependency injection.
pub struct MultiPassSource {
    passes: Vec<Box<dyn RecognitionPass + Send + Sync>>,
}

impl MultiPassSource {
    pub fn new(passes: Vec<Box<dyn RecognitionPass + Send + Sync>>) -> Self {
        Self { passes }
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
}

impl TextSource for MultiPassSource {
    /// Transcriptions of the passes that succeeded, in pass order.
    /// A failed pass is logged and skipped; it never fails the scan.
    fn produce_candidate_texts(&self) -> Vec<String> {
        let outcomes: Vec<Result<String, ExtractionError>> = self
            .passes
            .par_iter()
            .map(|pass| pass.recognize())
            .collect();

        let mut texts = Vec::with_capacity(outcomes.len());
        for (pass, outcome) in self.passes.iter().zip(outcomes) {
            match outcome {
                Ok(text) => texts.push(text),
                Err(ExtractionError::EmptyPass) => {
                    tracing::debug!(pass = pass.label(), "Recognition pass produced no text");
                }
                Err(e) => {
                    tracing::warn!(pass = pass.label(), error = %e, "Recognition pass failed, skipping");
                }
            }
        }

        tracing::debug!(
            passes = self.passes.len(),
            candidates = texts.len(),
            "Recognition passes complete"
        );
        texts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::passes::MockRecognitionPass;

    fn boxed(pass: MockRecognitionPass) -> Box<dyn RecognitionPass + Send + Sync> {
        Box::new(pass)
    }

    #[test]
    fn collects_successful_passes_in_order() {
        let source = MultiPassSource::new(vec![
            boxed(MockRecognitionPass::text("psm6", "first")),
            boxed(MockRecognitionPass::failing("psm4", "engine crashed")),
            boxed(MockRecognitionPass::text("psm3", "")),
            boxed(MockRecognitionPass::text("raw", "last")),
        ]);
        assert_eq!(source.pass_count(), 4);
        assert_eq!(source.produce_candidate_texts(), vec!["first", "last"]);
    }

    #[test]
    fn order_is_stable_across_many_passes() {
        let passes = (0..32)
            .map(|i| boxed(MockRecognitionPass::text(&format!("p{i}"), &format!("text {i}"))))
            .collect();
        let texts = MultiPassSource::new(passes).produce_candidate_texts();
        let expected: Vec<String> = (0..32).map(|i| format!("text {i}")).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn all_passes_failing_yields_nothing() {
        let source = MultiPassSource::new(vec![boxed(MockRecognitionPass::failing("x", "no engine"))]);
        assert!(source.produce_candidate_texts().is_empty());
        assert!(MultiPassSource::new(vec![]).produce_candidate_texts().is_empty());
    }
}
