use std::path::{Path, PathBuf};

use super::types::RecognitionPass;
use super::ExtractionError;

/// A transcription saved to disk by an external recognition run.
pub struct TranscriptFile {
    path: PathBuf,
    label: String,
}

impl TranscriptFile {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            label: path.display().to_string(),
        }
    }
}

impl RecognitionPass for TranscriptFile {
    fn label(&self) -> &str {
        &self.label
    }

    fn recognize(&self) -> Result<String, ExtractionError> {
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyPass);
        }
        Ok(text)
    }
}

/// Mock recognition pass for unit testing without an OCR engine.
pub struct MockRecognitionPass {
    pub label: String,
    pub outcome: Result<String, String>,
}

impl MockRecognitionPass {
    pub fn text(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            outcome: Ok(text.to_string()),
        }
    }

    pub fn failing(label: &str, reason: &str) -> Self {
        Self {
            label: label.to_string(),
            outcome: Err(reason.to_string()),
        }
    }
}

impl RecognitionPass for MockRecognitionPass {
    fn label(&self) -> &str {
        &self.label
    }

    fn recognize(&self) -> Result<String, ExtractionError> {
        match &self.outcome {
            Ok(text) if text.trim().is_empty() => Err(ExtractionError::EmptyPass),
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(ExtractionError::Recognition(reason.clone())),
        }
    }
}
