pub mod config;
pub mod pipeline;

pub use pipeline::extraction::{ExtractionError, MultiPassSource, RecognitionPass, TextSource};
pub use pipeline::structuring::{
    validate_candidates, Lexicon, LexiconError, MedicineCandidate, PrescriptionScanner,
    ScanResult, ValidatedMedicine,
};
