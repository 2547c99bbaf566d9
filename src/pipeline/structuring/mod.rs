pub mod types;
pub mod form_patterns;
pub mod lexicon;
pub mod extractors;
pub mod name_cleaner;
pub mod parser;
pub mod fallback;
pub mod finalize;
pub mod orchestrator;
pub mod validation;

pub use types::*;
pub use form_patterns::*;
pub use lexicon::*;
pub use extractors::*;
pub use name_cleaner::*;
pub use parser::*;
pub use fallback::*;
pub use finalize::*;
pub use orchestrator::*;
pub use validation::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexicon JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Form keyword pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid lexicon: {0}")]
    Invalid(String),
}
