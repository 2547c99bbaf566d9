pub mod types;
pub mod passes;
pub mod orchestrator;
pub mod selector;

pub use types::*;
pub use passes::*;
pub use orchestrator::*;
pub use selector::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Recognition pass produced no text")]
    EmptyPass,
}
