use std::io::Read;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use tracing::info;

use rxscan_lib::config;
use rxscan_lib::pipeline::extraction::{MultiPassSource, RecognitionPass, TranscriptFile};
use rxscan_lib::PrescriptionScanner;

use super::print_json;
use crate::cli::ScanArgs;

pub fn run(args: ScanArgs) -> Result<()> {
    let lexicon =
        config::load_lexicon(args.lexicon.as_deref()).context("failed to load lexicon")?;
    let scanner = PrescriptionScanner::new(Arc::new(lexicon));

    let result = if args.files.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read transcription from stdin")?;
        scanner.scan(&text)
    } else {
        for path in &args.files {
            ensure!(path.is_file(), "transcription not found: {}", path.display());
        }
        let passes: Vec<Box<dyn RecognitionPass + Send + Sync>> = args
            .files
            .iter()
            .map(|path| Box::new(TranscriptFile::new(path)) as Box<dyn RecognitionPass + Send + Sync>)
            .collect();
        scanner.scan_source(&MultiPassSource::new(passes))
    };

    info!(
        medicines = result.count,
        chars = result.extracted_text.chars().count(),
        "scan finished"
    );
    print_json(&result, args.pretty)
}
