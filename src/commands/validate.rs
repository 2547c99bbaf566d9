use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use rxscan_lib::config;
use rxscan_lib::{validate_candidates, MedicineCandidate};

use super::print_json;
use crate::cli::ValidateArgs;

/// Accepted input shapes. A full scan result matches `Wrapped`; its other
/// fields are ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum ValidateInput {
    Medicines(Vec<MedicineCandidate>),
    Wrapped { medicines: Vec<MedicineCandidate> },
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let lexicon =
        config::load_lexicon(args.lexicon.as_deref()).context("failed to load lexicon")?;

    let raw = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let medicines = parse_input(&raw)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let validated = validate_candidates(medicines, &lexicon);
    info!(medicines = validated.len(), "validation finished");
    print_json(&validated, args.pretty)
}

fn parse_input(raw: &[u8]) -> serde_json::Result<Vec<MedicineCandidate>> {
    Ok(match serde_json::from_slice(raw)? {
        ValidateInput::Medicines(medicines) | ValidateInput::Wrapped { medicines } => medicines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxscan_lib::PrescriptionScanner;

    #[test]
    fn accepts_scan_result_output() {
        let result = PrescriptionScanner::default()
            .scan("metformin 500 mg twice a day after food for 30 days");
        let raw = serde_json::to_vec(&result).unwrap();
        let medicines = parse_input(&raw).unwrap();
        assert_eq!(medicines, result.medicines);
    }

    #[test]
    fn accepts_bare_array_with_long_form_key() {
        let raw = br#"[{
            "name": "Dolo 650",
            "pharmaceutical_form": "Oral Tablet",
            "icon": "pill",
            "category": "pain",
            "frequency": "Twice daily",
            "confidence": {"name": 0.95, "dosage": 0.4, "frequency": 0.9, "overall": 0.75}
        }]"#;
        let medicines = parse_input(raw).unwrap();
        assert_eq!(medicines.len(), 1);
        assert_eq!(medicines[0].pharmaceutical_form, "Oral Tablet");
    }

    #[test]
    fn rejects_unrelated_json() {
        assert!(parse_input(br#"{"patients": []}"#).is_err());
        assert!(parse_input(b"not json").is_err());
    }
}
