use super::types::{defaults, MedicineCandidate};

/// Seal candidates for output: recompute `overall` and fill every field the
/// text never mentioned with its documented default.
pub fn finalize_candidates(candidates: &mut [MedicineCandidate]) {
    for candidate in candidates.iter_mut() {
        candidate.confidence.recompute_overall();

        fill_if_blank(&mut candidate.frequency, defaults::FREQUENCY);
        fill_if_blank(&mut candidate.duration, defaults::DURATION);
        fill_if_blank(&mut candidate.quantity, defaults::QUANTITY);
        match &candidate.timing {
            Some(timing) if !timing.trim().is_empty() => {}
            _ => candidate.timing = Some(defaults::TIMING.to_string()),
        }
    }
}

fn fill_if_blank(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::types::{icons, FieldConfidence, DEFAULT_FORM};

    fn bare(name: &str) -> MedicineCandidate {
        MedicineCandidate {
            name: name.into(),
            dosage: None,
            pharmaceutical_form: DEFAULT_FORM.into(),
            icon: icons::PILL.into(),
            category: "unknown".into(),
            frequency: String::new(),
            timing: None,
            duration: String::new(),
            quantity: String::new(),
            confidence: FieldConfidence::structured(0.80),
        }
    }

    #[test]
    fn fills_defaults_for_empty_fields() {
        let mut meds = vec![bare("Omez")];
        finalize_candidates(&mut meds);
        let med = &meds[0];
        assert_eq!(med.frequency, "Once daily");
        assert_eq!(med.timing.as_deref(), Some("After food"));
        assert_eq!(med.duration, "7 Days");
        assert_eq!(med.quantity, "30 Tabs");
        assert!(med.dosage.is_none());
    }

    #[test]
    fn keeps_extracted_values() {
        let mut med = bare("Dolo 650");
        med.frequency = "Three times daily".into();
        med.timing = Some("Before food".into());
        med.duration = "5 Days".into();
        med.quantity = "15 Tabs".into();
        let mut meds = vec![med.clone()];
        finalize_candidates(&mut meds);
        assert_eq!(meds[0].frequency, med.frequency);
        assert_eq!(meds[0].timing, med.timing);
        assert_eq!(meds[0].duration, med.duration);
        assert_eq!(meds[0].quantity, med.quantity);
    }

    #[test]
    fn blank_timing_is_replaced() {
        let mut med = bare("Telma");
        med.timing = Some("  ".into());
        let mut meds = vec![med];
        finalize_candidates(&mut meds);
        assert_eq!(meds[0].timing.as_deref(), Some("After food"));
    }

    #[test]
    fn overall_recomputed_from_fields() {
        let mut med = bare("Pan");
        med.confidence.dosage = 0.9;
        med.confidence.frequency = 0.95;
        let mut meds = vec![med];
        finalize_candidates(&mut meds);
        // (0.80 + 0.9 + 0.95) / 3 = 0.8833
        assert!((meds[0].confidence.overall - 0.88).abs() < 1e-6, "got {}", meds[0].confidence.overall);
    }

    #[test]
    fn empty_list_is_fine() {
        let mut meds: Vec<MedicineCandidate> = vec![];
        finalize_candidates(&mut meds);
        assert!(meds.is_empty());
    }
}
