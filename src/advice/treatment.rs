use std::sync::Arc;

use tracing::{error, warn};

use super::prompt::{fallback_treatment, treatment_prompt};
use super::TextGenerator;

/// Advice entry point. Always returns usable text.
pub struct TreatmentAdvisor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl TreatmentAdvisor {
    /// `None` means no credential is configured; every call gets the fallback.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Treatment recommendations for a disease label (free text accepted).
    pub fn recommend(&self, disease_label: &str) -> String {
        let Some(generator) = &self.generator else {
            warn!(disease = %disease_label, "No Gemini credential; serving canned treatment advice");
            return fallback_treatment(disease_label);
        };

        match generator.generate(&treatment_prompt(disease_label)) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!(disease = %disease_label, "Gemini returned empty treatment advice");
                fallback_treatment(disease_label)
            }
            Err(e) => {
                error!(disease = %disease_label, error = %e, "Error generating treatment recommendations");
                fallback_treatment(disease_label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::gemini::MockTextGenerator;

    #[test]
    fn missing_credential_returns_structured_fallback() {
        let advisor = TreatmentAdvisor::new(None);
        let text = advisor.recommend("Tomato_Late_blight");
        for section in ["Description", "Symptoms", "Treatment", "Prevention"] {
            assert!(text.contains(section));
        }
        assert!(text.contains("Tomato Late blight"));
        assert!(!advisor.is_configured());
    }

    #[test]
    fn generated_text_is_returned_verbatim() {
        let mock = Arc::new(MockTextGenerator::new("## Description\nRust fungus."));
        let advisor = TreatmentAdvisor::new(Some(mock.clone()));
        assert_eq!(advisor.recommend("Corn_Common_rust"), "## Description\nRust fungus.");

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("Corn Common rust"));
    }

    #[test]
    fn failure_falls_back() {
        let advisor = TreatmentAdvisor::new(Some(Arc::new(MockTextGenerator::failing())));
        assert!(advisor.recommend("Grape_Esca").contains("# Treatment Recommendations for Grape Esca"));
    }

    #[test]
    fn blank_generation_falls_back() {
        let advisor = TreatmentAdvisor::new(Some(Arc::new(MockTextGenerator::new("  \n"))));
        assert!(advisor.recommend("Grape_Esca").contains("## Prevention"));
    }
}
