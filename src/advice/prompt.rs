//! Prompt templates and canned replies for the advisor and the chat.

use crate::detection::labels::display_name;

/// Sent once per new chat session to prime the assistant's role.
pub const CHAT_PRIMING_MESSAGE: &str =
    "You are a plant disease expert assistant. Please acknowledge your role.";

pub const CHAT_MISSING_KEY_REPLY: &str = "Sorry, I cannot respond at the moment because the API key is missing. Please contact the administrator.";
pub const CHAT_INIT_FAILED_REPLY: &str = "Failed to initialize chat session. Please try again later.";
pub const CHAT_EMPTY_REPLY: &str = "I couldn't generate a response. Please try again.";
pub const CHAT_ERROR_REPLY: &str = "I apologize, but I encountered an error while processing your request. Please try again later.";

/// Treatment request for a disease label.
pub fn treatment_prompt(disease_label: &str) -> String {
    let disease = display_name(disease_label);
    format!(
        "You are a plant disease expert. Provide treatment recommendations for plants affected by {disease}.

Follow this structure in your response:
1. Brief description of the disease
2. Symptoms
3. Treatment recommendations (organic and chemical options)
4. Prevention tips

Keep your response informative but concise (less than 500 words)."
    )
}

/// Canned Markdown advice with the same section layout as generated advice.
pub fn fallback_treatment(disease_label: &str) -> String {
    let disease = display_name(disease_label);
    format!(
        "# Treatment Recommendations for {disease}

## Description
This is a common plant disease that affects crops and ornamental plants.

## Symptoms
- Discoloration of leaves
- Spots or lesions
- Wilting or stunted growth

## Treatment
- Remove affected plant parts
- Apply appropriate fungicide or insecticide
- Ensure proper plant nutrition

## Prevention
- Rotate crops
- Use disease-resistant varieties
- Maintain good air circulation
- Water at the base of plants to keep foliage dry

*Note: These are general recommendations. For specific treatment, please consult with a local agricultural extension service.*
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_uses_display_name() {
        let prompt = treatment_prompt("Corn_Common_rust");
        assert!(prompt.contains("affected by Corn Common rust."));
        assert!(prompt.contains("less than 500 words"));
    }

    #[test]
    fn fallback_has_all_sections() {
        let text = fallback_treatment("Tomato_Late_blight");
        for header in ["## Description", "## Symptoms", "## Treatment", "## Prevention"] {
            assert!(text.contains(header), "missing {header}");
        }
        assert!(text.contains("Tomato Late blight"));
    }
}
