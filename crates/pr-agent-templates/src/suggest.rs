use serde::Serialize;

use crate::TemplateCatalog;

pub const USAGE_HINT: &str =
    "Claude can help you fill out this template based on the specific changes in your PR.";

/// Result of matching a change type against the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Suggestion {
    Recommended {
        recommended_template: String,
        reasoning: String,
        template_content: String,
        usage_hint: String,
    },
    Unknown {
        error: String,
        available_types: Vec<String>,
    },
}

impl Suggestion {
    pub fn is_recommended(&self) -> bool {
        matches!(self, Self::Recommended { .. })
    }
}

/// Pick the template registered under `change_type`.
///
/// `changes_summary` is the caller's own description and is only echoed back.
pub fn suggest(catalog: &TemplateCatalog, changes_summary: &str, change_type: &str) -> Suggestion {
    match catalog.get(change_type) {
        Some(content) => Suggestion::Recommended {
            recommended_template: content.to_string(),
            reasoning: format!(
                "Based on your analysis: '{}', this appears to be a {} change.",
                changes_summary, change_type
            ),
            template_content: content.to_string(),
            usage_hint: USAGE_HINT.to_string(),
        },
        None => {
            let available: Vec<String> = catalog.names().into_iter().map(String::from).collect();
            Suggestion::Unknown {
                error: format!(
                    "No template found for change type '{}'. Available types: {}",
                    change_type,
                    available.join(", ")
                ),
                available_types: available,
            }
        }
    }
}
