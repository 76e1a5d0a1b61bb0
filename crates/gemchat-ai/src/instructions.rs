//! System instruction assembly.
//!
//! Each capability maps to one fixed fragment. The instruction is rebuilt
//! from scratch whenever a client is constructed, never appended to.

use gemchat_common::{Feature, FeatureToggles, ModelInfo};

pub const BASE_INSTRUCTION: &str =
    "You are a helpful assistant in a chat application. Answer clearly and accurately.";

const CODE_EXECUTION: &str = "When you show code, put it in fenced code blocks tagged with \
     the language name so the user can run it. Prefer small, self-contained snippets.";

const THINKING: &str = "The user can see a separate reasoning pass. Keep the final answer \
     focused and do not repeat the reasoning.";

const VISION: &str = "The user may attach images. Describe what is relevant in them \
     before answering questions about them.";

const RICH_TEXT: &str = "Format answers with markdown: headings, lists, tables and emphasis \
     where they help readability.";

/// Fixed text for a capability.
pub fn fragment(feature: Feature) -> &'static str {
    match feature {
        Feature::CodeExecution => CODE_EXECUTION,
        Feature::Thinking => THINKING,
        Feature::Vision => VISION,
        Feature::RichText => RICH_TEXT,
    }
}

/// Build the system instruction for a model and a set of toggles.
pub fn system_instruction(features: &FeatureToggles, model: &ModelInfo) -> String {
    let mut sections = vec![BASE_INSTRUCTION];
    for feature in Feature::ALL {
        if !features.get(feature) {
            continue;
        }
        if feature == Feature::Vision && !model.supports_vision {
            continue;
        }
        sections.push(fragment(feature));
    }
    sections.join("\n\n")
}
