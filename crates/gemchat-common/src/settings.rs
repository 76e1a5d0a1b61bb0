//! Per-user chat settings: selected model and capability toggles.

use serde::{Deserialize, Serialize};

use crate::models::{find_model, ModelInfo, MODELS};

/// Named capability switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    CodeExecution,
    Thinking,
    Vision,
    RichText,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::CodeExecution,
        Feature::Thinking,
        Feature::Vision,
        Feature::RichText,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::CodeExecution => "code_execution",
            Feature::Thinking => "thinking",
            Feature::Vision => "vision",
            Feature::RichText => "rich_text",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub code_execution: bool,
    pub thinking: bool,
    pub vision: bool,
    pub rich_text: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            code_execution: true,
            thinking: false,
            vision: true,
            rich_text: true,
        }
    }
}

impl FeatureToggles {
    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::CodeExecution => self.code_execution,
            Feature::Thinking => self.thinking,
            Feature::Vision => self.vision,
            Feature::RichText => self.rich_text,
        }
    }

    fn slot(&mut self, feature: Feature) -> &mut bool {
        match feature {
            Feature::CodeExecution => &mut self.code_execution,
            Feature::Thinking => &mut self.thinking,
            Feature::Vision => &mut self.vision,
            Feature::RichText => &mut self.rich_text,
        }
    }
}

/// The model selection plus toggles a generation client is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    model: &'static ModelInfo,
    features: FeatureToggles,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: &MODELS[0],
            features: FeatureToggles::default(),
        }
    }
}

impl ChatSettings {
    /// Build settings for `model_id`. Vision is cleared when the model cannot
    /// take images.
    pub fn new(model_id: &str, features: FeatureToggles) -> Result<Self, String> {
        let mut settings = Self {
            model: find_model(model_id).ok_or_else(|| format!("unknown model: {model_id}"))?,
            features,
        };
        settings.enforce_model_capabilities();
        Ok(settings)
    }

    pub fn model(&self) -> &'static ModelInfo {
        self.model
    }

    pub fn features(&self) -> FeatureToggles {
        self.features
    }

    /// Switch model. A model without vision support forces vision off,
    /// whatever it was before.
    pub fn select_model(&mut self, model_id: &str) -> Result<&'static ModelInfo, String> {
        self.model = find_model(model_id).ok_or_else(|| format!("unknown model: {model_id}"))?;
        self.enforce_model_capabilities();
        Ok(self.model)
    }

    /// Set a toggle. Returns the value actually stored, which stays `false`
    /// when enabling vision on a text-only model.
    pub fn set_feature(&mut self, feature: Feature, enabled: bool) -> bool {
        *self.features.slot(feature) = enabled;
        self.enforce_model_capabilities();
        self.features.get(feature)
    }

    pub fn toggle(&mut self, feature: Feature) -> bool {
        let next = !self.features.get(feature);
        self.set_feature(feature, next)
    }

    fn enforce_model_capabilities(&mut self) {
        if !self.model.supports_vision {
            self.features.vision = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_MODEL_ID;

    #[test]
    fn default_settings_use_default_model() {
        let settings = ChatSettings::default();
        assert_eq!(settings.model().id, DEFAULT_MODEL_ID);
        assert!(settings.features().vision);
    }

    #[test]
    fn selecting_text_only_model_disables_vision() {
        let mut settings = ChatSettings::default();
        assert!(settings.features().vision);
        settings.select_model("gemini-1.0-pro").unwrap();
        assert!(!settings.features().vision);
    }

    #[test]
    fn vision_cannot_be_enabled_on_text_only_model() {
        let mut settings = ChatSettings::new("gemini-1.0-pro", FeatureToggles::default()).unwrap();
        assert!(!settings.set_feature(Feature::Vision, true));
        assert!(!settings.features().vision);
    }

    #[test]
    fn switching_back_to_vision_model_keeps_vision_off() {
        let mut settings = ChatSettings::default();
        settings.select_model("gemini-1.0-pro").unwrap();
        settings.select_model("gemini-1.5-pro").unwrap();
        assert!(!settings.features().vision);
        assert!(settings.set_feature(Feature::Vision, true));
    }

    #[test]
    fn unknown_model_is_rejected_and_selection_kept() {
        let mut settings = ChatSettings::default();
        assert!(settings.select_model("nope").is_err());
        assert_eq!(settings.model().id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn toggle_flips_feature() {
        let mut settings = ChatSettings::default();
        assert!(!settings.features().thinking);
        assert!(settings.toggle(Feature::Thinking));
        assert!(!settings.toggle(Feature::Thinking));
    }

    #[test]
    fn feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("telepathy"), None);
    }
}
