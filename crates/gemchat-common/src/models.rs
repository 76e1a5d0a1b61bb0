//! Catalog of supported Gemini models.

use serde::Serialize;

pub const DEFAULT_MODEL_ID: &str = "gemini-2.0-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub display_name: &'static str,
    pub supports_vision: bool,
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-2.0-flash",
        display_name: "Gemini 2.0 Flash",
        supports_vision: true,
    },
    ModelInfo {
        id: "gemini-1.5-pro",
        display_name: "Gemini 1.5 Pro",
        supports_vision: true,
    },
    ModelInfo {
        id: "gemini-1.5-flash",
        display_name: "Gemini 1.5 Flash",
        supports_vision: true,
    },
    ModelInfo {
        id: "gemini-1.0-pro",
        display_name: "Gemini 1.0 Pro",
        supports_vision: false,
    },
];

pub fn find_model(id: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_in_catalog() {
        let model = find_model(DEFAULT_MODEL_ID).unwrap();
        assert!(model.supports_vision);
    }

    #[test]
    fn default_model_heads_the_catalog() {
        assert_eq!(MODELS[0].id, DEFAULT_MODEL_ID);
    }

    #[test]
    fn unknown_model_is_none() {
        assert!(find_model("gpt-4").is_none());
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut ids: Vec<_> = MODELS.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), MODELS.len());
    }

    #[test]
    fn catalog_has_a_text_only_model() {
        assert!(MODELS.iter().any(|m| !m.supports_vision));
    }
}
