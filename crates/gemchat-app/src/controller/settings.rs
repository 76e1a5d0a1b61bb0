//! Model and feature selection. Each change rebuilds the generation client
//! through the factory.

use gemchat_common::{ChatSettings, Feature, FeatureToggles, ModelInfo};
use tracing::{debug, warn};

use super::{ChatError, Inner, SessionController};

impl SessionController {
    /// Switch model. Vision is forced off for models without image support.
    pub async fn select_model(&self, model_id: &str) -> Result<&'static ModelInfo, ChatError> {
        let mut inner = self.inner.lock().await;
        let model = inner
            .settings
            .select_model(model_id)
            .map_err(ChatError::Settings)?;
        self.rebuild_client(&mut inner);
        Ok(model)
    }

    /// Replace all toggles. Returns the toggles in effect, which may differ
    /// when the model cannot take images.
    pub async fn set_features(&self, features: FeatureToggles) -> Result<FeatureToggles, ChatError> {
        let mut inner = self.inner.lock().await;
        inner.settings =
            ChatSettings::new(inner.settings.model().id, features).map_err(ChatError::Settings)?;
        self.rebuild_client(&mut inner);
        Ok(inner.settings.features())
    }

    /// Flip one toggle and return its new value.
    pub async fn toggle_feature(&self, feature: Feature) -> bool {
        let mut inner = self.inner.lock().await;
        let enabled = inner.settings.toggle(feature);
        self.rebuild_client(&mut inner);
        enabled
    }

    pub(super) fn rebuild_client(&self, inner: &mut Inner) {
        match (self.factory)(&inner.settings) {
            Ok(client) => {
                debug!(model = client.model_id(), "Generation client ready");
                inner.client = Some(client);
                inner.client_error = None;
            }
            Err(e) => {
                warn!(model = inner.settings.model().id, error = %e, "Generation client unavailable");
                inner.client = None;
                inner.client_error = Some(e.to_string());
            }
        }
    }
}
