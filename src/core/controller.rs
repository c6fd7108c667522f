//! # Controller
//!
//! Drives the request lifecycle end to end without a terminal: runs the
//! reducer, performs the one outbound call when asked, and feeds the result
//! back. The TUI does the same dance through a channel so it can keep
//! drawing while the call is in flight; headless callers just `.await`.

use log::warn;

use crate::core::action::{Action, Effect, update};
use crate::core::state::{App, GenerationSettings, Snapshot};

pub struct Controller {
    app: App,
}

impl Controller {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            app: App::new(settings),
        }
    }

    /// Submits trip text and waits for the lifecycle to settle.
    ///
    /// Returns the last effect produced, which is `Effect::ClearInput` for
    /// every accepted submission and `Effect::None` for rejected ones.
    pub async fn submit(&mut self, text: &str) -> Effect {
        let effect = update(&mut self.app, Action::Submit(text.to_string()));
        let Effect::SpawnRequest(request) = effect else {
            return effect;
        };

        let result = match self.app.provider.clone() {
            Some(provider) => provider.complete(request).await,
            None => {
                warn!("SpawnRequest issued without a provider");
                return Effect::None;
            }
        };
        update(&mut self.app, Action::ResponseReceived(result))
    }

    /// Clears a resettable error gate.
    pub fn reset_gate(&mut self) {
        update(&mut self.app, Action::ResetGate);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.app.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{MSG_INVALID_CREDENTIAL, MSG_MISSING_CONFIG, MSG_SUCCESS};
    use crate::core::packing::{Category, Message, PackingList};
    use crate::core::state::ErrorGate;
    use crate::inference::ProviderError;
    use crate::test_support::ScriptedProvider;

    const CLOTHING_JSON: &str = r#"{"categories":[{"name":"Clothing","items":["Shirt","Pants"]}]}"#;

    fn controller_with(provider: std::sync::Arc<ScriptedProvider>) -> Controller {
        Controller::new(GenerationSettings {
            provider: Some(provider),
            model_name: "test-model".to_string(),
        })
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let provider = ScriptedProvider::new(vec![Ok(CLOTHING_JSON.to_string())]);
        let mut controller = controller_with(provider.clone());

        let effect = controller.submit("Weekend in Lisbon").await;
        assert_eq!(effect, Effect::ClearInput);
        assert_eq!(provider.call_count(), 1);
        assert!(provider.prompts()[0].contains("Weekend in Lisbon"));

        let snapshot = controller.snapshot();
        assert!(!snapshot.pending);
        assert_eq!(
            snapshot.packing_list,
            Some(PackingList {
                categories: vec![Category {
                    name: "Clothing".to_string(),
                    items: vec!["Shirt".to_string(), "Pants".to_string()],
                }],
            })
        );
        assert_eq!(
            snapshot.messages,
            vec![Message::user("Weekend in Lisbon"), Message::assistant(MSG_SUCCESS)]
        );
    }

    #[tokio::test]
    async fn test_whitespace_issues_no_call() {
        let provider = ScriptedProvider::new(vec![]);
        let mut controller = controller_with(provider.clone());

        assert_eq!(controller.submit("   ").await, Effect::None);
        assert_eq!(provider.call_count(), 0);
        assert!(controller.snapshot().messages.is_empty());
    }

    #[tokio::test]
    async fn test_missing_config_issues_no_call() {
        let mut controller = Controller::new(GenerationSettings {
            provider: None,
            model_name: "test-model".to_string(),
        });

        assert_eq!(controller.submit("X").await, Effect::ClearInput);
        let snapshot = controller.snapshot();
        assert_eq!(
            snapshot.messages,
            vec![Message::user("X"), Message::assistant(MSG_MISSING_CONFIG)]
        );
        assert_eq!(snapshot.gate, ErrorGate::MissingConfig);
    }

    #[test]
    fn test_auth_failure_blocks_until_reset() {
        let provider = ScriptedProvider::new(vec![
            Err(ProviderError::Api {
                status: 401,
                message: "Unauthorized".to_string(),
            }),
            Ok(CLOTHING_JSON.to_string()),
        ]);
        let mut controller = controller_with(provider.clone());

        tokio_test::block_on(controller.submit("Trip"));
        assert_eq!(controller.snapshot().gate, ErrorGate::InvalidCredential);

        tokio_test::block_on(controller.submit("Trip again"));
        assert_eq!(provider.call_count(), 1, "gated submission must not call out");
        assert_eq!(
            controller.snapshot().messages.last(),
            Some(&Message::assistant(MSG_INVALID_CREDENTIAL))
        );

        controller.reset_gate();
        tokio_test::block_on(controller.submit("Trip again"));
        assert_eq!(provider.call_count(), 2);
        assert!(controller.snapshot().packing_list.is_some());
    }
}
