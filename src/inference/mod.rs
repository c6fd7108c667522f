pub mod provider;
pub mod providers;

pub use provider::{CompletionProvider, CompletionRequest, FailureClass, ProviderError};
pub use providers::{GeminiProvider, OpenRouterProvider};
