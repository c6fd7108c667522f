//! # Application State
//!
//! Core business state for packmate. Domain logic only, no TUI-specific
//! types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── provider: Option<Arc<dyn CompletionProvider>>  // None = no credential
//! ├── model_name: String            // model sent with every request
//! ├── messages: Vec<Message>        // transcript, append-only
//! ├── packing_list: Option<PackingList>  // last successful result
//! ├── phase: Phase                  // Idle | AwaitingResponse
//! ├── gate: ErrorGate               // last failure class
//! ├── in_flight: Option<String>     // trip text of the pending request
//! └── status_message: String        // title bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::core::packing::{Message, PackingList};
use crate::inference::CompletionProvider;

/// Request lifecycle phase. At most one request is ever in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Why the last attempt failed, and whether that stops the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorGate {
    #[default]
    None,
    /// No credential at startup. Permanent for the run.
    MissingConfig,
    /// The service rejected the credential. Blocks until reset.
    InvalidCredential,
    /// Throttled. Cleared when the next attempt starts.
    RateLimited,
    /// Any other call failure. Cleared when the next attempt starts.
    Transient,
}

impl ErrorGate {
    /// True when submissions short-circuit without calling the service.
    pub fn blocks_submission(self) -> bool {
        matches!(self, ErrorGate::MissingConfig | ErrorGate::InvalidCredential)
    }

    /// True when the user can clear the gate explicitly.
    pub fn is_resettable(self) -> bool {
        !matches!(self, ErrorGate::None | ErrorGate::MissingConfig)
    }

    /// Short label for the title bar. Empty when there is nothing to show.
    pub fn label(self) -> &'static str {
        match self {
            ErrorGate::None => "",
            ErrorGate::MissingConfig => "No API key",
            ErrorGate::InvalidCredential => "API key rejected (Ctrl+R to retry)",
            ErrorGate::RateLimited => "Rate limited",
            ErrorGate::Transient => "Last request failed",
        }
    }
}

/// Construction-time inputs for the controller.
///
/// `provider` is `None` when no credential was configured; the app then
/// starts with the `MissingConfig` gate and never calls out.
pub struct GenerationSettings {
    pub provider: Option<Arc<dyn CompletionProvider>>,
    pub model_name: String,
}

/// Read-only view handed to anything outside the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub packing_list: Option<PackingList>,
    pub pending: bool,
    pub gate: ErrorGate,
}

pub struct App {
    pub provider: Option<Arc<dyn CompletionProvider>>,
    pub model_name: String,
    pub messages: Vec<Message>,
    pub packing_list: Option<PackingList>,
    pub phase: Phase,
    pub gate: ErrorGate,
    /// Raw trip text of the request currently awaiting a response.
    pub in_flight: Option<String>,
    pub status_message: String,
}

impl App {
    pub fn new(settings: GenerationSettings) -> Self {
        let gate = if settings.provider.is_some() {
            ErrorGate::None
        } else {
            ErrorGate::MissingConfig
        };
        Self {
            provider: settings.provider,
            model_name: settings.model_name,
            messages: Vec::new(),
            packing_list: None,
            phase: Phase::Idle,
            gate,
            in_flight: None,
            status_message: String::from("Describe your trip to get started"),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingResponse
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.messages.clone(),
            packing_list: self.packing_list.clone(),
            pending: self.is_loading(),
            gate: self.gate,
        }
    }
}
