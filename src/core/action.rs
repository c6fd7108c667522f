//! # Actions
//!
//! Everything that can happen in packmate becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The provider answers? That's `Action::ResponseReceived(result)`.
//!
//! `update()` takes the current state and an action, mutates the state, and
//! returns an `Effect` describing the I/O the caller must perform. The
//! reducer itself never touches the network or the terminal.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Every failure is turned into an assistant message here. Nothing below
//! this boundary reaches the user unconverted; the raw error only goes to
//! the log.

use log::{debug, info, warn};

use crate::core::packing::{Message, build_prompt, parse_packing_list};
use crate::core::state::{App, ErrorGate, Phase};
use crate::inference::{CompletionRequest, FailureClass, ProviderError};

pub const MSG_SUCCESS: &str =
    "Here's your packing list! I've organized everything into categories. Anything else you'd like to plan for?";
pub const MSG_MISSING_CONFIG: &str =
    "No API key is configured. Set GEMINI_API_KEY (or add it to ~/.packmate/config.toml) and restart packmate.";
pub const MSG_INVALID_CREDENTIAL: &str =
    "The API key was rejected by the service. Check your key, then press Ctrl+R to try again.";
pub const MSG_RATE_LIMITED: &str =
    "The service is receiving too many requests right now. Please wait a moment and try again.";
pub const MSG_GENERIC_FAILURE: &str =
    "Sorry, something went wrong while generating your packing list. Please try again.";
pub const MSG_INVALID_FORMAT: &str =
    "Sorry, I couldn't read the packing list in that response. Please try describing your trip again.";

#[derive(Debug)]
pub enum Action {
    /// User submitted trip text.
    Submit(String),
    /// The generation call finished (either way).
    ResponseReceived(Result<String, ProviderError>),
    /// User acknowledged a credential failure and wants to try again.
    ResetGate,
    Quit,
}

/// I/O the caller performs after `update()` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Issue exactly one generation call and report back with `ResponseReceived`.
    SpawnRequest(CompletionRequest),
    /// The attempt is over; empty the input field.
    ClearInput,
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => submit(app, text),
        Action::ResponseReceived(result) => resolve(app, result),
        Action::ResetGate => {
            if app.gate.is_resettable() {
                info!("Error gate {:?} reset by user", app.gate);
                app.gate = ErrorGate::None;
                app.status_message = String::from("Ready");
            }
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit(app: &mut App, text: String) -> Effect {
    if text.trim().is_empty() {
        debug!("Ignoring empty submission");
        return Effect::None;
    }
    if app.phase == Phase::AwaitingResponse {
        debug!("Ignoring submission while a request is pending");
        return Effect::None;
    }

    if app.gate.blocks_submission() {
        info!("Submission short-circuited by gate {:?}", app.gate);
        let message = gate_message(app.gate);
        app.messages.push(Message::user(text));
        app.messages.push(Message::assistant(message));
        app.status_message = String::from("Submission blocked");
        return Effect::ClearInput;
    }

    // A provider is always present unless the gate is MissingConfig
    let Some(provider) = app.provider.as_ref() else {
        warn!("No provider configured but gate was {:?}", app.gate);
        app.gate = ErrorGate::MissingConfig;
        app.messages.push(Message::user(text));
        app.messages.push(Message::assistant(MSG_MISSING_CONFIG));
        return Effect::ClearInput;
    };

    info!(
        "Submitting trip ({} bytes) to {} model {}",
        text.len(),
        provider.name(),
        app.model_name
    );
    app.gate = ErrorGate::None;
    app.phase = Phase::AwaitingResponse;
    app.status_message = String::from("Packing...");
    let request = CompletionRequest {
        model: app.model_name.clone(),
        prompt: build_prompt(&text),
    };
    app.in_flight = Some(text);
    Effect::SpawnRequest(request)
}

fn resolve(app: &mut App, result: Result<String, ProviderError>) -> Effect {
    if app.phase != Phase::AwaitingResponse {
        warn!("Response received while idle; dropping it");
        return Effect::None;
    }
    let text = app.in_flight.take().unwrap_or_default();

    let reply = match result {
        Ok(raw) => match parse_packing_list(&raw) {
            Ok(list) => {
                info!(
                    "Packing list parsed: {} categories, {} items",
                    list.categories.len(),
                    list.item_count()
                );
                app.packing_list = Some(list);
                app.status_message = String::from("Packing list ready");
                MSG_SUCCESS
            }
            Err(e) => {
                warn!("Response was not a packing list: {e}");
                debug!("Unparseable response body: {raw}");
                app.status_message = String::from("Invalid response");
                MSG_INVALID_FORMAT
            }
        },
        Err(e) => {
            warn!("Generation call failed: {e}");
            app.gate = match e.class() {
                FailureClass::Authentication => ErrorGate::InvalidCredential,
                FailureClass::RateLimited => ErrorGate::RateLimited,
                FailureClass::Other => ErrorGate::Transient,
            };
            app.status_message = String::from("Request failed");
            gate_message(app.gate)
        }
    };

    app.messages.push(Message::user(text));
    app.messages.push(Message::assistant(reply));
    app.phase = Phase::Idle;
    Effect::ClearInput
}

fn gate_message(gate: ErrorGate) -> &'static str {
    match gate {
        ErrorGate::MissingConfig => MSG_MISSING_CONFIG,
        ErrorGate::InvalidCredential => MSG_INVALID_CREDENTIAL,
        ErrorGate::RateLimited => MSG_RATE_LIMITED,
        ErrorGate::Transient | ErrorGate::None => MSG_GENERIC_FAILURE,
    }
}
