//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Request Flow
//!
//! `Effect::SpawnRequest` starts a tokio task that performs the single
//! generation call and sends `Action::ResponseReceived` back over an
//! `mpsc` channel. The loop drains that channel between frames, so the
//! reducer only ever runs on this thread.
//!
//! ## Redraw Strategy
//!
//! - **Loading**: draws every ~80ms so the spinner animates.
//! - **Idle**: sleeps up to 500ms, only redraws on events or resize.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::Provider;
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, GenerationSettings};
use crate::inference::{
    CompletionProvider, CompletionRequest, GeminiProvider, OpenRouterProvider,
};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, MessageListState, PackingListState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives scroll keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Transcript,
    Checklist,
}

impl Pane {
    fn next(self) -> Self {
        match self {
            Pane::Transcript => Pane::Checklist,
            Pane::Checklist => Pane::Transcript,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub packing_list: PackingListState,
    pub input_box: InputBox,
    pub focus: Pane,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            packing_list: PackingListState::default(),
            input_box: InputBox::new(),
            focus: Pane::default(),
        }
    }

    /// Route a scroll event to the focused pane.
    fn scroll(&mut self, event: &TuiEvent) {
        match self.focus {
            Pane::Transcript => self.message_list.handle_event(event),
            Pane::Checklist => self.packing_list.handle_event(event),
        };
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock, // blinking cursors flicker under continuous redraws
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            DisableBracketedPaste,
            SetCursorStyle::DefaultUserShape
        );
    }
}

/// Build a provider from a resolved config.
///
/// Returns `None` when no API key is available; the app then starts in the
/// missing-configuration state instead of failing.
pub fn build_provider(config: &ResolvedConfig) -> Option<Arc<dyn CompletionProvider>> {
    let Some(api_key) = config.api_key.clone() else {
        warn!("No API key configured for provider {}", config.provider.as_str());
        return None;
    };
    let base_url = Some(config.base_url.clone());
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        Provider::OpenRouter => Arc::new(OpenRouterProvider::new(api_key, base_url)),
        Provider::Gemini => Arc::new(GeminiProvider::new(api_key, base_url)),
    };
    Some(provider)
}

/// Apply a core effect to the TUI side. Returns `true` when the app should exit.
fn apply_effect(
    effect: Effect,
    app: &App,
    tui: &mut TuiState,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match effect {
        Effect::None => {}
        Effect::Quit => return true,
        Effect::SpawnRequest(request) => match app.provider.clone() {
            Some(provider) => spawn_request(provider, request, tx.clone()),
            None => warn!("SpawnRequest without a provider"),
        },
        Effect::ClearInput => {
            tui.input_box.clear();
            tui.packing_list.reset();
            tui.message_list.stick_to_bottom = true;
        }
    }
    false
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::new(GenerationSettings {
        provider: build_provider(&config),
        model_name: config.model_name.clone(),
    });
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true; // Force first frame

    'main: loop {
        tui.input_box.locked = app.is_loading();
        let animating = app.is_loading();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let effect = match event {
                TuiEvent::Resize => continue,
                TuiEvent::ForceQuit | TuiEvent::Quit => update(&mut app, Action::Quit),
                TuiEvent::ResetGate => update(&mut app, Action::ResetGate),
                TuiEvent::FocusNext => {
                    tui.focus = tui.focus.next();
                    continue;
                }
                TuiEvent::ScrollUp
                | TuiEvent::ScrollDown
                | TuiEvent::ScrollPageUp
                | TuiEvent::ScrollPageDown => {
                    tui.scroll(&event);
                    continue;
                }
                _ => match tui.input_box.handle_event(&event) {
                    Some(InputEvent::Submit(text)) => update(&mut app, Action::Submit(text)),
                    Some(InputEvent::ContentChanged) | None => continue,
                },
            };
            if apply_effect(effect, &app, &mut tui, &tx) {
                break 'main;
            }
            // Lock the input box before any further keys in this batch
            tui.input_box.locked = app.is_loading();
        }

        // Handle background task actions
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            let effect = update(&mut app, action);
            if apply_effect(effect, &app, &mut tui, &tx) {
                break 'main;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

fn spawn_request(
    provider: Arc<dyn CompletionProvider>,
    request: CompletionRequest,
    tx: mpsc::Sender<Action>,
) {
    info!(
        "Spawning generation request ({} model {})",
        provider.name(),
        request.model
    );
    tokio::spawn(async move {
        let request_start = std::time::Instant::now();
        let result = provider.complete(request).await;
        debug!(
            "Generation call finished in {}ms (ok={})",
            request_start.elapsed().as_millis(),
            result.is_ok()
        );
        if tx.send(Action::ResponseReceived(result)).is_err() {
            warn!("Failed to send ResponseReceived: receiver dropped");
        }
    });
}
