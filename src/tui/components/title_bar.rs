//! # TitleBar Component
//!
//! Single-line header: `packmate (model: X) | status | gate`.
//!
//! Purely presentational. Every field is a prop copied out of `App` when the
//! frame is drawn, and sections with nothing to say are omitted.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    pub model_name: String,
    pub status_message: String,
    /// Short gate label, empty when submissions are unrestricted.
    pub gate_label: String,
    pub is_loading: bool,
}

impl TitleBar {
    pub fn new(
        model_name: String,
        status_message: String,
        gate_label: String,
        is_loading: bool,
    ) -> Self {
        Self {
            model_name,
            status_message,
            gate_label,
            is_loading,
        }
    }

    fn status_text(&self) -> Option<&str> {
        if self.is_loading {
            Some("Packing...")
        } else if self.status_message.is_empty() {
            None
        } else {
            Some(&self.status_message)
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(format!("packmate (model: {})", self.model_name))];

        if let Some(status) = self.status_text() {
            spans.push(Span::raw(format!(" | {status}")));
        }
        if !self.gate_label.is_empty() && self.status_text() != Some(self.gate_label.as_str()) {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.gate_label.clone(),
                Style::default().fg(Color::Red),
            ));
        }

        frame.render_widget(Line::from(spans), area);
    }
}
