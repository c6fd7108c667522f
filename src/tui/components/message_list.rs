//! # MessageList Component
//!
//! Scrollable view of the transcript.
//!
//! ## Responsibilities
//!
//! - Display the list of messages in insertion order
//! - Stick to the bottom so every append scrolls to the latest entry
//! - Show a pending line while a request is in flight
//! - Cache message heights so long transcripts stay cheap to draw
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the message slice
//! (props). Messages are append-only, so cached heights stay valid until the
//! width changes.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::packing::Message as TranscriptMessage;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// Rows reserved below the last message for the pending indicator.
const PENDING_ROWS: u16 = 1;

const EMPTY_HINT: &str =
    "Describe your trip (where, how long, what you'll do) and press Enter.";

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    /// Scroll offset and view state
    pub scroll_state: ScrollViewState,
    /// Cached layout measurements
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true, // Start attached to bottom
            viewport_height: 0,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.layout.total_height().saturating_sub(self.viewport_height)
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }
}

/// Scrollable transcript component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [TranscriptMessage],
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [TranscriptMessage],
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            spinner_frame,
        }
    }

    fn pending_line(&self) -> Paragraph<'static> {
        let spinner = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
        Paragraph::new(format!("{spinner} Packing your bags..."))
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.messages.is_empty() {
            if self.is_loading {
                frame.render_widget(self.pending_line(), area);
            } else {
                let hint = Paragraph::new(EMPTY_HINT)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray))
                    .wrap(ratatui::widgets::Wrap { trim: true });
                let y = area.y + area.height / 2;
                let hint_area = Rect::new(area.x, y, area.width, area.height.saturating_sub(y - area.y));
                frame.render_widget(hint, hint_area);
            }
            return;
        }

        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let num_items = self.messages.len();

        // 1. Update Layout Cache (Internal Mutation)
        let layout = &mut self.state.layout;
        let reusable = layout.reusable_count(num_items, content_width);
        layout.heights.truncate(reusable.min(layout.heights.len()));
        for message in self.messages.iter().skip(layout.heights.len()) {
            layout.heights.push(Message::calculate_height(message, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.update_metadata(num_items, content_width);

        let total_height = self.state.layout.total_height();
        let pending_rows = if self.is_loading { PENDING_ROWS } else { 0 };
        let canvas_height = total_height.saturating_add(pending_rows);

        // 2. Clamp scroll offset to prevent overscrolling past content.
        self.state.viewport_height = area.height;
        if self.state.stick_to_bottom {
            let x = self.state.scroll_state.offset().x;
            self.state.scroll_state.set_offset(Position {
                x,
                y: canvas_height.saturating_sub(area.height),
            });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            if y_offset >= canvas_height {
                break;
            }
            let height = self.state.layout.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            scroll_view.render_widget(Message::new(&self.messages[i]), rect);
            y_offset = y_offset.saturating_add(height);
        }

        if self.is_loading && total_height < canvas_height {
            let pending = self.pending_line();
            scroll_view.render_widget(pending, Rect::new(0, total_height, content_width, PENDING_ROWS));
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler lives on `MessageListState` because `MessageList` is
/// recreated each frame and can't hold scroll state.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    message_count: usize,
    content_width: u16,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            message_count: 0,
            content_width: 0,
        }
    }

    /// How many cached heights are still valid.
    ///
    /// Messages never change once appended, so only a width change (or a
    /// shorter transcript) invalidates the cache.
    pub fn reusable_count(&self, message_count: usize, content_width: u16) -> usize {
        if self.content_width != content_width || self.heights.is_empty() {
            return 0;
        }
        if message_count < self.message_count {
            return 0;
        }
        self.message_count
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16) {
        self.message_count = message_count;
        self.content_width = content_width;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Sum of all cached heights, pinned at `u16::MAX` for huge transcripts.
    pub fn total_height(&self) -> u16 {
        self.heights
            .iter()
            .fold(0u16, |acc, &h| acc.saturating_add(h))
    }

    /// Indices of messages that intersect the viewport, with half a
    /// viewport of slack on either side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_layout_cache_reusable() {
        let mut cache = LayoutCache::new();
        cache.update_metadata(5, 80);
        cache.heights = vec![3; 5];

        // Same everything → all reusable
        assert_eq!(cache.reusable_count(5, 80), 5);
        // Two messages appended → the old five are still valid
        assert_eq!(cache.reusable_count(7, 80), 5);
        // Width changed → nothing reusable
        assert_eq!(cache.reusable_count(5, 40), 0);
        // Transcript shrank → nothing reusable
        assert_eq!(cache.reusable_count(3, 80), 0);
    }

    #[test]
    fn test_prefix_heights_and_visible_range() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![3, 3, 3, 3, 3, 3];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.prefix_heights, vec![3, 6, 9, 12, 15, 18]);

        // Viewport of 4 rows at the top: buffered window 0..6 → messages 0..2
        assert_eq!(cache.visible_range(0, 4), 0..2);
        // Scrolled to row 12: buffered window 10..18 → messages 3..6
        assert_eq!(cache.visible_range(12, 4), 3..6);
    }

    #[test]
    fn test_heights_saturate_instead_of_overflowing() {
        let mut cache = LayoutCache::new();
        cache.heights = vec![u16::MAX - 2, 5, 5];
        cache.rebuild_prefix_heights();
        assert_eq!(cache.prefix_heights, vec![u16::MAX - 2, u16::MAX, u16::MAX]);
        assert_eq!(cache.total_height(), u16::MAX);
        assert_eq!(cache.visible_range(u16::MAX - 10, 4), 0..1);
    }

    #[test]
    fn test_clamp_scroll_with_saturated_heights() {
        let mut state = MessageListState::new();
        state.layout.heights = vec![u16::MAX, u16::MAX];
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: u16::MAX });
        state.clamp_scroll();
        assert_eq!(state.scroll_state.offset().y, u16::MAX - 10);
    }

    #[test]
    fn test_scroll_up_detaches_and_repin_reattaches() {
        let mut state = MessageListState::new();
        state.layout.heights = vec![10, 10];
        state.viewport_height = 5;

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);

        state.scroll_state.set_offset(Position { x: 0, y: 15 });
        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, 15);
    }

    #[test]
    fn test_clamp_scroll() {
        let mut state = MessageListState::new();
        state.layout.heights = vec![4, 4];
        state.viewport_height = 6;
        state.scroll_state.set_offset(Position { x: 0, y: 50 });
        state.clamp_scroll();
        assert_eq!(state.scroll_state.offset().y, 2);
    }

    #[test]
    fn test_empty_transcript_shows_hint() {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        let mut state = MessageListState::new();
        terminal
            .draw(|f| {
                let area = f.area();
                MessageList::new(&mut state, &[], false, 0).render(f, area);
            })
            .unwrap();
        assert!(screen_text(&terminal).contains("Describe your trip"));
    }

    #[test]
    fn test_renders_latest_message_when_overflowing() {
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        let mut state = MessageListState::new();
        let messages: Vec<TranscriptMessage> = (0..10)
            .map(|i| TranscriptMessage::user(format!("trip number {i}")))
            .collect();

        terminal
            .draw(|f| {
                let area = f.area();
                MessageList::new(&mut state, &messages, false, 0).render(f, area);
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("trip number 9"));
        assert!(!text.contains("trip number 0"));
        assert_eq!(state.layout.heights.len(), 10);
    }

    #[test]
    fn test_pending_indicator_shown_while_loading() {
        let mut terminal = Terminal::new(TestBackend::new(40, 8)).unwrap();
        let mut state = MessageListState::new();
        let messages = vec![TranscriptMessage::user("Camping")];

        terminal
            .draw(|f| {
                let area = f.area();
                MessageList::new(&mut state, &messages, true, 0).render(f, area);
            })
            .unwrap();

        assert!(screen_text(&terminal).contains("Packing your bags"));
    }
}
