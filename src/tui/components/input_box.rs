//! # InputBox Component
//!
//! Multi-line trip description editor.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, Ctrl+J newlines)
//! - Cursor movement within the buffer
//! - Emit `Submit` on Enter without clearing; the parent clears the box
//!   once the request resolves (`Effect::ClearInput`)
//! - Lock editing while a request is in flight
//!
//! The buffer is internal state. `locked` is a prop refreshed from
//! `App::is_loading()` before every frame.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
const VERTICAL_OVERHEAD: u16 = 2;
/// Content lines shown before the box scrolls internally
const MAX_VISIBLE_LINES: u16 = 5;

const TITLE: &str = "Describe your trip (Enter to send, Ctrl+J for newline)";
const LOCKED_TITLE: &str = "Waiting for your packing list...";

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed on a non-blank buffer
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary
    cursor: usize,
    /// First visible wrapped line
    scroll_offset: u16,
    /// Editing is disabled while a request is pending
    pub locked: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap_lines(text: &str, inner_width: u16) -> Vec<String> {
    if inner_width == 0 {
        return vec![String::new()];
    }
    let options = textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    let mut lines: Vec<String> = textwrap::wrap(text, options)
        .into_iter()
        .map(|l| l.into_owned())
        .collect();
    // textwrap drops the empty line after a trailing newline
    if text.ends_with('\n') && lines.last().is_none_or(|l| !l.is_empty()) {
        lines.push(String::new());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            locked: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Empty the buffer after the submitted text has been recorded.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    /// Height needed for the current buffer, clamped to
    /// `[1, MAX_VISIBLE_LINES]` content lines plus borders.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD);
        let lines = u16::try_from(wrap_lines(&self.buffer, inner).len()).unwrap_or(u16::MAX);
        lines.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Wrapped (line, column) of the cursor.
    ///
    /// The column is counted on the raw prefix, since wrapped lines have
    /// their trailing whitespace stripped.
    fn cursor_line_col(&self, inner_width: u16) -> (u16, u16) {
        let prefix = &self.buffer[..self.cursor];
        let before = wrap_lines(prefix, inner_width);
        let line = u16::try_from(before.len().saturating_sub(1)).unwrap_or(u16::MAX);

        // Byte offset where the last wrapped line starts in `prefix`
        let mut search_from = 0;
        let mut last_start = 0;
        for wrapped in &before {
            if let Some(found) = prefix[search_from..].find(wrapped.as_str()) {
                last_start = search_from + found;
                search_from = last_start + wrapped.len();
            }
        }
        // A wrapped line never spans a hard newline
        let hard_line_start = prefix.rfind('\n').map_or(0, |i| i + 1);
        let start = last_start.max(hard_line_start);

        let col = prefix[start..].chars().count().min(u16::MAX as usize) as u16;
        (line, col.min(inner_width.saturating_sub(1)))
    }

    fn line_start(&self) -> usize {
        self.buffer[..self.cursor]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn line_end(&self) -> usize {
        self.buffer[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.buffer.len())
    }

    /// Move to the same column on the previous (`up`) or next logical line.
    fn move_vertically(&mut self, up: bool) -> bool {
        let start = self.line_start();
        let column = self.buffer[start..self.cursor].chars().count();

        let target_start = if up {
            if start == 0 {
                return false;
            }
            self.buffer[..start - 1]
                .rfind('\n')
                .map(|i| i + 1)
                .unwrap_or(0)
        } else {
            let end = self.line_end();
            if end == self.buffer.len() {
                return false;
            }
            end + 1
        };

        let target_line = self.buffer[target_start..]
            .split('\n')
            .next()
            .unwrap_or_default();
        let offset = target_line
            .char_indices()
            .nth(column)
            .map(|(i, _)| i)
            .unwrap_or(target_line.len());
        self.cursor = target_start + offset;
        true
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD).max(1);
        let lines = wrap_lines(&self.buffer, inner_width);
        let (cursor_line, cursor_col) = self.cursor_line_col(inner_width);

        // Keep the cursor line inside the viewport
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + visible {
            self.scroll_offset = cursor_line + 1 - visible;
        }

        let (title, style) = if self.locked {
            (LOCKED_TITLE, Style::default().fg(Color::DarkGray))
        } else {
            (TITLE, Style::default().fg(Color::Green))
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .padding(Padding::horizontal(1))
            .title(title);

        let text = Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>());
        let input = Paragraph::new(text)
            .block(block)
            .style(style)
            .scroll((self.scroll_offset, 0));

        frame.render_widget(input, area);

        if !self.locked {
            frame.set_cursor_position((
                area.x + 2 + cursor_col,
                area.y + 1 + cursor_line - self.scroll_offset,
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.locked {
            return None;
        }

        let changed = match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                true
            }
            TuiEvent::Paste(text) => {
                // Terminals send CR line endings inside bracketed paste
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.buffer.insert_str(self.cursor, &text);
                self.cursor += text.len();
                true
            }
            TuiEvent::Backspace if self.cursor > 0 => {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            TuiEvent::Delete if self.cursor < self.buffer.len() => {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                true
            }
            TuiEvent::CursorLeft if self.cursor > 0 => {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                true
            }
            TuiEvent::CursorRight if self.cursor < self.buffer.len() => {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                true
            }
            TuiEvent::CursorHome => {
                let start = self.line_start();
                std::mem::replace(&mut self.cursor, start) != start
            }
            TuiEvent::CursorEnd => {
                let end = self.line_end();
                std::mem::replace(&mut self.cursor, end) != end
            }
            TuiEvent::CursorUp => self.move_vertically(true),
            TuiEvent::CursorDown => self.move_vertically(false),
            TuiEvent::Submit => {
                return (!self.buffer.trim().is_empty())
                    .then(|| InputEvent::Submit(self.buffer.clone()));
            }
            _ => false,
        };

        changed.then_some(InputEvent::ContentChanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
        input
    }

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
    fn test_handle_input() {
        let mut input = InputBox::new();

        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        input.handle_event(&TuiEvent::InputChar('é'));
        assert_eq!(input.text(), "aé");

        assert_eq!(
            input.handle_event(&TuiEvent::Backspace),
            Some(InputEvent::ContentChanged)
        );
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn test_submit_keeps_text_until_cleared() {
        let mut input = typed("Weekend in Lisbon");

        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("Weekend in Lisbon".to_string()))
        );
        assert_eq!(input.text(), "Weekend in Lisbon");

        input.clear();
        assert_eq!(input.text(), "");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut input = typed("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
    }

    #[test]
    fn test_locked_ignores_edits_and_submit() {
        let mut input = typed("Camping");
        input.locked = true;

        assert_eq!(input.handle_event(&TuiEvent::InputChar('!')), None);
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.text(), "Camping");
    }

    #[test]
    fn test_insert_in_middle() {
        let mut input = typed("ac");
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.text(), "abc");

        input.handle_event(&TuiEvent::CursorHome);
        input.handle_event(&TuiEvent::Delete);
        assert_eq!(input.text(), "bc");
    }

    #[test]
    fn test_home_end_are_line_local() {
        let mut input = typed("first\nsecond");
        assert_eq!(input.handle_event(&TuiEvent::CursorEnd), None);

        input.handle_event(&TuiEvent::CursorHome);
        assert_eq!(input.cursor, "first\n".len());
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut input = typed("abcdef\nxy");
        // cursor at end of "xy" (column 2)
        assert_eq!(
            input.handle_event(&TuiEvent::CursorUp),
            Some(InputEvent::ContentChanged)
        );
        assert_eq!(input.cursor, 2);
        assert_eq!(input.handle_event(&TuiEvent::CursorUp), None);

        input.handle_event(&TuiEvent::CursorEnd);
        input.handle_event(&TuiEvent::CursorDown);
        assert_eq!(input.cursor, input.text().len());
    }

    #[test]
    fn test_cursor_column_counts_trailing_space() {
        let input = typed("hello ");
        assert_eq!(input.cursor_line_col(40), (0, 6));
    }

    #[test]
    fn test_cursor_column_after_wrap_and_newline() {
        // inner width 8: "packing " | "list "
        let input = typed("packing list ");
        assert_eq!(input.cursor_line_col(8), (1, 5));

        let input = typed("socks\n");
        assert_eq!(input.cursor_line_col(40), (1, 0));

        let input = typed("socks\nhat ");
        assert_eq!(input.cursor_line_col(40), (1, 4));
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("a\r\nb\rc".to_string()));
        assert_eq!(input.text(), "a\nb\nc");
        assert_eq!(input.cursor, input.text().len());
    }

    #[test]
    fn test_calculate_height_clamps() {
        assert_eq!(InputBox::new().calculate_height(40), 1 + VERTICAL_OVERHEAD);

        let two = typed("one\ntwo");
        assert_eq!(two.calculate_height(40), 2 + VERTICAL_OVERHEAD);

        let many = typed("1\n2\n3\n4\n5\n6\n7\n8");
        assert_eq!(many.calculate_height(40), MAX_VISIBLE_LINES + VERTICAL_OVERHEAD);
    }

    #[test]
    fn test_render_shows_title_and_text() {
        let mut terminal = Terminal::new(TestBackend::new(70, 3)).unwrap();
        let mut input = typed("Ski trip");

        terminal
            .draw(|f| {
                input.render(f, f.area());
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Describe your trip"));
        assert!(text.contains("Ski trip"));
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let mut terminal = Terminal::new(TestBackend::new(40, 4)).unwrap();
        let mut input = typed("line1\nline2\nline3\nline4");

        terminal
            .draw(|f| {
                input.render(f, f.area());
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("line4"));
        assert!(!text.contains("line1"));
    }

    #[test]
    fn test_render_locked_title() {
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        let mut input = typed("Ski trip");
        input.locked = true;

        terminal
            .draw(|f| {
                input.render(f, f.area());
            })
            .unwrap();

        assert!(screen_text(&terminal).contains("Waiting for your packing list"));
    }
}
