//! # PackingListView Component
//!
//! Renders the most recent packing list as a checklist: one titled group per
//! category with a `[ ]` row per item. A placeholder panel is shown until the
//! first list arrives. Rendering is a pure function of the list; only the
//! scroll offset lives in `PackingListState`.

use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::packing::PackingList;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const PLACEHOLDER: &str = "Your packing list will appear here.";

#[derive(Default)]
pub struct PackingListState {
    pub scroll_state: ScrollViewState,
}

impl PackingListState {
    /// Jump back to the top, used when a new list replaces the old one.
    pub fn reset(&mut self) {
        self.scroll_state.scroll_to_top();
    }
}

impl EventHandler for PackingListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            _ => {}
        }
        None
    }
}

pub struct PackingListView<'a> {
    pub state: &'a mut PackingListState,
    pub list: Option<&'a PackingList>,
    pub focused: bool,
}

/// Checklist lines for one list, without any framing.
pub fn checklist_lines(list: &PackingList) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    for (i, category) in list.categories.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(category.name.clone(), heading)));
        for item in &category.items {
            lines.push(Line::from(vec![
                Span::styled("  [ ] ", Style::default().fg(Color::DarkGray)),
                Span::raw(item.clone()),
            ]));
        }
    }
    lines
}

impl<'a> PackingListView<'a> {
    pub fn new(state: &'a mut PackingListState, list: Option<&'a PackingList>, focused: bool) -> Self {
        Self {
            state,
            list,
            focused,
        }
    }

    fn block(&self) -> Block<'static> {
        let title = match self.list {
            Some(list) => format!("Packing list ({} items)", list.item_count()),
            None => "Packing list".to_string(),
        };
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title)
    }
}

impl<'a> Component for PackingListView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = self.block();
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(list) = self.list else {
            let placeholder = Paragraph::new(PLACEHOLDER)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true });
            frame.render_widget(placeholder, inner);
            return;
        };

        let lines = checklist_lines(list);
        // -1 column for the scrollbar
        let content_width = inner.width.saturating_sub(1);
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        let height = u16::try_from(paragraph.line_count(content_width))
            .unwrap_or(u16::MAX)
            .max(1);

        let mut scroll_view = ScrollView::new(Size::new(content_width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(paragraph, Rect::new(0, 0, content_width, height));

        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::packing::Category;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn sample() -> PackingList {
        PackingList {
            categories: vec![
                Category {
                    name: "Clothing".into(),
                    items: vec!["Jacket".into(), "Socks".into()],
                },
                Category {
                    name: "Toiletries".into(),
                    items: vec!["Toothbrush".into()],
                },
            ],
        }
    }

    fn render(list: Option<&PackingList>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut state = PackingListState::default();
        terminal
            .draw(|f| {
                let area = f.area();
                PackingListView::new(&mut state, list, false).render(f, area);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_placeholder_when_absent() {
        let text = render(None, 50, 6);
        assert!(text.contains("Packing list"));
        assert!(text.contains("Your packing list will appear here."));
    }

    #[test]
    fn test_renders_categories_and_items() {
        let list = sample();
        let text = render(Some(&list), 50, 12);

        assert!(text.contains("Packing list (3 items)"));
        assert!(text.contains("Clothing"));
        assert!(text.contains("[ ] Jacket"));
        assert!(text.contains("[ ] Socks"));
        assert!(text.contains("Toiletries"));
        assert!(text.contains("[ ] Toothbrush"));
        assert!(!text.contains("appear here"));
    }

    #[test]
    fn test_checklist_lines_layout() {
        let lines = checklist_lines(&sample());
        let rendered: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "Clothing",
                "  [ ] Jacket",
                "  [ ] Socks",
                "",
                "Toiletries",
                "  [ ] Toothbrush",
            ]
        );
    }

    #[test]
    fn test_empty_category_renders_heading_only() {
        let list = PackingList {
            categories: vec![Category {
                name: "Documents".into(),
                items: vec![],
            }],
        };
        assert_eq!(checklist_lines(&list).len(), 1);
    }

    #[test]
    fn test_scroll_events_move_offset() {
        let mut state = PackingListState::default();
        state.handle_event(&TuiEvent::ScrollDown);
        assert_eq!(state.scroll_state.offset().y, 1);
        state.reset();
        assert_eq!(state.scroll_state.offset().y, 0);
    }
}
