use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, PackingListView, TitleBar};
use crate::tui::{Pane, TuiState};

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Below this width the checklist is stacked under the transcript.
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 80;

fn body_direction(area: Rect) -> Direction {
    if area.width >= SIDE_BY_SIDE_MIN_WIDTH {
        Direction::Horizontal
    } else {
        Direction::Vertical
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min, Percentage};

    let input_height = tui.input_box.calculate_height(frame.area().width);
    let layout = Layout::vertical([Length(1), Min(0), Length(input_height)]);
    let [title_area, body_area, input_area] = layout.areas(frame.area());

    let body = Layout::default()
        .direction(body_direction(body_area))
        .constraints([Percentage(55), Percentage(45)]);
    let [transcript_area, checklist_area] = body.areas(body_area);

    TitleBar::new(
        app.model_name.clone(),
        app.status_message.clone(),
        app.gate.label().to_string(),
        app.is_loading(),
    )
    .render(frame, title_area);

    MessageList::new(
        &mut tui.message_list,
        &app.messages,
        app.is_loading(),
        spinner_frame,
    )
    .render(frame, transcript_area);

    PackingListView::new(
        &mut tui.packing_list,
        app.packing_list.as_ref(),
        tui.focus == Pane::Checklist,
    )
    .render(frame, checklist_area);

    tui.input_box.render(frame, input_area);
}
