//! Frame rendering: message panel above, input line below.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::panel::{wrapped_row_count, Panel};

/// Height of the bordered input area.
pub const INPUT_AREA_HEIGHT: u16 = 3;

/// Lines consumed by the panel title.
pub const PANEL_CHROME_HEIGHT: u16 = 1;

pub fn ui(f: &mut Frame, panel: &Panel, dot_phase: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_AREA_HEIGHT)])
        .split(f.area());

    let lines = panel.build_display_lines(dot_phase);
    let available_height = chunks[0].height.saturating_sub(PANEL_CHROME_HEIGHT);
    let max_scroll = wrapped_row_count(&lines, chunks[0].width).saturating_sub(available_height);
    let scroll = panel.effective_scroll(max_scroll);

    // trim: false keeps the indentation of structured dumps and the exact
    // whitespace of verbatim text.
    let messages = Paragraph::new(lines)
        .block(Block::default().title("opschat"))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    f.render_widget(messages, chunks[0]);

    let input = Paragraph::new(panel.input())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Type your message (Enter to send, Ctrl+N for new chat, Ctrl+C to quit)"),
        );
    f.render_widget(input, chunks[1]);

    f.set_cursor_position((
        input_cursor_x(panel.input(), chunks[1].x, chunks[1].width),
        chunks[1].y + 1,
    ));
}

/// Cursor column for the input box: one past the typed text, clamped so it
/// never crosses the right border however long the input grows.
fn input_cursor_x(input: &str, area_x: u16, area_width: u16) -> u16 {
    let inner_width = area_width.saturating_sub(2);
    let column = (input.chars().count() as u16).saturating_add(1);
    area_x + column.min(inner_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_follows_short_input() {
        assert_eq!(input_cursor_x("", 0, 20), 1);
        assert_eq!(input_cursor_x("abc", 0, 20), 4);
        assert_eq!(input_cursor_x("abc", 5, 20), 9);
    }

    #[test]
    fn cursor_is_clamped_to_the_input_box() {
        let long = "x".repeat(100);
        // width 20 leaves 18 inner columns.
        assert_eq!(input_cursor_x(&long, 0, 20), 18);
        assert_eq!(input_cursor_x(&long, 3, 20), 21);
        // Degenerate widths never underflow.
        assert_eq!(input_cursor_x(&long, 0, 1), 0);
    }
}
