//! Chat panel controller state.
//!
//! The panel owns the transcript, the in-flight typing placeholders, the
//! input line, and the scroll position. It holds no terminal or network
//! handles, so the submission and placeholder contracts are unit-testable
//! without a running UI.

use std::collections::VecDeque;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::message::Message;
use crate::core::render::{render_content, Rendered};

/// Identifies one submission's typing placeholder.
///
/// The input stays usable while a request is in flight, so several
/// placeholders can be live at once; removal is keyed to the ticket rather
/// than to whichever placeholder was added last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypingTicket(u64);

/// Message plus its display form, rendered once when the message is
/// appended so redraw ticks never re-parse the content.
#[derive(Debug)]
struct PanelMessage {
    message: Message,
    rendered: Rendered,
}

#[derive(Debug)]
enum PanelEntry {
    Message(PanelMessage),
    Typing(TypingTicket),
}

pub struct Panel {
    entries: VecDeque<PanelEntry>,
    input: String,
    next_ticket: u64,
    scroll_offset: u16,
    auto_scroll: bool,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            input: String::new(),
            next_ticket: 0,
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    /// Appends a message and pins the view to the bottom.
    pub fn push_message(&mut self, message: Message) {
        let rendered = render_content(&message.content);
        self.entries
            .push_back(PanelEntry::Message(PanelMessage { message, rendered }));
        self.auto_scroll = true;
    }

    /// Appends a typing placeholder for a new submission and returns its
    /// ticket.
    pub fn begin_typing(&mut self) -> TypingTicket {
        let ticket = TypingTicket(self.next_ticket);
        self.next_ticket += 1;
        self.entries.push_back(PanelEntry::Typing(ticket));
        self.auto_scroll = true;
        ticket
    }

    /// Removes the placeholder belonging to `ticket`. No-op when it was
    /// already removed (e.g. by a panel clear).
    pub fn end_typing(&mut self, ticket: TypingTicket) {
        self.entries
            .retain(|entry| !matches!(entry, PanelEntry::Typing(t) if *t == ticket));
    }

    pub fn typing_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, PanelEntry::Typing(_)))
            .count()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match entry {
            PanelEntry::Message(msg) => Some(&msg.message),
            PanelEntry::Typing(_) => None,
        })
    }

    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    /// Trims the pending input; returns it (and clears the field) when
    /// non-empty. All-whitespace input is rejected and left in the field,
    /// and nothing is rendered or sent for it.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.input.clear();
        Some(text)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace_input(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// New-chat action: drops every transcript entry (placeholders included),
    /// empties the input, and re-pins the view. Outstanding requests keep
    /// running; their tickets no longer match anything when they settle.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.input.clear();
        self.scroll_offset = 0;
        self.auto_scroll = true;
    }

    pub fn scroll_up(&mut self, amount: u16, max_scroll: u16) {
        let current = if self.auto_scroll {
            max_scroll
        } else {
            self.scroll_offset.min(max_scroll)
        };
        self.scroll_offset = current.saturating_sub(amount);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, amount: u16, max_scroll: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount).min(max_scroll);
        if self.scroll_offset >= max_scroll {
            self.auto_scroll = true;
        }
    }

    /// Scroll offset to draw with: bottom-pinned while auto-scroll is on,
    /// otherwise the manual offset clamped to the content.
    pub fn effective_scroll(&self, max_scroll: u16) -> u16 {
        if self.auto_scroll {
            max_scroll
        } else {
            self.scroll_offset.min(max_scroll)
        }
    }

    /// Maximum scroll offset for the given panel width and height. Counts
    /// wrapped display rows, not logical lines, so long lines do not leave
    /// the bottom of the transcript unreachable.
    pub fn max_scroll(&self, width: u16, available_height: u16, dot_phase: usize) -> u16 {
        let lines = self.build_display_lines(dot_phase);
        wrapped_row_count(&lines, width).saturating_sub(available_height)
    }

    /// Renders the transcript to display lines. `dot_phase` (0..3) selects
    /// which typing dot is highlighted this frame.
    pub fn build_display_lines(&self, dot_phase: usize) -> Vec<Line<'_>> {
        let mut lines = Vec::new();

        for entry in &self.entries {
            match entry {
                PanelEntry::Message(msg) => {
                    push_message_lines(&mut lines, msg);
                    lines.push(Line::from(""));
                }
                PanelEntry::Typing(_) => {
                    lines.push(typing_line(dot_phase));
                    lines.push(Line::from(""));
                }
            }
        }

        lines
    }
}

fn push_message_lines<'a>(lines: &mut Vec<Line<'a>>, msg: &'a PanelMessage) {
    let body_style = if msg.message.is_user() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };

    if msg.message.is_user() {
        lines.push(Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
    }

    let body = match &msg.rendered {
        Rendered::Structured(pretty) => pretty.as_str(),
        Rendered::Plain(text) => text.as_str(),
    };
    for line in body.lines() {
        lines.push(Line::from(Span::styled(line, body_style)));
    }
    if body.is_empty() {
        lines.push(Line::from(""));
    }
}

/// Estimates how many terminal rows `lines` occupy at `width`, counting one
/// row per `width` characters of a line. Word wrapping can break a little
/// earlier than the character count suggests, so this is a lower bound, but
/// it tracks wrapped content far closer than the logical line count.
pub fn wrapped_row_count(lines: &[Line], width: u16) -> u16 {
    if width == 0 {
        return lines.len() as u16;
    }
    let mut rows: u16 = 0;
    for line in lines {
        let chars: usize = line
            .spans
            .iter()
            .map(|span| span.content.chars().count())
            .sum();
        let line_rows = if chars == 0 {
            1
        } else {
            chars.div_ceil(width as usize)
        };
        rows = rows.saturating_add(line_rows.min(u16::MAX as usize) as u16);
    }
    rows
}

fn typing_line(dot_phase: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(3);
    for i in 0..3 {
        let style = if i == dot_phase % 3 {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled("• ", style));
    }
    Line::from(spans)
}
