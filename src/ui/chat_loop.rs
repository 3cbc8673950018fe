//! Main chat event loop.
//!
//! Drives the terminal: renders the panel, handles key and mouse input, and
//! dispatches one request task per submission. Each submission gets its own
//! typing ticket; the task reports back over an mpsc channel and the outcome
//! is applied on the UI loop, so the transcript is only ever mutated here.

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::api::{ChatClient, ChatError};
use crate::core::message::{Message, ERROR_REPLY_TEXT};
use crate::core::panel::{Panel, TypingTicket};
use crate::logging::TranscriptLog;
use crate::ui::renderer::{ui, INPUT_AREA_HEIGHT, PANEL_CHROME_HEIGHT};

/// Result of one settled chat request, keyed to the submission's ticket.
struct ChatOutcome {
    ticket: TypingTicket,
    result: Result<Option<Message>, ChatError>,
}

/// Applies the submit contract up to the network call: reject empty input,
/// render the user message, add the typing placeholder, clear the field.
/// Returns the text to send and the placeholder ticket.
fn begin_submission(panel: &mut Panel, transcript: &TranscriptLog) -> Option<(String, TypingTicket)> {
    let text = panel.take_submission()?;
    let message = Message::user(&text);
    if let Err(e) = transcript.log_message(&message) {
        warn!("transcript log write failed: {e}");
    }
    panel.push_message(message);
    let ticket = panel.begin_typing();
    Some((text, ticket))
}

/// Applies a settled request to the panel. The typing placeholder is always
/// released first, whichever way the request went; the input is then cleared
/// unconditionally, matching the submit contract.
fn handle_outcome(panel: &mut Panel, transcript: &TranscriptLog, outcome: ChatOutcome) {
    panel.end_typing(outcome.ticket);

    match outcome.result {
        Ok(Some(message)) => {
            if let Err(e) = transcript.log_message(&message) {
                warn!("transcript log write failed: {e}");
            }
            panel.push_message(message);
        }
        Ok(None) => {
            warn!("chat reply missing role or content; dropped");
        }
        Err(err) => {
            error!("chat request failed: {err}");
            let message = Message::assistant(ERROR_REPLY_TEXT);
            if let Err(e) = transcript.log_message(&message) {
                warn!("transcript log write failed: {e}");
            }
            panel.push_message(message);
        }
    }

    panel.clear_input();
}

pub async fn run_chat_loop(
    client: ChatClient,
    transcript: TranscriptLog,
) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut panel = Panel::new();
    let (tx, mut rx) = mpsc::unbounded_channel::<ChatOutcome>();
    let started = Instant::now();

    let result = loop {
        let dot_phase = (started.elapsed().as_millis() / 250) as usize % 3;
        terminal.draw(|f| ui(f, &panel, dot_phase))?;

        let (panel_width, available_height) = terminal
            .size()
            .map(|size| {
                (
                    size.width,
                    size.height
                        .saturating_sub(INPUT_AREA_HEIGHT)
                        .saturating_sub(PANEL_CHROME_HEIGHT),
                )
            })
            .unwrap_or((0, 0));

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break Ok(());
                    }
                    KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        panel.clear();
                    }
                    KeyCode::Enter => {
                        if let Some((text, ticket)) = begin_submission(&mut panel, &transcript) {
                            debug!("submitting message to {}", client.endpoint());
                            let client = client.clone();
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                let result = client.send(&text).await;
                                let _ = tx.send(ChatOutcome { ticket, result });
                            });
                        }
                    }
                    KeyCode::Char(c) => {
                        panel.push_input_char(c);
                    }
                    KeyCode::Backspace => {
                        panel.backspace_input();
                    }
                    KeyCode::Up => {
                        let max_scroll = panel.max_scroll(panel_width, available_height, dot_phase);
                        panel.scroll_up(1, max_scroll);
                    }
                    KeyCode::Down => {
                        let max_scroll = panel.max_scroll(panel_width, available_height, dot_phase);
                        panel.scroll_down(1, max_scroll);
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        let max_scroll = panel.max_scroll(panel_width, available_height, dot_phase);
                        panel.scroll_up(3, max_scroll);
                    }
                    MouseEventKind::ScrollDown => {
                        let max_scroll = panel.max_scroll(panel_width, available_height, dot_phase);
                        panel.scroll_down(3, max_scroll);
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Settled requests apply in arrival order, which may interleave
        // across concurrent submissions.
        while let Ok(outcome) = rx.try_recv() {
            handle_outcome(&mut panel, &transcript, outcome);
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::decode_reply;
    use crate::core::message::ROLE_ASSISTANT;

    fn quiet_log() -> TranscriptLog {
        TranscriptLog::new(None).unwrap()
    }

    fn type_text(panel: &mut Panel, text: &str) {
        for c in text.chars() {
            panel.push_input_char(c);
        }
    }

    #[test]
    fn submission_renders_user_message_before_request() {
        let mut panel = Panel::new();
        type_text(&mut panel, "  hello  ");

        let (text, _ticket) = begin_submission(&mut panel, &quiet_log()).unwrap();
        assert_eq!(text, "hello");
        let rendered: Vec<_> = panel.messages().collect();
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].is_user());
        assert_eq!(rendered[0].content, "hello");
        assert_eq!(panel.typing_count(), 1);
        assert_eq!(panel.input(), "");
    }

    #[test]
    fn empty_submission_does_nothing() {
        let mut panel = Panel::new();
        type_text(&mut panel, "   ");
        assert!(begin_submission(&mut panel, &quiet_log()).is_none());
        assert_eq!(panel.message_count(), 0);
        assert_eq!(panel.typing_count(), 0);
    }

    #[test]
    fn failed_request_renders_fixed_error_message() {
        let mut panel = Panel::new();
        type_text(&mut panel, "hello");
        let (_, ticket) = begin_submission(&mut panel, &quiet_log()).unwrap();

        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket,
                result: Err(ChatError::Http(reqwest::StatusCode::BAD_GATEWAY)),
            },
        );

        assert_eq!(panel.typing_count(), 0);
        let rendered: Vec<_> = panel.messages().collect();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1].role, ROLE_ASSISTANT);
        assert_eq!(rendered[1].content, ERROR_REPLY_TEXT);
    }

    #[test]
    fn malformed_success_reply_renders_nothing() {
        let mut panel = Panel::new();
        type_text(&mut panel, "hello");
        let (_, ticket) = begin_submission(&mut panel, &quiet_log()).unwrap();

        let decoded = decode_reply(r#"{"content":"orphan"}"#).unwrap();
        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket,
                result: Ok(decoded),
            },
        );

        assert_eq!(panel.typing_count(), 0);
        assert_eq!(panel.message_count(), 1);
    }

    #[test]
    fn input_typed_during_flight_is_cleared_when_request_settles() {
        let mut panel = Panel::new();
        type_text(&mut panel, "hello");
        let (_, ticket) = begin_submission(&mut panel, &quiet_log()).unwrap();
        type_text(&mut panel, "draft");

        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket,
                result: Ok(Some(Message::assistant("ok"))),
            },
        );
        assert_eq!(panel.input(), "");
    }

    #[test]
    fn successful_round_trip_leaves_two_messages_and_no_placeholder() {
        let mut panel = Panel::new();
        type_text(&mut panel, "hello");
        let (_, ticket) = begin_submission(&mut panel, &quiet_log()).unwrap();

        // Server replies 200 with an assistant message.
        let decoded = decode_reply(r#"{"role":"assistant","content":"hi there"}"#).unwrap();
        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket,
                result: Ok(decoded),
            },
        );

        let rendered: Vec<_> = panel.messages().collect();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].content, "hello");
        assert_eq!(rendered[1].content, "hi there");
        assert_eq!(panel.typing_count(), 0);
    }

    #[test]
    fn interleaved_outcomes_resolve_their_own_placeholders() {
        let mut panel = Panel::new();

        type_text(&mut panel, "first");
        let (_, first) = begin_submission(&mut panel, &quiet_log()).unwrap();
        type_text(&mut panel, "second");
        let (_, second) = begin_submission(&mut panel, &quiet_log()).unwrap();
        assert_eq!(panel.typing_count(), 2);

        // Second submission settles before the first.
        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket: second,
                result: Ok(Some(Message::assistant("reply two"))),
            },
        );
        assert_eq!(panel.typing_count(), 1);

        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket: first,
                result: Ok(Some(Message::assistant("reply one"))),
            },
        );
        assert_eq!(panel.typing_count(), 0);

        // Replies rendered in arrival order.
        let contents: Vec<_> = panel.messages().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["first", "second", "reply two", "reply one"]
        );
    }

    #[test]
    fn outcome_for_a_cleared_panel_is_harmless() {
        let mut panel = Panel::new();
        type_text(&mut panel, "hello");
        let (_, ticket) = begin_submission(&mut panel, &quiet_log()).unwrap();

        panel.clear();
        handle_outcome(
            &mut panel,
            &quiet_log(),
            ChatOutcome {
                ticket,
                result: Ok(Some(Message::assistant("late"))),
            },
        );

        // The late reply still renders; the stale ticket removal is a no-op.
        assert_eq!(panel.typing_count(), 0);
        assert_eq!(panel.message_count(), 1);
    }
}
