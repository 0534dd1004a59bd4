// Terminal input handling.
// Forwards crossterm events from a background task and maps keys to actions.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

/// Something the user asked the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    ToggleExpand,
    /// Close help if open, otherwise collapse the expanded article.
    Back,
    ScrollDown,
    ScrollUp,
    ToggleHelp,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _task: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // Polling blocks, so it runs off the async workers. The loop ends
        // once the receiver is dropped.
        let task = tokio::task::spawn_blocking(move || {
            loop {
                match event::poll(tick_rate) {
                    Ok(true) => match event::read() {
                        Ok(evt) => {
                            if tx.send(evt).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    },
                    Ok(false) => {
                        if tx.is_closed() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        EventHandler { rx, _task: task }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Map a key press to an action.
pub fn key_to_action(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (_, KeyCode::Char('q')) => Some(Action::Quit),
        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => Some(Action::SelectNext),
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => Some(Action::SelectPrev),
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => Some(Action::SelectFirst),
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => Some(Action::SelectLast),
        (_, KeyCode::Enter) | (_, KeyCode::Char(' ')) => Some(Action::ToggleExpand),
        (_, KeyCode::Esc) => Some(Action::Back),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) | (_, KeyCode::PageDown) => {
            Some(Action::ScrollDown)
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) | (_, KeyCode::PageUp) => {
            Some(Action::ScrollUp)
        }
        (_, KeyCode::Char('?')) => Some(Action::ToggleHelp),
        _ => None,
    }
}
