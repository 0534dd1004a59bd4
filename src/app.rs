// App state and main event loop.
// Starts the article load, applies its outcome, and handles keyboard input.

use std::time::Duration;

use crossterm::event::Event;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::Result;
use crate::event::{Action, EventHandler, key_to_action};
use crate::loader::{DataLoader, EventSource};
use crate::state::PostListState;
use crate::tui::Tui;
use crate::ui;

/// Lines moved per reader scroll step.
const SCROLL_STEP: u16 = 10;

/// Main application state.
pub struct App {
    /// Loaded articles, selection, and expansion.
    pub posts: PostListState,
    /// Whether the help overlay is visible.
    pub show_help: bool,
    /// Whether the app should exit.
    pub should_quit: bool,
}

impl App {
    pub fn new(placeholder_avatar: impl Into<String>) -> Self {
        Self {
            posts: PostListState::new(placeholder_avatar),
            show_help: false,
            should_quit: false,
        }
    }

    /// Main event loop. Runs the load sequence once, in the background.
    pub async fn run<S>(&mut self, terminal: &mut Tui, loader: DataLoader<S>) -> Result<()>
    where
        S: EventSource + 'static,
    {
        let (load_tx, mut load_rx) = mpsc::unbounded_channel();
        let load = tokio::spawn(async move {
            let outcome = loader.run().await;
            let _ = load_tx.send(outcome);
        });

        let mut events = EventHandler::new(Duration::from_millis(100));

        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;

            tokio::select! {
                Some(event) = events.next() => self.handle_event(event),
                Some(outcome) = load_rx.recv() => {
                    info!(posts = outcome.summary.posts, "articles ready");
                    self.posts.apply_load(outcome);
                }
                else => break,
            }
        }

        // A pending fetch or retry delay must not outlive the app.
        load.abort();
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if let Some(action) = key_to_action(key) {
                self.handle_action(action);
            }
        }
    }

    /// Apply a user action to the app state.
    pub fn handle_action(&mut self, action: Action) {
        debug!(?action, "action");

        if self.show_help {
            match action {
                Action::Quit => self.should_quit = true,
                Action::ToggleHelp | Action::Back => self.show_help = false,
                _ => {}
            }
            return;
        }

        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp => self.show_help = true,
            Action::SelectNext => self.posts.select_next(),
            Action::SelectPrev => self.posts.select_prev(),
            Action::SelectFirst => self.posts.select_first(),
            Action::SelectLast => self.posts.select_last(),
            Action::ToggleExpand => self.posts.toggle_selected(),
            Action::Back => {
                self.posts.expansion.clear();
                self.posts.reader_scroll = 0;
            }
            Action::ScrollDown => self.posts.scroll_reader_down(SCROLL_STEP),
            Action::ScrollUp => self.posts.scroll_reader_up(SCROLL_STEP),
        }
    }
}
