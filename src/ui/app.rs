use crate::error::SessionError;
use crate::game::{GameState, MoveRecord, Outcome, COLS};
use crate::session::{Controller, GameSession, SessionObserver};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use std::io;
use std::sync::mpsc;

use super::game_view::{self, ViewModel};

/// Turns session transitions into status-line messages.
struct StatusObserver {
    tx: mpsc::Sender<String>,
}

impl SessionObserver for StatusObserver {
    fn on_move(&mut self, record: MoveRecord, _state: &GameState) {
        let _ = self
            .tx
            .send(format!("{} played column {}", record.player, record.column + 1));
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        let text = match outcome {
            Outcome::Won(player) => format!("{player} wins! Press 'r' to play again."),
            Outcome::Draw => "It's a draw! Press 'r' to play again.".to_string(),
            Outcome::InProgress => return,
        };
        let _ = self.tx.send(text);
    }

    fn on_reset(&mut self) {
        let _ = self.tx.send("New game started!".to_string());
    }
}

pub struct App {
    session: GameSession,
    mode: String,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
    status_rx: mpsc::Receiver<String>,
}

impl App {
    pub fn new(mut session: GameSession, mode: impl Into<String>) -> Self {
        let (tx, status_rx) = mpsc::channel();
        session.add_observer(Box::new(StatusObserver { tx }));
        let message = session
            .session_id()
            .map(|id| format!("Share this game ID with your friend: {id}"));
        App {
            session,
            mode: mode.into(),
            selected_column: COLS / 2,
            should_quit: false,
            message,
            status_rx,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            self.drain_status();
            terminal
                .draw(|f| self.render(f))
                .map_err(Into::<io::Error>::into)?;

            if self.should_quit {
                break;
            }

            // The board is drawn with the human move before the computer thinks.
            if self.session.computer_pending() {
                self.run_step(|session| session.play_computer_turn().map(|_| ()));
                continue;
            }
            self.run_step(|session| session.receive_remote_moves().map(|_| ()));

            self.handle_events()?;
        }
        Ok(())
    }

    fn run_step(&mut self, step: impl FnOnce(&mut GameSession) -> Result<(), SessionError>) {
        if let Err(e) = step(&mut self.session) {
            self.message = Some(e.to_string());
        }
    }

    fn drain_status(&mut self) {
        while let Ok(text) = self.status_rx.try_recv() {
            self.message = Some(text);
        }
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Char(c @ '1'..='7') => {
                self.selected_column = c as usize - '1' as usize;
                self.drop_piece();
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                self.session.reset();
                self.selected_column = COLS / 2;
            }
            _ => {}
        }
    }

    /// Drop piece in selected column
    fn drop_piece(&mut self) {
        if let Err(e) = self.session.submit_move(self.selected_column) {
            self.message = Some(match e {
                SessionError::NotYourTurn { .. }
                    if matches!(
                        self.session.controller(self.session.state().current_player()),
                        Controller::Remote
                    ) =>
                {
                    "Waiting for the other player...".to_string()
                }
                other => other.to_string(),
            });
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let view = ViewModel {
            selected_column: self.selected_column,
            message: self.message.as_deref(),
            mode: &self.mode,
            session_id: self.session.session_id().map(|id| id.as_str()),
        };
        game_view::render(frame, self.session.state(), &view);
    }
}
