//! Game sessions: turn order, who controls each side, the computer's reply
//! and the remote half of a relayed game.

use std::time::Duration;

use crate::ai::Agent;
use crate::error::SessionError;
use crate::game::{GameState, MoveRecord, Outcome, Player};
use crate::relay::{MoveChannel, SessionId};

/// Who makes the moves for one side.
pub enum Controller {
    /// A person at this terminal
    Local,
    /// The computer
    Computer(Box<dyn Agent>),
    /// The other participant of a relayed session
    Remote,
}

impl Controller {
    fn label(&self) -> &str {
        match self {
            Controller::Local => "local",
            Controller::Computer(agent) => agent.name(),
            Controller::Remote => "remote",
        }
    }
}

/// Callbacks fired on session transitions. Presentation lives here, not in
/// the session.
pub trait SessionObserver: Send {
    fn on_move(&mut self, _record: MoveRecord, _state: &GameState) {}
    fn on_outcome(&mut self, _outcome: Outcome) {}
    fn on_reset(&mut self) {}
}

/// One game between two controllers. Moves are applied one at a time; a
/// finished game accepts nothing until [`GameSession::reset`].
pub struct GameSession {
    state: GameState,
    first_player: Player,
    red: Controller,
    yellow: Controller,
    channel: Option<Box<dyn MoveChannel>>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl GameSession {
    pub fn new(red: Controller, yellow: Controller, first_player: Player) -> Self {
        GameSession {
            state: GameState::with_first_player(first_player),
            first_player,
            red,
            yellow,
            channel: None,
            observers: Vec::new(),
        }
    }

    /// Two people sharing one terminal
    pub fn local() -> Self {
        Self::new(Controller::Local, Controller::Local, Player::Red)
    }

    /// A person against `agent`, which plays `computer_side`
    pub fn vs_computer(agent: Box<dyn Agent>, computer_side: Player) -> Self {
        let (red, yellow) = match computer_side {
            Player::Red => (Controller::Computer(agent), Controller::Local),
            Player::Yellow => (Controller::Local, Controller::Computer(agent)),
        };
        Self::new(red, yellow, Player::Red)
    }

    /// This participant plays `local_side`; the other side's moves arrive
    /// through `channel`. The host plays Red, the guest Yellow.
    pub fn remote(channel: Box<dyn MoveChannel>, local_side: Player) -> Self {
        let (red, yellow) = match local_side {
            Player::Red => (Controller::Local, Controller::Remote),
            Player::Yellow => (Controller::Remote, Controller::Local),
        };
        let mut session = Self::new(red, yellow, Player::Red);
        session.channel = Some(channel);
        session
    }

    /// Use `first` as the opening side for this and every later game
    pub fn starting_with(mut self, first: Player) -> Self {
        self.first_player = first;
        self.state = GameState::with_first_player(first);
        self
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn outcome(&self) -> Outcome {
        self.state.outcome()
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.channel.as_ref().map(|channel| channel.session_id())
    }

    pub fn controller(&self, side: Player) -> &Controller {
        match side {
            Player::Red => &self.red,
            Player::Yellow => &self.yellow,
        }
    }

    /// Short description of the two controllers, e.g. "local vs Minimax"
    pub fn describe(&self) -> String {
        format!("{} vs {}", self.red.label(), self.yellow.label())
    }

    /// True while the computer owes a move
    pub fn computer_pending(&self) -> bool {
        !self.state.is_terminal()
            && matches!(self.controller(self.state.current_player()), Controller::Computer(_))
    }

    /// Submit a move for the local player whose turn it is. In a relayed
    /// session the column is published before it is committed locally, so a
    /// failed publish leaves the game unchanged.
    pub fn submit_move(&mut self, column: usize) -> Result<MoveRecord, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::GameOver);
        }
        let expected = self.state.current_player();
        if !matches!(self.controller(expected), Controller::Local) {
            return Err(SessionError::NotYourTurn { expected });
        }

        let mut next = self.state;
        let record = next.apply_move_mut(column)?;
        if let Some(channel) = self.channel.as_mut() {
            channel.publish_move(column)?;
        }
        self.commit(next, record);
        Ok(record)
    }

    /// Submit a local move and let the computer answer if it is up next.
    pub fn play(&mut self, column: usize) -> Result<Vec<MoveRecord>, SessionError> {
        let mut records = vec![self.submit_move(column)?];
        while let Some(record) = self.play_computer_turn()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Let the computer move if it is its turn. Returns `None` otherwise.
    pub fn play_computer_turn(&mut self) -> Result<Option<MoveRecord>, SessionError> {
        if !self.computer_pending() {
            return Ok(None);
        }
        let side = self.state.current_player();
        let state = self.state;
        let agent = match side {
            Player::Red => &mut self.red,
            Player::Yellow => &mut self.yellow,
        };
        let Controller::Computer(agent) = agent else {
            return Ok(None);
        };
        let Some(column) = agent.select_action(&state) else {
            return Ok(None);
        };
        log::debug!("{} ({side}) plays column {column}", agent.name());

        let mut next = self.state;
        let record = next.apply_move_mut(column)?;
        self.commit(next, record);
        Ok(Some(record))
    }

    /// Apply a column received from the relay. Anything that does not fit
    /// the local game is a desync and leaves the state untouched.
    pub fn apply_remote_move(&mut self, column: usize) -> Result<MoveRecord, SessionError> {
        let desync = |reason: String| {
            log::warn!("remote move {column} rejected: {reason}");
            SessionError::Desync { column, reason }
        };

        if self.state.is_terminal() {
            return Err(desync("game is already over".to_string()));
        }
        let expected = self.state.current_player();
        if !matches!(self.controller(expected), Controller::Remote) {
            return Err(desync(format!("it is the local {expected} player's turn")));
        }

        let mut next = self.state;
        let record = next
            .apply_move_mut(column)
            .map_err(|e| desync(e.to_string()))?;
        self.commit(next, record);
        Ok(record)
    }

    /// Apply every column the relay has delivered so far.
    pub fn receive_remote_moves(&mut self) -> Result<Vec<MoveRecord>, SessionError> {
        let mut records = Vec::new();
        while let Some(column) = self.next_remote_column(None)? {
            records.push(self.apply_remote_move(column)?);
        }
        Ok(records)
    }

    /// Wait up to `timeout` for one remote move and apply it.
    pub fn wait_for_remote_move(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<MoveRecord>, SessionError> {
        match self.next_remote_column(Some(timeout))? {
            Some(column) => Ok(Some(self.apply_remote_move(column)?)),
            None => Ok(None),
        }
    }

    /// Start a fresh game with the same controllers. Only this participant's
    /// board is reset.
    pub fn reset(&mut self) {
        self.state = GameState::with_first_player(self.first_player);
        log::info!("new game: {}", self.describe());
        for observer in &mut self.observers {
            observer.on_reset();
        }
    }

    fn next_remote_column(&mut self, timeout: Option<Duration>) -> Result<Option<usize>, SessionError> {
        let Some(channel) = self.channel.as_mut() else {
            return Ok(None);
        };
        let column = match timeout {
            Some(timeout) => channel.recv_move_timeout(timeout)?,
            None => channel.try_recv_move()?,
        };
        Ok(column)
    }

    fn commit(&mut self, next: GameState, record: MoveRecord) {
        self.state = next;
        log::debug!(
            "{} dropped in column {} (row {})",
            record.player,
            record.column,
            record.row
        );
        for observer in &mut self.observers {
            observer.on_move(record, &self.state);
        }

        let outcome = self.state.outcome();
        if outcome != Outcome::InProgress {
            match outcome {
                Outcome::Won(player) => log::info!("{player} wins"),
                _ => log::info!("game drawn"),
            }
            for observer in &mut self.observers {
                observer.on_outcome(outcome);
            }
        }
    }
}
