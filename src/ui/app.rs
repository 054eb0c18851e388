use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};

use crate::ai::{Decision, TableAgent};
use crate::game::{stones_for_action, GameState, MoveError, Player, NUM_ACTIONS};

/// Seat taken by the human. The human always moves first.
pub const HUMAN: Player = Player::Agent;
/// Seat taken by the table-driven AI.
pub const AI: Player = Player::Opponent;

/// One move as shown in the move log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRecord {
    pub player: Player,
    pub taken: u32,
    pub remaining: u32,
}

/// Games won by each side since the app started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub human: u32,
    pub ai: u32,
}

/// The AI's last choice together with the pile it was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiMove {
    pub stones_before: u32,
    pub decision: Decision,
}

pub struct App {
    game_state: GameState,
    initial_stones: u32,
    ai: TableAgent,
    ai_delay: Duration,
    ai_waiting_since: Option<Instant>,
    moves: Vec<MoveRecord>,
    last_ai_move: Option<AiMove>,
    score: Score,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    pub fn new(ai: TableAgent, initial_stones: u32, ai_delay: Duration) -> Self {
        App {
            game_state: GameState::with_stones(initial_stones),
            initial_stones,
            ai,
            ai_delay,
            ai_waiting_since: None,
            moves: Vec::new(),
            last_ai_move: None,
            score: Score::default(),
            should_quit: false,
            message: Some("Your move: take 1, 2 or 3 stones.".to_string()),
        }
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn initial_stones(&self) -> u32 {
        self.initial_stones
    }

    pub fn ai(&self) -> &TableAgent {
        &self.ai
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    pub fn last_ai_move(&self) -> Option<AiMove> {
        self.last_ai_move
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// True while the AI is due to move.
    pub fn ai_thinking(&self) -> bool {
        !self.game_state.is_terminal() && self.game_state.current_player() == AI
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal
                .draw(|f| self.render(f))
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.tick(Instant::now());
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.restart();
            }
            KeyCode::Char(c @ '1'..='3') => {
                let action = c as usize - '1' as usize;
                self.human_move(action);
            }
            _ => {}
        }
    }

    /// Start a new game with the same pile size. The score is kept.
    pub fn restart(&mut self) {
        self.game_state = GameState::with_stones(self.initial_stones);
        self.ai_waiting_since = None;
        self.moves.clear();
        self.last_ai_move = None;
        self.message = Some("New game started! Your move.".to_string());
    }

    /// Apply the human's action. Illegal choices are reported and leave the game unchanged.
    pub fn human_move(&mut self, action: usize) {
        if self.game_state.is_terminal() {
            self.message = Some("Game over! Press 'r' to restart.".to_string());
            return;
        }
        if action >= NUM_ACTIONS {
            return;
        }

        let taken = stones_for_action(action);
        match self.game_state.take(HUMAN, taken) {
            Ok(()) => {
                self.record(HUMAN, taken);
                self.message = None;
                self.after_move();
            }
            Err(MoveError::OutOfTurn { .. }) => {
                self.message = Some("Wait for the AI to move.".to_string());
            }
            Err(MoveError::InvalidTake { remaining, .. }) => {
                self.message = Some(format!(
                    "Can't take {}: only {} left.",
                    taken, remaining
                ));
            }
            Err(MoveError::GameOver) => {
                self.message = Some("Game is over!".to_string());
            }
        }
    }

    /// Let the AI move once its delay has elapsed since it became its turn.
    pub fn tick(&mut self, now: Instant) {
        if !self.ai_thinking() {
            self.ai_waiting_since = None;
            return;
        }
        let since = *self.ai_waiting_since.get_or_insert(now);
        if now.duration_since(since) >= self.ai_delay {
            self.ai_waiting_since = None;
            self.ai_move();
        }
    }

    fn ai_move(&mut self) {
        let stones_before = self.game_state.stones_remaining();
        let Some(decision) = self.ai.decide(stones_before) else {
            return;
        };
        match self.game_state.take(AI, decision.stones()) {
            Ok(()) => {
                self.last_ai_move = Some(AiMove {
                    stones_before,
                    decision,
                });
                self.record(AI, decision.stones());
                self.after_move();
            }
            Err(e) => {
                // Unreachable: decisions are masked to legal takes.
                log::error!("AI move rejected with {} stones: {}", stones_before, e);
                self.message = Some(format!("AI move rejected: {e}"));
            }
        }
    }

    fn record(&mut self, player: Player, taken: u32) {
        self.moves.push(MoveRecord {
            player,
            taken,
            remaining: self.game_state.stones_remaining(),
        });
    }

    fn after_move(&mut self) {
        let Some(outcome) = self.game_state.outcome() else {
            return;
        };
        if outcome.winner() == HUMAN {
            self.score.human += 1;
            self.message = Some("You took the last stone. You win! Press 'r' to play again.".to_string());
        } else {
            self.score.ai += 1;
            self.message = Some("The AI took the last stone. AI wins! Press 'r' to play again.".to_string());
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(frame, self);
    }
}
