//! Application state and key handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tictactoe_oracle::{
    AiReply, AiTurn, DEFAULT_PLAYER_ONE, DEFAULT_PLAYER_TWO, GameController, GameMode, Mark, Phase,
    Position,
};
use tracing::{debug, info};

use super::input::{digit_to_index, move_cursor};

/// Field focused on the setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    /// Mode toggle.
    Mode,
    /// Name for X.
    PlayerOne,
    /// Name for O.
    PlayerTwo,
    /// Start button.
    Start,
}

impl SetupField {
    fn next(self) -> Self {
        match self {
            SetupField::Mode => SetupField::PlayerOne,
            SetupField::PlayerOne => SetupField::PlayerTwo,
            SetupField::PlayerTwo => SetupField::Start,
            SetupField::Start => SetupField::Mode,
        }
    }

    fn previous(self) -> Self {
        match self {
            SetupField::Mode => SetupField::Start,
            SetupField::PlayerOne => SetupField::Mode,
            SetupField::PlayerTwo => SetupField::PlayerOne,
            SetupField::Start => SetupField::PlayerTwo,
        }
    }
}

/// Setup form: mode and player names.
#[derive(Debug, Clone)]
pub struct SetupForm {
    mode: GameMode,
    player_one: String,
    player_two: String,
    focus: SetupField,
}

impl SetupForm {
    fn new(ai_name: &str) -> Self {
        Self {
            mode: GameMode::SinglePlayer,
            player_one: DEFAULT_PLAYER_ONE.to_string(),
            player_two: ai_name.to_string(),
            focus: SetupField::Mode,
        }
    }

    /// Selected mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Name entered for X.
    pub fn player_one(&self) -> &str {
        &self.player_one
    }

    /// Name entered for O.
    pub fn player_two(&self) -> &str {
        &self.player_two
    }

    /// Focused field.
    pub fn focus(&self) -> SetupField {
        self.focus
    }

    fn toggle_mode(&mut self, ai_name: &str) {
        self.mode = match self.mode {
            GameMode::SinglePlayer => GameMode::TwoPlayer,
            GameMode::TwoPlayer => GameMode::SinglePlayer,
        };
        self.player_two = match self.mode {
            GameMode::SinglePlayer => ai_name.to_string(),
            GameMode::TwoPlayer => DEFAULT_PLAYER_TWO.to_string(),
        };
    }

    fn focused_name(&mut self) -> Option<&mut String> {
        match self.focus {
            SetupField::PlayerOne => Some(&mut self.player_one),
            SetupField::PlayerTwo => Some(&mut self.player_two),
            SetupField::Mode | SetupField::Start => None,
        }
    }
}

/// Which screen is showing.
#[derive(Debug, Clone)]
pub enum Screen {
    /// Mode and name entry.
    Setup(SetupForm),
    /// Board, scores and status.
    Playing,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    controller: GameController,
    screen: Screen,
    cursor: Position,
    notice: Option<String>,
    should_quit: bool,
}

impl App {
    /// Creates the app on the setup screen.
    pub fn new(controller: GameController) -> Self {
        let form = SetupForm::new(controller.ai_name());
        Self {
            controller,
            screen: Screen::Setup(form),
            cursor: Position::Center,
            notice: None,
            should_quit: false,
        }
    }

    /// Skips setup and starts a game directly.
    pub fn start_game(&mut self, mode: GameMode, player_one: &str, player_two: &str) {
        match self.controller.start(mode, player_one, player_two) {
            Ok(()) => {
                self.screen = Screen::Playing;
                self.cursor = Position::Center;
                self.notice = None;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    /// The game controller.
    pub fn controller(&self) -> &GameController {
        &self.controller
    }

    /// Current screen.
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Board cursor.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Last rejection or fallback message, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// True once the user asked to quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Kicks off the AI request when it's the AI's turn.
    pub fn tick(&mut self) {
        while let Some(reply) = self.controller.try_recv_ai_reply() {
            self.on_ai_reply(reply);
        }
        if matches!(self.screen, Screen::Playing) {
            self.controller.request_ai_move();
        }
    }

    fn on_ai_reply(&mut self, reply: AiReply) {
        match self.controller.handle_ai_reply(reply) {
            AiTurn::Applied { selection, .. } => {
                self.notice = if selection.is_fallback() {
                    Some(format!("AI picked {} at random", selection.position))
                } else {
                    None
                };
            }
            AiTurn::Discarded => debug!("Stale AI reply ignored"),
        }
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Setup(_) => self.handle_setup_key(key.code),
            Screen::Playing => self.handle_playing_key(key.code),
        }
    }

    fn handle_setup_key(&mut self, code: KeyCode) {
        let ai_name = self.controller.ai_name().to_string();
        let Screen::Setup(form) = &mut self.screen else {
            return;
        };

        match (form.focus, code) {
            (_, KeyCode::Esc) => self.should_quit = true,
            (_, KeyCode::Tab | KeyCode::Down) => form.focus = form.focus.next(),
            (_, KeyCode::BackTab | KeyCode::Up) => form.focus = form.focus.previous(),
            (SetupField::Mode, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
                form.toggle_mode(&ai_name)
            }
            (SetupField::PlayerOne | SetupField::PlayerTwo, KeyCode::Backspace) => {
                if let Some(name) = form.focused_name() {
                    name.pop();
                }
            }
            (SetupField::PlayerOne | SetupField::PlayerTwo, KeyCode::Char(c)) => {
                if let Some(name) = form.focused_name() {
                    name.push(c);
                }
            }
            (SetupField::Start, KeyCode::Enter | KeyCode::Char(' ')) | (_, KeyCode::Enter) => {
                let (mode, one, two) = (form.mode, form.player_one.clone(), form.player_two.clone());
                info!(%mode, "Setup submitted");
                self.start_game(mode, &one, &two);
            }
            _ => {}
        }
    }

    fn handle_playing_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') => {
                self.controller.new_game();
                self.screen = Screen::Setup(SetupForm::new(self.controller.ai_name()));
                self.notice = None;
            }
            KeyCode::Char('p') | KeyCode::Char('r') => match self.controller.play_again() {
                Ok(()) => self.notice = None,
                Err(e) => self.notice = Some(e.to_string()),
            },
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => {
                self.cursor = move_cursor(self.cursor, code);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.place(self.cursor.to_index()),
            KeyCode::Char(c) => {
                if let Some(index) = digit_to_index(c) {
                    if let Some(pos) = Position::from_index(index) {
                        self.cursor = pos;
                    }
                    self.place(index);
                }
            }
            _ => {}
        }
    }

    fn place(&mut self, index: usize) {
        match self.controller.human_move(index) {
            Ok(_) => self.notice = None,
            Err(e) => {
                debug!(index, error = %e, "Move rejected");
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Status line: thinking, winner, draw or whose turn.
    pub fn status(&self) -> String {
        let session = self.controller.session();
        let name = |mark: Mark| {
            session
                .player(mark)
                .map(|p| p.name().to_string())
                .unwrap_or_else(|| mark.to_string())
        };

        match session.phase() {
            Phase::AwaitingSetup => "Choose a mode and enter names".to_string(),
            Phase::RoundOver(outcome) => match outcome.winner() {
                Some(mark) => format!("Winner: {}! Press 'p' to play again", name(mark)),
                None => "It's a draw! Press 'p' to play again".to_string(),
            },
            Phase::InRound if self.controller.is_thinking() => {
                format!("{} is thinking...", name(session.to_move()))
            }
            Phase::InRound => format!(
                "Next player: {} ({})",
                name(session.to_move()),
                session.to_move()
            ),
        }
    }
}
