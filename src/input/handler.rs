use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Command, Direction};

/// Maps key presses to game commands
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> Option<Command> {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }

        let command = match key.code {
            // Movement - Arrow keys
            KeyCode::Up => Command::Turn(Direction::Up),
            KeyCode::Down => Command::Turn(Direction::Down),
            KeyCode::Left => Command::Turn(Direction::Left),
            KeyCode::Right => Command::Turn(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => Command::Turn(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => Command::Turn(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => Command::Turn(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => Command::Turn(Direction::Right),

            // Speed
            KeyCode::Char('+') | KeyCode::Char('=') => Command::SpeedUp,
            KeyCode::Char('-') | KeyCode::Char('_') => Command::SpeedDown,

            // Controls
            KeyCode::Enter => Command::Start,
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => Command::TogglePause,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,

            _ => return None,
        };

        Some(command)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
