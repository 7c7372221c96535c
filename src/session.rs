//! Session controller
//!
//! Sits between the input/render loop and the [`GameEngine`]: it turns player
//! commands into engine calls, advances the engine one tick at a time, keeps
//! the live high score and persists it when a session ends or the player
//! quits.

use std::time::Duration;
use tracing::info;

use crate::game::{
    Command, GameConfig, GameEngine, GameError, GameSnapshot, GameStatus, StepResult,
};
use crate::metrics::GameMetrics;
use crate::persistence::HighScoreStore;

pub struct SessionController {
    engine: GameEngine,
    store: HighScoreStore,
    /// Value currently on disk
    saved_high_score: u32,
    /// Includes the running session's score once it beats the saved value
    high_score: u32,
    metrics: GameMetrics,
    should_quit: bool,
}

impl SessionController {
    /// Build a controller for `config`, loading the high score once
    pub fn new(config: GameConfig, store: HighScoreStore) -> Result<Self, GameError> {
        Ok(Self::with_engine(GameEngine::new(config)?, store))
    }

    pub fn with_engine(engine: GameEngine, store: HighScoreStore) -> Self {
        let saved_high_score = store.load();
        info!(high_score = saved_high_score, "session controller ready");

        Self {
            engine,
            store,
            saved_high_score,
            high_score: saved_high_score,
            metrics: GameMetrics::new(),
            should_quit: false,
        }
    }

    /// Apply one player command
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Turn(direction) => {
                self.engine.set_pending_direction(direction);
                // Steering also kicks off a fresh game
                if self.engine.status() == GameStatus::NotStarted {
                    self.start();
                }
            }
            Command::Start => self.start(),
            Command::TogglePause => match self.engine.status() {
                GameStatus::NotStarted => self.start(),
                GameStatus::Running => {
                    self.engine.pause();
                    self.metrics.on_pause();
                }
                GameStatus::Paused => {
                    self.engine.resume();
                    self.metrics.on_resume();
                }
                GameStatus::Over => {}
            },
            Command::SpeedUp => {
                self.engine.adjust_speed(1);
            }
            Command::SpeedDown => {
                self.engine.adjust_speed(-1);
            }
            Command::Restart => {
                if self.engine.restart() {
                    info!("session restarted");
                    self.metrics.on_game_start();
                }
            }
            Command::Quit => {
                self.finish();
                self.should_quit = true;
            }
        }
    }

    fn start(&mut self) {
        if self.engine.start() {
            info!("session started");
            self.metrics.on_game_start();
        }
    }

    /// Advance the game by one tick
    pub fn tick(&mut self) -> StepResult {
        let result = self.engine.step();
        if !result.advanced {
            return result;
        }

        if result.score > self.high_score {
            self.high_score = result.score;
        }

        if !result.alive {
            self.end_session();
        }

        result
    }

    fn end_session(&mut self) {
        self.metrics.on_game_over();
        info!(
            score = self.engine.score(),
            high_score = self.high_score,
            games_played = self.metrics.games_played,
            "game over"
        );
        self.persist_high_score();
    }

    fn persist_high_score(&mut self) {
        if self.high_score > self.saved_high_score && self.store.save(self.high_score) {
            self.saved_high_score = self.high_score;
        }
    }

    /// Save anything still pending before the process exits
    pub fn finish(&mut self) {
        self.persist_high_score();
    }

    /// Time to wait between ticks at the current speed
    pub fn tick_interval(&self) -> Duration {
        self.engine.config().tick_interval(self.engine.speed())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.engine.snapshot(self.high_score)
    }

    pub fn update_metrics(&mut self) {
        self.metrics.update();
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
