//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The session controller drives it one tick at a time and the renderer only
//! ever sees a [`GameSnapshot`].

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod grid;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use config::GameConfig;
pub use engine::{GameEngine, StepResult};
pub use error::GameError;
pub use food::{Food, FoodKind, FoodSpawner};
pub use grid::{Grid, Position};
pub use state::{CollisionType, GameSnapshot, GameState, GameStatus, Snake};
