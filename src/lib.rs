//! Grid Snake - a terminal Snake game
//!
//! This library provides:
//! - Core game logic: grid geometry, food, the tick engine (game module)
//! - High-score persistence (persistence module)
//! - The session controller that drives the engine (session module)
//! - TUI input, rendering and the interactive play loop (input, render, modes)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
pub mod session;
