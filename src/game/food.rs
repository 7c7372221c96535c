//! Food items and their placement on the grid.

use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::HashSet;

use super::config::GameConfig;
use super::grid::{Grid, Position};

/// Reward class of a food item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Ordinary,
    /// Rarer and worth more points
    Bonus,
}

impl FoodKind {
    /// Points awarded for eating this kind of food
    pub fn points(&self, config: &GameConfig) -> u32 {
        match self {
            FoodKind::Ordinary => config.ordinary_points,
            FoodKind::Bonus => config.bonus_points,
        }
    }
}

/// A food item on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
    pub kind: FoodKind,
}

impl Food {
    pub fn new(position: Position, kind: FoodKind) -> Self {
        Self { position, kind }
    }

    pub fn ordinary(position: Position) -> Self {
        Self::new(position, FoodKind::Ordinary)
    }
}

/// Places new food uniformly among the free cells of a grid
#[derive(Debug, Clone, Copy)]
pub struct FoodSpawner {
    bonus_probability: f64,
}

impl FoodSpawner {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            bonus_probability: config.bonus_probability.clamp(0.0, 1.0),
        }
    }

    /// Pick a free cell and a reward class.
    ///
    /// Returns `None` when every cell is occupied.
    pub fn spawn<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        occupied: &[Position],
        rng: &mut R,
    ) -> Option<Food> {
        if occupied.len() >= grid.area() {
            return None;
        }

        let taken: HashSet<Position> = occupied.iter().copied().collect();
        let position = grid.cells().filter(|p| !taken.contains(p)).choose(rng)?;

        let kind = if rng.gen_bool(self.bonus_probability) {
            FoodKind::Bonus
        } else {
            FoodKind::Ordinary
        };

        Some(Food::new(position, kind))
    }
}
