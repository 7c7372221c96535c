use super::action::Direction;
use super::food::Food;
use super::grid::Position;

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        // Add initial body segments behind the head
        let back = direction.opposite();
        for i in 1..length.max(1) {
            let prev = body[i - 1];
            body.push(prev.moved_in_direction(back));
        }

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first
    ///
    /// # Panics
    ///
    /// Panics if `body` is empty.
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        assert!(!body.is_empty(), "snake needs at least one segment");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Whether the head moving to `pos` would hit the body.
    ///
    /// The tail only counts when the snake grows this tick; otherwise its
    /// cell is vacated as the head arrives.
    pub fn collides_with_body(&self, pos: Position, growing: bool) -> bool {
        let checked = if growing {
            &self.body[..]
        } else {
            &self.body[..self.body.len() - 1]
        };
        checked.contains(&pos)
    }

    /// Push a new head, dropping the tail unless the snake grows
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    NotStarted,
    Running,
    Paused,
    Over,
}

impl GameStatus {
    /// The snake is alive in every state except `Over`
    pub fn is_alive(&self) -> bool {
        !matches!(self, GameStatus::Over)
    }
}

/// Mutable gameplay state of one session
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// `None` only while the grid has no free cell
    pub food: Option<Food>,
    pub score: u32,
    pub steps: u32,
    pub status: GameStatus,
    /// Direction to apply on the next tick
    pub pending_direction: Option<Direction>,
}

impl GameState {
    /// Create a new game state
    pub fn new(snake: Snake, food: Option<Food>) -> Self {
        Self {
            snake,
            food,
            score: 0,
            steps: 0,
            status: GameStatus::NotStarted,
            pending_direction: None,
        }
    }
}

/// Read-only view of the game handed to the presentation layer each frame
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    /// Head first
    pub body: Vec<Position>,
    pub direction: Direction,
    pub food: Option<Food>,
    pub score: u32,
    pub high_score: u32,
    pub speed: u32,
    pub status: GameStatus,
    pub steps: u32,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl GameSnapshot {
    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }
}
