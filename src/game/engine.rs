use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use super::{
    action::Direction,
    config::GameConfig,
    error::GameError,
    food::{Food, FoodKind, FoodSpawner},
    grid::{Grid, Position},
    state::{CollisionType, GameSnapshot, GameState, GameStatus, Snake},
};

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// False when the engine was not running and nothing happened
    pub advanced: bool,
    /// Whether the snake survived this step
    pub alive: bool,
    /// Score after the step
    pub score: u32,
    /// Whether the snake got one segment longer
    pub grew: bool,
    /// Reward class of the food eaten this step, if any
    pub ate: Option<FoodKind>,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
    /// No free cell was left for new food
    pub food_unavailable: bool,
}

/// The game engine that owns the session state and handles all game logic
pub struct GameEngine {
    config: GameConfig,
    grid: Grid,
    spawner: FoodSpawner,
    rng: StdRng,
    state: GameState,
    speed: u32,
}

impl GameEngine {
    /// Create a new game engine with the given configuration.
    ///
    /// The first session is set up immediately and waits in
    /// [`GameStatus::NotStarted`].
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let grid = config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let spawner = FoodSpawner::new(&config);
        let state = Self::fresh_state(&grid, &spawner, &mut rng);

        Ok(Self {
            speed: config.initial_speed,
            config,
            grid,
            spawner,
            rng,
            state,
        })
    }

    /// Create an engine for a `width` x `height` grid with default settings
    pub fn new_session(width: usize, height: usize) -> Result<Self, GameError> {
        Self::new(GameConfig::new(width, height))
    }

    /// Create an engine from a hand-built state
    #[cfg(test)]
    pub(crate) fn with_state(config: GameConfig, state: GameState) -> Result<Self, GameError> {
        let mut engine = Self::new(config)?;
        engine.state = state;
        Ok(engine)
    }

    fn fresh_state(grid: &Grid, spawner: &FoodSpawner, rng: &mut StdRng) -> GameState {
        let snake = Snake::new(grid.center(), Direction::Right, 1);
        let food = spawner.spawn(grid, &snake.body, rng);
        GameState::new(snake, food)
    }

    /// Reset the game to the initial state of a new session.
    ///
    /// Speed is a player preference and survives the reset.
    pub fn reset(&mut self) {
        self.state = Self::fresh_state(&self.grid, &self.spawner, &mut self.rng);
    }

    /// NotStarted -> Running
    pub fn start(&mut self) -> bool {
        self.transition(GameStatus::NotStarted, GameStatus::Running)
    }

    /// Running -> Paused
    pub fn pause(&mut self) -> bool {
        self.transition(GameStatus::Running, GameStatus::Paused)
    }

    /// Paused -> Running
    pub fn resume(&mut self) -> bool {
        self.transition(GameStatus::Paused, GameStatus::Running)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Over -> Running with a brand-new session
    pub fn restart(&mut self) -> bool {
        if self.state.status != GameStatus::Over {
            return false;
        }
        self.reset();
        self.state.status = GameStatus::Running;
        true
    }

    fn transition(&mut self, from: GameStatus, to: GameStatus) -> bool {
        if self.state.status != from {
            return false;
        }
        debug!(?from, ?to, "status change");
        self.state.status = to;
        true
    }

    /// Record the direction for the next tick.
    ///
    /// Reversals are ignored, and so is anything sent while paused or after
    /// game over. The last accepted call before a tick wins.
    pub fn set_pending_direction(&mut self, direction: Direction) -> bool {
        if !matches!(
            self.state.status,
            GameStatus::NotStarted | GameStatus::Running
        ) {
            return false;
        }
        if self.state.snake.direction.is_opposite(direction) {
            return false;
        }
        self.state.pending_direction = Some(direction);
        true
    }

    /// Change the speed by `delta`, clamped to the configured bounds
    pub fn adjust_speed(&mut self, delta: i32) -> u32 {
        self.speed = self.config.clamp_speed(self.speed as i64 + delta as i64);
        self.speed
    }

    /// Execute one step of the game
    pub fn step(&mut self) -> StepResult {
        if self.state.status != GameStatus::Running {
            return StepResult {
                advanced: false,
                alive: self.state.status.is_alive(),
                score: self.state.score,
                grew: false,
                ate: None,
                collision: None,
                food_unavailable: false,
            };
        }

        // Apply the pending turn (never a 180° turn)
        if let Some(direction) = self.state.pending_direction.take() {
            if !self.state.snake.direction.is_opposite(direction) {
                self.state.snake.direction = direction;
            }
        }

        // Calculate new head position
        let new_head = self
            .grid
            .translate(self.state.snake.head(), self.state.snake.direction);
        let eats = self.state.food.is_some_and(|food| food.position == new_head);

        // Check for collisions
        if let Some(collision) = self.check_collision(new_head, eats) {
            self.state.status = GameStatus::Over;
            debug!(?collision, x = new_head.x, y = new_head.y, score = self.state.score, "snake died");

            return StepResult {
                advanced: true,
                alive: false,
                score: self.state.score,
                grew: false,
                ate: None,
                collision: Some(collision),
                food_unavailable: false,
            };
        }

        // Move snake (grow if ate food)
        self.state.snake.advance(new_head, eats);
        self.state.steps += 1;

        let mut ate = None;
        if eats {
            if let Some(food) = self.state.food.take() {
                let points = food.kind.points(&self.config);
                self.state.score = self.state.score.saturating_add(points);
                ate = Some(food.kind);
                debug!(kind = ?food.kind, points, score = self.state.score, "ate food");
            }
        }

        // Respawn after eating, or retry if the grid was full last time
        let mut food_unavailable = false;
        if self.state.food.is_none() {
            self.state.food = self.spawn_food();
            food_unavailable = self.state.food.is_none();
            if food_unavailable {
                warn!(length = self.state.snake.len(), "no free cell for food");
            }
        }

        StepResult {
            advanced: true,
            alive: true,
            score: self.state.score,
            grew: eats,
            ate,
            collision: None,
            food_unavailable,
        }
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, pos: Position, growing: bool) -> Option<CollisionType> {
        // Check wall collision
        if !self.grid.in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        // Check self-collision
        if self.state.snake.collides_with_body(pos, growing) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Spawn food at a random empty position
    fn spawn_food(&mut self) -> Option<Food> {
        self.spawner
            .spawn(&self.grid, &self.state.snake.body, &mut self.rng)
    }

    /// Copy of everything the presentation layer needs to draw a frame
    pub fn snapshot(&self, high_score: u32) -> GameSnapshot {
        GameSnapshot {
            body: self.state.snake.body.clone(),
            direction: self.state.snake.direction,
            food: self.state.food,
            score: self.state.score,
            high_score,
            speed: self.speed,
            status: self.state.status,
            steps: self.state.steps,
            grid_width: self.grid.width(),
            grid_height: self.grid.height(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// A running engine with a hand-placed snake and food
    fn running(width: usize, height: usize, snake: Snake, food: Option<Food>) -> GameEngine {
        let mut state = GameState::new(snake, food);
        state.status = GameStatus::Running;
        GameEngine::with_state(GameConfig::new(width, height).with_seed(42), state).unwrap()
    }

    fn far_food() -> Option<Food> {
        Some(Food::ordinary(Position::new(8, 8)))
    }

    #[test]
    fn test_new_session() {
        let engine = GameEngine::new_session(20, 15).unwrap();
        let state = engine.state();

        assert_eq!(state.status, GameStatus::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
        assert_eq!(state.snake.body, vec![Position::new(10, 7)]);
        assert_eq!(state.snake.direction, Direction::Right);

        let food = state.food.unwrap();
        assert!(engine.grid().in_bounds(food.position));
        assert!(!state.snake.body.contains(&food.position));
    }

    #[test]
    fn test_new_session_rejects_bad_size() {
        assert!(matches!(
            GameEngine::new_session(0, 10),
            Err(GameError::InvalidGridSize { .. })
        ));
        assert!(GameEngine::new_session(10, 0).is_err());
    }

    #[test]
    fn test_step_before_start_is_noop() {
        let mut engine = GameEngine::new_session(10, 10).unwrap();
        let before = engine.state().clone();

        let result = engine.step();

        assert!(!result.advanced);
        assert!(result.alive);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = GameEngine::new(GameConfig::small().with_seed(1)).unwrap();
        engine.start();
        let initial_head = engine.state().snake.head();

        let result = engine.step();

        assert!(result.advanced);
        assert!(result.alive);
        assert_eq!(engine.state().steps, 1);
        assert_ne!(engine.state().snake.head(), initial_head);
    }

    #[test]
    fn test_motion_shifts_every_segment() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 4);
        let mut engine = running(10, 10, snake.clone(), far_food());

        let result = engine.step();

        assert!(result.alive);
        assert!(!result.grew);
        let body = &engine.state().snake.body;
        assert_eq!(body.len(), 4);
        assert_eq!(body[0], Position::new(6, 5));
        // Every other segment takes the place of the one ahead of it
        assert_eq!(&body[1..], &snake.body[..3]);
    }

    #[test]
    fn test_food_consumption() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let food = Some(Food::ordinary(Position::new(6, 5)));
        let mut engine = running(10, 10, snake, food);

        let result = engine.step();

        assert!(result.grew);
        assert_eq!(result.ate, Some(FoodKind::Ordinary));
        assert_eq!(result.score, 1);
        assert_eq!(engine.state().snake.len(), 4);

        // Exactly one new food, off the snake
        let new_food = engine.state().food.unwrap();
        assert_ne!(new_food.position, Position::new(6, 5));
        assert!(!engine.state().snake.body.contains(&new_food.position));
    }

    #[test]
    fn test_bonus_food_points() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 1);
        let food = Some(Food::new(Position::new(6, 5), FoodKind::Bonus));
        let mut engine = running(10, 10, snake, food);

        let result = engine.step();

        assert_eq!(result.ate, Some(FoodKind::Bonus));
        assert_eq!(result.score, engine.config().bonus_points);
    }

    #[test]
    fn test_five_by_five_growth() {
        let snake = Snake::new(Position::new(2, 2), Direction::Right, 1);
        let food = Some(Food::ordinary(Position::new(3, 2)));
        let mut engine = running(5, 5, snake, food);

        let result = engine.step();

        assert!(result.alive);
        assert!(result.grew);
        assert_eq!(
            engine.state().snake.body,
            vec![Position::new(3, 2), Position::new(2, 2)]
        );
        assert_eq!(engine.score(), 1);
        let new_food = engine.state().food.unwrap();
        assert!(!engine.state().snake.body.contains(&new_food.position));
    }

    #[test]
    fn test_wall_collision() {
        let snake = Snake::new(Position::new(0, 5), Direction::Left, 3);
        let mut engine = running(10, 10, snake.clone(), far_food());

        let result = engine.step();

        assert!(!result.alive);
        assert_eq!(engine.status(), GameStatus::Over);
        assert_eq!(result.collision, Some(CollisionType::Wall));
        // Nothing else changes on the fatal tick
        assert_eq!(engine.state().snake, snake);
        assert_eq!(engine.state().steps, 0);
    }

    #[test]
    fn test_right_wall_collision() {
        let snake = Snake::new(Position::new(9, 3), Direction::Right, 2);
        let mut engine = running(10, 10, snake, far_food());

        let result = engine.step();

        assert_eq!(result.collision, Some(CollisionType::Wall));
    }

    #[test]
    fn test_vertical_wall_collisions() {
        let up = Snake::new(Position::new(4, 0), Direction::Up, 1);
        let mut engine = running(10, 10, up, far_food());
        assert_eq!(engine.step().collision, Some(CollisionType::Wall));

        let down = Snake::new(Position::new(4, 9), Direction::Down, 1);
        let mut engine = running(10, 10, down, far_food());
        assert_eq!(engine.step().collision, Some(CollisionType::Wall));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = running(
            10,
            10,
            Snake::new(Position::new(5, 5), Direction::Right, 5),
            far_food(),
        );

        // Body: (5,5) (4,5) (3,5) (2,5) (1,5)
        engine.step();
        // Down: (6,6) (6,5) (5,5) (4,5) (3,5)
        engine.set_pending_direction(Direction::Down);
        engine.step();
        // Left: (5,6) (6,6) (6,5) (5,5) (4,5)
        engine.set_pending_direction(Direction::Left);
        engine.step();
        // Up into (5,5), which is not the tail
        engine.set_pending_direction(Direction::Up);
        let result = engine.step();

        assert!(!result.alive);
        assert_eq!(result.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_tail_exemption() {
        // A 2x2 loop: the head moves into the cell the tail is leaving
        let snake = Snake::from_segments(
            vec![
                Position::new(5, 6),
                Position::new(6, 6),
                Position::new(6, 5),
                Position::new(5, 5),
            ],
            Direction::Left,
        );
        let mut engine = running(10, 10, snake, far_food());
        engine.set_pending_direction(Direction::Up);

        let result = engine.step();

        assert!(result.alive);
        assert_eq!(engine.state().snake.head(), Position::new(5, 5));
        assert_eq!(engine.state().snake.len(), 4);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut engine = GameEngine::new(GameConfig::small().with_seed(5)).unwrap();
        engine.start();

        // Try to turn 180 degrees (should be ignored)
        assert!(!engine.set_pending_direction(Direction::Left));
        engine.step();

        assert_eq!(engine.state().snake.direction, Direction::Right);
    }

    #[test]
    fn test_latest_direction_wins() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        let mut engine = running(10, 10, snake, far_food());

        assert!(engine.set_pending_direction(Direction::Up));
        assert!(engine.set_pending_direction(Direction::Down));
        // Still judged against the active direction, so this is dropped
        assert!(!engine.set_pending_direction(Direction::Left));

        engine.step();

        assert_eq!(engine.state().snake.direction, Direction::Down);
        assert_eq!(engine.state().snake.head(), Position::new(5, 6));
    }

    #[test]
    fn test_pause_blocks_steps_and_turns() {
        let mut engine = GameEngine::new(GameConfig::small().with_seed(3)).unwrap();
        engine.start();
        assert!(engine.pause());
        let before = engine.state().clone();

        assert!(!engine.set_pending_direction(Direction::Up));
        let result = engine.step();

        assert!(!result.advanced);
        assert_eq!(engine.state(), &before);

        assert!(engine.toggle_pause());
        assert_eq!(engine.status(), GameStatus::Running);
        assert!(engine.step().advanced);
    }

    #[test]
    fn test_invalid_transitions_ignored() {
        let mut engine = GameEngine::new_session(10, 10).unwrap();

        assert!(!engine.pause());
        assert!(!engine.resume());
        assert!(!engine.restart());
        assert!(engine.start());
        assert!(!engine.start());
        assert!(!engine.restart());
    }

    #[test]
    fn test_restart_after_game_over() {
        let snake = Snake::new(Position::new(9, 0), Direction::Right, 1);
        let mut state = GameState::new(snake, far_food());
        state.status = GameStatus::Running;
        state.score = 12;
        let mut engine =
            GameEngine::with_state(GameConfig::small().with_seed(8), state).unwrap();
        engine.adjust_speed(3);

        engine.step();
        assert_eq!(engine.status(), GameStatus::Over);
        let after_over = engine.step();
        assert!(!after_over.advanced);
        assert!(!after_over.alive);

        assert!(engine.restart());
        assert_eq!(engine.status(), GameStatus::Running);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.state().snake.body, vec![Position::new(5, 5)]);
        assert_eq!(engine.state().snake.direction, Direction::Right);
        assert_eq!(engine.speed(), 11);
    }

    #[test]
    fn test_adjust_speed_clamps() {
        let mut engine = GameEngine::new_session(10, 10).unwrap();
        assert_eq!(engine.speed(), 8);

        assert_eq!(engine.adjust_speed(1), 9);
        assert_eq!(engine.adjust_speed(100), 20);
        assert_eq!(engine.adjust_speed(-100), 1);

        // Allowed while paused
        engine.start();
        engine.pause();
        assert_eq!(engine.adjust_speed(2), 3);
    }

    #[test]
    fn test_full_grid_is_not_fatal() {
        // 2x2 grid with one free cell holding the food
        let snake = Snake::from_segments(
            vec![Position::new(1, 0), Position::new(0, 0), Position::new(0, 1)],
            Direction::Right,
        );
        let food = Some(Food::ordinary(Position::new(1, 1)));
        let mut state = GameState::new(snake, food);
        state.status = GameStatus::Running;
        let mut engine = GameEngine::with_state(GameConfig::new(2, 2), state).unwrap();

        engine.set_pending_direction(Direction::Down);
        let result = engine.step();
        assert!(result.alive);
        assert!(result.grew);
        assert!(result.food_unavailable);
        assert_eq!(engine.state().food, None);

        // Chasing the tail around the full grid keeps the snake alive
        engine.set_pending_direction(Direction::Left);
        let result = engine.step();
        assert!(result.alive);
        assert!(result.food_unavailable);
        assert_eq!(engine.state().snake.len(), 4);
    }

    #[test]
    fn test_missing_food_is_retried() {
        let snake = Snake::new(Position::new(2, 2), Direction::Right, 1);
        let mut engine = running(10, 10, snake, None);

        let result = engine.step();

        assert!(!result.food_unavailable);
        assert!(engine.state().food.is_some());
    }

    #[test]
    fn test_snapshot() {
        let mut engine = GameEngine::new(GameConfig::new(12, 9).with_seed(4)).unwrap();
        engine.start();
        engine.step();

        let snapshot = engine.snapshot(40);

        assert_eq!(snapshot.body, engine.state().snake.body);
        assert_eq!(snapshot.head(), engine.state().snake.head());
        assert_eq!(snapshot.high_score, 40);
        assert_eq!(snapshot.speed, 8);
        assert_eq!(snapshot.status, GameStatus::Running);
        assert_eq!((snapshot.grid_width, snapshot.grid_height), (12, 9));
        assert_eq!(snapshot.food, engine.state().food);
    }

    fn direction_strategy() -> impl Strategy<Value = Option<Direction>> {
        prop_oneof![
            Just(None),
            Just(Some(Direction::Up)),
            Just(Some(Direction::Down)),
            Just(Some(Direction::Left)),
            Just(Some(Direction::Right)),
        ]
    }

    proptest! {
        #[test]
        fn prop_running_snake_stays_consistent(
            width in 3usize..9,
            height in 3usize..9,
            seed in any::<u64>(),
            turns in proptest::collection::vec(direction_strategy(), 1..200),
        ) {
            let config = GameConfig {
                bonus_probability: 0.3,
                ..GameConfig::new(width, height).with_seed(seed)
            };
            let mut engine = GameEngine::new(config).unwrap();
            engine.start();

            for turn in turns {
                let before = engine.state().clone();
                if let Some(direction) = turn {
                    engine.set_pending_direction(direction);
                }
                let result = engine.step();
                let after = engine.state();

                prop_assert!(!after.snake.direction.is_opposite(before.snake.direction));
                prop_assert!(after.score >= before.score);

                if !result.alive {
                    prop_assert_eq!(after.status, GameStatus::Over);
                    prop_assert_eq!(&after.snake.body, &before.snake.body);
                    break;
                }

                let distinct: HashSet<Position> = after.snake.body.iter().copied().collect();
                prop_assert_eq!(distinct.len(), after.snake.len());
                prop_assert!(after.snake.body.iter().all(|p| engine.grid().in_bounds(*p)));

                let expected_len = before.snake.len() + usize::from(result.grew);
                prop_assert_eq!(after.snake.len(), expected_len);

                if let Some(food) = after.food {
                    prop_assert!(!after.snake.body.contains(&food.position));
                } else {
                    prop_assert_eq!(after.snake.len(), engine.grid().area());
                }
            }
        }
    }
}
