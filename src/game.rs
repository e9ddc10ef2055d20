use crate::config::GameConfig;
use crate::entity::{Direction, Position};
use crate::error::ConfigError;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::iter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    Over,
}

/// What a renderer should draw in one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Head,
    Body,
    Food,
}

/// Immutable copy of everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grid_size: i32,
    pub head: Position,
    /// Body segments, oldest (tail end) first. Does not include the head.
    pub trail: Vec<Position>,
    pub food: Position,
    pub direction: Direction,
    pub length: usize,
    pub score: u32,
    pub state: GameState,
}

impl Snapshot {
    /// Head is drawn over body, body over food.
    pub fn cell_at(&self, position: Position) -> Cell {
        if position == self.head {
            Cell::Head
        } else if self.trail.contains(&position) {
            Cell::Body
        } else if position == self.food {
            Cell::Food
        } else {
            Cell::Empty
        }
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::Over
    }
}

/// The authoritative game state. Advanced by `tick()` from an external clock
/// and steered by `set_direction()` from input events; both must be called
/// from the same thread of control.
pub struct Game {
    head: Position,
    direction: Direction,
    length: usize,
    trail: VecDeque<Position>,
    food: Position,
    score: u32,
    state: GameState,
    rng: StdRng,
    config: GameConfig,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as [`Game::new`] but food placement follows a reproducible sequence.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            head: config.initial_head,
            direction: Direction::Right,
            length: 1,
            trail: VecDeque::new(),
            food: config.initial_food,
            score: 0,
            state: GameState::Running,
            rng,
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Requests a turn for the next tick. The current direction and its
    /// opposite are silently ignored; otherwise the last request wins.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.state == GameState::Over {
            return;
        }

        if direction == self.direction || direction == self.direction.opposite() {
            return;
        }

        debug!("direction {:?} -> {:?}", self.direction, direction);
        self.direction = direction;
    }

    /// Advances the game by one cell of movement.
    pub fn tick(&mut self) {
        if self.state != GameState::Running {
            return;
        }

        let next = self.head.wrapped(self.direction, self.config.grid_size);

        // Only cells still occupied after this tick's tail eviction count.
        if self.body_after_move().any(|segment| segment == next) {
            self.state = GameState::Over;
            info!(
                "game over at {}: score {}, length {}",
                next, self.score, self.length
            );
            return;
        }

        self.trail.push_back(self.head);
        while self.trail.len() > self.length - 1 {
            self.trail.pop_front();
        }

        self.head = next;

        if self.head == self.food {
            self.score += 1;
            self.length += 1;
            self.food = self.random_position();
            info!("food eaten at {}: score {}", self.head, self.score);
            debug!("food relocated to {}", self.food);
        }
    }

    /// Back to the configured starting state. The food RNG keeps its stream.
    pub fn reset(&mut self) {
        self.head = self.config.initial_head;
        self.direction = Direction::Right;
        self.length = 1;
        self.trail.clear();
        self.food = self.config.initial_food;
        self.score = 0;
        self.state = GameState::Running;
        info!("game reset");
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid_size: self.config.grid_size,
            head: self.head,
            trail: self.trail.iter().copied().collect(),
            food: self.food,
            direction: self.direction,
            length: self.length,
            score: self.score,
            state: self.state,
        }
    }

    /// The trail as it will be once the current head is pushed and the
    /// oldest segments beyond `length - 1` are evicted.
    fn body_after_move(&self) -> impl Iterator<Item = Position> + '_ {
        let keep = self.length - 1;
        let total = self.trail.len() + 1;

        self.trail
            .iter()
            .copied()
            .chain(iter::once(self.head))
            .skip(total.saturating_sub(keep))
    }

    // Uniform over the whole grid; may land under the snake.
    fn random_position(&mut self) -> Position {
        let n = self.config.grid_size;
        Position::new(self.rng.gen_range(0..n), self.rng.gen_range(0..n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FAR_AWAY: Position = Position { x: 0, y: 15 };

    fn new_game() -> Game {
        Game::with_seed(GameConfig::default(), 7).unwrap()
    }

    /// Puts food directly ahead of the head and ticks, so the snake eats it.
    fn eat_ahead(game: &mut Game) {
        game.food = game.head.wrapped(game.direction, game.config.grid_size);
        game.tick();
    }

    /// Ticks with the food moved out of the way.
    fn step(game: &mut Game, direction: Direction) {
        game.set_direction(direction);
        game.food = FAR_AWAY;
        game.tick();
    }

    /// A snake with four trail segments turning back into its own body.
    fn collided_game() -> Game {
        let mut game = new_game();
        for _ in 0..4 {
            eat_ahead(&mut game);
        }
        assert_eq!(game.length, 5);
        assert_eq!(game.head, Position::new(6, 2));

        step(&mut game, Direction::Down);
        step(&mut game, Direction::Left);
        assert_eq!(game.state, GameState::Running);
        assert_eq!(game.trail.len(), 4);

        step(&mut game, Direction::Up);
        game
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    /// Each entry is either a turn request or a bare tick.
    fn input_sequence_strategy() -> impl Strategy<Value = Vec<Option<Direction>>> {
        prop::collection::vec(prop::option::of(direction_strategy()), 1..300)
    }

    proptest! {
        /// The trail never holds more than `length - 1` segments, and the
        /// score always accounts for every unit of growth.
        #[test]
        fn prop_trail_bounded_by_length(
            inputs in input_sequence_strategy(),
            seed in any::<u64>(),
        ) {
            // Small grid so food is eaten often
            let config = GameConfig::new(5).with_food(Position::new(4, 2));
            let mut game = Game::with_seed(config, seed).unwrap();

            for input in inputs {
                if let Some(direction) = input {
                    game.set_direction(direction);
                }
                game.tick();

                prop_assert!(
                    game.trail.len() <= game.length - 1,
                    "trail of {} exceeds length {} - 1",
                    game.trail.len(),
                    game.length
                );
                prop_assert_eq!(game.length, 1 + game.score as usize);
                prop_assert!(game.head.is_within(5));
                prop_assert!(game.food.is_within(5));
            }
        }

        /// Once over, nothing moves until reset.
        #[test]
        fn prop_over_is_frozen(inputs in input_sequence_strategy()) {
            let mut game = collided_game();
            prop_assert_eq!(game.state, GameState::Over);
            let frozen = game.snapshot();

            for input in inputs {
                if let Some(direction) = input {
                    game.set_direction(direction);
                }
                game.tick();
                prop_assert_eq!(&game.snapshot(), &frozen);
            }
        }

        /// Reset from any reachable state yields the configured start.
        #[test]
        fn prop_reset_restores_initial_snapshot(
            inputs in input_sequence_strategy(),
            seed in any::<u64>(),
        ) {
            let config = GameConfig::new(6)
                .with_head(Position::new(1, 4))
                .with_food(Position::new(3, 4));
            let mut game = Game::with_seed(config.clone(), seed).unwrap();
            let initial = game.snapshot();

            for input in inputs {
                if let Some(direction) = input {
                    game.set_direction(direction);
                }
                game.tick();
            }

            game.reset();
            prop_assert_eq!(&game.snapshot(), &initial);
            prop_assert_eq!(game.snapshot(), Game::new(config).unwrap().snapshot());
        }

        /// With at most one turn between ticks the head never folds back
        /// onto its neck.
        #[test]
        fn prop_single_turn_per_tick_never_hits_neck(inputs in input_sequence_strategy()) {
            let mut game = new_game();
            game.length = 3;

            for input in inputs {
                if let Some(direction) = input {
                    game.set_direction(direction);
                }
                let before = game.head;
                // Food under the head is never reached
                game.food = game.head;
                game.tick();

                prop_assert_eq!(game.state, GameState::Running);
                prop_assert_ne!(game.head, before);
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let game = new_game();
        let snapshot = game.snapshot();

        assert_eq!(snapshot.head, Position::new(2, 2));
        assert_eq!(snapshot.food, Position::new(10, 10));
        assert_eq!(snapshot.direction, Direction::Right);
        assert_eq!(snapshot.length, 1);
        assert!(snapshot.trail.is_empty());
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.state, GameState::Running);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let result = Game::new(GameConfig::new(1));
        assert!(matches!(result, Err(ConfigError::GridTooSmall { size: 1 })));

        let result = Game::new(GameConfig::new(8).with_head(Position::new(8, 8)));
        assert!(matches!(result, Err(ConfigError::OutOfBounds { what: "head", .. })));
    }

    #[test]
    fn test_tick_then_turn() {
        let mut game = new_game();

        game.tick();
        assert_eq!(game.head, Position::new(3, 2));
        assert!(game.snapshot().trail.is_empty());

        game.set_direction(Direction::Up);
        game.tick();
        assert_eq!(game.head, Position::new(3, 1));
    }

    #[test]
    fn test_wraps_past_right_edge() {
        let config = GameConfig::new(20).with_head(Position::new(19, 5));
        let mut game = Game::with_seed(config, 1).unwrap();

        game.tick();
        assert_eq!(game.head, Position::new(0, 5));
    }

    #[test]
    fn test_wraps_past_every_edge() {
        let n = 20;
        let cases = [
            (Position::new(19, 5), Direction::Right, Position::new(0, 5)),
            (Position::new(0, 5), Direction::Left, Position::new(19, 5)),
            (Position::new(5, 0), Direction::Up, Position::new(5, 19)),
            (Position::new(5, 19), Direction::Down, Position::new(5, 0)),
        ];

        for (start, direction, expected) in cases {
            let mut game = Game::with_seed(GameConfig::new(n).with_head(start), 3).unwrap();
            game.direction = direction;
            game.tick();
            assert_eq!(game.head, expected, "moving {:?} from {}", direction, start);
        }
    }

    #[test]
    fn test_reversal_rejected_for_every_direction() {
        for direction in Direction::ALL {
            let mut game = Game::with_seed(GameConfig::new(20).with_head(Position::new(10, 10)), 5).unwrap();
            game.direction = direction;

            game.set_direction(direction.opposite());
            game.tick();

            assert_eq!(game.direction, direction);
            assert_eq!(game.head, Position::new(10, 10).wrapped(direction, 20));
        }
    }

    #[test]
    fn test_same_direction_is_ignored() {
        let mut game = new_game();
        game.set_direction(Direction::Right);
        assert_eq!(game.direction, Direction::Right);
    }

    #[test]
    fn test_double_turn_within_one_tick_hits_neck() {
        // Four cells moving right, head (5,2), trail [(3,2), (4,2)]
        let mut game = new_game();
        for _ in 0..3 {
            eat_ahead(&mut game);
        }
        assert_eq!(game.length, 4);
        assert_eq!(game.head, Position::new(5, 2));

        // Up then Left before the next tick: Left is not opposite to Up, so it wins
        game.set_direction(Direction::Up);
        game.set_direction(Direction::Left);
        assert_eq!(game.direction, Direction::Left);

        game.food = FAR_AWAY;
        game.tick();
        assert_eq!(game.state, GameState::Over);
        assert_eq!(game.head, Position::new(5, 2));

        let frozen = game.snapshot();
        for direction in Direction::ALL {
            game.set_direction(direction);
            game.tick();
        }
        assert_eq!(game.snapshot(), frozen);
    }

    #[test]
    fn test_three_cell_snake_turning_into_neck_collides() {
        let mut game = new_game();
        game.length = 3;
        game.tick();
        game.tick();
        assert_eq!(game.head, Position::new(4, 2));

        game.set_direction(Direction::Up);
        game.set_direction(Direction::Left);
        game.tick();

        assert_eq!(game.state, GameState::Over);
        assert_eq!(game.head, Position::new(4, 2));
    }

    #[test]
    fn test_last_turn_wins_within_one_tick() {
        let mut game = new_game();
        game.set_direction(Direction::Up);
        game.set_direction(Direction::Down);
        assert_eq!(game.direction, Direction::Up);

        let mut game = new_game();
        game.set_direction(Direction::Up);
        game.set_direction(Direction::Right);
        assert_eq!(game.direction, Direction::Right);
    }

    #[test]
    fn test_eating_food_grows_and_relocates() {
        let mut game = new_game();
        game.food = Position::new(3, 2);

        game.tick();

        assert_eq!(game.head, Position::new(3, 2));
        assert_eq!(game.score, 1);
        assert_eq!(game.length, 2);
        assert!(game.food.is_within(20));
        // Growth shows up on the following tick.
        assert!(game.trail.is_empty());

        game.food = FAR_AWAY;
        game.tick();
        assert_eq!(game.trail.iter().copied().collect::<Vec<_>>(), vec![Position::new(3, 2)]);
    }

    #[test]
    fn test_growth_after_k_meals() {
        let mut game = new_game();
        let k = 6;

        for _ in 0..k {
            eat_ahead(&mut game);
        }
        assert_eq!(game.score, k as u32);
        assert_eq!(game.length, 1 + k);
        assert_eq!(game.trail.len(), k - 1);

        game.food = FAR_AWAY;
        game.tick();
        assert_eq!(game.trail.len(), k);

        // Trail stays full (no further growth) while moving on
        for _ in 0..10 {
            game.food = FAR_AWAY;
            game.tick();
            assert_eq!(game.trail.len(), k);
        }
    }

    #[test]
    fn test_trail_evicts_oldest_first() {
        let mut game = new_game();
        eat_ahead(&mut game);
        eat_ahead(&mut game);
        // length 3, head (4,2)
        step(&mut game, Direction::Right);
        step(&mut game, Direction::Right);

        assert_eq!(game.head, Position::new(6, 2));
        assert_eq!(
            game.trail.iter().copied().collect::<Vec<_>>(),
            vec![Position::new(4, 2), Position::new(5, 2)]
        );
    }

    #[test]
    fn test_self_collision_ends_game() {
        let mut game = collided_game();

        assert_eq!(game.state, GameState::Over);
        // The colliding move is not applied
        assert_eq!(game.head, Position::new(5, 3));
        assert_eq!(game.score, 4);

        let frozen = game.snapshot();
        game.tick();
        game.set_direction(Direction::Right);
        game.tick();
        assert_eq!(game.snapshot(), frozen);
        assert!(frozen.is_over());
    }

    #[test]
    fn test_chasing_own_tail_is_safe() {
        // Four cells circling a 2x2 square: the head always enters the cell
        // the tail leaves on the same tick.
        let mut game = new_game();
        for _ in 0..3 {
            eat_ahead(&mut game);
        }
        assert_eq!(game.length, 4);

        for _ in 0..20 {
            for direction in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
                step(&mut game, direction);
                assert_eq!(game.state, GameState::Running, "died moving {:?}", direction);
            }
        }
        assert_eq!(game.trail.len(), 3);
    }

    #[test]
    fn test_wrapping_into_own_body_collides() {
        // A ring of four cells: four segments chase their tail round it
        // forever, five cannot fit.
        for (length, expected) in [(4, GameState::Running), (5, GameState::Over)] {
            let config = GameConfig::new(4)
                .with_head(Position::new(0, 0))
                .with_food(Position::new(0, 3));
            let mut game = Game::with_seed(config, 11).unwrap();
            game.length = length;

            for _ in 0..8 {
                step(&mut game, Direction::Right);
            }
            assert_eq!(game.state, expected, "length {}", length);
        }
    }

    #[test]
    fn test_reset_from_over() {
        let mut game = collided_game();
        game.reset();

        assert_eq!(game.snapshot(), new_game().snapshot());
        game.tick();
        assert_eq!(game.head, Position::new(3, 2));
    }

    #[test]
    fn test_snapshot_cell_precedence() {
        let mut game = new_game();
        eat_ahead(&mut game);
        eat_ahead(&mut game);

        let mut snapshot = game.snapshot();
        snapshot.food = snapshot.trail[0];

        assert_eq!(snapshot.cell_at(snapshot.head), Cell::Head);
        assert_eq!(snapshot.cell_at(snapshot.trail[0]), Cell::Body);

        snapshot.food = Position::new(9, 9);
        assert_eq!(snapshot.cell_at(Position::new(9, 9)), Cell::Food);
        assert_eq!(snapshot.cell_at(Position::new(0, 19)), Cell::Empty);
    }
}
