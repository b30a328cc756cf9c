//! Assorted constants & hard-coded configuration
use ratatui::{
    layout::Size,
    style::{Color, Modifier, Style},
};
use std::time::Duration;

/// Width and height of the (square) playing field, in cells
pub(crate) const GRID_SIZE: i32 = 20;

/// Number of cells in a freshly-spawned snake
pub(crate) const INITIAL_SNAKE_LENGTH: usize = 3;

/// Time between movements of the snake at the start of a game, in
/// milliseconds
pub(crate) const INITIAL_SPEED_MS: u64 = 150;

/// How much the time between movements shrinks each time food is eaten, in
/// milliseconds
pub(crate) const SPEED_STEP_MS: u64 = 5;

/// The shortest the time between movements can ever get, in milliseconds
pub(crate) const MIN_SPEED_MS: u64 = 50;

/// Points awarded for each piece of food eaten
pub(crate) const FOOD_SCORE: u32 = 10;

/// Number of random draws made when placing food before falling back to
/// choosing among the free cells directly
pub(crate) const FOOD_PLACEMENT_RETRIES: usize = 64;

/// Revival challenges that may be failed before the game is reset
pub(crate) const REVIVE_ATTEMPTS: u32 = 3;

/// Seconds allowed for answering each math question
pub(crate) const QUESTION_TIME_LIMIT: u32 = 10;

/// Countdown granularity for math questions
pub(crate) const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

/// How far back from the point of death a revived snake reappears
pub(crate) const REVIVAL_DISTANCE: i32 = 5;

/// Revived heads are kept at least this many cells away from every wall
pub(crate) const REVIVAL_MARGIN: i32 = 2;

/// A face whose center is left of this fraction of the frame width is in the
/// starting zone of the gesture
pub(crate) const LEFT_ZONE: f64 = 0.3;

/// A face whose center is right of this fraction of the frame width completes
/// the gesture
pub(crate) const RIGHT_ZONE: f64 = 0.7;

/// Draw everything inside a rectangle of this size in the center of the
/// terminal window.
///
/// Cf. [`crate::util::get_display_area()`]
pub(crate) const DISPLAY_SIZE: Size = Size {
    width: 80,
    height: 24,
};

/// Number of terminal columns used to draw one grid cell
pub(crate) const CELL_WIDTH: u16 = 2;

/// Glyph for the snake's head when it is moving north/up
pub(crate) const SNAKE_HEAD_NORTH_SYMBOL: char = 'v';

/// Glyph for the snake's head when it is moving south/down
pub(crate) const SNAKE_HEAD_SOUTH_SYMBOL: char = '^';

/// Glyph for the snake's head when it is moving east/right
pub(crate) const SNAKE_HEAD_EAST_SYMBOL: char = '<';

/// Glyph for the snake's head when it is moving west/left
pub(crate) const SNAKE_HEAD_WEST_SYMBOL: char = '>';

/// Glyph for the parts of the snake's body
pub(crate) const SNAKE_BODY_SYMBOL: char = '⚬';

/// Glyph for the food
pub(crate) const FOOD_SYMBOL: char = '●';

/// Glyph for the snake's head when it's collided with a wall or itself
pub(crate) const COLLISION_SYMBOL: char = '×';

/// Glyph marking where a revived snake will reappear
pub(crate) const REVIVAL_SYMBOL: char = '◌';

/// Style for the snake's head and body
pub(crate) const SNAKE_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

/// Style for the food
pub(crate) const FOOD_STYLE: Style = Style::new().fg(Color::LightRed);

/// Style for [`COLLISION_SYMBOL`]
pub(crate) const COLLISION_STYLE: Style = Style::new()
    .fg(Color::LightRed)
    .add_modifier(Modifier::REVERSED);

/// Style for [`REVIVAL_SYMBOL`]
pub(crate) const REVIVAL_STYLE: Style = Style::new()
    .fg(Color::White)
    .add_modifier(Modifier::SLOW_BLINK);

/// Style for key codes shown in the interface
pub(crate) const KEY_STYLE: Style = Style::new().fg(Color::Yellow);

/// Style for the score bar at the top of the game screen
pub(crate) const SCORE_BAR_STYLE: Style = Style::new().add_modifier(Modifier::REVERSED);

/// Style for the currently-selected menu item
pub(crate) const MENU_SELECTION_STYLE: Style = Style::new().add_modifier(Modifier::UNDERLINED);

/// Style for the countdown bar while there is plenty of time left
pub(crate) const TIMER_STYLE: Style = Style::new().fg(Color::Cyan);

/// Style for the countdown bar once [`TIMER_URGENT_SECONDS`] or fewer remain
pub(crate) const TIMER_URGENT_STYLE: Style = Style::new().fg(Color::LightRed);

/// Seconds remaining at or below which the countdown is drawn as urgent
pub(crate) const TIMER_URGENT_SECONDS: u32 = 3;
