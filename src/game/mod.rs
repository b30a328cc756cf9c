mod confirm;
use self::confirm::{ConfirmOpt, ConfirmReset};
use crate::app::Screen;
use crate::camera::FaceJoystick;
use crate::command::Command;
use crate::consts;
use crate::engine::collision::DeathCause;
use crate::engine::direction::Direction;
use crate::engine::face::{GestureProgress, GestureStage};
use crate::engine::grid::Cell;
use crate::engine::schedule::Scheduler;
use crate::engine::{Engine, Event, Failure, Phase, ResetCause, Snapshot};
use crate::util::{center_rect, get_display_area};
use crate::warning::{Warning, WarningOutcome};
use crossterm::event::{poll, read, Event as TermEvent};
use rand::{rngs::ThreadRng, Rng};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Position, Rect, Size},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Widget},
    Frame,
};
use std::collections::VecDeque;
use std::time::Instant;

/// Longest answer that can be typed in, sign included
const MAX_ANSWER_LEN: usize = 6;

/// Width of the face-position track shown during a face challenge
const TRACK_WIDTH: u32 = 30;

#[derive(Debug)]
pub(crate) struct Game<R = ThreadRng> {
    engine: Engine<R>,
    scheduler: Scheduler,
    /// The answer being typed in during a math challenge
    answer: String,
    confirm: Option<ConfirmReset>,
    /// Pending warnings; the first one is on screen
    warnings: VecDeque<Warning>,
    /// Message about the most recent thing that happened
    notice: Option<String>,
    /// Steers the simulated camera, if that's the camera in use
    joystick: Option<FaceJoystick>,
}

impl<R> Game<R> {
    pub(crate) fn new(engine: Engine<R>, joystick: Option<FaceJoystick>) -> Game<R> {
        Game {
            engine,
            scheduler: Scheduler::new(),
            answer: String::new(),
            confirm: None,
            warnings: VecDeque::new(),
            notice: None,
            joystick,
        }
    }

    pub(crate) fn push_warning(&mut self, warning: Warning) {
        self.warnings.push_back(warning);
    }

    pub(crate) fn draw(&self, frame: &mut Frame<'_>) {
        frame.render_widget(self, frame.area());
    }

    /// Whether a pop-up is covering the game, in which case nothing moves
    fn paused(&self) -> bool {
        self.confirm.is_some() || !self.warnings.is_empty()
    }

    fn note(&mut self, event: Event) {
        if !matches!(event, Event::AteFood { .. }) {
            self.answer.clear();
        }
        self.notice = Some(match event {
            Event::AteFood { score } => format!("Yum! Score is now {score}."),
            Event::Died {
                cause: DeathCause::Wall,
                ..
            } => String::from("You hit the wall!"),
            Event::Died {
                cause: DeathCause::SelfCollision,
                ..
            } => String::from("You ran into yourself!"),
            Event::Revived { .. } => String::from("Revived! Keep going."),
            Event::ChallengeFailed {
                reason: Failure::WrongAnswer,
                attempts_left,
            } => format!("Wrong answer! {}.", revives_left(attempts_left)),
            Event::ChallengeFailed {
                reason: Failure::TimedOut,
                attempts_left,
            } => format!("Time's up! {}.", revives_left(attempts_left)),
            Event::ChallengeAbandoned { attempts_left } => {
                format!("Challenge abandoned. {}.", revives_left(attempts_left))
            }
            Event::Reset(ResetCause::AttemptsExhausted) => {
                String::from("Out of revives. Starting over.")
            }
            Event::Reset(ResetCause::Requested) => String::from("New game."),
        });
    }
}

impl<R: Rng> Game<R> {
    pub(crate) fn process_input(&mut self) -> std::io::Result<Option<Screen>> {
        if let Some(when) = self.sync_timers(Instant::now()) {
            let wait = when.saturating_duration_since(Instant::now());
            if wait.is_zero() || !poll(wait)? {
                self.run_due(Instant::now());
                return Ok(None);
            }
        }
        Ok(self.handle_event(read()?))
    }

    /// Returns when the next timed activity is due.  Nothing is due while a
    /// pop-up is open; the clock picks up where it stopped once it closes.
    fn sync_timers(&mut self, now: Instant) -> Option<Instant> {
        if self.paused() {
            self.scheduler.pause(now);
            None
        } else {
            self.scheduler
                .sync(self.engine.plan(), self.engine.epoch(), now)
        }
    }

    fn run_due(&mut self, now: Instant) {
        if let Some((activity, epoch)) = self.scheduler.take_due(now) {
            if let Some(event) = self.engine.fire(activity, epoch) {
                self.note(event);
            }
        }
    }

    fn handle_event(&mut self, event: TermEvent) -> Option<Screen> {
        if let Some(warning) = self.warnings.front_mut() {
            let cmd = Command::from_key_event(event.as_key_press_event()?)?;
            match warning.handle_command(cmd)? {
                WarningOutcome::Dismissed => {
                    let _ = self.warnings.pop_front();
                }
                WarningOutcome::Quit => return Some(Screen::Quit),
            }
            return None;
        }
        if let Some(confirm) = self.confirm.as_mut() {
            let choice = confirm.handle_event(event)?;
            self.confirm = None;
            if choice == ConfirmOpt::Restart {
                let event = self.engine.reset();
                self.note(event);
            }
            return None;
        }
        let cmd = Command::from_key_event(event.as_key_press_event()?)?;
        match (self.engine.phase(), cmd) {
            (_, Command::Quit) => return Some(Screen::Quit),
            (Phase::MathChallenge, Command::Digit(c)) => {
                if self.answer.len() < MAX_ANSWER_LEN {
                    self.answer.push(c);
                }
            }
            (Phase::MathChallenge, Command::Minus) if self.answer.is_empty() => {
                self.answer.push('-');
            }
            (Phase::MathChallenge, Command::Backspace) => {
                let _ = self.answer.pop();
            }
            (Phase::MathChallenge, Command::Enter) => {
                let answer = std::mem::take(&mut self.answer);
                if let Some(event) = self.engine.submit_answer(&answer) {
                    self.note(event);
                }
            }
            (Phase::MathChallenge | Phase::FaceChallenge, Command::Esc) => {
                if let Some(event) = self.engine.abort_challenge() {
                    self.note(event);
                }
            }
            (Phase::FaceChallenge, Command::Left) => {
                if let Some(ref joystick) = self.joystick {
                    joystick.left();
                }
            }
            (Phase::FaceChallenge, Command::Right) => {
                if let Some(ref joystick) = self.joystick {
                    joystick.right();
                }
            }
            (Phase::Running, Command::Up) => {
                self.engine.turn(Direction::Up);
            }
            (Phase::Running, Command::Down) => {
                self.engine.turn(Direction::Down);
            }
            (Phase::Running, Command::Left) => {
                self.engine.turn(Direction::Left);
            }
            (Phase::Running, Command::Right) => {
                self.engine.turn(Direction::Right);
            }
            (Phase::AwaitingRevivalChoice, Command::M | Command::Digit('1')) => {
                self.answer.clear();
                self.engine.choose_math();
            }
            (Phase::AwaitingRevivalChoice, Command::F | Command::Digit('2')) => {
                if let Err(e) = self.engine.choose_face() {
                    self.push_warning(Warning::from(e));
                }
            }
            (_, Command::R) => self.confirm = Some(ConfirmReset::new()),
            (_, Command::Q) => return Some(Screen::Quit),
            _ => (),
        }
        None
    }
}

fn revives_left(attempts: u32) -> String {
    if attempts == 1 {
        String::from("1 revive left")
    } else {
        format!("{attempts} revives left")
    }
}

impl<R> Widget for &Game<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.engine.snapshot();
        let display = get_display_area(area);
        let [score_area, main_area, notice_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(display);
        Line::styled(format!(" Score: {}", snap.score), consts::SCORE_BAR_STYLE)
            .render(score_area, buf);

        let grid = self.engine.grid();
        let board_size = Size {
            width: u16::try_from(grid.width)
                .unwrap_or_default()
                .saturating_mul(consts::CELL_WIDTH)
                .saturating_add(2),
            height: u16::try_from(grid.height)
                .unwrap_or_default()
                .saturating_add(2),
        };
        let [_, board_column, _, panel_area] = Layout::horizontal([
            Constraint::Length(1),
            Constraint::Length(board_size.width),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(main_area);
        let block_area = Rect {
            height: board_size.height.min(board_column.height),
            ..board_column
        };
        let block = Block::bordered();
        let board_area = block.inner(block_area);
        block.render(block_area, buf);
        draw_board(
            &snap,
            &mut Canvas {
                area: board_area,
                buf,
            },
        );

        self.side_panel(&snap).render(panel_area, buf);
        if let Some(ref notice) = self.notice {
            Line::from(format!(" {notice}")).render(notice_area, buf);
        }

        if let Some(confirm) = self.confirm {
            let confirm_area = center_rect(
                display,
                Size {
                    width: ConfirmReset::WIDTH,
                    height: ConfirmReset::HEIGHT,
                },
            );
            confirm.render(confirm_area, buf);
        }
        if let Some(warning) = self.warnings.front() {
            warning.render(display, buf);
        }
    }
}

impl<R> Game<R> {
    fn side_panel(&self, snap: &Snapshot) -> Text<'static> {
        let mut lines = Vec::new();
        match snap.phase {
            Phase::Running => {
                lines.push(Line::from(format!("Length: {}", snap.snake.len())));
                lines.push(Line::from(format!(
                    "Speed: {} ms",
                    snap.speed.as_millis()
                )));
                lines.push(Line::from(format!("Revives: {}", snap.attempts)));
                lines.push(Line::default());
                lines.push(key_help("←↑↓→", "steer"));
                lines.push(key_help("r", "restart"));
                lines.push(key_help("q", "quit"));
            }
            Phase::AwaitingRevivalChoice => {
                lines.push(Line::from(match snap.death_cause {
                    Some(DeathCause::SelfCollision) => "Your snake bit itself.",
                    _ => "Your snake hit the wall.",
                }));
                lines.push(Line::from(format!("Revives left: {}", snap.attempts)));
                lines.push(Line::default());
                lines.push(Line::from("Choose a challenge:"));
                lines.push(key_help("m", "math question"));
                lines.push(key_help("f", "face gesture"));
                lines.push(Line::default());
                lines.push(key_help("r", "restart"));
                lines.push(key_help("q", "quit"));
            }
            Phase::MathChallenge => {
                lines.push(Line::from("Solve to revive:"));
                lines.push(Line::default());
                if let Some(ref question) = snap.question {
                    lines.push(Line::from(format!("  {question}")));
                }
                lines.push(Line::default());
                lines.push(Line::from(format!("Answer: {}_", self.answer)));
                lines.push(Line::default());
                if let Some(remaining) = snap.countdown {
                    lines.push(countdown_bar(remaining));
                }
                lines.push(Line::from(format!("Revives left: {}", snap.attempts)));
                lines.push(Line::default());
                lines.push(key_help("Enter", "submit"));
                lines.push(key_help("Esc", "give up"));
            }
            Phase::FaceChallenge => {
                let progress = snap.gesture.unwrap_or(GestureProgress {
                    stage: GestureStage::AwaitingLeftZone,
                    face_position: None,
                });
                lines.push(Line::from("Move your face to revive:"));
                lines.push(Line::default());
                lines.push(Line::from(match progress.stage {
                    GestureStage::AwaitingLeftZone => "Step 1: over to the LEFT",
                    GestureStage::LeftZoneConfirmed => "Step 2: now to the RIGHT",
                }));
                lines.push(face_track(progress.face_position));
                if progress.face_position.is_none() {
                    lines.push(Line::from("No face seen yet"));
                }
                lines.push(Line::from(format!("Revives left: {}", snap.attempts)));
                lines.push(Line::default());
                if self.joystick.is_some() {
                    lines.push(key_help("←/→", "move face"));
                }
                lines.push(key_help("Esc", "give up"));
            }
        }
        Text::from(lines)
    }
}

fn key_help(key: &'static str, action: &'static str) -> Line<'static> {
    Line::from_iter([
        Span::styled(format!("{key:<6}"), consts::KEY_STYLE),
        Span::raw(action),
    ])
}

fn countdown_bar(remaining: u32) -> Line<'static> {
    let total = consts::QUESTION_TIME_LIMIT;
    let filled = remaining.min(total);
    let style = if remaining <= consts::TIMER_URGENT_SECONDS {
        consts::TIMER_URGENT_STYLE
    } else {
        consts::TIMER_STYLE
    };
    let bar = (0..total)
        .map(|i| if i < filled { '█' } else { '░' })
        .collect::<String>();
    Line::from_iter([
        Span::styled(bar, style),
        Span::raw(format!(" {remaining}s")),
    ])
}

/// A horizontal track across the camera's view with the starting and
/// finishing zones shaded and the face marked
fn face_track(position: Option<f64>) -> Line<'static> {
    let width = f64::from(TRACK_WIDTH);
    let mut face_drawn = false;
    let spans = (0..TRACK_WIDTH).map(|i| {
        let start = f64::from(i) / width;
        let end = f64::from(i + 1) / width;
        let here = position.is_some_and(|p| start <= p && (p < end || i + 1 == TRACK_WIDTH));
        if here && !face_drawn {
            face_drawn = true;
            Span::styled("O", consts::SNAKE_STYLE)
        } else if end <= consts::LEFT_ZONE || start >= consts::RIGHT_ZONE {
            Span::raw("░")
        } else {
            Span::raw("─")
        }
    });
    Line::from_iter(spans)
}

fn draw_board(snap: &Snapshot, board: &mut Canvas<'_>) {
    for &cell in snap.snake.iter().skip(1) {
        board.draw_cell(cell, consts::SNAKE_BODY_SYMBOL, consts::SNAKE_STYLE);
    }
    if let Some(food) = snap.food {
        board.draw_cell(food, consts::FOOD_SYMBOL, consts::FOOD_STYLE);
    }
    if let Some(cell) = snap.revival_preview {
        board.draw_cell(cell, consts::REVIVAL_SYMBOL, consts::REVIVAL_STYLE);
    }
    // Draw the head last so that, if it's a collision, we overwrite
    // whatever it's colliding with
    if let Some(cell) = snap.collision {
        board.draw_cell(cell, consts::COLLISION_SYMBOL, consts::COLLISION_STYLE);
    } else if let Some(&head) = snap.snake.first() {
        board.draw_cell(head, head_symbol(snap.direction), consts::SNAKE_STYLE);
    }
}

fn head_symbol(direction: Direction) -> char {
    match direction {
        Direction::Up => consts::SNAKE_HEAD_NORTH_SYMBOL,
        Direction::Down => consts::SNAKE_HEAD_SOUTH_SYMBOL,
        Direction::Left => consts::SNAKE_HEAD_WEST_SYMBOL,
        Direction::Right => consts::SNAKE_HEAD_EAST_SYMBOL,
    }
}

/// The inside of the board.  Each grid cell takes up
/// [`CELL_WIDTH`][consts::CELL_WIDTH] columns, with the glyph in the first.
#[derive(Debug, Eq, PartialEq)]
struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl Canvas<'_> {
    /// Draw `symbol` at `cell`.  Cells off the board, such as the tail of a
    /// snake revived next to a wall, are skipped.
    fn draw_cell(&mut self, cell: Cell, symbol: char, style: Style) {
        let (Ok(col), Ok(row)) = (u16::try_from(cell.x), u16::try_from(cell.y)) else {
            return;
        };
        let Some(x) = col
            .checked_mul(consts::CELL_WIDTH)
            .and_then(|dx| self.area.x.checked_add(dx))
        else {
            return;
        };
        let Some(y) = self.area.y.checked_add(row) else {
            return;
        };
        if !self.area.contains(Position::new(x, y)) {
            return;
        }
        if let Some(c) = self.buf.cell_mut((x, y)) {
            c.set_char(symbol);
            c.set_style(Style::reset().patch(style));
        }
    }
}
