//! The terminal-independent game engine: snake movement, death, and the
//! revival challenges
pub(crate) mod collision;
pub(crate) mod direction;
pub(crate) mod face;
pub(crate) mod grid;
pub(crate) mod math;
mod revive;
pub(crate) mod schedule;
mod snake;
#[cfg(test)]
mod tests;
use self::collision::{DeathCause, MoveOutcome};
use self::direction::Direction;
use self::face::{
    Camera, CameraError, FaceDetector, FaceGestureTracker, GesturePoll, GestureProgress,
};
use self::grid::{Cell, Grid};
use self::math::MathQuestion;
use self::revive::DeathRecord;
use self::schedule::{Activity, Epoch, Plan};
use self::snake::Snake;
use crate::consts;
use rand::{rngs::ThreadRng, Rng};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Time between movements of the snake
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Speed(u64);

impl Speed {
    /// Shorten the time between movements by one step, down to the minimum
    fn faster(self) -> Speed {
        Speed(
            self.0
                .saturating_sub(consts::SPEED_STEP_MS)
                .max(consts::MIN_SPEED_MS),
        )
    }

    pub(crate) fn interval(self) -> Duration {
        Duration::from_millis(self.0)
    }

    pub(crate) fn as_millis(self) -> u64 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Speed {
        Speed(consts::INITIAL_SPEED_MS)
    }
}

/// The engine's state machine.  Everything that only matters while dead
/// lives inside the variants that need it.
#[derive(Debug)]
enum Lifecycle {
    Running,
    /// The snake has died and the player has yet to pick a challenge
    AwaitingRevivalChoice { death: DeathRecord },
    MathChallenge {
        death: DeathRecord,
        question: MathQuestion,
        /// Whole seconds left to answer `question`
        remaining: u32,
    },
    /// The camera is held for exactly as long as this state lasts, via the
    /// tracker's frame source
    FaceChallenge {
        death: DeathRecord,
        tracker: FaceGestureTracker,
    },
}

/// Which state the engine is in, without any of the state's data
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Phase {
    Running,
    AwaitingRevivalChoice,
    MathChallenge,
    FaceChallenge,
}

/// Something noteworthy that an engine operation caused
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Event {
    AteFood {
        score: u32,
    },
    Died {
        cause: DeathCause,
        /// Position of the head when the snake died
        at: Cell,
    },
    Revived {
        head: Cell,
    },
    ChallengeFailed {
        reason: Failure,
        attempts_left: u32,
    },
    ChallengeAbandoned {
        attempts_left: u32,
    },
    Reset(ResetCause),
}

/// Why a math round was lost
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Failure {
    WrongAnswer,
    TimedOut,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ResetCause {
    /// The player asked to start over
    Requested,
    /// The last revival attempt was used up
    AttemptsExhausted,
}

/// Everything the interface needs in order to draw the game
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Snapshot {
    /// The snake's cells, head first.  While dead, this is the snake as it
    /// was at the moment of death.
    pub(crate) snake: Vec<Cell>,
    pub(crate) direction: Direction,
    pub(crate) food: Option<Cell>,
    pub(crate) score: u32,
    pub(crate) speed: Speed,
    pub(crate) phase: Phase,
    pub(crate) attempts: u32,
    /// Seconds left on the math question, if one is being asked
    pub(crate) countdown: Option<u32>,
    pub(crate) question: Option<String>,
    pub(crate) gesture: Option<GestureProgress>,
    /// Where the snake will reappear if revived
    pub(crate) revival_preview: Option<Cell>,
    /// Where the snake's head was when it died
    pub(crate) collision: Option<Cell>,
    pub(crate) death_cause: Option<DeathCause>,
}

#[derive(Debug)]
pub(crate) struct Engine<R = ThreadRng> {
    rng: R,
    grid: Grid,
    snake: Snake,
    food: Option<Cell>,
    speed: Speed,
    score: u32,
    attempts: u32,
    lifecycle: Lifecycle,
    epoch: Epoch,
    camera: Box<dyn Camera>,
    detector: Box<dyn FaceDetector>,
}

impl Engine<ThreadRng> {
    pub(crate) fn new(camera: Box<dyn Camera>, detector: Box<dyn FaceDetector>) -> Self {
        Engine::new_with_rng(camera, detector, rand::rng())
    }
}

impl<R: Rng> Engine<R> {
    pub(crate) fn new_with_rng(
        camera: Box<dyn Camera>,
        detector: Box<dyn FaceDetector>,
        mut rng: R,
    ) -> Engine<R> {
        let grid = Grid::default();
        let snake = Snake::initial();
        let food = grid.place_food(&snake, &mut rng);
        Engine {
            rng,
            grid,
            snake,
            food,
            speed: Speed::default(),
            score: 0,
            attempts: consts::REVIVE_ATTEMPTS,
            lifecycle: Lifecycle::Running,
            epoch: Epoch::default(),
            camera,
            detector,
        }
    }

    /// Steer the snake.  Ignored unless the snake is alive; returns `false`
    /// if the turn was not accepted.  A turn is rejected if it reverses either
    /// the current direction or the direction of the last move, so two quick
    /// turns between ticks can't fold the snake back onto its neck.
    pub(crate) fn turn(&mut self, direction: Direction) -> bool {
        if !matches!(self.lifecycle, Lifecycle::Running) {
            return false;
        }
        let accepted = self.snake.turn(direction);
        trace!(?direction, accepted, "turn");
        accepted
    }

    /// Move the snake one cell
    pub(crate) fn tick(&mut self) -> Option<Event> {
        if !matches!(self.lifecycle, Lifecycle::Running) {
            return None;
        }
        let probe = collision::probe(&self.snake, self.snake.direction(), self.food, self.grid);
        if let Some(cause) = probe.outcome.death_cause() {
            let death = DeathRecord::capture(&self.snake, cause);
            let at = death.head;
            info!(?cause, head = ?at, length = death.length, score = self.score, "snake died");
            self.enter(Lifecycle::AwaitingRevivalChoice { death });
            return Some(Event::Died { cause, at });
        }
        let ate = probe.outcome == MoveOutcome::FoodEaten;
        self.snake.advance(probe.head, ate);
        if ate {
            self.score += consts::FOOD_SCORE;
            self.speed = self.speed.faster();
            self.food = self.grid.place_food(&self.snake, &mut self.rng);
            debug!(
                score = self.score,
                length = self.snake.len(),
                speed_ms = self.speed.as_millis(),
                food = ?self.food,
                "food eaten"
            );
            Some(Event::AteFood { score: self.score })
        } else {
            None
        }
    }

    /// Start a math challenge.  Returns `false` if the game isn't waiting for
    /// a challenge to be chosen.
    pub(crate) fn choose_math(&mut self) -> bool {
        if self.phase() != Phase::AwaitingRevivalChoice {
            return false;
        }
        let Some(death) = self.take_death() else {
            return false;
        };
        let question = MathQuestion::generate(&mut self.rng);
        info!(%question, attempts = self.attempts, "math challenge started");
        self.enter(Lifecycle::MathChallenge {
            death,
            question,
            remaining: consts::QUESTION_TIME_LIMIT,
        });
        true
    }

    /// Start a face challenge.  Returns `Ok(false)` if the game isn't waiting
    /// for a challenge to be chosen.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the camera could not be acquired.  In that case,
    /// nothing changes and no attempt is used up.
    pub(crate) fn choose_face(&mut self) -> Result<bool, CameraError> {
        if self.phase() != Phase::AwaitingRevivalChoice {
            return Ok(false);
        }
        let source = match self.camera.acquire() {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "could not acquire camera");
                return Err(e);
            }
        };
        let Some(death) = self.take_death() else {
            return Ok(false);
        };
        info!(attempts = self.attempts, "face challenge started");
        self.enter(Lifecycle::FaceChallenge {
            death,
            tracker: FaceGestureTracker::new(source),
        });
        Ok(true)
    }

    /// Answer the current math question
    pub(crate) fn submit_answer(&mut self, input: &str) -> Option<Event> {
        let (correct, expected) = match &self.lifecycle {
            Lifecycle::MathChallenge { question, .. } => (question.check(input), question.answer()),
            _ => return None,
        };
        if correct {
            let death = self.take_death()?;
            Some(self.revive(death))
        } else {
            debug!(input, expected, "wrong answer");
            Some(self.fail_math_round(Failure::WrongAnswer))
        }
    }

    /// Take one second off the math question's timer
    pub(crate) fn countdown_tick(&mut self) -> Option<Event> {
        let Lifecycle::MathChallenge { remaining, .. } = &mut self.lifecycle else {
            return None;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            Some(self.fail_math_round(Failure::TimedOut))
        } else {
            None
        }
    }

    /// Check the camera for progress on the face gesture
    pub(crate) fn poll_face(&mut self) -> Option<Event> {
        let Lifecycle::FaceChallenge { tracker, .. } = &mut self.lifecycle else {
            return None;
        };
        let poll = tracker.poll(self.detector.as_mut());
        if poll == GesturePoll::Completed {
            let death = self.take_death()?;
            Some(self.revive(death))
        } else {
            None
        }
    }

    /// Give up on the current challenge.  This costs an attempt, same as
    /// failing it.
    pub(crate) fn abort_challenge(&mut self) -> Option<Event> {
        if !matches!(self.phase(), Phase::MathChallenge | Phase::FaceChallenge) {
            return None;
        }
        // Leaving the challenge state drops the face tracker, if any, and
        // with it the camera.
        let death = self.take_death()?;
        self.attempts = self.attempts.saturating_sub(1);
        info!(attempts_left = self.attempts, "challenge abandoned");
        if self.attempts == 0 {
            return Some(self.reset_with(ResetCause::AttemptsExhausted));
        }
        self.enter(Lifecycle::AwaitingRevivalChoice { death });
        Some(Event::ChallengeAbandoned {
            attempts_left: self.attempts,
        })
    }

    /// Start a new game from scratch.  Allowed in every state.
    pub(crate) fn reset(&mut self) -> Event {
        self.reset_with(ResetCause::Requested)
    }

    /// Run a scheduled activity.  Activities scheduled under an earlier epoch
    /// are ignored.
    pub(crate) fn fire(&mut self, activity: Activity, epoch: Epoch) -> Option<Event> {
        if epoch != self.epoch {
            trace!(?activity, "ignoring stale activity");
            return None;
        }
        match activity {
            Activity::Movement => self.tick(),
            Activity::Countdown => self.countdown_tick(),
            Activity::FacePoll => self.poll_face(),
        }
    }

    fn fail_math_round(&mut self, reason: Failure) -> Event {
        self.attempts = self.attempts.saturating_sub(1);
        info!(?reason, attempts_left = self.attempts, "math challenge failed");
        if self.attempts == 0 {
            return self.reset_with(ResetCause::AttemptsExhausted);
        }
        let fresh = MathQuestion::generate(&mut self.rng);
        if let Lifecycle::MathChallenge {
            question,
            remaining,
            ..
        } = &mut self.lifecycle
        {
            *question = fresh;
            *remaining = consts::QUESTION_TIME_LIMIT;
        }
        // The new round gets a countdown of its own
        self.epoch = self.epoch.next();
        Event::ChallengeFailed {
            reason,
            attempts_left: self.attempts,
        }
    }

    fn revive(&mut self, death: DeathRecord) -> Event {
        let revival = revive::reconstruct(&death, self.grid);
        self.snake = Snake::from_cells(revival.body, revival.direction);
        if self.food.is_none_or(|f| self.snake.occupies(f)) {
            self.food = self.grid.place_food(&self.snake, &mut self.rng);
        }
        info!(
            head = ?revival.head,
            length = death.length,
            attempts = self.attempts,
            "snake revived"
        );
        self.enter(Lifecycle::Running);
        Event::Revived { head: revival.head }
    }

    fn reset_with(&mut self, cause: ResetCause) -> Event {
        self.snake = Snake::initial();
        self.score = 0;
        self.speed = Speed::default();
        self.attempts = consts::REVIVE_ATTEMPTS;
        self.food = self.grid.place_food(&self.snake, &mut self.rng);
        self.enter(Lifecycle::Running);
        info!(?cause, "game reset");
        Event::Reset(cause)
    }
}

impl<R> Engine<R> {
    pub(crate) fn grid(&self) -> Grid {
        self.grid
    }

    pub(crate) fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub(crate) fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Running => Phase::Running,
            Lifecycle::AwaitingRevivalChoice { .. } => Phase::AwaitingRevivalChoice,
            Lifecycle::MathChallenge { .. } => Phase::MathChallenge,
            Lifecycle::FaceChallenge { .. } => Phase::FaceChallenge,
        }
    }

    /// The periodic activity the current state wants run, if any
    pub(crate) fn plan(&self) -> Option<Plan> {
        match self.lifecycle {
            Lifecycle::Running => Some(Plan {
                activity: Activity::Movement,
                period: self.speed.interval(),
            }),
            Lifecycle::AwaitingRevivalChoice { .. } => None,
            Lifecycle::MathChallenge { .. } => Some(Plan {
                activity: Activity::Countdown,
                period: consts::COUNTDOWN_PERIOD,
            }),
            Lifecycle::FaceChallenge { ref tracker, .. } => Some(Plan {
                activity: Activity::FacePoll,
                period: tracker.frame_interval(),
            }),
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot {
            snake: self.snake.cells().collect(),
            direction: self.snake.direction(),
            food: self.food,
            score: self.score,
            speed: self.speed,
            phase: self.phase(),
            attempts: self.attempts,
            countdown: None,
            question: None,
            gesture: None,
            revival_preview: None,
            collision: None,
            death_cause: None,
        };
        let death = match self.lifecycle {
            Lifecycle::Running => return snap,
            Lifecycle::AwaitingRevivalChoice { ref death } => death,
            Lifecycle::MathChallenge {
                ref death,
                ref question,
                remaining,
            } => {
                snap.question = Some(question.to_string());
                snap.countdown = Some(remaining);
                death
            }
            Lifecycle::FaceChallenge {
                ref death,
                ref tracker,
            } => {
                snap.gesture = Some(tracker.progress());
                death
            }
        };
        snap.snake.clone_from(&death.body);
        snap.direction = death.direction;
        snap.revival_preview = Some(revive::revival_head(death.head, death.direction, self.grid));
        snap.collision = Some(death.head);
        snap.death_cause = Some(death.cause);
        snap
    }

    /// Move to a new state, cancelling everything scheduled for the old one
    fn enter(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
        self.epoch = self.epoch.next();
        debug!(phase = ?self.phase(), epoch = ?self.epoch, "entered new state");
    }

    /// Leave the current state, returning its death record if it has one.
    /// The engine is left in [`Lifecycle::Running`] until the caller enters
    /// some other state.
    fn take_death(&mut self) -> Option<DeathRecord> {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Running) {
            Lifecycle::Running => None,
            Lifecycle::AwaitingRevivalChoice { death }
            | Lifecycle::MathChallenge { death, .. }
            | Lifecycle::FaceChallenge { death, .. } => Some(death),
        }
    }
}
