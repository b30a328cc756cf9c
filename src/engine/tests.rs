use super::face::testing::{face_at, ScriptedCamera, ScriptedDetector};
use super::face::{CameraError, GestureStage};
use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::collections::HashSet;
use std::rc::Rc;

const RNG_SEED: u64 = 0x0123456789ABCDEF;

fn engine_with(camera: ScriptedCamera) -> Engine<ChaCha12Rng> {
    Engine::new_with_rng(
        Box::new(camera),
        Box::new(ScriptedDetector::default()),
        ChaCha12Rng::seed_from_u64(RNG_SEED),
    )
}

fn engine() -> Engine<ChaCha12Rng> {
    engine_with(ScriptedCamera::new([]))
}

/// Put the snake against the right wall and run it into it
fn kill(engine: &mut Engine<ChaCha12Rng>) {
    engine.snake = Snake::straight(Cell::new(19, 5), Direction::Right, 3);
    engine.food = None;
    assert_eq!(
        engine.tick(),
        Some(Event::Died {
            cause: DeathCause::Wall,
            at: Cell::new(19, 5)
        })
    );
    assert_eq!(engine.phase(), Phase::AwaitingRevivalChoice);
}

fn current_answer(engine: &Engine<ChaCha12Rng>) -> i64 {
    match engine.lifecycle {
        Lifecycle::MathChallenge { ref question, .. } => question.answer(),
        ref other => panic!("no math question in {other:?}"),
    }
}

/// The question the engine should ask next, given the state of its RNG
fn next_question(engine: &Engine<ChaCha12Rng>) -> MathQuestion {
    MathQuestion::generate(&mut engine.rng.clone())
}

fn current_question(engine: &Engine<ChaCha12Rng>) -> MathQuestion {
    match engine.lifecycle {
        Lifecycle::MathChallenge { question, .. } => question,
        ref other => panic!("no math question in {other:?}"),
    }
}

fn wrong_answer(engine: &Engine<ChaCha12Rng>) -> String {
    (current_answer(engine) + 1).to_string()
}

fn assert_fresh_game(engine: &Engine<ChaCha12Rng>) {
    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::Running);
    assert_eq!(
        snap.snake,
        [Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)]
    );
    assert_eq!(snap.direction, Direction::Right);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.speed, Speed::default());
    assert_eq!(snap.attempts, consts::REVIVE_ATTEMPTS);
    assert!(snap.food.is_some_and(|f| !snap.snake.contains(&f)));
}

#[test]
fn new_engine() {
    let engine = engine();
    assert_fresh_game(&engine);
    assert_eq!(
        engine.plan(),
        Some(Plan {
            activity: Activity::Movement,
            period: Duration::from_millis(150)
        })
    );
}

#[test]
fn plain_tick_moves_snake() {
    let mut engine = engine();
    engine.food = None;
    assert_eq!(engine.tick(), None);
    assert_eq!(
        engine.snapshot().snake,
        [Cell::new(6, 5), Cell::new(5, 5), Cell::new(4, 5)]
    );
}

#[test]
fn eating_grows_and_speeds_up() {
    let mut engine = engine();
    engine.food = Some(Cell::new(6, 5));
    assert_eq!(engine.tick(), Some(Event::AteFood { score: 10 }));
    let snap = engine.snapshot();
    assert_eq!(snap.snake.len(), 4);
    assert_eq!(snap.speed.as_millis(), 145);
    assert!(snap.food.is_some_and(|f| !snap.snake.contains(&f)));
    assert_eq!(
        engine.plan().map(|p| p.period),
        Some(Duration::from_millis(145))
    );
}

#[test]
fn speed_has_floor() {
    let mut speed = Speed::default();
    for _ in 0..100 {
        speed = speed.faster();
    }
    assert_eq!(speed.as_millis(), consts::MIN_SPEED_MS);
}

#[test]
fn reversal_rejected() {
    let mut engine = engine();
    assert!(!engine.turn(Direction::Left));
    assert!(engine.turn(Direction::Down));
    assert!(!engine.turn(Direction::Left));
    engine.food = None;
    assert_eq!(engine.tick(), None);
    assert_eq!(engine.snapshot().snake[0], Cell::new(5, 6));
    assert!(engine.turn(Direction::Left));
}

#[test]
fn self_collision_is_death() {
    let mut engine = engine();
    engine.snake = Snake::from_cells(
        [
            Cell::new(5, 5),
            Cell::new(5, 4),
            Cell::new(4, 4),
            Cell::new(4, 5),
            Cell::new(4, 6),
        ],
        Direction::Down,
    );
    assert!(engine.turn(Direction::Left));
    assert_eq!(
        engine.tick(),
        Some(Event::Died {
            cause: DeathCause::SelfCollision,
            at: Cell::new(5, 5)
        })
    );
    let snap = engine.snapshot();
    assert_eq!(snap.death_cause, Some(DeathCause::SelfCollision));
    assert_eq!(snap.collision, Some(Cell::new(5, 5)));
    assert_eq!(snap.snake.len(), 5);
}

#[test]
fn dead_snake_ignores_movement() {
    let mut engine = engine();
    kill(&mut engine);
    let before = engine.snapshot();
    assert!(!engine.turn(Direction::Up));
    assert_eq!(engine.tick(), None);
    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.plan(), None);
    assert_eq!(before.revival_preview, Some(Cell::new(14, 5)));
    assert_eq!(before.collision, Some(Cell::new(19, 5)));
}

#[test]
fn math_revival() {
    let mut engine = engine();
    engine.score = 70;
    kill(&mut engine);
    assert!(engine.choose_math());
    assert!(!engine.choose_math());
    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::MathChallenge);
    assert_eq!(snap.countdown, Some(consts::QUESTION_TIME_LIMIT));
    assert!(snap.question.is_some());
    let answer = current_answer(&engine).to_string();
    assert_eq!(
        engine.submit_answer(&answer),
        Some(Event::Revived {
            head: Cell::new(14, 5)
        })
    );
    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::Running);
    assert_eq!(
        snap.snake,
        [Cell::new(14, 5), Cell::new(13, 5), Cell::new(12, 5)]
    );
    assert_eq!(snap.direction, Direction::Right);
    assert_eq!(snap.attempts, consts::REVIVE_ATTEMPTS);
    assert_eq!(snap.score, 70);
    assert_eq!(snap.revival_preview, None);
    assert_eq!(snap.collision, None);
}

#[test]
fn wrong_answers_exhaust_attempts() {
    let mut engine = engine();
    engine.score = 30;
    kill(&mut engine);
    assert!(engine.choose_math());
    let wrong = wrong_answer(&engine);
    let fresh = next_question(&engine);
    assert_eq!(
        engine.submit_answer(&wrong),
        Some(Event::ChallengeFailed {
            reason: Failure::WrongAnswer,
            attempts_left: 2
        })
    );
    assert_eq!(engine.phase(), Phase::MathChallenge);
    assert_eq!(current_question(&engine), fresh);
    assert_eq!(engine.snapshot().countdown, Some(consts::QUESTION_TIME_LIMIT));
    let fresh = next_question(&engine);
    assert_eq!(
        engine.submit_answer("not a number"),
        Some(Event::ChallengeFailed {
            reason: Failure::WrongAnswer,
            attempts_left: 1
        })
    );
    assert_eq!(current_question(&engine), fresh);
    let wrong = wrong_answer(&engine);
    assert_eq!(
        engine.submit_answer(&wrong),
        Some(Event::Reset(ResetCause::AttemptsExhausted))
    );
    assert_fresh_game(&engine);
}

#[test]
fn countdown_expiries_exhaust_attempts() {
    let mut engine = engine();
    engine.score = 50;
    kill(&mut engine);
    assert!(engine.choose_math());
    for attempts_left in (1..consts::REVIVE_ATTEMPTS).rev() {
        let fresh = next_question(&engine);
        for _ in 1..consts::QUESTION_TIME_LIMIT {
            assert_eq!(engine.countdown_tick(), None);
        }
        assert_eq!(
            engine.countdown_tick(),
            Some(Event::ChallengeFailed {
                reason: Failure::TimedOut,
                attempts_left
            })
        );
        assert_eq!(current_question(&engine), fresh);
        assert_eq!(engine.snapshot().countdown, Some(consts::QUESTION_TIME_LIMIT));
    }
    for _ in 1..consts::QUESTION_TIME_LIMIT {
        assert_eq!(engine.countdown_tick(), None);
    }
    assert_eq!(
        engine.countdown_tick(),
        Some(Event::Reset(ResetCause::AttemptsExhausted))
    );
    assert_fresh_game(&engine);
}

#[test]
fn countdown_expiry_fails_round() {
    let mut engine = engine();
    kill(&mut engine);
    assert!(engine.choose_math());
    for left in (1..consts::QUESTION_TIME_LIMIT).rev() {
        assert_eq!(engine.countdown_tick(), None);
        assert_eq!(engine.snapshot().countdown, Some(left));
    }
    assert_eq!(
        engine.countdown_tick(),
        Some(Event::ChallengeFailed {
            reason: Failure::TimedOut,
            attempts_left: 2
        })
    );
    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::MathChallenge);
    assert_eq!(snap.countdown, Some(consts::QUESTION_TIME_LIMIT));
}

#[test]
fn countdown_only_during_math() {
    let mut engine = engine();
    assert_eq!(engine.countdown_tick(), None);
    kill(&mut engine);
    assert_eq!(engine.countdown_tick(), None);
    assert_eq!(engine.submit_answer("0"), None);
    assert_eq!(engine.snapshot().attempts, consts::REVIVE_ATTEMPTS);
}

#[test]
fn stale_countdown_is_ignored() {
    let mut engine = engine();
    kill(&mut engine);
    assert!(engine.choose_math());
    let first_round = engine.epoch();
    assert_eq!(
        engine.plan().map(|p| p.activity),
        Some(Activity::Countdown)
    );
    let wrong = wrong_answer(&engine);
    let _ = engine.submit_answer(&wrong);
    assert_ne!(engine.epoch(), first_round);
    assert_eq!(engine.fire(Activity::Countdown, first_round), None);
    assert_eq!(engine.snapshot().countdown, Some(consts::QUESTION_TIME_LIMIT));
    let current = engine.epoch();
    assert_eq!(engine.fire(Activity::Countdown, current), None);
    assert_eq!(
        engine.snapshot().countdown,
        Some(consts::QUESTION_TIME_LIMIT - 1)
    );
}

#[test]
fn stale_movement_after_death_is_ignored() {
    let mut engine = engine();
    let alive = engine.epoch();
    kill(&mut engine);
    let before = engine.snapshot();
    assert_eq!(engine.fire(Activity::Movement, alive), None);
    assert_eq!(engine.snapshot(), before);
}

#[test]
fn face_revival_releases_camera() {
    let camera = ScriptedCamera::new([face_at(50), face_at(20), None, face_at(80)]);
    let log = Rc::clone(&camera.log);
    let mut engine = engine_with(camera);
    kill(&mut engine);
    assert_eq!(engine.choose_face(), Ok(true));
    assert!(log.borrow().live);
    assert_eq!(
        engine.plan(),
        Some(Plan {
            activity: Activity::FacePoll,
            period: Duration::from_millis(33)
        })
    );
    assert_eq!(engine.poll_face(), None);
    assert_eq!(engine.poll_face(), None);
    assert_eq!(
        engine.snapshot().gesture.map(|g| g.stage),
        Some(GestureStage::LeftZoneConfirmed)
    );
    assert_eq!(engine.poll_face(), None);
    assert_eq!(
        engine.poll_face(),
        Some(Event::Revived {
            head: Cell::new(14, 5)
        })
    );
    assert!(!log.borrow().live);
    let snap = engine.snapshot();
    assert_eq!(snap.phase, Phase::Running);
    assert_eq!(snap.attempts, consts::REVIVE_ATTEMPTS);
    assert_eq!(snap.gesture, None);
}

#[test]
fn camera_failure_costs_nothing() {
    let mut engine = engine_with(ScriptedCamera::failing(CameraError::Busy));
    kill(&mut engine);
    let epoch = engine.epoch();
    assert_eq!(engine.choose_face(), Err(CameraError::Busy));
    assert_eq!(engine.phase(), Phase::AwaitingRevivalChoice);
    assert_eq!(engine.epoch(), epoch);
    assert_eq!(engine.snapshot().attempts, consts::REVIVE_ATTEMPTS);
    assert!(engine.choose_math());
}

#[test]
fn abandoning_face_challenge() {
    let camera = ScriptedCamera::new([face_at(20)]);
    let log = Rc::clone(&camera.log);
    let mut engine = engine_with(camera);
    kill(&mut engine);
    assert_eq!(engine.choose_face(), Ok(true));
    assert_eq!(
        engine.abort_challenge(),
        Some(Event::ChallengeAbandoned { attempts_left: 2 })
    );
    assert!(!log.borrow().live);
    assert_eq!(engine.phase(), Phase::AwaitingRevivalChoice);
    assert_eq!(engine.choose_face(), Ok(true));
    assert_eq!(log.borrow().acquisitions, 2);
    assert_eq!(
        engine.abort_challenge(),
        Some(Event::ChallengeAbandoned { attempts_left: 1 })
    );
    assert!(engine.choose_math());
    assert_eq!(
        engine.abort_challenge(),
        Some(Event::Reset(ResetCause::AttemptsExhausted))
    );
    assert_fresh_game(&engine);
}

#[test]
fn abort_outside_challenge_does_nothing() {
    let mut engine = engine();
    assert_eq!(engine.abort_challenge(), None);
    kill(&mut engine);
    assert_eq!(engine.abort_challenge(), None);
    assert_eq!(engine.snapshot().attempts, consts::REVIVE_ATTEMPTS);
}

#[test]
fn attempts_never_increase_while_dead() {
    let mut engine = engine();
    kill(&mut engine);
    let mut last = engine.snapshot().attempts;
    assert!(engine.choose_math());
    for _ in 0..5 {
        let wrong = wrong_answer(&engine);
        if let Some(Event::Reset(_)) = engine.submit_answer(&wrong) {
            break;
        }
        let now = engine.snapshot().attempts;
        assert!(now < last);
        last = now;
    }
    assert_eq!(engine.phase(), Phase::Running);
}

#[test]
fn reset_from_every_phase() {
    let camera = ScriptedCamera::new([face_at(20)]);
    let log = Rc::clone(&camera.log);
    let mut engine = engine_with(camera);
    assert_eq!(engine.reset(), Event::Reset(ResetCause::Requested));
    assert_fresh_game(&engine);
    kill(&mut engine);
    let _ = engine.reset();
    assert_fresh_game(&engine);
    kill(&mut engine);
    assert!(engine.choose_math());
    let _ = engine.reset();
    assert_fresh_game(&engine);
    kill(&mut engine);
    assert_eq!(engine.choose_face(), Ok(true));
    assert!(log.borrow().live);
    let _ = engine.reset();
    assert!(!log.borrow().live);
    assert_fresh_game(&engine);
}

#[test]
fn reset_is_idempotent() {
    let mut engine = engine();
    engine.score = 120;
    kill(&mut engine);
    let _ = engine.reset();
    let mut first = engine.snapshot();
    let _ = engine.reset();
    let mut second = engine.snapshot();
    first.food = None;
    second.food = None;
    assert_eq!(first, second);
}

#[test]
fn revival_replaces_covered_food() {
    let mut engine = engine();
    kill(&mut engine);
    engine.food = Some(Cell::new(13, 5));
    assert!(engine.choose_math());
    let answer = current_answer(&engine).to_string();
    let _ = engine.submit_answer(&answer);
    let snap = engine.snapshot();
    assert!(snap.food.is_some_and(|f| !snap.snake.contains(&f)));
}

#[test]
fn long_snake_revives_partly_off_board() {
    let mut engine = engine();
    engine.snake = Snake::straight(Cell::new(19, 5), Direction::Right, 18);
    engine.food = None;
    let _ = engine.tick();
    assert!(engine.choose_math());
    let answer = current_answer(&engine).to_string();
    let _ = engine.submit_answer(&answer);
    let snap = engine.snapshot();
    assert_eq!(snap.snake.len(), 18);
    assert_eq!(snap.snake.last(), Some(&Cell::new(-3, 5)));
    engine.food = None;
    // The off-board tail follows the head back onto the board
    for _ in 0..3 {
        assert_eq!(engine.tick(), None);
    }
    let snap = engine.snapshot();
    assert!(snap.snake.iter().all(|&c| engine.grid().is_inside(c)));
}

#[test]
fn random_play_keeps_snake_consistent() {
    let mut engine = engine();
    let mut rng = ChaCha12Rng::seed_from_u64(RNG_SEED ^ 0xFFFF);
    let directions = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
    for _ in 0..5000 {
        if engine.phase() != Phase::Running {
            let _ = engine.reset();
        }
        if rng.random_ratio(1, 4) {
            let _ = engine.turn(directions[rng.random_range(0..4)]);
        }
        let before = engine.snapshot();
        let event = engine.tick();
        let after = engine.snapshot();
        match event {
            Some(Event::Died { .. }) => {
                assert_eq!(after.snake, before.snake);
                continue;
            }
            Some(Event::AteFood { .. }) => assert_eq!(after.snake.len(), before.snake.len() + 1),
            _ => assert_eq!(after.snake.len(), before.snake.len()),
        }
        let unique = after.snake.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), after.snake.len());
        if let Some(food) = after.food {
            assert!(!after.snake.contains(&food));
        }
    }
}
