use enum_map::Enum;
use rand::Rng;
use std::fmt;

#[derive(Clone, Copy, Debug, Enum, Eq, Hash, PartialEq)]
pub(crate) enum Operator {
    Plus,
    Minus,
    Times,
}

impl Operator {
    fn apply(self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Operator::Plus => lhs + rhs,
            Operator::Minus => lhs - rhs,
            Operator::Times => lhs * rhs,
        }
    }

    fn symbol(self) -> char {
        match self {
            Operator::Plus => '+',
            Operator::Minus => '−',
            Operator::Times => '×',
        }
    }
}

/// An arithmetic question posed to revive the snake
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MathQuestion {
    operator: Operator,
    lhs: i64,
    rhs: i64,
    answer: i64,
}

impl MathQuestion {
    pub(crate) fn new(operator: Operator, lhs: i64, rhs: i64) -> MathQuestion {
        MathQuestion {
            operator,
            lhs,
            rhs,
            answer: operator.apply(lhs, rhs),
        }
    }

    /// Generate a random question.  The operator is chosen uniformly; sums
    /// use operands below 50, differences have a minuend in `50..100` and a
    /// smaller subtrahend, and products use operands below 12, so the answer
    /// is never negative.
    pub(crate) fn generate<R: Rng + ?Sized>(rng: &mut R) -> MathQuestion {
        let operator = Operator::from_usize(rng.random_range(0..Operator::LENGTH));
        let (lhs, rhs) = match operator {
            Operator::Plus => (rng.random_range(0..50), rng.random_range(0..50)),
            Operator::Minus => {
                let lhs = rng.random_range(50..100);
                (lhs, rng.random_range(0..lhs))
            }
            Operator::Times => (rng.random_range(0..12), rng.random_range(0..12)),
        };
        MathQuestion::new(operator, lhs, rhs)
    }

    pub(crate) fn answer(&self) -> i64 {
        self.answer
    }

    /// Test whether `input` is the correct answer.  Input that is not an
    /// integer is simply wrong.
    pub(crate) fn check(&self, input: &str) -> bool {
        input.trim().parse::<i64>().ok() == Some(self.answer)
    }
}

impl fmt::Display for MathQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.lhs,
            self.operator.symbol(),
            self.rhs
        )
    }
}
