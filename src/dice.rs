//! Dice string parsing and analysis for numeric stat fields
//!
//! Creature stats arrive as dice strings like `1d4`, `3d6+1-2d2`, or a
//! plain `17`. An expression is an ordered list of (quantity, faces)
//! terms; integer bonuses are carried as `quantity d 1`.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;
use thiserror::Error;

/// Error type for dice string parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// Input string was empty
    #[error("empty dice string")]
    Empty,
    /// Dice strings may only contain digits, 'd', '+', '-', or spaces
    #[error("invalid dice string '{0}' - only digits, 'd', '+', '-', and spaces allowed")]
    InvalidCharacter(String),
    /// A segment matched neither an integer bonus nor an NdM die roll
    #[error("dice segment of unsupported format: '{0}'")]
    InvalidSegment(String),
}

/// One segment of a dice string. A bare bonus like `+3` is `3d1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Term {
    quantity: i64,
    faces: i64,
}

/// A parsed, immutable dice expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceExpression {
    terms: Vec<Term>,
    source: String,
}

/// Whole-string charset guard.
fn valid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9d+\-\s]+$").expect("static pattern"))
}

/// One segment, generally delimited by + or - (examples: 1d6, +3d2, -4).
fn segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[+-]?[^+-]+").expect("static pattern"))
}

/// A segment that is a die roll (examples: 2d3, -1d2).
fn roll_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([+-]?\d+)d(\d+)$").expect("static pattern"))
}

/// A segment that is a numeric bonus or malus (examples: +3, -1).
fn bonus_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([+-]?\d+)$").expect("static pattern"))
}

impl DiceExpression {
    /// Parse a dice string such as `1d4`, `3d6+1-2d2`, or `17`.
    pub fn parse(text: &str) -> Result<Self, DiceError> {
        if text.trim().is_empty() {
            return Err(DiceError::Empty);
        }
        if !valid_pattern().is_match(text) {
            return Err(DiceError::InvalidCharacter(text.to_string()));
        }

        let compact: String = text.split_whitespace().collect();
        let mut terms = Vec::new();
        for segment in segment_pattern().find_iter(&compact) {
            let segment = segment.as_str();
            if let Some(captures) = roll_pattern().captures(segment) {
                terms.push(Term {
                    quantity: parse_int(&captures[1], segment)?,
                    faces: parse_int(&captures[2], segment)?,
                });
            } else if let Some(captures) = bonus_pattern().captures(segment) {
                terms.push(Term {
                    quantity: parse_int(&captures[1], segment)?,
                    faces: 1,
                });
            } else {
                return Err(DiceError::InvalidSegment(segment.to_string()));
            }
        }
        if terms.is_empty() {
            return Err(DiceError::InvalidSegment(text.to_string()));
        }

        Ok(Self {
            terms,
            source: text.to_string(),
        })
    }

    /// Minimum value this expression can roll.
    pub fn minimum(&self) -> i64 {
        self.terms
            .iter()
            .map(|term| {
                if term.quantity >= 0 {
                    term.quantity
                } else {
                    term.quantity * term.faces
                }
            })
            .sum()
    }

    /// Maximum value this expression can roll.
    pub fn maximum(&self) -> i64 {
        self.terms
            .iter()
            .map(|term| {
                if term.quantity >= 0 {
                    term.quantity * term.faces
                } else {
                    term.quantity
                }
            })
            .sum()
    }

    /// Mean roll, truncated to an integer.
    pub fn average(&self) -> i64 {
        let mean: f64 = self
            .terms
            .iter()
            .map(|term| term.quantity as f64 * (1.0 + term.faces as f64) / 2.0)
            .sum();
        mean as i64
    }

    /// Simulate one roll with the thread RNG.
    pub fn sample(&self) -> i64 {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Simulate one roll with a caller-provided RNG.
    pub fn sample_with<R: Rng>(&self, rng: &mut R) -> i64 {
        let mut total = 0;
        for term in &self.terms {
            let faces = term.faces.max(1);
            for _ in 0..term.quantity.abs() {
                let roll = rng.gen_range(1..=faces);
                if term.quantity > 0 {
                    total += roll;
                } else {
                    total -= roll;
                }
            }
        }
        total
    }
}

fn parse_int(digits: &str, segment: &str) -> Result<i64, DiceError> {
    digits
        .parse()
        .map_err(|_| DiceError::InvalidSegment(segment.to_string()))
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
