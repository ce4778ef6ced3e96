use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Errors raised when a numeric score falls outside its closed interval.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("percentage score {0} must be between 0 and 100")]
    PercentOutOfRange(u8),

    #[error("scaled score {0} must be between 10 and 90")]
    ScaledOutOfRange(u8),
}

//
// ─── PERCENT SCORE ────────────────────────────────────────────────────────────
//

/// Percentage score in the closed interval 0..=100, used by quizzes and section tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MAX: u8 = 100;

    /// # Errors
    ///
    /// Returns `ScoreError::PercentOutOfRange` when `value > 100`.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if value > Self::MAX {
            return Err(ScoreError::PercentOutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Score {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── SCALED SCORE ─────────────────────────────────────────────────────────────
//

/// Exam-scale score in the closed interval 10..=90, used by full mock exams
/// and their per-skill breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ScaledScore(u8);

impl ScaledScore {
    pub const MIN: u8 = 10;
    pub const MAX: u8 = 90;

    /// # Errors
    ///
    /// Returns `ScoreError::ScaledOutOfRange` when `value` is outside 10..=90.
    pub fn new(value: u8) -> Result<Self, ScoreError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ScoreError::ScaledOutOfRange(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ScaledScore {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScaledScore> for u8 {
    fn from(score: ScaledScore) -> Self {
        score.0
    }
}

impl fmt::Display for ScaledScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
