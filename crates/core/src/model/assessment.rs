use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AttemptId, ModuleId, TestId};
use crate::model::score::{ScaledScore, Score, ScoreError};

/// Minimum quiz score that counts as a pass.
pub const QUIZ_PASS_THRESHOLD: u8 = 70;

/// Minimum section score that counts as a pass.
pub const SECTION_PASS_THRESHOLD: u8 = 65;

/// Minimum overall mock score, on the hardest tier, for deployment readiness.
pub const DEPLOYMENT_READY_THRESHOLD: u8 = 79;

//
// ─── QUIZ ATTEMPT ─────────────────────────────────────────────────────────────
//

/// Immutable record of one module quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    attempt_id: AttemptId,
    module_id: ModuleId,
    score: Score,
    passed: bool,
    timestamp: DateTime<Utc>,
}

impl QuizAttempt {
    #[must_use]
    pub fn new(module_id: ModuleId, score: Score, timestamp: DateTime<Utc>) -> Self {
        Self {
            attempt_id: AttemptId::generate(),
            module_id,
            score,
            passed: score.value() >= QUIZ_PASS_THRESHOLD,
            timestamp,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

//
// ─── SECTION SCORE ────────────────────────────────────────────────────────────
//

/// Latest result for one gating section. Only the most recent attempt is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionScoreRecord {
    score: Score,
    passed: bool,
    timestamp: DateTime<Utc>,
}

impl SectionScoreRecord {
    #[must_use]
    pub fn new(score: Score, timestamp: DateTime<Utc>) -> Self {
        Self {
            score,
            passed: score.value() >= SECTION_PASS_THRESHOLD,
            timestamp,
        }
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

//
// ─── MOCK TEST RESULT ─────────────────────────────────────────────────────────
//

/// Difficulty tier of a full mock exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Per-skill breakdown of a mock exam, each on the 10..=90 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub speaking: ScaledScore,
    pub writing: ScaledScore,
    pub reading: ScaledScore,
    pub listening: ScaledScore,
}

impl SkillBreakdown {
    /// # Errors
    ///
    /// Returns `ScoreError::ScaledOutOfRange` for the first value outside 10..=90.
    pub fn from_raw(speaking: u8, writing: u8, reading: u8, listening: u8) -> Result<Self, ScoreError> {
        Ok(Self {
            speaking: ScaledScore::new(speaking)?,
            writing: ScaledScore::new(writing)?,
            reading: ScaledScore::new(reading)?,
            listening: ScaledScore::new(listening)?,
        })
    }
}

/// Immutable record of a submitted full mock exam.
///
/// `is_deployment_ready` and `is_technical_verified` are computed once, when
/// the record is created, and stored as-is. Reading a record never recomputes
/// them, so historical results keep the verdict of their own time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockTestResult {
    attempt_id: AttemptId,
    test_id: TestId,
    difficulty: Difficulty,
    overall_score: ScaledScore,
    breakdown: SkillBreakdown,
    timestamp: DateTime<Utc>,
    verified: bool,
    is_deployment_ready: bool,
    is_technical_verified: bool,
}

impl MockTestResult {
    /// Builds a new result, deriving the readiness flags from the inputs.
    ///
    /// Every submission is marked `verified`; there is no independent check.
    #[must_use]
    pub fn new(
        test_id: TestId,
        difficulty: Difficulty,
        overall_score: ScaledScore,
        breakdown: SkillBreakdown,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let is_deployment_ready = difficulty == Difficulty::Hard
            && overall_score.value() >= DEPLOYMENT_READY_THRESHOLD;
        let is_technical_verified = is_deployment_ready && test_id.is_technical();
        Self {
            attempt_id: AttemptId::generate(),
            test_id,
            difficulty,
            overall_score,
            breakdown,
            timestamp,
            verified: true,
            is_deployment_ready,
            is_technical_verified,
        }
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn overall_score(&self) -> ScaledScore {
        self.overall_score
    }

    #[must_use]
    pub fn breakdown(&self) -> &SkillBreakdown {
        &self.breakdown
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn verified(&self) -> bool {
        self.verified
    }

    #[must_use]
    pub fn is_deployment_ready(&self) -> bool {
        self.is_deployment_ready
    }

    #[must_use]
    pub fn is_technical_verified(&self) -> bool {
        self.is_technical_verified
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
