//! Pure derived views over a progression snapshot: unlock gating, course
//! completion and badges.
//!
//! Nothing here mutates state or touches storage. Callers decide what to do
//! with the answers (enable a button, show a badge).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{LessonId, ModuleId, MockTestResult, QuizAttempt, SectionId, SectionScoreRecord};

//
// ─── FULL MOCK GATE ───────────────────────────────────────────────────────────
//

/// Whether the full mock exam is available, and which sections still block it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullMockGate {
    pub is_unlocked: bool,
    /// Blocking sections, in the order they were required.
    pub incomplete: Vec<SectionId>,
}

/// Checks every required section for a passing record.
///
/// A section with no record, or whose latest record failed, is incomplete.
#[must_use]
pub fn gate_full_mock(
    required_section_ids: &[SectionId],
    section_scores: &BTreeMap<SectionId, SectionScoreRecord>,
) -> FullMockGate {
    let incomplete: Vec<SectionId> = required_section_ids
        .iter()
        .filter(|id| !section_scores.get(*id).is_some_and(SectionScoreRecord::passed))
        .cloned()
        .collect();
    FullMockGate {
        is_unlocked: incomplete.is_empty(),
        incomplete,
    }
}

//
// ─── COURSE CONTAINERS ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonOutline {
    pub id: LessonId,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOutline {
    pub id: ModuleId,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<LessonOutline>,
}

/// Course content in either of its two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CourseContainer {
    /// Modules that each hold lessons.
    Nested { modules: Vec<ModuleOutline> },
    /// Lessons held directly.
    Flat { lessons: Vec<LessonOutline> },
}

impl CourseContainer {
    /// Every lesson id in the container, in content order.
    #[must_use]
    pub fn lesson_ids(&self) -> Vec<&LessonId> {
        match self {
            CourseContainer::Nested { modules } => modules
                .iter()
                .flat_map(|m| m.lessons.iter().map(|l| &l.id))
                .collect(),
            CourseContainer::Flat { lessons } => lessons.iter().map(|l| &l.id).collect(),
        }
    }

    /// Module ids, for nested containers only.
    #[must_use]
    pub fn module_ids(&self) -> Vec<&ModuleId> {
        match self {
            CourseContainer::Nested { modules } => modules.iter().map(|m| &m.id).collect(),
            CourseContainer::Flat { .. } => Vec::new(),
        }
    }
}

//
// ─── BADGES ───────────────────────────────────────────────────────────────────
//

/// Condition under which a badge is awarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum BadgeTrigger {
    /// A specific lesson has been completed.
    LessonCompleted(LessonId),
    /// Any lesson whose id starts with the prefix has been completed.
    LessonPrefixCompleted(String),
    /// At least this many of the container's lessons are completed.
    CompletedAtLeast(usize),
    /// Completion percentage is at least this value.
    PercentageAtLeast(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRule {
    pub name: String,
    pub trigger: BadgeTrigger,
}

impl BadgeRule {
    #[must_use]
    pub fn new(name: impl Into<String>, trigger: BadgeTrigger) -> Self {
        Self {
            name: name.into(),
            trigger,
        }
    }

    fn is_met(&self, completed: &HashSet<&LessonId>, completed_count: usize, percentage: u32) -> bool {
        match &self.trigger {
            BadgeTrigger::LessonCompleted(id) => completed.contains(id),
            BadgeTrigger::LessonPrefixCompleted(prefix) => {
                completed.iter().any(|id| id.has_prefix(prefix))
            }
            BadgeTrigger::CompletedAtLeast(n) => completed_count >= *n,
            BadgeTrigger::PercentageAtLeast(p) => percentage >= *p,
        }
    }
}

/// Badge table used by [`compute_progress`].
#[must_use]
pub fn default_badge_rules() -> Vec<BadgeRule> {
    vec![
        BadgeRule::new(
            "Safety First",
            BadgeTrigger::LessonCompleted(LessonId::new("tech-m1-l1")),
        ),
        BadgeRule::new("Course Champion", BadgeTrigger::PercentageAtLeast(100)),
    ]
}

//
// ─── COURSE PROGRESS ──────────────────────────────────────────────────────────
//

/// Dashboard view of a learner's progress through one container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseProgress {
    pub completion_percentage: u32,
    pub remaining: usize,
    /// Awarded badge names, in rule-table order.
    pub badges: Vec<String>,
}

/// Computes completion and badges with the default badge table.
#[must_use]
pub fn compute_progress<'a>(
    container: &CourseContainer,
    completed_lesson_ids: impl IntoIterator<Item = &'a LessonId>,
) -> CourseProgress {
    compute_progress_with(container, completed_lesson_ids, &default_badge_rules())
}

/// Computes completion and evaluates the given badge table.
///
/// Only completed ids that belong to the container count toward the
/// percentage. An empty container yields zero progress and no badges.
#[must_use]
pub fn compute_progress_with<'a>(
    container: &CourseContainer,
    completed_lesson_ids: impl IntoIterator<Item = &'a LessonId>,
    rules: &[BadgeRule],
) -> CourseProgress {
    let lessons = container.lesson_ids();
    let total = lessons.len();
    if total == 0 {
        return CourseProgress::default();
    }

    let completed: HashSet<&LessonId> = completed_lesson_ids.into_iter().collect();
    let completed_count = lessons.iter().filter(|id| completed.contains(*id)).count();
    let completion_percentage = rounded_percentage(completed_count, total);

    let badges = rules
        .iter()
        .filter(|rule| rule.is_met(&completed, completed_count, completion_percentage))
        .map(|rule| rule.name.clone())
        .collect();

    CourseProgress {
        completion_percentage,
        remaining: total - completed_count,
        badges,
    }
}

/// `round(100 * part / total)` with halves rounded up, in integer arithmetic.
fn rounded_percentage(part: usize, total: usize) -> u32 {
    let pct = (200 * part + total) / (2 * total);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

//
// ─── QUIZ / MOCK SUMMARIES ────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizSummary {
    pub attempts: usize,
    pub best_score: Option<u8>,
    pub passed: bool,
}

/// Summarizes every attempt recorded for one module.
#[must_use]
pub fn quiz_summary(attempts: &[QuizAttempt], module_id: &ModuleId) -> QuizSummary {
    attempts
        .iter()
        .filter(|a| a.module_id() == module_id)
        .fold(QuizSummary::default(), |acc, a| QuizSummary {
            attempts: acc.attempts + 1,
            best_score: Some(acc.best_score.map_or(a.score().value(), |b| b.max(a.score().value()))),
            passed: acc.passed || a.passed(),
        })
}

/// Most recent mock result that was deployment-ready when recorded.
#[must_use]
pub fn latest_deployment_ready(results: &[MockTestResult]) -> Option<&MockTestResult> {
    results
        .iter()
        .filter(|r| r.is_deployment_ready())
        .max_by_key(|r| r.timestamp())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, ScaledScore, Score, SkillBreakdown, TestId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn section(score: u8) -> SectionScoreRecord {
        SectionScoreRecord::new(Score::new(score).unwrap(), fixed_now())
    }

    fn ids(raw: &[&str]) -> Vec<SectionId> {
        raw.iter().map(|s| SectionId::new(*s)).collect()
    }

    fn lessons(raw: &[&str]) -> Vec<LessonOutline> {
        raw.iter()
            .map(|id| LessonOutline {
                id: LessonId::new(*id),
                title: String::new(),
            })
            .collect()
    }

    fn nested() -> CourseContainer {
        CourseContainer::Nested {
            modules: vec![
                ModuleOutline {
                    id: ModuleId::new("tech-m1"),
                    order: 1,
                    title: "Safety".into(),
                    lessons: lessons(&["tech-m1-l1", "tech-m1-l2"]),
                },
                ModuleOutline {
                    id: ModuleId::new("tech-m2"),
                    order: 2,
                    title: "Tools".into(),
                    lessons: lessons(&["tech-m2-l1", "tech-m2-l2"]),
                },
            ],
        }
    }

    #[test]
    fn gate_reports_missing_and_failed_sections_in_order() {
        let mut scores = BTreeMap::new();
        scores.insert(SectionId::new("A"), section(90));
        scores.insert(SectionId::new("B"), section(40));
        let gate = gate_full_mock(&ids(&["A", "B", "C"]), &scores);
        assert!(!gate.is_unlocked);
        assert_eq!(gate.incomplete, ids(&["B", "C"]));
    }

    #[test]
    fn gate_unlocks_when_all_sections_pass() {
        let mut scores = BTreeMap::new();
        scores.insert(SectionId::new("A"), section(65));
        scores.insert(SectionId::new("B"), section(100));
        let gate = gate_full_mock(&ids(&["B", "A"]), &scores);
        assert!(gate.is_unlocked);
        assert!(gate.incomplete.is_empty());
    }

    #[test]
    fn gate_with_no_requirements_is_unlocked() {
        let gate = gate_full_mock(&[], &BTreeMap::new());
        assert!(gate.is_unlocked);
    }

    #[test]
    fn empty_container_has_no_progress() {
        let container = CourseContainer::Nested { modules: vec![] };
        let progress = compute_progress(&container, std::iter::empty());
        assert_eq!(progress, CourseProgress::default());
        assert_eq!(progress.completion_percentage, 0);
        assert_eq!(progress.remaining, 0);
        assert!(progress.badges.is_empty());
    }

    #[test]
    fn three_of_four_lessons_awards_safety_badge() {
        let done = [
            LessonId::new("tech-m1-l1"),
            LessonId::new("tech-m1-l2"),
            LessonId::new("tech-m2-l1"),
        ];
        let progress = compute_progress(&nested(), &done);
        assert_eq!(progress.completion_percentage, 75);
        assert_eq!(progress.remaining, 1);
        assert_eq!(progress.badges, vec!["Safety First".to_string()]);
    }

    #[test]
    fn full_completion_awards_champion() {
        let container = CourseContainer::Flat {
            lessons: lessons(&["a", "b"]),
        };
        let done = [LessonId::new("a"), LessonId::new("b")];
        let progress = compute_progress(&container, &done);
        assert_eq!(progress.completion_percentage, 100);
        assert_eq!(progress.badges, vec!["Course Champion".to_string()]);
    }

    #[test]
    fn ids_outside_container_do_not_count() {
        let container = CourseContainer::Flat {
            lessons: lessons(&["a", "b", "c"]),
        };
        let done = [LessonId::new("a"), LessonId::new("zzz")];
        let progress = compute_progress(&container, &done);
        assert_eq!(progress.completion_percentage, 33);
        assert_eq!(progress.remaining, 2);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(2, 3), 67);
        assert_eq!(rounded_percentage(0, 5), 0);
    }

    #[test]
    fn custom_rule_table_is_evaluated_in_order() {
        let rules = vec![
            BadgeRule::new("First Step", BadgeTrigger::CompletedAtLeast(1)),
            BadgeRule::new("Toolsmith", BadgeTrigger::LessonPrefixCompleted("tech-m2".into())),
            BadgeRule::new("Halfway", BadgeTrigger::PercentageAtLeast(50)),
        ];
        let done = [LessonId::new("tech-m2-l2")];
        let progress = compute_progress_with(&nested(), &done, &rules);
        assert_eq!(progress.badges, vec!["First Step".to_string(), "Toolsmith".to_string()]);
    }

    #[test]
    fn container_shapes_deserialize_untagged() {
        let nested: CourseContainer = serde_json::from_str(r#"{"modules": []}"#).unwrap();
        assert!(matches!(nested, CourseContainer::Nested { .. }));
        let flat: CourseContainer =
            serde_json::from_str(r#"{"lessons": [{"id": "x"}]}"#).unwrap();
        assert_eq!(flat.lesson_ids(), vec![&LessonId::new("x")]);
    }

    #[test]
    fn quiz_summary_tracks_best_and_pass() {
        let m1 = ModuleId::new("m1");
        let attempts = vec![
            QuizAttempt::new(m1.clone(), Score::new(50).unwrap(), fixed_now()),
            QuizAttempt::new(m1.clone(), Score::new(72).unwrap(), fixed_now()),
            QuizAttempt::new(ModuleId::new("m2"), Score::new(99).unwrap(), fixed_now()),
        ];
        let summary = quiz_summary(&attempts, &m1);
        assert_eq!(summary.attempts, 2);
        assert_eq!(summary.best_score, Some(72));
        assert!(summary.passed);
        assert_eq!(quiz_summary(&attempts, &ModuleId::new("m3")), QuizSummary::default());
    }

    #[test]
    fn latest_deployment_ready_picks_newest_ready_result() {
        let s = ScaledScore::new(80).unwrap();
        let breakdown = SkillBreakdown {
            speaking: s,
            writing: s,
            reading: s,
            listening: s,
        };
        let older = MockTestResult::new(TestId::new("t1"), Difficulty::Hard, s, breakdown, fixed_now());
        let newer = MockTestResult::new(
            TestId::new("t2"),
            Difficulty::Hard,
            s,
            breakdown,
            fixed_now() + Duration::days(1),
        );
        let not_ready = MockTestResult::new(
            TestId::new("t3"),
            Difficulty::Easy,
            s,
            breakdown,
            fixed_now() + Duration::days(2),
        );
        let results = vec![older, newer.clone(), not_ready];
        assert_eq!(latest_deployment_ready(&results), Some(&newer));
        assert_eq!(latest_deployment_ready(&[]), None);
    }
}
