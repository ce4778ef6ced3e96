use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

//
// ─── STATUS ───────────────────────────────────────────────────────────────────
//

/// Lifecycle of a module for one learner.
///
/// Variants are declared in progression order so `Ord` reflects how far a
/// learner has advanced: `Locked < Unlocked < InProgress < Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleStatus {
    #[default]
    Locked,
    Unlocked,
    InProgress,
    Completed,
}

/// How status transitions treat modules that are already further along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusPolicy {
    /// Status only moves forward; a completed module stays completed.
    #[default]
    Monotonic,
    /// Unlock always sets `Unlocked` and lesson completion always sets
    /// `InProgress`, even over a completed module.
    Legacy,
}

//
// ─── MODULE PROGRESS ──────────────────────────────────────────────────────────
//

/// Per-learner progress through one module.
///
/// Modules the learner never touched have no entry and are implicitly locked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleProgress {
    status: ModuleStatus,
    completed_lessons: BTreeSet<LessonId>,
    unlocked_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl ModuleProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> ModuleStatus {
        self.status
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &BTreeSet<LessonId> {
        &self.completed_lessons
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson_id: &LessonId) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    #[must_use]
    pub fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Marks the module unlocked.
    ///
    /// Under `Monotonic` a module that is already in progress or completed
    /// keeps its status; `unlocked_at` is stamped when the module was locked
    /// or had never been stamped.
    pub fn unlock(&mut self, policy: StatusPolicy, now: DateTime<Utc>) {
        match policy {
            StatusPolicy::Legacy => {
                self.status = ModuleStatus::Unlocked;
                self.unlocked_at = Some(now);
            }
            StatusPolicy::Monotonic => {
                if self.status == ModuleStatus::Locked || self.unlocked_at.is_none() {
                    self.unlocked_at = Some(now);
                }
                self.status = self.status.max(ModuleStatus::Unlocked);
            }
        }
    }

    /// Records a completed lesson. Returns `true` if the lesson was newly added.
    pub fn complete_lesson(&mut self, lesson_id: LessonId, policy: StatusPolicy) -> bool {
        let inserted = self.completed_lessons.insert(lesson_id);
        self.status = match policy {
            StatusPolicy::Legacy => ModuleStatus::InProgress,
            StatusPolicy::Monotonic => self.status.max(ModuleStatus::InProgress),
        };
        inserted
    }

    /// Marks the whole module completed.
    pub fn complete(&mut self, policy: StatusPolicy, now: DateTime<Utc>) {
        if policy == StatusPolicy::Monotonic && self.status == ModuleStatus::Completed {
            if self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
            return;
        }
        self.status = ModuleStatus::Completed;
        self.completed_at = Some(now);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
