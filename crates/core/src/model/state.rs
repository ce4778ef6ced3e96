use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::assessment::{MockTestResult, QuizAttempt, SectionScoreRecord};
use crate::model::ids::{CourseId, LessonId, ModuleId, Namespace, SectionId, TicketId};
use crate::model::module::{ModuleProgress, ModuleStatus};
use crate::model::ticket::SupportTicket;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

//
// ─── PROFILE ──────────────────────────────────────────────────────────────────
//

/// Who the state belongs to and which courses they enrolled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearnerProfile {
    pub identity_key: String,
    pub enrolled_courses: BTreeSet<CourseId>,
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

/// Complete progression state for one namespace.
///
/// Every field defaults, so records written by older builds deserialize with
/// the missing parts filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressState {
    pub schema_version: u32,
    pub profile: LearnerProfile,
    pub modules: BTreeMap<ModuleId, ModuleProgress>,
    pub quiz_attempts: Vec<QuizAttempt>,
    pub section_scores: BTreeMap<SectionId, SectionScoreRecord>,
    pub mock_results: Vec<MockTestResult>,
    /// Newest first.
    pub support_tickets: Vec<SupportTicket>,
}

impl ProgressState {
    /// Schema-complete default state stamped with the namespace.
    #[must_use]
    pub fn new(namespace: &Namespace) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            profile: LearnerProfile {
                identity_key: namespace.as_str().to_owned(),
                enrolled_courses: BTreeSet::new(),
            },
            ..Self::default()
        }
    }

    /// Fills fields an older record could not carry.
    pub fn backfill(&mut self, namespace: &Namespace) {
        if self.profile.identity_key.is_empty() {
            self.profile.identity_key = namespace.as_str().to_owned();
        }
        if self.schema_version < CURRENT_SCHEMA_VERSION {
            self.schema_version = CURRENT_SCHEMA_VERSION;
        }
    }

    /// Status of a module; untouched modules are locked.
    #[must_use]
    pub fn module_status(&self, module_id: &ModuleId) -> ModuleStatus {
        self.modules
            .get(module_id)
            .map_or(ModuleStatus::Locked, ModuleProgress::status)
    }

    /// Returns the module entry, creating an empty one if absent.
    pub fn module_entry(&mut self, module_id: ModuleId) -> &mut ModuleProgress {
        self.modules.entry(module_id).or_default()
    }

    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&SupportTicket> {
        self.support_tickets.iter().find(|t| t.id() == id)
    }

    pub fn ticket_mut(&mut self, id: TicketId) -> Option<&mut SupportTicket> {
        self.support_tickets.iter_mut().find(|t| t.id() == id)
    }

    /// All lessons completed across every module.
    pub fn completed_lessons(&self) -> impl Iterator<Item = &LessonId> {
        self.modules
            .values()
            .flat_map(|progress| progress.completed_lessons().iter())
    }
}
