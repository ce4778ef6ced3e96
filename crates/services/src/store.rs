use std::sync::Arc;

use progress_core::Catalog;
use progress_core::identity::resolve_namespace;
use progress_core::model::{
    CURRENT_SCHEMA_VERSION, CourseId, Difficulty, LessonId, MessageAuthor, MockTestResult,
    ModuleId, Namespace, ProgressState, QuizAttempt, ScaledScore, Score, SectionId,
    SectionScoreRecord, SkillBreakdown, StatusPolicy, SupportTicket, TestId, TicketError,
    TicketId,
};
use progress_storage::{LoadOutcome, PersistenceCodec};

use crate::Clock;
use crate::error::StoreError;
use crate::identity::IdentityProvider;

/// How the current in-memory state was obtained by the last load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// A stored record was restored.
    Restored,
    /// Nothing was stored yet; defaults are in use.
    Fresh,
    /// The stored record was malformed and defaults are in use.
    Recovered { reason: String },
}

/// Canonical progression state for one namespace.
///
/// Every mutation is applied to the in-memory state as a whole and then
/// saved through the codec. Until a load has completed, mutations fail with
/// `StoreError::NotLoaded`: the bootstrap default must never overwrite a
/// record that has not been read yet.
///
/// A record written by a newer schema is loaded read-only: mutations fail
/// with `StoreError::ReadOnly` so fields this build does not know are never
/// dropped by a re-save.
///
/// Methods take `&mut self`, so a store has a single writer at a time.
/// Sharing one across tasks means wrapping it in a lock.
pub struct ProgressionStore {
    clock: Clock,
    policy: StatusPolicy,
    catalog: Option<Arc<Catalog>>,
    codec: PersistenceCodec,
    namespace: Namespace,
    state: ProgressState,
    loaded: bool,
}

impl ProgressionStore {
    /// Creates an unloaded store holding the namespace default.
    #[must_use]
    pub fn new(namespace: Namespace, codec: PersistenceCodec, clock: Clock) -> Self {
        let state = ProgressState::new(&namespace);
        Self {
            clock,
            policy: StatusPolicy::default(),
            catalog: None,
            codec,
            namespace,
            state,
            loaded: false,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attaches a catalog; writes against unknown ids are then rejected.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Resolves the identity, then creates and loads the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Load` if the backend cannot be read.
    pub async fn open(
        identity: Option<&str>,
        codec: PersistenceCodec,
        clock: Clock,
    ) -> Result<(Self, LoadStatus), StoreError> {
        let mut store = Self::new(resolve_namespace(identity), codec, clock);
        let status = store.load().await?;
        Ok((store, status))
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Read access to the full current state.
    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// `true` when the loaded record carries a newer schema version. Such a
    /// store can be read but rejects every mutation.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.state.schema_version > CURRENT_SCHEMA_VERSION
    }

    #[must_use]
    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    //
    // ─── LOADING ──────────────────────────────────────────────────────────────
    //

    /// Replaces the in-memory state with the stored record of the current
    /// namespace. Anything held in memory is discarded, not merged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Load` if the backend cannot be read. The store
    /// then stays unloaded and rejects writes until a later load succeeds.
    pub async fn load(&mut self) -> Result<LoadStatus, StoreError> {
        let outcome = self
            .codec
            .load(&self.namespace)
            .await
            .map_err(|source| StoreError::Load {
                namespace: self.namespace.clone(),
                source,
            })?;

        let status = match outcome {
            LoadOutcome::Restored(state) => {
                self.state = state;
                LoadStatus::Restored
            }
            LoadOutcome::Fresh(state) => {
                self.state = state;
                LoadStatus::Fresh
            }
            LoadOutcome::Recovered { state, reason } => {
                self.state = state;
                LoadStatus::Recovered { reason }
            }
        };
        self.loaded = true;
        tracing::info!(namespace = %self.namespace, status = ?status, "state loaded");
        if self.is_read_only() {
            tracing::warn!(
                namespace = %self.namespace,
                stored = self.state.schema_version,
                supported = CURRENT_SCHEMA_VERSION,
                "record written by a newer schema; store is read-only"
            );
        }
        Ok(status)
    }

    /// Points the store at the namespace of `identity`, reloading wholesale
    /// when it differs from the current one.
    ///
    /// Returns `None` when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Load` if the new namespace cannot be read.
    pub async fn switch_identity(
        &mut self,
        identity: Option<&str>,
    ) -> Result<Option<LoadStatus>, StoreError> {
        let namespace = resolve_namespace(identity);
        if namespace == self.namespace && self.loaded {
            return Ok(None);
        }
        tracing::info!(from = %self.namespace, to = %namespace, "identity changed; reloading");
        self.state = ProgressState::new(&namespace);
        self.namespace = namespace;
        self.loaded = false;
        self.load().await.map(Some)
    }

    /// Re-reads the provider's identity and reloads if the namespace moved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Load` if the new namespace cannot be read.
    pub async fn sync_identity(
        &mut self,
        provider: &dyn IdentityProvider,
    ) -> Result<Option<LoadStatus>, StoreError> {
        let identity = provider.current_identity();
        self.switch_identity(identity.as_deref()).await
    }

    //
    // ─── MODULES ──────────────────────────────────────────────────────────────
    //

    /// Unlocks a module, creating its entry if needed. Completed lessons are kept.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for unknown modules when a catalog is
    /// attached, or `StoreError::Persistence` if the save fails.
    pub async fn unlock_module(&mut self, module_id: ModuleId) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.check_module(&module_id)?;
        let now = self.clock.now();
        tracing::debug!(namespace = %self.namespace, module = %module_id, "unlock module");
        self.state.module_entry(module_id).unlock(self.policy, now);
        self.persist().await
    }

    /// Records a completed lesson and moves the module to in-progress.
    ///
    /// Repeating the call leaves the lesson set unchanged. Returns `true` if
    /// the lesson was newly recorded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for unknown modules when a catalog is
    /// attached, or `StoreError::Persistence` if the save fails.
    pub async fn complete_lesson(
        &mut self,
        module_id: ModuleId,
        lesson_id: LessonId,
    ) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        self.check_module(&module_id)?;
        tracing::debug!(
            namespace = %self.namespace,
            module = %module_id,
            lesson = %lesson_id,
            "complete lesson"
        );
        let inserted = self
            .state
            .module_entry(module_id)
            .complete_lesson(lesson_id, self.policy);
        self.persist().await?;
        Ok(inserted)
    }

    /// Marks a whole module completed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Catalog` for unknown modules when a catalog is
    /// attached, or `StoreError::Persistence` if the save fails.
    pub async fn complete_module(&mut self, module_id: ModuleId) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.check_module(&module_id)?;
        let now = self.clock.now();
        tracing::debug!(namespace = %self.namespace, module = %module_id, "complete module");
        self.state.module_entry(module_id).complete(self.policy, now);
        self.persist().await
    }

    /// Adds a course to the learner's enrollments. Returns `true` if new.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persistence` if the save fails.
    pub async fn enroll_course(&mut self, course_id: CourseId) -> Result<bool, StoreError> {
        self.ensure_writable()?;
        tracing::debug!(namespace = %self.namespace, course = %course_id, "enroll course");
        let inserted = self.state.profile.enrolled_courses.insert(course_id);
        self.persist().await?;
        Ok(inserted)
    }

    //
    // ─── ASSESSMENTS ──────────────────────────────────────────────────────────
    //

    /// Appends a quiz attempt. Module status is not affected.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Score` if `score > 100`, `StoreError::Catalog` for
    /// unknown modules when a catalog is attached, or
    /// `StoreError::Persistence` if the save fails.
    pub async fn record_quiz_attempt(
        &mut self,
        module_id: ModuleId,
        score: u8,
    ) -> Result<QuizAttempt, StoreError> {
        self.ensure_writable()?;
        let score = Score::new(score)?;
        self.check_module(&module_id)?;
        let attempt = QuizAttempt::new(module_id, score, self.clock.now());
        tracing::debug!(
            namespace = %self.namespace,
            module = %attempt.module_id(),
            score = score.value(),
            passed = attempt.passed(),
            "record quiz attempt"
        );
        self.state.quiz_attempts.push(attempt.clone());
        self.persist().await?;
        Ok(attempt)
    }

    /// Stores the latest score for a section, discarding any earlier one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Score` if `score > 100`, `StoreError::Catalog` for
    /// unknown sections when a catalog is attached, or
    /// `StoreError::Persistence` if the save fails.
    pub async fn record_section_score(
        &mut self,
        section_id: SectionId,
        score: u8,
    ) -> Result<SectionScoreRecord, StoreError> {
        self.ensure_writable()?;
        let score = Score::new(score)?;
        if let Some(catalog) = &self.catalog {
            catalog.check_section(&section_id)?;
        }
        let record = SectionScoreRecord::new(score, self.clock.now());
        tracing::debug!(
            namespace = %self.namespace,
            section = %section_id,
            score = score.value(),
            passed = record.passed(),
            "record section score"
        );
        self.state.section_scores.insert(section_id, record.clone());
        self.persist().await?;
        Ok(record)
    }

    /// Appends a mock exam result with its readiness flags fixed at write time.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Score` if `overall_score` is outside 10..=90,
    /// `StoreError::Catalog` for unknown tests when a catalog is attached,
    /// or `StoreError::Persistence` if the save fails.
    pub async fn record_mock_result(
        &mut self,
        test_id: TestId,
        difficulty: Difficulty,
        overall_score: u8,
        breakdown: SkillBreakdown,
    ) -> Result<MockTestResult, StoreError> {
        self.ensure_writable()?;
        let overall = ScaledScore::new(overall_score)?;
        if let Some(catalog) = &self.catalog {
            catalog.check_test(&test_id)?;
        }
        let result = MockTestResult::new(test_id, difficulty, overall, breakdown, self.clock.now());
        tracing::debug!(
            namespace = %self.namespace,
            test = %result.test_id(),
            overall = overall_score,
            deployment_ready = result.is_deployment_ready(),
            technical_verified = result.is_technical_verified(),
            "record mock result"
        );
        self.state.mock_results.push(result.clone());
        self.persist().await?;
        Ok(result)
    }

    //
    // ─── SUPPORT TICKETS ──────────────────────────────────────────────────────
    //

    /// Opens a ticket and places it first in the ticket list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Ticket` for a blank question, or
    /// `StoreError::Persistence` if the save fails.
    pub async fn file_support_ticket(
        &mut self,
        lesson_id: LessonId,
        lesson_title: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<TicketId, StoreError> {
        self.ensure_writable()?;
        let ticket = SupportTicket::open(
            self.namespace.clone(),
            lesson_id,
            lesson_title,
            question,
            self.clock.now(),
        )?;
        let id = ticket.id();
        tracing::debug!(namespace = %self.namespace, ticket = %id, "file support ticket");
        self.state.support_tickets.insert(0, ticket);
        self.persist().await?;
        Ok(id)
    }

    /// Appends a message to a ticket's thread.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Ticket` if the ticket is unknown or the body is
    /// blank, or `StoreError::Persistence` if the save fails.
    pub async fn reply_to_ticket(
        &mut self,
        ticket_id: TicketId,
        author: MessageAuthor,
        body: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.ensure_writable()?;
        let now = self.clock.now();
        let ticket = self
            .state
            .ticket_mut(ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?;
        ticket.reply(author, body, now)?;
        tracing::debug!(namespace = %self.namespace, ticket = %ticket_id, ?author, "reply to ticket");
        self.persist().await
    }

    /// Marks a ticket resolved.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Ticket` if the ticket is unknown, or
    /// `StoreError::Persistence` if the save fails.
    pub async fn resolve_ticket(&mut self, ticket_id: TicketId) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.state
            .ticket_mut(ticket_id)
            .ok_or(TicketError::NotFound(ticket_id))?
            .resolve();
        tracing::debug!(namespace = %self.namespace, ticket = %ticket_id, "resolve ticket");
        self.persist().await
    }

    //
    // ─── INTERNALS ────────────────────────────────────────────────────────────
    //

    /// Rejects writes until a load has succeeded, and for records written
    /// by a newer schema, which this build cannot re-encode without loss.
    fn ensure_writable(&self) -> Result<(), StoreError> {
        if !self.loaded {
            return Err(StoreError::NotLoaded {
                namespace: self.namespace.clone(),
            });
        }
        if self.is_read_only() {
            return Err(StoreError::ReadOnly {
                namespace: self.namespace.clone(),
                schema_version: self.state.schema_version,
            });
        }
        Ok(())
    }

    fn check_module(&self, module_id: &ModuleId) -> Result<(), StoreError> {
        if let Some(catalog) = &self.catalog {
            catalog.check_module(module_id)?;
        }
        Ok(())
    }

    async fn persist(&self) -> Result<(), StoreError> {
        self.codec
            .save(&self.namespace, &self.state)
            .await
            .map_err(|source| {
                tracing::warn!(namespace = %self.namespace, error = %source, "failed to persist state");
                StoreError::Persistence {
                    namespace: self.namespace.clone(),
                    source,
                }
            })
    }
}
