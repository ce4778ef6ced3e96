use std::sync::Arc;

use progress_core::model::{
    CourseId, Difficulty, LessonId, MessageAuthor, MockTestResult, ModuleId, Namespace,
    ProgressState, QuizAttempt, ScaledScore, Score, SectionId, SectionScoreRecord,
    SkillBreakdown, StatusPolicy, SupportTicket, TestId,
};
use progress_core::time::fixed_now;
use progress_storage::{
    FileBackend, LoadOutcome, PersistenceBackend, PersistenceCodec, SqliteBackend, Storage,
};

fn populated_state(namespace: &Namespace) -> ProgressState {
    let now = fixed_now();
    let mut state = ProgressState::new(namespace);
    state
        .profile
        .enrolled_courses
        .insert(CourseId::new("tech-welding"));

    let module = state.module_entry(ModuleId::new("tech-m1"));
    module.unlock(StatusPolicy::Monotonic, now);
    module.complete_lesson(LessonId::new("tech-m1-l1"), StatusPolicy::Monotonic);
    state
        .module_entry(ModuleId::new("tech-m2"))
        .complete(StatusPolicy::Monotonic, now);

    state.quiz_attempts.push(QuizAttempt::new(
        ModuleId::new("tech-m1"),
        Score::new(88).unwrap(),
        now,
    ));
    state.section_scores.insert(
        SectionId::new("pte-mock-1"),
        SectionScoreRecord::new(Score::new(61).unwrap(), now),
    );
    let s = ScaledScore::new(82).unwrap();
    state.mock_results.push(MockTestResult::new(
        TestId::new("tech-weld-1"),
        Difficulty::Hard,
        s,
        SkillBreakdown {
            speaking: s,
            writing: s,
            reading: s,
            listening: s,
        },
        now,
    ));
    let mut ticket = SupportTicket::open(
        namespace.clone(),
        LessonId::new("tech-m1-l1"),
        "Workshop safety",
        "Which gloves?",
        now,
    )
    .unwrap();
    ticket
        .reply(MessageAuthor::Instructor, "Nitrile.", now)
        .unwrap();
    state.support_tickets.insert(0, ticket);
    state
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_full_state() {
    let storage = Storage::sqlite("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    let codec = PersistenceCodec::new(Arc::clone(&storage.backend));
    let namespace = Namespace::new("ana@example.com");
    let state = populated_state(&namespace);

    codec.save(&namespace, &state).await.unwrap();
    let loaded = codec.load(&namespace).await.unwrap();

    assert_eq!(loaded, LoadOutcome::Restored(state));
}

#[tokio::test]
async fn sqlite_upsert_replaces_previous_value() {
    let backend = SqliteBackend::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    backend.migrate().await.expect("migrate");
    backend.migrate().await.expect("migrations are idempotent");

    backend.set("lms_state_guest", "first").await.unwrap();
    backend.set("lms_state_guest", "second").await.unwrap();
    assert_eq!(
        backend.get("lms_state_guest").await.unwrap().as_deref(),
        Some("second")
    );
    assert!(backend.get("lms_state_other").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_malformed_record_recovers_default() {
    let storage = Storage::sqlite("sqlite:file:memdb_malformed?mode=memory&cache=shared")
        .await
        .expect("connect");
    storage
        .backend
        .set("lms_state_guest", "[1, 2, 3]")
        .await
        .unwrap();

    let codec = PersistenceCodec::new(Arc::clone(&storage.backend));
    let namespace = Namespace::new("guest");
    let outcome = codec.load(&namespace).await.unwrap();

    assert!(outcome.is_recovered());
    assert_eq!(outcome.into_state(), ProgressState::new(&namespace));
}

#[tokio::test]
async fn file_roundtrip_preserves_full_state() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FileBackend::open(dir.path()).await.unwrap();
    let codec = PersistenceCodec::new(Arc::new(backend));
    let namespace = Namespace::new("bo/../etc");
    let state = populated_state(&namespace);

    codec.save(&namespace, &state).await.unwrap();

    assert_eq!(
        codec.load(&namespace).await.unwrap(),
        LoadOutcome::Restored(state)
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
