mod assessment;
mod ids;
mod module;
mod score;
mod state;
mod ticket;

pub use assessment::{
    DEPLOYMENT_READY_THRESHOLD, Difficulty, MockTestResult, QUIZ_PASS_THRESHOLD, QuizAttempt,
    SECTION_PASS_THRESHOLD, SectionScoreRecord, SkillBreakdown,
};
pub use ids::{
    AttemptId, CourseId, LessonId, ModuleId, Namespace, ParseIdError, SectionId, TestId, TicketId,
};
pub use module::{ModuleProgress, ModuleStatus, StatusPolicy};
pub use score::{ScaledScore, Score, ScoreError};
pub use state::{CURRENT_SCHEMA_VERSION, LearnerProfile, ProgressState};
pub use ticket::{MessageAuthor, SupportTicket, TicketError, TicketMessage, TicketStatus};
