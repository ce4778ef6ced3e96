use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LessonId, Namespace, TicketId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TicketError {
    #[error("ticket question cannot be empty")]
    EmptyQuestion,

    #[error("ticket message cannot be empty")]
    EmptyMessage,

    #[error("ticket not found: {0}")]
    NotFound(TicketId),
}

//
// ─── STATUS / MESSAGES ────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    #[default]
    Open,
    Answered,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAuthor {
    Learner,
    Instructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMessage {
    pub author: MessageAuthor,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

//
// ─── TICKET ───────────────────────────────────────────────────────────────────
//

/// A learner question raised against a lesson.
///
/// The message thread only grows; messages are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    id: TicketId,
    namespace: Namespace,
    lesson_id: LessonId,
    lesson_title: String,
    question: String,
    status: TicketStatus,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    messages: Vec<TicketMessage>,
}

impl SupportTicket {
    /// Opens a ticket whose thread starts with the learner's question.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::EmptyQuestion` if the question is blank.
    pub fn open(
        namespace: Namespace,
        lesson_id: LessonId,
        lesson_title: impl Into<String>,
        question: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, TicketError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(TicketError::EmptyQuestion);
        }
        let opening = TicketMessage {
            author: MessageAuthor::Learner,
            body: question.clone(),
            sent_at: now,
        };
        Ok(Self {
            id: TicketId::generate(),
            namespace,
            lesson_id,
            lesson_title: lesson_title.into(),
            question,
            status: TicketStatus::Open,
            timestamp: now,
            messages: vec![opening],
        })
    }

    /// Appends a reply. An instructor reply marks an open ticket as answered.
    ///
    /// # Errors
    ///
    /// Returns `TicketError::EmptyMessage` if the body is blank.
    pub fn reply(
        &mut self,
        author: MessageAuthor,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TicketError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(TicketError::EmptyMessage);
        }
        self.messages.push(TicketMessage {
            author,
            body,
            sent_at: now,
        });
        if author == MessageAuthor::Instructor && self.status == TicketStatus::Open {
            self.status = TicketStatus::Answered;
        }
        Ok(())
    }

    pub fn resolve(&mut self) {
        self.status = TicketStatus::Resolved;
    }

    #[must_use]
    pub fn id(&self) -> TicketId {
        self.id
    }

    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        &self.lesson_id
    }

    #[must_use]
    pub fn lesson_title(&self) -> &str {
        &self.lesson_title
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn messages(&self) -> &[TicketMessage] {
        &self.messages
    }
}
