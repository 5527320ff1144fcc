//! Content-creation events and content validation.
//!
//! [`ContentEvent`] is what the HTTP layer hands to the notification
//! fan-out after it has persisted a question, answer, comment or vote.
//! Request bodies are validated and coerced into one of these variants at
//! the API boundary; the fan-out never sees raw JSON.

use serde::{Deserialize, Serialize};

use crate::notification::{ContentKind, NotificationType};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum question title length in characters.
pub const MAX_TITLE_LENGTH: usize = 300;

/// Maximum body length (question, answer or comment) in characters.
pub const MAX_BODY_LENGTH: usize = 30_000;

/// Maximum number of tags on a question.
pub const MAX_TAGS: usize = 5;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 35;

// ---------------------------------------------------------------------------
// Item references
// ---------------------------------------------------------------------------

/// A question or an answer; the things comments and votes attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Question(DbId),
    Answer(DbId),
}

impl ItemRef {
    pub fn id(self) -> DbId {
        match self {
            ItemRef::Question(id) | ItemRef::Answer(id) => id,
        }
    }

    pub fn kind(self) -> ContentKind {
        match self {
            ItemRef::Question(_) => ContentKind::Question,
            ItemRef::Answer(_) => ContentKind::Answer,
        }
    }

    /// The answer id, if this refers to an answer.
    pub fn answer_id(self) -> Option<DbId> {
        match self {
            ItemRef::Answer(id) => Some(id),
            ItemRef::Question(_) => None,
        }
    }
}

/// Vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Change applied to the item's vote count.
    pub fn delta(self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// Ordering for question listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionSort {
    #[default]
    Newest,
    Votes,
    Answers,
    Views,
}

impl QuestionSort {
    /// Parse the `sort` query value.
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "newest" => Ok(QuestionSort::Newest),
            "votes" => Ok(QuestionSort::Votes),
            "answers" => Ok(QuestionSort::Answers),
            "views" => Ok(QuestionSort::Views),
            other => Err(format!(
                "Invalid sort '{other}': expected newest, votes, answers or views"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ContentEvent
// ---------------------------------------------------------------------------

/// Links a notification carries back to the content that triggered it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRefs {
    pub question_id: Option<DbId>,
    pub answer_id: Option<DbId>,
    pub comment_id: Option<DbId>,
}

/// A just-persisted piece of content that may produce notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ContentEvent {
    /// `actor_id` posted answer `answer_id` on question `question_id`.
    /// Direct recipient: the question's author.
    QuestionAnswered {
        actor_id: DbId,
        question_id: DbId,
        answer_id: DbId,
        body: String,
    },

    /// `actor_id` posted comment `comment_id` on `target`.
    /// Direct recipient: the target's author.
    ItemCommented {
        actor_id: DbId,
        question_id: DbId,
        target: ItemRef,
        comment_id: DbId,
        body: String,
    },

    /// `actor_id` wrote content inside question `question_id` that mentions
    /// users. `mentioned_user_id` names an explicit direct recipient; body
    /// mentions are resolved by username either way.
    UserMentioned {
        actor_id: DbId,
        mentioned_user_id: Option<DbId>,
        question_id: DbId,
        answer_id: Option<DbId>,
        comment_id: Option<DbId>,
        body: String,
    },

    /// `actor_id` voted on `target`. Direct recipient: the target's author.
    ItemVoted {
        actor_id: DbId,
        question_id: DbId,
        target: ItemRef,
        direction: VoteDirection,
    },
}

impl ContentEvent {
    /// The user who triggered the event.
    pub fn actor_id(&self) -> DbId {
        match self {
            ContentEvent::QuestionAnswered { actor_id, .. }
            | ContentEvent::ItemCommented { actor_id, .. }
            | ContentEvent::UserMentioned { actor_id, .. }
            | ContentEvent::ItemVoted { actor_id, .. } => *actor_id,
        }
    }

    /// Free text to scan for `@mentions`. Votes carry none.
    pub fn body(&self) -> &str {
        match self {
            ContentEvent::QuestionAnswered { body, .. }
            | ContentEvent::ItemCommented { body, .. }
            | ContentEvent::UserMentioned { body, .. } => body,
            ContentEvent::ItemVoted { .. } => "",
        }
    }

    /// Category of the direct-recipient notification.
    pub fn category(&self) -> NotificationType {
        match self {
            ContentEvent::QuestionAnswered { .. } => NotificationType::Answer,
            ContentEvent::ItemCommented { .. } => NotificationType::Comment,
            ContentEvent::UserMentioned { .. } => NotificationType::Mention,
            ContentEvent::ItemVoted { .. } => NotificationType::Vote,
        }
    }

    /// Where the scanned body lives, used in mention messages.
    pub fn content_kind(&self) -> ContentKind {
        match self {
            ContentEvent::QuestionAnswered { .. } => ContentKind::Answer,
            ContentEvent::ItemCommented { .. } => ContentKind::Comment,
            ContentEvent::UserMentioned {
                answer_id,
                comment_id,
                ..
            } => {
                if comment_id.is_some() {
                    ContentKind::Comment
                } else if answer_id.is_some() {
                    ContentKind::Answer
                } else {
                    ContentKind::Question
                }
            }
            ContentEvent::ItemVoted { target, .. } => target.kind(),
        }
    }

    /// References stored on every notification produced by this event.
    pub fn refs(&self) -> ContentRefs {
        match self {
            ContentEvent::QuestionAnswered {
                question_id,
                answer_id,
                ..
            } => ContentRefs {
                question_id: Some(*question_id),
                answer_id: Some(*answer_id),
                comment_id: None,
            },
            ContentEvent::ItemCommented {
                question_id,
                target,
                comment_id,
                ..
            } => ContentRefs {
                question_id: Some(*question_id),
                answer_id: target.answer_id(),
                comment_id: Some(*comment_id),
            },
            ContentEvent::UserMentioned {
                question_id,
                answer_id,
                comment_id,
                ..
            } => ContentRefs {
                question_id: Some(*question_id),
                answer_id: *answer_id,
                comment_id: *comment_id,
            },
            ContentEvent::ItemVoted {
                question_id,
                target,
                ..
            } => ContentRefs {
                question_id: Some(*question_id),
                answer_id: target.answer_id(),
                comment_id: None,
            },
        }
    }

    /// Short event name for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentEvent::QuestionAnswered { .. } => "question-answered",
            ContentEvent::ItemCommented { .. } => "item-commented",
            ContentEvent::UserMentioned { .. } => "user-mentioned",
            ContentEvent::ItemVoted { .. } => "item-voted",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a question title: non-blank and within the length limit.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title cannot be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validate a question, answer or comment body.
pub fn validate_body(body: &str) -> Result<(), String> {
    if body.trim().is_empty() {
        return Err("Body cannot be empty".to_string());
    }
    if body.chars().count() > MAX_BODY_LENGTH {
        return Err(format!(
            "Body exceeds maximum length of {MAX_BODY_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Trim, lowercase and deduplicate tags, then check count and length.
///
/// Returns the normalized tag list in first-seen order.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err("Tags cannot be empty".to_string());
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(format!(
                "Tag '{tag}' exceeds maximum length of {MAX_TAG_LENGTH} characters"
            ));
        }
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    if normalized.len() > MAX_TAGS {
        return Err(format!("A question can have at most {MAX_TAGS} tags"));
    }
    Ok(normalized)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
