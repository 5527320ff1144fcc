//! Notification categories, per-user preference values and message templates.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NotificationType
// ---------------------------------------------------------------------------

/// Notification category. Doubles as the preference flag that gates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Answer,
    Comment,
    Mention,
    Vote,
}

impl NotificationType {
    /// All categories, in display order.
    pub const ALL: [NotificationType; 4] = [
        NotificationType::Answer,
        NotificationType::Comment,
        NotificationType::Mention,
        NotificationType::Vote,
    ];

    /// The value stored in the `notifications.type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::Answer => "answer",
            NotificationType::Comment => "comment",
            NotificationType::Mention => "mention",
            NotificationType::Vote => "vote",
        }
    }

    /// Parse a stored column value. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "answer" => Some(NotificationType::Answer),
            "comment" => Some(NotificationType::Comment),
            "mention" => Some(NotificationType::Mention),
            "vote" => Some(NotificationType::Vote),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate an optional `?type=` filter value.
pub fn validate_notification_type(value: &str) -> Result<NotificationType, String> {
    NotificationType::parse(value).ok_or_else(|| {
        let valid: Vec<&str> = NotificationType::ALL.iter().map(|t| t.as_str()).collect();
        format!(
            "Invalid notification type '{value}'. Must be one of: {}",
            valid.join(", ")
        )
    })
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// Per-category opt-out flags for one user.
///
/// A user with no stored row gets [`NotificationPreferences::default`],
/// which enables every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub answer_notifications: bool,
    pub comment_notifications: bool,
    pub mention_notifications: bool,
    pub vote_notifications: bool,
}

impl NotificationPreferences {
    /// Whether the given category is enabled.
    pub fn is_enabled(&self, category: NotificationType) -> bool {
        match category {
            NotificationType::Answer => self.answer_notifications,
            NotificationType::Comment => self.comment_notifications,
            NotificationType::Mention => self.mention_notifications,
            NotificationType::Vote => self.vote_notifications,
        }
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            answer_notifications: true,
            comment_notifications: true,
            mention_notifications: true,
            vote_notifications: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Message templates
// ---------------------------------------------------------------------------

/// Display name used when the acting user cannot be resolved.
pub const UNKNOWN_ACTOR: &str = "Someone";

/// What kind of content an action was performed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Question,
    Answer,
    Comment,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Question => "question",
            ContentKind::Answer => "answer",
            ContentKind::Comment => "comment",
        }
    }

    fn with_article(self) -> &'static str {
        match self {
            ContentKind::Question => "a question",
            ContentKind::Answer => "an answer",
            ContentKind::Comment => "a comment",
        }
    }
}

/// `"<actor> answered your question"`.
pub fn answer_message(actor: &str) -> String {
    format!("{actor} answered your question")
}

/// `"<actor> commented on your question"` / `"... your answer"`.
pub fn comment_message(actor: &str, target: ContentKind) -> String {
    format!("{actor} commented on your {}", target.as_str())
}

/// `"<actor> mentioned you in an answer"`.
pub fn mention_message(actor: &str, context: ContentKind) -> String {
    format!("{actor} mentioned you in {}", context.with_article())
}

/// `"<actor> upvoted your answer"` / `"<actor> downvoted your question"`.
pub fn vote_message(actor: &str, upvote: bool, target: ContentKind) -> String {
    let verb = if upvote { "upvoted" } else { "downvoted" };
    format!("{actor} {verb} your {}", target.as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_round_trips_through_column_value() {
        for t in NotificationType::ALL {
            assert_eq!(NotificationType::parse(t.as_str()), Some(t));
        }
        assert_eq!(NotificationType::parse("digest"), None);
    }

    #[test]
    fn type_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationType::Mention).unwrap();
        assert_eq!(json, r#""mention""#);
    }

    #[test]
    fn invalid_filter_lists_valid_values() {
        let err = validate_notification_type("digest").unwrap_err();
        assert!(err.contains("answer, comment, mention, vote"));
    }

    #[test]
    fn default_preferences_enable_everything() {
        let prefs = NotificationPreferences::default();
        for t in NotificationType::ALL {
            assert!(prefs.is_enabled(t), "{t} should be enabled by default");
        }
    }

    #[test]
    fn disabled_flag_only_affects_its_category() {
        let prefs = NotificationPreferences {
            mention_notifications: false,
            ..Default::default()
        };
        assert!(!prefs.is_enabled(NotificationType::Mention));
        assert!(prefs.is_enabled(NotificationType::Answer));
        assert!(prefs.is_enabled(NotificationType::Comment));
        assert!(prefs.is_enabled(NotificationType::Vote));
    }

    #[test]
    fn messages_read_naturally() {
        assert_eq!(answer_message("bob"), "bob answered your question");
        assert_eq!(
            comment_message("bob", ContentKind::Answer),
            "bob commented on your answer"
        );
        assert_eq!(
            mention_message("bob", ContentKind::Answer),
            "bob mentioned you in an answer"
        );
        assert_eq!(
            mention_message("bob", ContentKind::Comment),
            "bob mentioned you in a comment"
        );
        assert_eq!(
            vote_message("bob", false, ContentKind::Question),
            "bob downvoted your question"
        );
    }
}
