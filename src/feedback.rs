use crate::error::FeedbackError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Maximum length of the optional free-form text, in characters.
pub const MAX_TEXT_LEN: usize = 500;

/// One of the fixed reactions a participant can send.
///
/// Closed set: the emoji and display label are pure functions of the
/// variant, so an unmapped kind is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FeedbackKind {
    Understand,
    Question,
    Confused,
    Repeat,
}

impl FeedbackKind {
    /// Display glyph shown on the dashboard and in history listings.
    pub fn emoji(self) -> &'static str {
        match self {
            FeedbackKind::Understand => "😊",
            FeedbackKind::Question => "❓",
            FeedbackKind::Confused => "😐",
            FeedbackKind::Repeat => "🔄",
        }
    }

    /// Human-readable label for the kind.
    pub fn label(self) -> &'static str {
        match self {
            FeedbackKind::Understand => "I understand",
            FeedbackKind::Question => "I have a question",
            FeedbackKind::Confused => "This is difficult",
            FeedbackKind::Repeat => "Please explain again",
        }
    }
}

/// One unit of participant feedback.
///
/// Wire field names (`type`, `userAgent`) match the collector protocol; the
/// Rust-side names stay idiomatic via serde renames. `emoji` is derived from
/// `kind` at construction and is never independently settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    /// Stable identity assigned at creation; delivery confirmation keys off
    /// this, not structural equality or position.
    pub id: Uuid,

    #[serde(rename = "type")]
    pub kind: FeedbackKind,

    pub emoji: String,

    /// Optional free-form text; trimmed, capped at [`MAX_TEXT_LEN`].
    pub text: String,

    /// Creation instant (ISO-8601 on the wire); immutable after creation.
    pub timestamp: DateTime<Utc>,

    /// `true` until the remote collector has confirmed delivery.
    pub pending: bool,

    /// Diagnostic field supplied by the producer; not semantically
    /// load-bearing.
    #[serde(rename = "userAgent", skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl FeedbackItem {
    /// Build a new pending item. Rejects over-long text; trims surrounding
    /// whitespace the way the original entry surface did.
    pub fn new(
        kind: FeedbackKind,
        text: &str,
        user_agent: Option<String>,
    ) -> std::result::Result<Self, FeedbackError> {
        let text = text.trim();
        let len = text.chars().count();
        if len > MAX_TEXT_LEN {
            return Err(FeedbackError::TextTooLong {
                len,
                max: MAX_TEXT_LEN,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            emoji: kind.emoji().to_string(),
            text: text.to_string(),
            timestamp: Utc::now(),
            pending: true,
            user_agent,
        })
    }
}
