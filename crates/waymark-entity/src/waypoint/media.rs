//! Waypoint media entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kind of media attached to a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A still image; `description` holds the alt text.
    Image,
    /// An audio clip; `description` holds the transcript.
    Audio,
    /// A video clip.
    Video,
}

impl MediaKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = waymark_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            _ => Err(waymark_core::AppError::validation(format!(
                "Invalid media kind: '{s}'. Expected one of: image, audio, video"
            ))),
        }
    }
}

/// Media attached to a waypoint. The row owns its stored blob: deleting
/// the row (directly or by cascade) also removes the blob.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WaypointMedia {
    /// Unique media identifier.
    pub id: Uuid,
    /// The owning waypoint.
    pub waypoint_id: Uuid,
    /// Path of the stored blob in the media store.
    pub media_path: String,
    /// Media kind.
    pub kind: MediaKind,
    /// MIME type of the blob.
    pub mime_type: String,
    /// Alt text (images) or transcript (audio).
    pub description: Option<String>,
    /// Display order among the waypoint's media items.
    pub index: Option<i32>,
    /// When the media was created.
    pub created_at: DateTime<Utc>,
    /// When the media was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to attach media to a waypoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWaypointMedia {
    /// The owning waypoint.
    pub waypoint_id: Uuid,
    /// Path of the stored blob.
    pub media_path: String,
    /// Media kind.
    pub kind: MediaKind,
    /// MIME type.
    pub mime_type: String,
    /// Alt text or transcript.
    pub description: Option<String>,
    /// Display order.
    pub index: Option<i32>,
}
