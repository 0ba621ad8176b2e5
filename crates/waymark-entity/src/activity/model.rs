//! Activity entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::ActivityKind;

/// Default locale for new activities.
pub const DEFAULT_LOCALE: &str = "en_US";

/// An authored activity: a guided tour or orienteering route.
///
/// When `folder_id` is set, authorization flows through the folder's
/// sharing grants; when it is unset, only the author (and staff) may write.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    /// Unique activity identifier.
    pub id: Uuid,
    /// The authoring user. Always server-assigned at creation.
    pub author_id: Uuid,
    /// Author display name snapshot.
    pub author_name: String,
    /// Author email snapshot.
    pub author_email: Option<String>,
    /// Activity title.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Activity kind.
    pub kind: ActivityKind,
    /// Content locale (BCP 47-ish identifier, e.g. `en_US`).
    pub locale: String,
    /// Optional availability window start.
    pub start_at: Option<DateTime<Utc>>,
    /// Optional availability window end.
    pub end_at: Option<DateTime<Utc>>,
    /// Whether the activity expires at the end of its window.
    pub expires: bool,
    /// Stored path of the featured image, if any.
    pub image_path: Option<String>,
    /// Alt text for the featured image.
    pub image_alt: Option<String>,
    /// Owning folder (None for unfiled, author-owned activities).
    pub folder_id: Option<Uuid>,
    /// Set by every mutation of the activity or its descendants; cleared
    /// only by publishing.
    pub unpublished_changes: bool,
    /// When the activity was last published.
    pub last_published: Option<DateTime<Utc>>,
    /// When the activity was created.
    pub created_at: DateTime<Utc>,
    /// When the activity was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Directory under which all of this activity's files are stored.
    pub fn file_directory_path(&self) -> String {
        format!("activities/{}", self.id)
    }

    /// Stored path of the published artifact.
    pub fn published_file_path(&self) -> String {
        format!("{}/activity.gpx", self.file_directory_path())
    }

    /// Directory for waypoint media blobs.
    pub fn media_directory_path(&self) -> String {
        format!("{}/waypoints_media", self.file_directory_path())
    }

    /// Whether a shareable link exists (the activity has been published).
    pub fn can_link(&self) -> bool {
        self.last_published.is_some()
    }
}

/// Data required to create a new activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivity {
    /// The authoring user.
    pub author_id: Uuid,
    /// Author display name snapshot.
    pub author_name: String,
    /// Author email snapshot.
    pub author_email: Option<String>,
    /// Activity title.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Activity kind.
    pub kind: ActivityKind,
    /// Content locale.
    pub locale: String,
    /// Optional availability window start.
    pub start_at: Option<DateTime<Utc>>,
    /// Optional availability window end.
    pub end_at: Option<DateTime<Utc>>,
    /// Whether the activity expires.
    pub expires: bool,
    /// Owning folder.
    pub folder_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_paths() {
        let id = Uuid::new_v4();
        let activity = Activity {
            id,
            author_id: Uuid::new_v4(),
            author_name: "Author".into(),
            author_email: None,
            name: "Harbor walk".into(),
            description: String::new(),
            kind: ActivityKind::GuidedTour,
            locale: DEFAULT_LOCALE.into(),
            start_at: None,
            end_at: None,
            expires: false,
            image_path: None,
            image_alt: None,
            folder_id: None,
            unpublished_changes: false,
            last_published: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            activity.published_file_path(),
            format!("activities/{id}/activity.gpx")
        );
        assert_eq!(
            activity.media_directory_path(),
            format!("activities/{id}/waypoints_media")
        );
        assert!(!activity.can_link());
    }
}
