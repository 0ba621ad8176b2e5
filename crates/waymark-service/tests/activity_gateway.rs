//! Integration tests for the activity write gateway: folder-scoped
//! authorization, server-assigned authorship, default groups, and the
//! publish flow.

mod common;

use bytes::Bytes;

use waymark_core::error::ErrorKind;
use waymark_database::repositories::activity::UpdateActivity;
use waymark_entity::activity::ActivityKind;
use waymark_entity::grant::{GrantAccess, Principal};
use waymark_entity::waypoint::WaypointGroupKind;
use waymark_service::activity::{ActivityFilter, CreateActivityRequest};
use waymark_service::folder::CreateFolderRequest;
use waymark_service::grant::CreateGrantRequest;
use waymark_service::RequestContext;

fn activity_request(folder_id: Option<uuid::Uuid>) -> CreateActivityRequest {
    CreateActivityRequest {
        name: "City loop".into(),
        description: "Orienteering around the old town".into(),
        kind: ActivityKind::Orienteering,
        locale: None,
        start_at: None,
        end_at: None,
        expires: false,
        folder_id,
    }
}

fn update_from(activity: &waymark_entity::activity::Activity) -> UpdateActivity {
    UpdateActivity {
        name: activity.name.clone(),
        description: activity.description.clone(),
        kind: activity.kind,
        locale: activity.locale.clone(),
        start_at: activity.start_at,
        end_at: activity.end_at,
        expires: activity.expires,
        image_alt: activity.image_alt.clone(),
        folder_id: activity.folder_id,
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn create_assigns_author_and_default_groups() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);

    let (activity, groups) = app
        .activities
        .create_activity(&ctx, activity_request(None))
        .await
        .unwrap();

    assert_eq!(activity.author_id, author.id);
    assert!(activity.unpublished_changes);
    assert_eq!(groups.len(), 2);
    assert!(
        groups
            .iter()
            .any(|g| g.kind == WaypointGroupKind::Ordered && g.name.as_deref() == Some("Default"))
    );
    assert!(groups.iter().any(|g| g.kind == WaypointGroupKind::Unordered
        && g.name.as_deref() == Some("Points of Interest")));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn create_in_folder_requires_write_access() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let reader = app.create_user("reader", false).await;
    let owner_ctx = RequestContext::user(owner.id);

    let folder = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Tours".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: folder.id,
                principal: Principal::User(reader.id),
                access: GrantAccess::Read,
            },
        )
        .await
        .unwrap();

    let err = app
        .activities
        .create_activity(&RequestContext::user(reader.id), activity_request(Some(folder.id)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    // A writer succeeds.
    app.activities
        .create_activity(&owner_ctx, activity_request(Some(folder.id)))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn unfiled_activity_is_private_to_its_author() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let other = app.create_user("other", false).await;
    let author_ctx = RequestContext::user(author.id);

    let (activity, _) = app
        .activities
        .create_activity(&author_ctx, activity_request(None))
        .await
        .unwrap();

    let err = app
        .activities
        .get_activity(&RequestContext::user(other.id), activity.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .activities
        .delete_activity(&RequestContext::user(other.id), activity.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    app.activities
        .delete_activity(&author_ctx, activity.id)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn moving_requires_write_on_both_folders() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let editor = app.create_user("editor", false).await;
    let owner_ctx = RequestContext::user(owner.id);

    let source = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Source".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    let destination = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Destination".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: source.id,
                principal: Principal::User(editor.id),
                access: GrantAccess::Write,
            },
        )
        .await
        .unwrap();

    let (activity, _) = app
        .activities
        .create_activity(&owner_ctx, activity_request(Some(source.id)))
        .await
        .unwrap();

    let mut update = update_from(&activity);
    update.folder_id = Some(destination.id);

    let err = app
        .activities
        .update_activity(&RequestContext::user(editor.id), activity.id, update.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    // The folder's owner can move it.
    let moved = app
        .activities
        .update_activity(&owner_ctx, activity.id, update)
        .await
        .unwrap();
    assert_eq!(moved.folder_id, Some(destination.id));
    assert!(moved.unpublished_changes);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn listing_filters_by_folder_and_unfiled() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let stranger = app.create_user("stranger", false).await;
    let owner_ctx = RequestContext::user(owner.id);

    let folder = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Tours".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    let (filed, _) = app
        .activities
        .create_activity(&owner_ctx, activity_request(Some(folder.id)))
        .await
        .unwrap();
    let (unfiled, _) = app
        .activities
        .create_activity(&owner_ctx, activity_request(None))
        .await
        .unwrap();

    let in_folder = app
        .activities
        .list_activities(&owner_ctx, Some(ActivityFilter::Folder(folder.id)))
        .await
        .unwrap();
    assert_eq!(in_folder.len(), 1);
    assert_eq!(in_folder[0].id, filed.id);

    let unfiled_list = app
        .activities
        .list_activities(&owner_ctx, Some(ActivityFilter::Unfiled))
        .await
        .unwrap();
    assert_eq!(unfiled_list.len(), 1);
    assert_eq!(unfiled_list[0].id, unfiled.id);

    let everything = app.activities.list_activities(&owner_ctx, None).await.unwrap();
    assert_eq!(everything.len(), 2);

    // An inaccessible folder filter yields an empty list, not an error.
    let hidden = app
        .activities
        .list_activities(
            &RequestContext::user(stranger.id),
            Some(ActivityFilter::Folder(folder.id)),
        )
        .await
        .unwrap();
    assert!(hidden.is_empty());

    let anonymous = app
        .activities
        .list_activities(&RequestContext::anonymous(), None)
        .await
        .unwrap();
    assert!(anonymous.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn publish_stores_artifact_and_clears_flag() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);

    let (activity, _) = app
        .activities
        .create_activity(&ctx, activity_request(None))
        .await
        .unwrap();

    let published = app
        .activities
        .publish(&ctx, activity.id, Bytes::from_static(b"<gpx/>"))
        .await
        .unwrap();
    assert!(!published.unpublished_changes);
    assert!(published.last_published.is_some());

    use waymark_core::traits::MediaStore;
    assert!(
        app.media_store
            .exists(&published.published_file_path())
            .await
            .unwrap()
    );

    // Editing after publishing flags again.
    let edited = app
        .activities
        .update_activity(&ctx, activity.id, update_from(&published))
        .await
        .unwrap();
    assert!(edited.unpublished_changes);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn team_write_grant_allows_editing_filed_activities() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let member = app.create_user("member", false).await;
    let team = app.create_team_with_member(owner.id, member.id, "Guides").await;
    let owner_ctx = RequestContext::user(owner.id);

    let folder = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Shared tours".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: folder.id,
                principal: Principal::Team(team.id),
                access: GrantAccess::Write,
            },
        )
        .await
        .unwrap();

    let (activity, _) = app
        .activities
        .create_activity(&owner_ctx, activity_request(Some(folder.id)))
        .await
        .unwrap();

    let member_ctx = RequestContext::user(member.id);
    let mut update = update_from(&activity);
    update.name = "City loop (revised)".into();

    let updated = app
        .activities
        .update_activity(&member_ctx, activity.id, update)
        .await
        .unwrap();
    assert_eq!(updated.name, "City loop (revised)");
}
