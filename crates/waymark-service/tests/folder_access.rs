//! Integration tests for folder access resolution and the folder
//! mutation guard.

mod common;

use waymark_core::error::ErrorKind;
use waymark_entity::grant::{GrantAccess, Principal};
use waymark_service::RequestContext;
use waymark_service::folder::{CreateFolderRequest, UpdateFolderRequest};
use waymark_service::grant::CreateGrantRequest;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn team_read_grant_is_inherited_by_descendants() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let member = app.create_user("member", false).await;
    let team = app.create_team_with_member(owner.id, member.id, "Guides").await;

    let owner_ctx = RequestContext::user(owner.id);
    let root = app
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
    let child = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Harbor".into(),
                parent_id: Some(root.id),
            },
        )
        .await
        .unwrap();

    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: root.id,
                principal: Principal::Team(team.id),
                access: GrantAccess::Read,
            },
        )
        .await
        .unwrap();

    let access = app
        .resolver
        .resolve(Some(member.id), false, &child)
        .await
        .unwrap();
    assert!(access.can_read);
    assert!(!access.can_write);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn owner_has_full_access_regardless_of_grants() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let ctx = RequestContext::user(owner.id);

    let folder = app
        .folders
        .create_folder(
            &ctx,
            CreateFolderRequest {
                name: "Mine".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    let access = app
        .resolver
        .resolve(Some(owner.id), false, &folder)
        .await
        .unwrap();
    assert!(access.can_read);
    assert!(access.can_write);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn write_grant_on_any_ancestor_yields_write() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let guest = app.create_user("guest", false).await;
    let owner_ctx = RequestContext::user(owner.id);

    let root = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Root".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    let mid = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Mid".into(),
                parent_id: Some(root.id),
            },
        )
        .await
        .unwrap();
    let leaf = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Leaf".into(),
                parent_id: Some(mid.id),
            },
        )
        .await
        .unwrap();

    // Read on the midpoint, write at the root: the union wins, depth is
    // irrelevant.
    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: mid.id,
                principal: Principal::User(guest.id),
                access: GrantAccess::Read,
            },
        )
        .await
        .unwrap();
    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: root.id,
                principal: Principal::User(guest.id),
                access: GrantAccess::Write,
            },
        )
        .await
        .unwrap();

    let access = app
        .resolver
        .resolve(Some(guest.id), false, &leaf)
        .await
        .unwrap();
    assert!(access.can_read);
    assert!(access.can_write);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn accessible_folder_ids_expand_downward() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let guest = app.create_user("guest", false).await;
    let owner_ctx = RequestContext::user(owner.id);

    let root = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Shared".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    let child = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Child".into(),
                parent_id: Some(root.id),
            },
        )
        .await
        .unwrap();
    let grandchild = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Grandchild".into(),
                parent_id: Some(child.id),
            },
        )
        .await
        .unwrap();

    app.grants
        .create_grant(
            &owner_ctx,
            CreateGrantRequest {
                folder_id: root.id,
                principal: Principal::User(guest.id),
                access: GrantAccess::Read,
            },
        )
        .await
        .unwrap();

    let accessible = app
        .resolver
        .accessible_folder_ids(Some(guest.id), false)
        .await
        .unwrap();
    assert!(accessible.contains(&root.id));
    assert!(accessible.contains(&child.id));
    assert!(accessible.contains(&grandchild.id));

    let stranger = app.create_user("stranger", false).await;
    let empty = app
        .resolver
        .accessible_folder_ids(Some(stranger.id), false)
        .await
        .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn reparent_cycle_is_rejected_and_tree_unchanged() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let ctx = RequestContext::user(owner.id);

    let a = app
        .folders
        .create_folder(
            &ctx,
            CreateFolderRequest {
                name: "A".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();
    let b = app
        .folders
        .create_folder(
            &ctx,
            CreateFolderRequest {
                name: "B".into(),
                parent_id: Some(a.id),
            },
        )
        .await
        .unwrap();

    let err = app
        .folders
        .update_folder(
            &ctx,
            a.id,
            UpdateFolderRequest {
                name: "A".into(),
                parent_id: Some(b.id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let a_after = app.folders.get_folder(&ctx, a.id).await.unwrap();
    assert_eq!(a_after.parent_id, None);

    let err = app
        .folders
        .update_folder(
            &ctx,
            a.id,
            UpdateFolderRequest {
                name: "A".into(),
                parent_id: Some(a.id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn root_folder_names_are_globally_unique() {
    let app = common::TestApp::new().await;
    let alice = app.create_user("alice", false).await;
    let bob = app.create_user("bob", false).await;

    app.folders
        .create_folder(
            &RequestContext::user(alice.id),
            CreateFolderRequest {
                name: "Shared".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    let err = app
        .folders
        .create_folder(
            &RequestContext::user(bob.id),
            CreateFolderRequest {
                name: "Shared".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.is_retriable());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn inaccessible_folder_reads_report_not_found() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let stranger = app.create_user("stranger", false).await;

    let folder = app
        .folders
        .create_folder(
            &RequestContext::user(owner.id),
            CreateFolderRequest {
                name: "Private".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    let err = app
        .folders
        .get_folder(&RequestContext::user(stranger.id), folder.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .folders
        .get_folder(&RequestContext::anonymous(), folder.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn reparent_requires_write_on_destination() {
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
    let moving = app
        .folders
        .create_folder(
            &owner_ctx,
            CreateFolderRequest {
                name: "Moving".into(),
                parent_id: Some(source.id),
            },
        )
        .await
        .unwrap();

    // Editor can write the source tree but not the destination.
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

    let err = app
        .folders
        .update_folder(
            &RequestContext::user(editor.id),
            moving.id,
            UpdateFolderRequest {
                name: "Moving".into(),
                parent_id: Some(destination.id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn staff_bypass_sees_everything() {
    let app = common::TestApp::new().await;
    let owner = app.create_user("owner", false).await;
    let admin = app.create_user("admin", true).await;

    let folder = app
        .folders
        .create_folder(
            &RequestContext::user(owner.id),
            CreateFolderRequest {
                name: "Private".into(),
                parent_id: None,
            },
        )
        .await
        .unwrap();

    let access = app
        .resolver
        .resolve(Some(admin.id), true, &folder)
        .await
        .unwrap();
    assert!(access.can_read && access.can_write);

    let accessible = app
        .resolver
        .accessible_folder_ids(Some(admin.id), true)
        .await
        .unwrap();
    assert!(accessible.contains(&folder.id));
}
