//! Integration tests for the ordered-waypoint index invariant: dense,
//! unique, zero-based per group after any sequence of operations.

mod common;

use uuid::Uuid;

use waymark_core::error::ErrorKind;
use waymark_entity::activity::{Activity, ActivityKind};
use waymark_entity::waypoint::{WaypointGroup, WaypointGroupKind};
use waymark_service::RequestContext;
use waymark_service::activity::CreateActivityRequest;
use waymark_service::waypoint::{CreateWaypointRequest, UpdateWaypointRequest};

async fn create_activity(
    app: &common::TestApp,
    ctx: &RequestContext,
) -> (Activity, WaypointGroup, WaypointGroup) {
    let (activity, groups) = app
        .activities
        .create_activity(
            ctx,
            CreateActivityRequest {
                name: "Harbor walk".into(),
                description: "A walk around the harbor".into(),
                kind: ActivityKind::GuidedTour,
                locale: None,
                start_at: None,
                end_at: None,
                expires: false,
                folder_id: None,
            },
        )
        .await
        .unwrap();

    let route = groups
        .iter()
        .find(|g| g.kind == WaypointGroupKind::Ordered)
        .cloned()
        .unwrap();
    let pois = groups
        .iter()
        .find(|g| g.kind == WaypointGroupKind::Unordered)
        .cloned()
        .unwrap();
    (activity, route, pois)
}

fn waypoint_request(group_id: Uuid, name: &str) -> CreateWaypointRequest {
    CreateWaypointRequest {
        group_id,
        latitude: 55.6761,
        longitude: 12.5683,
        name: name.into(),
        description: None,
        departure_callout: None,
        arrival_callout: None,
    }
}

fn update_request(name: &str, index: Option<i32>) -> UpdateWaypointRequest {
    UpdateWaypointRequest {
        latitude: 55.6761,
        longitude: 12.5683,
        name: name.into(),
        description: None,
        departure_callout: None,
        arrival_callout: None,
        index,
    }
}

/// Assert the group's indices are exactly `0..n`.
async fn assert_dense(app: &common::TestApp, ctx: &RequestContext, group_id: Uuid, n: usize) {
    let waypoints = app.waypoints.list_for_group(ctx, group_id).await.unwrap();
    assert_eq!(waypoints.len(), n);
    let mut indices: Vec<i32> = waypoints.iter().map(|w| w.index.unwrap()).collect();
    indices.sort_unstable();
    assert_eq!(indices, (0..n as i32).collect::<Vec<_>>());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn inserts_append_with_dense_indices() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    for (i, name) in ["First", "Second", "Third"].iter().enumerate() {
        let waypoint = app
            .waypoints
            .create_waypoint(&ctx, waypoint_request(route.id, name))
            .await
            .unwrap();
        assert_eq!(waypoint.index, Some(i as i32));
    }

    assert_dense(&app, &ctx, route.id, 3).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn single_step_move_up_swaps_indices() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    let first = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "First"))
        .await
        .unwrap();
    let second = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "Second"))
        .await
        .unwrap();

    let affected = app
        .waypoints
        .update_waypoint(&ctx, second.id, update_request("Second", Some(0)))
        .await
        .unwrap();
    assert_eq!(affected.len(), 2);

    let moved = affected.iter().find(|w| w.id == second.id).unwrap();
    let displaced = affected.iter().find(|w| w.id == first.id).unwrap();
    assert_eq!(moved.index, Some(0));
    assert_eq!(displaced.index, Some(1));

    assert_dense(&app, &ctx, route.id, 2).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn single_step_move_down_swaps_indices() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    let first = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "First"))
        .await
        .unwrap();
    app.waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "Second"))
        .await
        .unwrap();

    let affected = app
        .waypoints
        .update_waypoint(&ctx, first.id, update_request("First", Some(1)))
        .await
        .unwrap();

    let moved = affected.iter().find(|w| w.id == first.id).unwrap();
    assert_eq!(moved.index, Some(1));
    assert_dense(&app, &ctx, route.id, 2).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn reorder_to_current_index_changes_nothing() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    let first = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "First"))
        .await
        .unwrap();
    let second = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "Second"))
        .await
        .unwrap();

    let affected = app
        .waypoints
        .update_waypoint(&ctx, first.id, update_request("First renamed", Some(0)))
        .await
        .unwrap();
    assert_eq!(affected.len(), 1);
    assert_eq!(affected[0].index, Some(0));
    assert_eq!(affected[0].name, "First renamed");

    let others = app.waypoints.list_for_group(&ctx, route.id).await.unwrap();
    let untouched = others.iter().find(|w| w.id == second.id).unwrap();
    assert_eq!(untouched.index, Some(1));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn non_adjacent_move_is_rejected_without_changes() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    for name in ["A", "B", "C", "D", "E"] {
        app.waypoints
            .create_waypoint(&ctx, waypoint_request(route.id, name))
            .await
            .unwrap();
    }

    let waypoints = app.waypoints.list_for_group(&ctx, route.id).await.unwrap();
    let first = waypoints.iter().find(|w| w.index == Some(0)).unwrap();

    let err = app
        .waypoints
        .update_waypoint(&ctx, first.id, update_request("A", Some(3)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    // No index moved.
    let after = app.waypoints.list_for_group(&ctx, route.id).await.unwrap();
    for (before, after) in waypoints.iter().zip(after.iter()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.index, after.index);
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn negative_target_index_is_rejected() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    let waypoint = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "Only"))
        .await
        .unwrap();

    let err = app
        .waypoints
        .update_waypoint(&ctx, waypoint.id, update_request("Only", Some(-1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn delete_compacts_remaining_indices() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    let mut created = Vec::new();
    for name in ["A", "B", "C", "D"] {
        created.push(
            app.waypoints
                .create_waypoint(&ctx, waypoint_request(route.id, name))
                .await
                .unwrap(),
        );
    }

    let shifted = app.waypoints.delete_waypoint(&ctx, created[1].id).await.unwrap();
    assert_eq!(shifted.len(), 2);

    assert_dense(&app, &ctx, route.id, 3).await;

    // Relative order preserved: A stays at 0, C and D close the gap.
    let after = app.waypoints.list_for_group(&ctx, route.id).await.unwrap();
    let names: Vec<&str> = after.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C", "D"]);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn mixed_operation_sequence_keeps_indices_dense() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, route, _) = create_activity(&app, &ctx).await;

    for name in ["A", "B", "C", "D", "E"] {
        app.waypoints
            .create_waypoint(&ctx, waypoint_request(route.id, name))
            .await
            .unwrap();
    }

    let waypoints = app.waypoints.list_for_group(&ctx, route.id).await.unwrap();
    // Move E up one, delete C, append F.
    let e = waypoints.iter().find(|w| w.name == "E").unwrap();
    app.waypoints
        .update_waypoint(&ctx, e.id, update_request("E", Some(3)))
        .await
        .unwrap();
    let c = waypoints.iter().find(|w| w.name == "C").unwrap();
    app.waypoints.delete_waypoint(&ctx, c.id).await.unwrap();
    app.waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "F"))
        .await
        .unwrap();

    assert_dense(&app, &ctx, route.id, 5).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn unordered_group_waypoints_carry_no_index() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (_, _, pois) = create_activity(&app, &ctx).await;

    let waypoint = app
        .waypoints
        .create_waypoint(&ctx, waypoint_request(pois.id, "Fountain"))
        .await
        .unwrap();
    assert_eq!(waypoint.index, None);

    // Deleting runs no compaction for unordered groups.
    let shifted = app.waypoints.delete_waypoint(&ctx, waypoint.id).await.unwrap();
    assert!(shifted.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn descendant_writes_flag_unpublished_changes() {
    let app = common::TestApp::new().await;
    let author = app.create_user("author", false).await;
    let ctx = RequestContext::user(author.id);
    let (activity, route, _) = create_activity(&app, &ctx).await;

    assert!(activity.unpublished_changes);

    let published = app
        .activities
        .publish(&ctx, activity.id, bytes::Bytes::from_static(b"<gpx/>"))
        .await
        .unwrap();
    assert!(!published.unpublished_changes);
    assert!(published.last_published.is_some());

    app.waypoints
        .create_waypoint(&ctx, waypoint_request(route.id, "New stop"))
        .await
        .unwrap();

    let after = app.activities.get_activity(&ctx, activity.id).await.unwrap();
    assert!(after.unpublished_changes);
}
