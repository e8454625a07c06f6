//! Booking state machine tests: check-in guards and window, checkout
//! turnover, housekeeping completion and the terminal state.

use anyhow::Result;
use chrono::Duration;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use roomops::models::audit_event;
use roomops::models::booking::BookingStatus;
use roomops::models::housekeeping_task::TaskStatus;
use roomops::models::room::{HousekeepingStatus, RoomStatus};
use roomops::repositories::RoomRepository;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{
    at, booking_request, controller, create_test_tenant, force_room_state, seed_room,
    setup_test_db,
};

#[tokio::test]
async fn full_stay_walks_the_state_machine() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "301", 100.0).await?;
    let ops = controller(&db);
    let rooms = RoomRepository::new(&db);

    // Reserve 10:00-12:00.
    let booking = ops
        .create_booking(tenant, "front-desk", booking_request(room.id, at(10, 0), at(12, 0)), at(8, 0))
        .await?;
    assert_eq!(booking.status, BookingStatus::Reserved);
    assert_eq!(
        rooms.find_by_tenant(tenant, room.id).await?.unwrap().status,
        RoomStatus::Reserved
    );

    // Check in within the window.
    let booking = ops
        .check_in(tenant, "front-desk", booking.id, at(10, 5))
        .await
        .expect("check-in within window succeeds");
    assert_eq!(booking.status, BookingStatus::CheckedIn);
    assert_eq!(
        rooms.find_by_tenant(tenant, room.id).await?.unwrap().status,
        RoomStatus::Occupied
    );

    // Check out: terminal booking state, room in turnover, task opened.
    let outcome = ops
        .check_out(tenant, "front-desk", booking.id, at(11, 30))
        .await?;
    assert_eq!(outcome.booking.status, BookingStatus::CheckedOut);
    assert_eq!(outcome.housekeeping_task.status, TaskStatus::InProgress);
    assert_eq!(outcome.housekeeping_task.booking_id, Some(booking.id));

    let room_state = rooms.find_by_tenant(tenant, room.id).await?.unwrap();
    assert_eq!(room_state.status, RoomStatus::Cleaning);
    assert_eq!(room_state.housekeeping_status, HousekeepingStatus::Cleaning);

    // Complete the turnover: room bookable again.
    let task = ops
        .complete_housekeeping(tenant, "housekeeping", outcome.housekeeping_task.id, at(12, 15))
        .await?;
    assert_eq!(task.status, TaskStatus::Clean);
    assert!(task.completed_at.is_some());

    let room_state = rooms.find_by_tenant(tenant, room.id).await?.unwrap();
    assert_eq!(room_state.status, RoomStatus::Available);
    assert_eq!(room_state.housekeeping_status, HousekeepingStatus::Clean);

    // Inspection stamps the room.
    let room_state = ops
        .inspect_room(tenant, "supervisor", room.id, at(12, 30))
        .await?;
    assert_eq!(
        room_state.housekeeping_status,
        HousekeepingStatus::Inspected
    );
    assert!(room_state.inspected_at.is_some());

    // Every transition above appended exactly one audit event.
    let events = audit_event::Entity::find()
        .filter(audit_event::Column::TenantId.eq(tenant.0))
        .all(&db)
        .await?;
    let actions: Vec<_> = events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(events.len(), 5);
    assert!(actions.contains(&"booking.create"));
    assert!(actions.contains(&"booking.check_in"));
    assert!(actions.contains(&"booking.check_out"));
    assert!(actions.contains(&"housekeeping.complete"));
    assert!(actions.contains(&"room.inspect"));

    Ok(())
}

#[tokio::test]
async fn check_in_requires_reserved_state() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "302", 100.0).await?;
    let ops = controller(&db);

    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(8, 0))
        .await?;
    ops.check_in(tenant, "tester", booking.id, at(10, 0)).await?;

    // A second check-in finds CHECKED_IN, not RESERVED.
    let err = ops
        .check_in(tenant, "tester", booking.id, at(10, 30))
        .await
        .expect_err("double check-in rejected");
    assert_eq!(err.code.as_ref(), "WRONG_BOOKING_STATE");

    Ok(())
}

#[tokio::test]
async fn check_in_rejected_while_room_is_cleaning() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "303", 100.0).await?;
    let ops = controller(&db);

    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(8, 0))
        .await?;

    // Stage a room still in turnover.
    force_room_state(&db,
        RoomRepository::new(&db).find_by_tenant(tenant, room.id).await?.unwrap(),
        RoomStatus::Cleaning,
        HousekeepingStatus::Cleaning,
    )
    .await?;

    let err = ops
        .check_in(tenant, "tester", booking.id, at(10, 0))
        .await
        .expect_err("cleaning room blocks check-in");
    assert_eq!(err.code.as_ref(), "ROOM_UNAVAILABLE");

    Ok(())
}

#[tokio::test]
async fn check_in_window_is_enforced() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "304", 100.0).await?;
    let ops = controller(&db);

    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(6, 0))
        .await?;

    // More than two hours early.
    let err = ops
        .check_in(tenant, "tester", booking.id, at(7, 59))
        .await
        .expect_err("too early");
    assert_eq!(err.code.as_ref(), "OUTSIDE_CHECK_IN_WINDOW");

    // After the booking ended.
    let err = ops
        .check_in(tenant, "tester", booking.id, at(12, 1))
        .await
        .expect_err("too late");
    assert_eq!(err.code.as_ref(), "OUTSIDE_CHECK_IN_WINDOW");

    // Exactly at the window edges is allowed.
    ops.check_in(tenant, "tester", booking.id, at(8, 0))
        .await
        .expect("window opens at start - 2h");

    Ok(())
}

#[tokio::test]
async fn checked_out_is_terminal() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "305", 100.0).await?;
    let ops = controller(&db);

    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(8, 0))
        .await?;
    ops.check_in(tenant, "tester", booking.id, at(10, 0)).await?;
    let outcome = ops.check_out(tenant, "tester", booking.id, at(11, 0)).await?;

    // Finish the turnover so the room guard cannot mask the booking-state
    // guard.
    ops.complete_housekeeping(tenant, "tester", outcome.housekeeping_task.id, at(11, 5))
        .await?;

    let err = ops
        .check_in(tenant, "tester", booking.id, at(11, 10))
        .await
        .expect_err("no transition out of CHECKED_OUT");
    assert_eq!(err.code.as_ref(), "WRONG_BOOKING_STATE");

    let err = ops
        .check_out(tenant, "tester", booking.id, at(11, 10))
        .await
        .expect_err("no repeated checkout");
    assert_eq!(err.code.as_ref(), "WRONG_BOOKING_STATE");

    Ok(())
}

#[tokio::test]
async fn checkout_cannot_skip_check_in() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "306", 100.0).await?;
    let ops = controller(&db);

    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(8, 0))
        .await?;

    let err = ops
        .check_out(tenant, "tester", booking.id, at(10, 30))
        .await
        .expect_err("RESERVED cannot check out directly");
    assert_eq!(err.code.as_ref(), "WRONG_BOOKING_STATE");

    Ok(())
}

#[tokio::test]
async fn completing_a_task_twice_fails() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "307", 100.0).await?;
    let ops = controller(&db);

    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(8, 0))
        .await?;
    ops.check_in(tenant, "tester", booking.id, at(10, 0)).await?;
    let outcome = ops.check_out(tenant, "tester", booking.id, at(11, 0)).await?;

    ops.complete_housekeeping(tenant, "tester", outcome.housekeeping_task.id, at(11, 30))
        .await?;

    let err = ops
        .complete_housekeeping(tenant, "tester", outcome.housekeeping_task.id, at(11, 45))
        .await
        .expect_err("second completion rejected");
    assert_eq!(err.code.as_ref(), "WRONG_BOOKING_STATE");

    Ok(())
}

#[tokio::test]
async fn unknown_ids_surface_not_found() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let ops = controller(&db);

    let missing = uuid::Uuid::new_v4();

    let err = ops
        .check_in(tenant, "tester", missing, at(10, 0))
        .await
        .expect_err("unknown booking");
    assert_eq!(err.code.as_ref(), "NOT_FOUND");

    let err = ops
        .complete_housekeeping(tenant, "tester", missing, at(10, 0))
        .await
        .expect_err("unknown task");
    assert_eq!(err.code.as_ref(), "NOT_FOUND");

    let err = ops
        .return_to_service(tenant, "tester", missing, at(10, 0))
        .await
        .expect_err("unknown room");
    assert_eq!(err.code.as_ref(), "NOT_FOUND");

    Ok(())
}
