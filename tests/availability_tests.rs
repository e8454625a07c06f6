//! Admission-control tests: strict overlap, back-to-back edges, the
//! out-of-order gate and probe/create agreement.

use anyhow::Result;
use chrono::Duration;

use roomops::availability::{AvailabilityDecision, BookingPolicy, BookingInterval, check_availability};
use roomops::error::OpsError;
use roomops::models::booking::BookingStatus;
use roomops::repositories::RoomRepository;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{at, booking_request, controller, create_test_tenant, seed_booking, seed_room, setup_test_db};

#[tokio::test]
async fn overlapping_booking_is_rejected() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "201", 100.0).await?;
    let ops = controller(&db);

    ops.create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(9, 0))
        .await
        .expect("first booking admitted");

    // Fully contained interval conflicts.
    let err = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 30), at(11, 30)), at(9, 0))
        .await
        .expect_err("overlap must be rejected");
    assert_eq!(err.code.as_ref(), "OVERLAP");

    let details = err.details.expect("overlap carries conflicts");
    let conflicts = details["conflicts"].as_array().expect("conflicts array");
    assert_eq!(conflicts.len(), 1);

    Ok(())
}

#[tokio::test]
async fn back_to_back_bookings_are_both_admitted() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "202", 100.0).await?;
    let ops = controller(&db);

    ops.create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(9, 0))
        .await
        .expect("first booking admitted");

    // Starting exactly where the previous one ends is not a conflict.
    let second = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(12, 0), at(13, 0)), at(9, 0))
        .await
        .expect("edge-touching booking admitted");
    assert_eq!(second.status, BookingStatus::Reserved);

    // And ending exactly where the first one starts.
    ops.create_booking(tenant, "tester", booking_request(room.id, at(9, 0), at(10, 0)), at(8, 0))
        .await
        .expect("booking ending at existing start admitted");

    Ok(())
}

#[tokio::test]
async fn probe_and_create_never_disagree() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "203", 100.0).await?;
    let ops = controller(&db);
    let policy = BookingPolicy::default();

    ops.create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(9, 0))
        .await?;
    let room = RoomRepository::new(&db)
        .find_by_tenant(tenant, room.id)
        .await?
        .expect("room exists");

    // Probe the conflicting interval, then try to create it: the decisions
    // must match reason for reason.
    let interval = BookingInterval::new(at(11, 0), at(13, 0), &policy).unwrap();
    let decision = check_availability(&db, tenant, &room, &interval, &policy).await?;
    assert!(matches!(
        decision,
        AvailabilityDecision::Rejected(OpsError::Overlap { .. })
    ));

    let err = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(11, 0), at(13, 0)), at(9, 0))
        .await
        .expect_err("create must agree with probe");
    assert_eq!(err.code.as_ref(), "OVERLAP");

    // And a free interval admitted by the probe is admitted by create.
    let free = BookingInterval::new(at(14, 0), at(15, 0), &policy).unwrap();
    let decision = check_availability(&db, tenant, &room, &free, &policy).await?;
    assert!(decision.is_available());
    ops.create_booking(tenant, "tester", booking_request(room.id, at(14, 0), at(15, 0)), at(9, 0))
        .await
        .expect("create must agree with probe");

    Ok(())
}

#[tokio::test]
async fn invalid_intervals_are_rejected_before_storage() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "204", 100.0).await?;
    let ops = controller(&db);

    let inverted = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(12, 0), at(10, 0)), at(9, 0))
        .await
        .expect_err("inverted interval rejected");
    assert_eq!(inverted.code.as_ref(), "INVALID_INTERVAL");

    let too_short = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(10, 15)), at(9, 0))
        .await
        .expect_err("sub-minimum interval rejected");
    assert_eq!(too_short.code.as_ref(), "INVALID_INTERVAL");

    Ok(())
}

#[tokio::test]
async fn out_of_order_gate_honors_due_at() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "401", 100.0).await?;
    let ops = controller(&db);

    // Out of order until T+3h.
    let now = at(12, 0);
    let due = now + Duration::hours(3);
    ops.declare_out_of_order(tenant, "tester", room.id, "AC broken", Some(due), now)
        .await?;

    // A request starting inside the maintenance window is rejected with the
    // expected return time.
    let err = ops
        .create_booking(
            tenant,
            "tester",
            booking_request(room.id, now + Duration::hours(1), now + Duration::hours(2)),
            now,
        )
        .await
        .expect_err("start before due_at rejected");
    assert_eq!(err.code.as_ref(), "OUT_OF_ORDER");
    let details = err.details.expect("details carry until");
    assert_eq!(details["until"].as_str().unwrap(), due.to_rfc3339());

    // A request starting at/after due_at is admitted.
    ops.create_booking(
        tenant,
        "tester",
        booking_request(room.id, now + Duration::hours(4), now + Duration::hours(5)),
        now,
    )
    .await
    .expect("start after due_at admitted");

    // The room is still out of order; the admitted future booking must not
    // have pulled it back into the pool.
    let room = RoomRepository::new(&db)
        .find_by_tenant(tenant, room.id)
        .await?
        .expect("room exists");
    assert!(room.out_of_order);

    Ok(())
}

#[tokio::test]
async fn out_of_order_without_due_at_rejects_indefinitely() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "402", 100.0).await?;
    let ops = controller(&db);

    let now = at(12, 0);
    ops.declare_out_of_order(tenant, "tester", room.id, "flood damage", None, now)
        .await?;

    let err = ops
        .create_booking(
            tenant,
            "tester",
            booking_request(room.id, now + Duration::days(30), now + Duration::days(30) + Duration::hours(2)),
            now,
        )
        .await
        .expect_err("indefinite out-of-order rejects any start");
    assert_eq!(err.code.as_ref(), "OUT_OF_ORDER");
    let details = err.details.expect("details present");
    assert!(details["until"].is_null());

    Ok(())
}

#[tokio::test]
async fn reported_conflicts_are_bounded() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "205", 100.0).await?;
    let ops = controller(&db);

    // Seed more overlapping holding rows than the reporting bound directly;
    // admission control would never let these in itself.
    for i in 0..8 {
        seed_booking(
            &db,
            tenant,
            room.id,
            at(10, 0) + Duration::minutes(i * 5),
            at(12, 0) + Duration::minutes(i * 5),
            BookingStatus::Reserved,
            100.0,
        )
        .await?;
    }

    let err = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(9, 0))
        .await
        .expect_err("overlap rejected");
    assert_eq!(err.code.as_ref(), "OVERLAP");

    let details = err.details.expect("conflicts attached");
    let conflicts = details["conflicts"].as_array().expect("conflicts array");
    assert_eq!(
        conflicts.len(),
        BookingPolicy::default().max_reported_conflicts as usize
    );

    Ok(())
}

#[tokio::test]
async fn amount_is_computed_from_base_rate_and_rounded_duration() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant = create_test_tenant(&db).await?;
    let room = seed_room(&db, tenant, "206", 120.0).await?;
    let ops = controller(&db);

    // 45 minutes rounds to a billable hour at the room's base rate.
    let booking = ops
        .create_booking(tenant, "tester", booking_request(room.id, at(10, 0), at(10, 45)), at(9, 0))
        .await?;
    assert_eq!(booking.amount, 120.0);

    // An explicit rate overrides the base rate.
    let mut request = booking_request(room.id, at(14, 0), at(16, 0));
    request.rate_per_hour = Some(80.0);
    let booking = ops.create_booking(tenant, "tester", request, at(9, 0)).await?;
    assert_eq!(booking.amount, 160.0);

    // An explicit amount wins outright.
    let mut request = booking_request(room.id, at(18, 0), at(19, 0));
    request.amount = Some(42.0);
    let booking = ops.create_booking(tenant, "tester", request, at(9, 0)).await?;
    assert_eq!(booking.amount, 42.0);

    Ok(())
}
