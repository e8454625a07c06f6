//! Tests ensuring tenant isolation: entities of one tenant are invisible to
//! another, and room-name uniqueness is scoped per tenant.

use anyhow::Result;

use roomops::repositories::{BookingListFilter, BookingRepository, RoomRepository};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{at, booking_request, controller, create_test_tenant, seed_room, setup_test_db};

#[tokio::test]
async fn rooms_and_bookings_are_invisible_across_tenants() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant_a = create_test_tenant(&db).await?;
    let tenant_b = create_test_tenant(&db).await?;
    let ops = controller(&db);

    let room = seed_room(&db, tenant_a, "101", 100.0).await?;
    let booking = ops
        .create_booking(tenant_a, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(9, 0))
        .await?;

    // Tenant B sees neither the room nor the booking, even by ID.
    let rooms = RoomRepository::new(&db);
    assert!(rooms.find_by_tenant(tenant_b, room.id).await?.is_none());
    assert!(rooms.list_by_tenant(tenant_b).await?.is_empty());

    let bookings = BookingRepository::new(&db);
    assert!(
        bookings
            .find_by_tenant(tenant_b, booking.id)
            .await?
            .is_none()
    );
    assert!(
        bookings
            .list_by_tenant(
                tenant_b,
                BookingListFilter {
                    limit: 100,
                    ..BookingListFilter::default()
                }
            )
            .await?
            .is_empty()
    );

    Ok(())
}

#[tokio::test]
async fn lifecycle_operations_cannot_cross_tenants() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant_a = create_test_tenant(&db).await?;
    let tenant_b = create_test_tenant(&db).await?;
    let ops = controller(&db);

    let room = seed_room(&db, tenant_a, "102", 100.0).await?;
    let booking = ops
        .create_booking(tenant_a, "tester", booking_request(room.id, at(10, 0), at(12, 0)), at(9, 0))
        .await?;

    // Another tenant referencing the foreign booking or room gets NOT_FOUND,
    // exactly as if it did not exist.
    let err = ops
        .check_in(tenant_b, "intruder", booking.id, at(10, 0))
        .await
        .expect_err("foreign booking is invisible");
    assert_eq!(err.code.as_ref(), "NOT_FOUND");

    let err = ops
        .declare_out_of_order(tenant_b, "intruder", room.id, "sabotage", None, at(10, 0))
        .await
        .expect_err("foreign room is invisible");
    assert_eq!(err.code.as_ref(), "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn room_names_are_unique_per_tenant_only() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant_a = create_test_tenant(&db).await?;
    let tenant_b = create_test_tenant(&db).await?;

    // The same name is fine under different tenants.
    seed_room(&db, tenant_a, "201", 100.0).await?;
    seed_room(&db, tenant_b, "201", 100.0).await?;

    // A duplicate within one tenant violates the unique index.
    let duplicate = seed_room(&db, tenant_a, "201", 100.0).await;
    assert!(duplicate.is_err());

    Ok(())
}

#[tokio::test]
async fn overlap_checks_do_not_leak_across_tenants() -> Result<()> {
    let db = setup_test_db().await?;
    let tenant_a = create_test_tenant(&db).await?;
    let tenant_b = create_test_tenant(&db).await?;
    let ops = controller(&db);

    // Same room name, same interval, different tenants: both admitted
    // because the rooms are distinct inventory.
    let room_a = seed_room(&db, tenant_a, "301", 100.0).await?;
    let room_b = seed_room(&db, tenant_b, "301", 100.0).await?;

    ops.create_booking(tenant_a, "tester", booking_request(room_a.id, at(10, 0), at(12, 0)), at(9, 0))
        .await
        .expect("tenant A booking admitted");
    ops.create_booking(tenant_b, "tester", booking_request(room_b.id, at(10, 0), at(12, 0)), at(9, 0))
        .await
        .expect("tenant B booking admitted");

    Ok(())
}
