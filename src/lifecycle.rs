//! # Lifecycle Controller
//!
//! Executes booking and room state transitions: create, check-in, check-out,
//! housekeeping completion, inspection, out-of-order declaration and return
//! to service.
//!
//! Every operation takes the current time as an explicit parameter, runs as a
//! single transaction against the inventory and booking tables (SERIALIZABLE
//! on Postgres; SQLite transactions are already serializable), appends an
//! audit record in that same transaction, and is the sole writer of
//! `Room.status`, `Room.housekeeping_status`, `Room.out_of_order`,
//! `Booking.status` and ticket/task statuses. A transient storage failure is
//! retried once with a fresh transaction; a second one surfaces as 503.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveEnum, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, IsolationLevel, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::TenantId;
use crate::availability::{
    AvailabilityDecision, BookingInterval, BookingPolicy, check_availability, compute_amount,
};
use crate::error::{ApiError, OpsError, is_transient};
use crate::models::booking::{self, BookingStatus};
use crate::models::housekeeping_task::{self, TaskStatus};
use crate::models::maintenance_ticket;
use crate::models::room::{self, HousekeepingStatus, RoomStatus};
use crate::repositories::{
    AuditEventRepository, BookingRepository, HousekeepingTaskRepository,
    MaintenanceTicketRepository, RoomRepository,
};
use crate::repositories::booking::NewBooking;

/// Request to create a booking. Occupant fields are descriptive only.
#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub rate_per_hour: Option<f64>,
    pub amount: Option<f64>,
    pub booked_by: Option<String>,
    pub guest_name: Option<String>,
    pub purpose: Option<String>,
    pub adults: i32,
    pub children: i32,
}

/// Result of a checkout: the terminal booking and the turnover task it
/// created.
#[derive(Debug, Clone)]
pub struct CheckOutOutcome {
    pub booking: booking::Model,
    pub housekeeping_task: housekeeping_task::Model,
}

/// Result of declaring a room out of order.
#[derive(Debug, Clone)]
pub struct OutOfOrderOutcome {
    pub room: room::Model,
    pub ticket: maintenance_ticket::Model,
}

/// Internal failure split: business-rule violations are never retried,
/// storage failures may be.
enum LifecycleFailure {
    Domain(OpsError),
    Storage(DbErr),
}

impl From<OpsError> for LifecycleFailure {
    fn from(error: OpsError) -> Self {
        LifecycleFailure::Domain(error)
    }
}

impl From<DbErr> for LifecycleFailure {
    fn from(error: DbErr) -> Self {
        LifecycleFailure::Storage(error)
    }
}

/// The lifecycle controller. One instance per app state; cheap to clone.
#[derive(Clone)]
pub struct LifecycleController {
    db: DatabaseConnection,
    policy: BookingPolicy,
}

impl LifecycleController {
    pub fn new(db: DatabaseConnection, policy: BookingPolicy) -> Self {
        Self { db, policy }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Open the transaction every operation runs in. SQLite rejects explicit
    /// isolation levels but is serializable by default; Postgres gets
    /// SERIALIZABLE so concurrent admissions on the same room cannot both
    /// pass the overlap check.
    async fn begin(&self) -> Result<DatabaseTransaction, DbErr> {
        match self.db.get_database_backend() {
            DbBackend::Sqlite => self.db.begin().await,
            _ => {
                self.db
                    .begin_with_config(Some(IsolationLevel::Serializable), None)
                    .await
            }
        }
    }

    fn settle<T>(operation: &'static str, result: Result<T, LifecycleFailure>) -> Result<T, ApiError> {
        match result {
            Ok(value) => Ok(value),
            Err(LifecycleFailure::Domain(error)) => {
                tracing::debug!(operation, error = %error, "Lifecycle operation rejected");
                Err(error.into())
            }
            Err(LifecycleFailure::Storage(error)) if is_transient(&error) => {
                tracing::error!(operation, error = %error, "Transient storage failure persisted after retry");
                Err(OpsError::Unavailable.into())
            }
            Err(LifecycleFailure::Storage(error)) => Err(error.into()),
        }
    }

    fn should_retry<T>(result: &Result<T, LifecycleFailure>) -> bool {
        matches!(result, Err(LifecycleFailure::Storage(error)) if is_transient(error))
    }

    /// Create a booking: admission check and insert are atomic with respect
    /// to concurrent creations on the same room.
    pub async fn create_booking(
        &self,
        tenant: TenantId,
        actor: &str,
        request: CreateBookingRequest,
        now: DateTime<Utc>,
    ) -> Result<booking::Model, ApiError> {
        let interval = BookingInterval::new(request.start_at, request.end_at, &self.policy)
            .map_err(ApiError::from)?;

        let mut result = self
            .try_create_booking(tenant, actor, &request, &interval, now)
            .await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, room_id = %request.room_id, "Retrying create_booking after transient storage failure");
            result = self
                .try_create_booking(tenant, actor, &request, &interval, now)
                .await;
        }
        Self::settle("create_booking", result)
    }

    async fn try_create_booking(
        &self,
        tenant: TenantId,
        actor: &str,
        request: &CreateBookingRequest,
        interval: &BookingInterval,
        now: DateTime<Utc>,
    ) -> Result<booking::Model, LifecycleFailure> {
        let txn = self.begin().await?;

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, request.room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        match check_availability(&txn, tenant, &room, interval, &self.policy).await? {
            AvailabilityDecision::Rejected(reason) => return Err(reason.into()),
            AvailabilityDecision::Available => {}
        }

        let amount = match request.amount {
            Some(amount) => amount,
            None => compute_amount(
                request.rate_per_hour.unwrap_or(room.base_rate),
                interval,
            ),
        };

        let created = BookingRepository::new(&txn)
            .insert(
                tenant,
                NewBooking {
                    room_id: room.id,
                    start_at: interval.start(),
                    end_at: interval.end(),
                    rate_per_hour: request.rate_per_hour,
                    amount,
                    booked_by: request.booked_by.clone(),
                    guest_name: request.guest_name.clone(),
                    purpose: request.purpose.clone(),
                    adults: request.adults,
                    children: request.children,
                },
                now,
            )
            .await?;

        // A booking admitted past a ticket's due_at must not pull the room
        // back into the pool early; the status mirror follows the flag.
        let next_status = if room.out_of_order {
            RoomStatus::OutOfOrder
        } else {
            RoomStatus::Reserved
        };
        let mut active_room: room::ActiveModel = room.into();
        active_room.status = Set(next_status);
        active_room.updated_at = Set(now.fixed_offset());
        active_room.update(&txn).await?;

        AuditEventRepository::new(&txn)
            .append(
                tenant,
                Some(created.room_id),
                Some(created.id),
                actor,
                "booking.create",
                now,
            )
            .await?;

        txn.commit().await?;
        metrics::counter!("roomops_bookings_created_total").increment(1);

        Ok(created)
    }

    /// Move a RESERVED booking to CHECKED_IN within its check-in window.
    pub async fn check_in(
        &self,
        tenant: TenantId,
        actor: &str,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<booking::Model, ApiError> {
        let mut result = self.try_check_in(tenant, actor, booking_id, now).await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, booking_id = %booking_id, "Retrying check_in after transient storage failure");
            result = self.try_check_in(tenant, actor, booking_id, now).await;
        }
        Self::settle("check_in", result)
    }

    async fn try_check_in(
        &self,
        tenant: TenantId,
        actor: &str,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<booking::Model, LifecycleFailure> {
        let txn = self.begin().await?;

        let booking = BookingRepository::new(&txn)
            .find_by_tenant(tenant, booking_id)
            .await?
            .ok_or(OpsError::NotFound {
                resource: "booking",
            })?;

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, booking.room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        if matches!(room.status, RoomStatus::OutOfOrder | RoomStatus::Cleaning) {
            return Err(OpsError::RoomUnavailable {
                status: room.status,
            }
            .into());
        }

        if booking.status != BookingStatus::Reserved {
            return Err(OpsError::WrongBookingState {
                expected: BookingStatus::Reserved.to_value(),
                actual: booking.status.to_value(),
            }
            .into());
        }

        let opens_at = booking.start_at.with_timezone(&Utc) - self.policy.check_in_lead;
        let closes_at = booking.end_at.with_timezone(&Utc);
        if now < opens_at || now > closes_at {
            return Err(OpsError::OutsideCheckInWindow {
                opens_at,
                closes_at,
            }
            .into());
        }

        let mut active_booking: booking::ActiveModel = booking.into();
        active_booking.status = Set(BookingStatus::CheckedIn);
        active_booking.updated_at = Set(now.fixed_offset());
        let updated = active_booking.update(&txn).await?;

        let mut active_room: room::ActiveModel = room.into();
        active_room.status = Set(RoomStatus::Occupied);
        active_room.updated_at = Set(now.fixed_offset());
        active_room.update(&txn).await?;

        AuditEventRepository::new(&txn)
            .append(
                tenant,
                Some(updated.room_id),
                Some(updated.id),
                actor,
                "booking.check_in",
                now,
            )
            .await?;

        txn.commit().await?;
        metrics::counter!("roomops_check_ins_total").increment(1);

        Ok(updated)
    }

    /// Move a CHECKED_IN booking to its terminal CHECKED_OUT state and open
    /// the turnover task. Early and late checkout are both permitted.
    pub async fn check_out(
        &self,
        tenant: TenantId,
        actor: &str,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CheckOutOutcome, ApiError> {
        let mut result = self.try_check_out(tenant, actor, booking_id, now).await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, booking_id = %booking_id, "Retrying check_out after transient storage failure");
            result = self.try_check_out(tenant, actor, booking_id, now).await;
        }
        Self::settle("check_out", result)
    }

    async fn try_check_out(
        &self,
        tenant: TenantId,
        actor: &str,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CheckOutOutcome, LifecycleFailure> {
        let txn = self.begin().await?;

        let booking = BookingRepository::new(&txn)
            .find_by_tenant(tenant, booking_id)
            .await?
            .ok_or(OpsError::NotFound {
                resource: "booking",
            })?;

        if booking.status != BookingStatus::CheckedIn {
            return Err(OpsError::WrongBookingState {
                expected: BookingStatus::CheckedIn.to_value(),
                actual: booking.status.to_value(),
            }
            .into());
        }

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, booking.room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        let mut active_booking: booking::ActiveModel = booking.into();
        active_booking.status = Set(BookingStatus::CheckedOut);
        active_booking.updated_at = Set(now.fixed_offset());
        let updated = active_booking.update(&txn).await?;

        let next_status = if room.out_of_order {
            RoomStatus::OutOfOrder
        } else {
            RoomStatus::Cleaning
        };
        let mut active_room: room::ActiveModel = room.into();
        active_room.status = Set(next_status);
        active_room.housekeeping_status = Set(HousekeepingStatus::Cleaning);
        active_room.updated_at = Set(now.fixed_offset());
        active_room.update(&txn).await?;

        let task = HousekeepingTaskRepository::new(&txn)
            .open(
                tenant,
                updated.room_id,
                Some(updated.id),
                Some(default_checklist()),
                now,
            )
            .await?;

        AuditEventRepository::new(&txn)
            .append(
                tenant,
                Some(updated.room_id),
                Some(updated.id),
                actor,
                "booking.check_out",
                now,
            )
            .await?;

        txn.commit().await?;
        metrics::counter!("roomops_check_outs_total").increment(1);

        Ok(CheckOutOutcome {
            booking: updated,
            housekeeping_task: task,
        })
    }

    /// Complete a turnover task; the room becomes AVAILABLE again unless it
    /// is still out of order.
    pub async fn complete_housekeeping(
        &self,
        tenant: TenantId,
        actor: &str,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<housekeeping_task::Model, ApiError> {
        let mut result = self
            .try_complete_housekeeping(tenant, actor, task_id, now)
            .await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, task_id = %task_id, "Retrying complete_housekeeping after transient storage failure");
            result = self
                .try_complete_housekeeping(tenant, actor, task_id, now)
                .await;
        }
        Self::settle("complete_housekeeping", result)
    }

    async fn try_complete_housekeeping(
        &self,
        tenant: TenantId,
        actor: &str,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<housekeeping_task::Model, LifecycleFailure> {
        let txn = self.begin().await?;

        let task = HousekeepingTaskRepository::new(&txn)
            .find_by_tenant(tenant, task_id)
            .await?
            .ok_or(OpsError::NotFound {
                resource: "housekeeping task",
            })?;

        if task.status != TaskStatus::InProgress {
            return Err(OpsError::WrongBookingState {
                expected: TaskStatus::InProgress.to_value(),
                actual: task.status.to_value(),
            }
            .into());
        }

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, task.room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        let mut active_task: housekeeping_task::ActiveModel = task.into();
        active_task.status = Set(TaskStatus::Clean);
        active_task.completed_at = Set(Some(now.fixed_offset()));
        let updated = active_task.update(&txn).await?;

        // An out-of-order room stays out of the pool until returned to
        // service; turnover completion only records the clean state then.
        let next_status = if room.out_of_order {
            RoomStatus::OutOfOrder
        } else {
            RoomStatus::Available
        };
        let mut active_room: room::ActiveModel = room.into();
        active_room.status = Set(next_status);
        active_room.housekeeping_status = Set(HousekeepingStatus::Clean);
        active_room.updated_at = Set(now.fixed_offset());
        active_room.update(&txn).await?;

        AuditEventRepository::new(&txn)
            .append(
                tenant,
                Some(updated.room_id),
                updated.booking_id,
                actor,
                "housekeeping.complete",
                now,
            )
            .await?;

        txn.commit().await?;
        metrics::counter!("roomops_housekeeping_completed_total").increment(1);

        Ok(updated)
    }

    /// Mark a clean room as inspected, stamping the inspection time.
    pub async fn inspect_room(
        &self,
        tenant: TenantId,
        actor: &str,
        room_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<room::Model, ApiError> {
        let mut result = self.try_inspect_room(tenant, actor, room_id, now).await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, room_id = %room_id, "Retrying inspect_room after transient storage failure");
            result = self.try_inspect_room(tenant, actor, room_id, now).await;
        }
        Self::settle("inspect_room", result)
    }

    async fn try_inspect_room(
        &self,
        tenant: TenantId,
        actor: &str,
        room_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<room::Model, LifecycleFailure> {
        let txn = self.begin().await?;

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        if room.housekeeping_status != HousekeepingStatus::Clean {
            return Err(OpsError::WrongBookingState {
                expected: HousekeepingStatus::Clean.to_value(),
                actual: room.housekeeping_status.to_value(),
            }
            .into());
        }

        let mut active_room: room::ActiveModel = room.into();
        active_room.housekeeping_status = Set(HousekeepingStatus::Inspected);
        active_room.inspected_at = Set(Some(now.fixed_offset()));
        active_room.updated_at = Set(now.fixed_offset());
        let updated = active_room.update(&txn).await?;

        AuditEventRepository::new(&txn)
            .append(tenant, Some(updated.id), None, actor, "room.inspect", now)
            .await?;

        txn.commit().await?;

        Ok(updated)
    }

    /// Remove a room from the bookable pool and open the maintenance ticket
    /// recording why. Existing future bookings are left untouched; they are
    /// rejected lazily at check-in time if still conflicting.
    pub async fn declare_out_of_order(
        &self,
        tenant: TenantId,
        actor: &str,
        room_id: Uuid,
        reason: &str,
        eta: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<OutOfOrderOutcome, ApiError> {
        let mut result = self
            .try_declare_out_of_order(tenant, actor, room_id, reason, eta, now)
            .await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, room_id = %room_id, "Retrying declare_out_of_order after transient storage failure");
            result = self
                .try_declare_out_of_order(tenant, actor, room_id, reason, eta, now)
                .await;
        }
        Self::settle("declare_out_of_order", result)
    }

    async fn try_declare_out_of_order(
        &self,
        tenant: TenantId,
        actor: &str,
        room_id: Uuid,
        reason: &str,
        eta: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<OutOfOrderOutcome, LifecycleFailure> {
        let txn = self.begin().await?;

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        let ticket = MaintenanceTicketRepository::new(&txn)
            .open(tenant, room.id, reason, eta, now)
            .await?;

        let mut active_room: room::ActiveModel = room.into();
        active_room.status = Set(RoomStatus::OutOfOrder);
        active_room.out_of_order = Set(true);
        active_room.updated_at = Set(now.fixed_offset());
        let updated = active_room.update(&txn).await?;

        AuditEventRepository::new(&txn)
            .append(
                tenant,
                Some(updated.id),
                None,
                actor,
                "room.out_of_order",
                now,
            )
            .await?;

        txn.commit().await?;
        metrics::counter!("roomops_out_of_order_total").increment(1);

        Ok(OutOfOrderOutcome {
            room: updated,
            ticket,
        })
    }

    /// Return an out-of-order room to the bookable pool, closing all its
    /// open tickets. Refused while a holding booking's interval contains
    /// `now`.
    pub async fn return_to_service(
        &self,
        tenant: TenantId,
        actor: &str,
        room_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<room::Model, ApiError> {
        let mut result = self
            .try_return_to_service(tenant, actor, room_id, now)
            .await;
        if Self::should_retry(&result) {
            tracing::warn!(tenant_id = %tenant.0, room_id = %room_id, "Retrying return_to_service after transient storage failure");
            result = self
                .try_return_to_service(tenant, actor, room_id, now)
                .await;
        }
        Self::settle("return_to_service", result)
    }

    async fn try_return_to_service(
        &self,
        tenant: TenantId,
        actor: &str,
        room_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<room::Model, LifecycleFailure> {
        let txn = self.begin().await?;

        let room = RoomRepository::new(&txn)
            .find_by_tenant(tenant, room_id)
            .await?
            .ok_or(OpsError::NotFound { resource: "room" })?;

        let active = BookingRepository::new(&txn)
            .find_active_holding(tenant, room.id, now)
            .await?;
        if active.is_some() {
            return Err(OpsError::ActiveBookingPresent.into());
        }

        let closed = MaintenanceTicketRepository::new(&txn)
            .close_open_for_room(tenant, room.id, now)
            .await?;

        let mut active_room: room::ActiveModel = room.into();
        active_room.status = Set(RoomStatus::Available);
        active_room.out_of_order = Set(false);
        active_room.updated_at = Set(now.fixed_offset());
        let updated = active_room.update(&txn).await?;

        AuditEventRepository::new(&txn)
            .append(
                tenant,
                Some(updated.id),
                None,
                actor,
                "room.return_to_service",
                now,
            )
            .await?;

        txn.commit().await?;
        metrics::counter!("roomops_returned_to_service_total").increment(1);

        tracing::info!(
            tenant_id = %tenant.0,
            room_id = %updated.id,
            closed_tickets = closed,
            "Room returned to service"
        );

        Ok(updated)
    }
}

fn default_checklist() -> serde_json::Value {
    json!(["strip linens", "bathroom", "restock", "vacuum", "final check"])
}
