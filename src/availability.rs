//! # Availability Checker
//!
//! Admission control for new bookings: interval validation, the out-of-order
//! gate, and strict-overlap conflict detection against the booking ledger.
//!
//! [`check_availability`] is the single admission predicate. It is generic
//! over the SeaORM connection so the read-only probe endpoint and the
//! `create_booking` transaction run the exact same code; the two can never
//! disagree on the same committed state.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ConnectionTrait, DbErr};

use crate::auth::TenantId;
use crate::config::BookingPolicyConfig;
use crate::error::{BookingConflict, OpsError};
use crate::models::room::{self, RoomStatus};
use crate::repositories::{BookingRepository, MaintenanceTicketRepository};

/// Runtime booking policy derived from configuration.
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Shortest admissible booking
    pub min_duration: Duration,
    /// How long before `start_at` check-in opens
    pub check_in_lead: Duration,
    /// Conflict rows attached to an `Overlap` rejection
    pub max_reported_conflicts: u64,
}

impl BookingPolicy {
    pub fn from_config(config: &BookingPolicyConfig) -> Self {
        Self {
            min_duration: Duration::minutes(config.min_duration_minutes),
            check_in_lead: Duration::hours(config.check_in_lead_hours),
            max_reported_conflicts: config.max_reported_conflicts as u64,
        }
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self::from_config(&BookingPolicyConfig::default())
    }
}

/// A validated, half-open booking interval `[start, end)`.
///
/// Construction is the `InvalidInterval` precondition of admission control:
/// a value of this type always satisfies `start < end` and the minimum
/// duration, so the checks run before any storage access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BookingInterval {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        policy: &BookingPolicy,
    ) -> Result<Self, OpsError> {
        if start >= end {
            return Err(OpsError::InvalidInterval {
                reason: "start must be before end".to_string(),
            });
        }

        if end - start < policy.min_duration {
            return Err(OpsError::InvalidInterval {
                reason: format!(
                    "booking must be at least {} minutes long",
                    policy.min_duration.num_minutes()
                ),
            });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Exact duration in hours
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_minutes() as f64 / 60.0
    }

    /// Duration rounded to the nearest half hour, used for billing
    pub fn billable_hours(&self) -> f64 {
        (self.duration_hours() * 2.0).round() / 2.0
    }

    /// Strict overlap: the intervals share at least one instant. Touching
    /// edges do not overlap, so back-to-back bookings are admissible.
    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        other_start < self.end && other_end > self.start
    }
}

/// Total price for an interval at the given hourly rate, in cents precision.
pub fn compute_amount(rate_per_hour: f64, interval: &BookingInterval) -> f64 {
    (rate_per_hour * interval.billable_hours() * 100.0).round() / 100.0
}

/// Outcome of an admission check.
#[derive(Debug, Clone)]
pub enum AvailabilityDecision {
    Available,
    Rejected(OpsError),
}

impl AvailabilityDecision {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityDecision::Available)
    }
}

/// Decide whether `interval` can be booked on `room`.
///
/// 1. Out-of-order gate: a room under an open maintenance ticket rejects
///    requests starting before the ticket's `due_at`; a ticket without
///    `due_at` rejects indefinitely. Requests starting at or after `due_at`
///    fall through to the conflict check.
/// 2. Conflict check: any holding booking strictly overlapping the interval
///    rejects with up to `policy.max_reported_conflicts` conflicts attached.
///
/// Interval validity is established by [`BookingInterval::new`] before this
/// function touches storage.
pub async fn check_availability<C: ConnectionTrait>(
    conn: &C,
    tenant: TenantId,
    room: &room::Model,
    interval: &BookingInterval,
    policy: &BookingPolicy,
) -> Result<AvailabilityDecision, DbErr> {
    if room.status == RoomStatus::OutOfOrder {
        let ticket = MaintenanceTicketRepository::new(conn)
            .latest_open_for_room(tenant, room.id)
            .await?;

        match ticket.and_then(|t| t.due_at) {
            None => {
                return Ok(AvailabilityDecision::Rejected(OpsError::OutOfOrder {
                    until: None,
                }));
            }
            Some(due_at) => {
                let due_at = due_at.with_timezone(&Utc);
                if interval.start() < due_at {
                    return Ok(AvailabilityDecision::Rejected(OpsError::OutOfOrder {
                        until: Some(due_at),
                    }));
                }
                // Requested start is at/after the expected return to
                // service; only the ledger decides from here.
            }
        }
    }

    let conflicts = BookingRepository::new(conn)
        .find_conflicts(
            tenant,
            room.id,
            interval.start(),
            interval.end(),
            policy.max_reported_conflicts,
        )
        .await?;

    if !conflicts.is_empty() {
        let conflicts = conflicts.iter().map(BookingConflict::from).collect();
        return Ok(AvailabilityDecision::Rejected(OpsError::Overlap {
            conflicts,
        }));
    }

    Ok(AvailabilityDecision::Available)
}
