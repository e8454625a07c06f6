//! # KPI Aggregator
//!
//! Read-only occupancy and revenue rollups over the booking ledger. Never
//! mutates state; reads reflect some committed state at or before the query.
//! All figures default to zero on empty input.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::TenantId;
use crate::error::ApiError;
use crate::models::booking;
use crate::models::room::RoomStatus;
use crate::repositories::{BookingRepository, RoomRepository};

/// Time window selector for KPI averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KpiWindow {
    Today,
    #[serde(rename = "last_7_days")]
    Last7Days,
    MonthToDate,
}

impl KpiWindow {
    /// Parse the wire form used by the query parameter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(KpiWindow::Today),
            "last_7_days" => Some(KpiWindow::Last7Days),
            "month_to_date" => Some(KpiWindow::MonthToDate),
            _ => None,
        }
    }

    fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            KpiWindow::Today => start_of_day(now),
            KpiWindow::Last7Days => now - Duration::days(7),
            KpiWindow::MonthToDate => start_of_month(now),
        }
    }
}

/// One KPI snapshot for a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KpiSnapshot {
    /// Window the averages were computed over
    pub window: KpiWindow,
    /// Rooms currently OCCUPIED with an active holding booking
    pub occupied: u64,
    /// Rooms currently out of order
    pub out_of_order: u64,
    /// Remaining rooms: total − occupied − out_of_order
    pub vacant: u64,
    /// Average booking duration in hours over the window
    pub avg_stay_hours: f64,
    /// Average hourly rate over the window (explicit rate, else amount/hours)
    pub avg_hourly_rate: f64,
    /// Summed booking amounts started today
    pub todays_total: f64,
    /// Summed booking amounts started in the last 7 days
    pub week_total: f64,
    /// Summed booking amounts started this month
    pub month_total: f64,
}

/// Read-only aggregator over the inventory and booking tables.
#[derive(Clone)]
pub struct KpiAggregator {
    db: DatabaseConnection,
}

impl KpiAggregator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Compute the KPI snapshot for a tenant at `now`.
    pub async fn snapshot(
        &self,
        tenant: TenantId,
        window: KpiWindow,
        now: DateTime<Utc>,
    ) -> Result<KpiSnapshot, ApiError> {
        let rooms = RoomRepository::new(&self.db).list_by_tenant(tenant).await?;
        let bookings = BookingRepository::new(&self.db);

        let active_now = bookings.list_active_holding_by_tenant(tenant, now).await?;
        let held_rooms: Vec<_> = active_now.iter().map(|b| b.room_id).collect();

        let occupied = rooms
            .iter()
            .filter(|r| r.status == RoomStatus::Occupied && held_rooms.contains(&r.id))
            .count() as u64;
        let out_of_order = rooms.iter().filter(|r| r.out_of_order).count() as u64;
        let vacant = (rooms.len() as u64).saturating_sub(occupied + out_of_order);

        // One ledger read covers the selected window and all three revenue
        // windows; they are filtered apart in memory.
        let week_start = now - Duration::days(7);
        let month_start = start_of_month(now);
        let earliest = week_start.min(month_start).min(window.start(now));
        let ledger = bookings.list_started_within(tenant, earliest, now).await?;

        let window_start = window.start(now);
        let in_window: Vec<&booking::Model> = ledger
            .iter()
            .filter(|b| started_within(b, window_start, now))
            .collect();
        let (avg_stay_hours, avg_hourly_rate) = averages(&in_window);

        Ok(KpiSnapshot {
            window,
            occupied,
            out_of_order,
            vacant,
            avg_stay_hours,
            avg_hourly_rate,
            todays_total: sum_amounts(&ledger, start_of_day(now), now),
            week_total: sum_amounts(&ledger, week_start, now),
            month_total: sum_amounts(&ledger, month_start, now),
        })
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = now.date_naive().with_day(1).unwrap_or(now.date_naive());
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}

fn started_within(booking: &booking::Model, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    let start = booking.start_at.with_timezone(&Utc);
    start >= from && start <= to
}

fn duration_hours(booking: &booking::Model) -> f64 {
    (booking.end_at.with_timezone(&Utc) - booking.start_at.with_timezone(&Utc)).num_minutes()
        as f64
        / 60.0
}

/// Average stay length and hourly rate over a set of bookings. The hourly
/// rate falls back to amount/duration when no explicit rate was recorded.
fn averages(bookings: &[&booking::Model]) -> (f64, f64) {
    if bookings.is_empty() {
        return (0.0, 0.0);
    }

    let mut stay_sum = 0.0;
    let mut rate_sum = 0.0;
    let mut rate_count = 0u32;

    for booking in bookings {
        let hours = duration_hours(booking);
        stay_sum += hours;

        match booking.rate_per_hour {
            Some(rate) => {
                rate_sum += rate;
                rate_count += 1;
            }
            None if hours > 0.0 => {
                rate_sum += booking.amount / hours;
                rate_count += 1;
            }
            None => {}
        }
    }

    let avg_stay = stay_sum / bookings.len() as f64;
    let avg_rate = if rate_count > 0 {
        rate_sum / f64::from(rate_count)
    } else {
        0.0
    };

    (avg_stay, avg_rate)
}

fn sum_amounts(bookings: &[booking::Model], from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    bookings
        .iter()
        .filter(|b| started_within(b, from, to))
        .map(|b| b.amount)
        .sum()
}
