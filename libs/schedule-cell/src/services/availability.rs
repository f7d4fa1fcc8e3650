use chrono::NaiveDate;
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AvailabilityQuery, AvailabilityResponse, BookedSlot, ScheduleError, ScheduleOverride,
    WeeklySchedule,
};
use crate::services::resolver;

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Derives the open slots for a doctor over an inclusive date
    /// range, returned together with the weekly schedule they were
    /// computed from. Reads a point-in-time snapshot; booking remains
    /// the authority on whether a slot is actually free.
    pub async fn get_availability(
        &self,
        doctor_id: &str,
        query: &AvailabilityQuery,
    ) -> Result<AvailabilityResponse, ScheduleError> {
        let (start_date, end_date) =
            resolver::parse_date_range(&query.start_date, &query.end_date)?;

        debug!(
            "Resolving availability for doctor {} from {} to {}",
            doctor_id, start_date, end_date
        );

        let weekly = self.fetch_weekly_schedule(doctor_id).await?;
        let overrides = self
            .fetch_overrides_in_range(doctor_id, start_date, end_date)
            .await?;
        let booked = self
            .fetch_booked_slots(doctor_id, start_date, end_date)
            .await?;

        let available_slots =
            resolver::resolve_available_slots(start_date, end_date, &weekly, &overrides, &booked);

        debug!(
            "Doctor {} has {} open slots in range",
            doctor_id,
            available_slots.len()
        );

        Ok(AvailabilityResponse {
            schedules: weekly,
            available_slots,
        })
    }

    async fn fetch_weekly_schedule(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        let path = format!("/rest/v1/weekly_schedules?doctor_id=eq.{}", doctor_id);
        let rows: Vec<WeeklySchedule> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows)
    }

    async fn fetch_overrides_in_range(
        &self,
        doctor_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_overrides?doctor_id=eq.{}&date=gte.{}&date=lte.{}",
            doctor_id, start_date, end_date
        );
        let rows: Vec<ScheduleOverride> =
            self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows)
    }

    /// Cancelled appointments never block a slot, so they are filtered
    /// out at the store.
    async fn fetch_booked_slots(
        &self,
        doctor_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<BookedSlot>, ScheduleError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=gte.{}&date=lte.{}&status=neq.CANCELLED&select=date,time_slot",
            doctor_id, start_date, end_date
        );
        let rows: Vec<BookedSlot> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows)
    }
}
