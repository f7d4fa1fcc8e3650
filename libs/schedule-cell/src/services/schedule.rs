use chrono::NaiveDate;
use futures::future::try_join_all;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::is_catalog_slot;

use crate::models::{
    ScheduleError, ScheduleOverride, SetWeeklyScheduleRequest, UpsertOverrideRequest,
    WeeklySchedule,
};

pub struct ScheduleService {
    supabase: SupabaseClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Returns the doctor's weekly schedule sorted Monday through
    /// Sunday. The store keeps the day column as text, so ordering
    /// happens here rather than in the query.
    pub async fn get_weekly_schedule(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        let path = format!("/rest/v1/weekly_schedules?doctor_id=eq.{}", doctor_id);
        let mut rows: Vec<WeeklySchedule> =
            self.supabase.request(Method::GET, &path, None).await?;

        rows.sort_by_key(|entry| entry.day.ordinal());
        Ok(rows)
    }

    /// Replaces the doctor's recurring rules for the submitted days.
    /// Each entry upserts on (doctor_id, day), so resubmitting a day
    /// overwrites it instead of duplicating it.
    pub async fn set_weekly_schedule(
        &self,
        doctor_id: &str,
        request: SetWeeklyScheduleRequest,
    ) -> Result<Vec<WeeklySchedule>, ScheduleError> {
        if request.schedule.is_empty() {
            return Err(ScheduleError::Validation(
                "Schedule must contain at least one day".to_string(),
            ));
        }
        for entry in &request.schedule {
            validate_off_slots(&entry.off_slots)?;
        }

        debug!(
            "Upserting {} weekly schedule entries for doctor {}",
            request.schedule.len(),
            doctor_id
        );

        let upserts = request.schedule.iter().map(|entry| {
            let body = json!({
                "doctor_id": doctor_id,
                "day": entry.day,
                "is_off": entry.is_off,
                "off_slots": entry.off_slots
            });

            self.supabase.request_with_headers::<Vec<WeeklySchedule>>(
                Method::POST,
                "/rest/v1/weekly_schedules?on_conflict=doctor_id,day",
                Some(body),
                Some(upsert_headers()),
            )
        });

        let results = try_join_all(upserts).await?;
        let mut saved: Vec<WeeklySchedule> = results.into_iter().flatten().collect();
        saved.sort_by_key(|entry| entry.day.ordinal());

        Ok(saved)
    }

    pub async fn list_overrides(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_overrides?doctor_id=eq.{}&order=date.asc",
            doctor_id
        );
        let rows: Vec<ScheduleOverride> =
            self.supabase.request(Method::GET, &path, None).await?;
        Ok(rows)
    }

    /// Creates or replaces the exception for one calendar date,
    /// upserting on (doctor_id, date).
    pub async fn upsert_override(
        &self,
        doctor_id: &str,
        request: UpsertOverrideRequest,
    ) -> Result<ScheduleOverride, ScheduleError> {
        let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d").map_err(|_| {
            ScheduleError::InvalidDateRange(format!("Invalid override date: {}", request.date))
        })?;
        validate_off_slots(&request.off_slots)?;

        debug!("Upserting schedule override for doctor {} on {}", doctor_id, date);

        let body = json!({
            "doctor_id": doctor_id,
            "date": date,
            "is_off": request.is_off,
            "off_slots": request.off_slots,
            "start_time": request.start_time,
            "end_time": request.end_time
        });

        let result: Vec<ScheduleOverride> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/schedule_overrides?on_conflict=doctor_id,date",
                Some(body),
                Some(upsert_headers()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| ScheduleError::Database(anyhow::anyhow!("Upsert returned no row")))
    }

    pub async fn delete_override(
        &self,
        doctor_id: &str,
        override_id: &str,
    ) -> Result<(), ScheduleError> {
        let path = format!(
            "/rest/v1/schedule_overrides?id=eq.{}&doctor_id=eq.{}",
            override_id, doctor_id
        );

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(headers))
            .await?;

        if deleted.is_empty() {
            return Err(ScheduleError::OverrideNotFound);
        }

        debug!("Deleted schedule override {} for doctor {}", override_id, doctor_id);
        Ok(())
    }
}

fn upsert_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "Prefer",
        HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
    );
    headers
}

fn validate_off_slots(off_slots: &[String]) -> Result<(), ScheduleError> {
    for slot in off_slots {
        if !is_catalog_slot(slot) {
            return Err(ScheduleError::UnknownSlot(slot.clone()));
        }
    }
    Ok(())
}
