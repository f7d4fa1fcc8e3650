use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::is_catalog_slot;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentsQuery,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};

pub struct AppointmentService {
    supabase: SupabaseClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Books a slot for a patient. New appointments always start as
    /// PENDING. The pre-check narrows the race window; the store's
    /// uniqueness constraint on non-cancelled (doctor, date, slot)
    /// rows has the final say, surfacing as SlotTaken on conflict.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let date = parse_appointment_date(&request.date)?;
        if !is_catalog_slot(&request.time_slot) {
            return Err(AppointmentError::UnknownSlot(request.time_slot));
        }

        if self
            .slot_is_taken(request.doctor_id, date, &request.time_slot, None)
            .await?
        {
            return Err(AppointmentError::SlotTaken);
        }

        debug!(
            "Booking {} on {} for doctor {}",
            request.time_slot, date, request.doctor_id
        );

        let body = json!({
            "doctor_id": request.doctor_id,
            "patient_id": request.patient_id,
            "treatment_id": request.treatment_id,
            "date": date,
            "time_slot": request.time_slot,
            "status": AppointmentStatus::Pending,
            "notes": request.notes,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Result<Vec<Appointment>, anyhow::Error> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(body),
                Some(representation_headers()),
            )
            .await;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) if e.to_string().starts_with("Conflict") => {
                return Err(AppointmentError::SlotTaken);
            }
            Err(e) => return Err(AppointmentError::Database(e)),
        };

        rows.into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database(anyhow::anyhow!("Insert returned no row")))
    }

    pub async fn list_appointments(
        &self,
        query: &AppointmentsQuery,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query_parts = vec!["order=date.desc,time_slot.asc".to_string()];

        if let Some(doctor_id) = query.doctor_id {
            query_parts.push(format!("doctor_id=eq.{}", doctor_id));
        }
        if let Some(patient_id) = query.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(status) = query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(date) = &query.date {
            let date = parse_appointment_date(date)?;
            query_parts.push(format!("date=eq.{}", date));
        }

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        let appointments: Vec<Appointment> =
            self.supabase.request(Method::GET, &path, None).await?;
        Ok(appointments)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> =
            self.supabase.request(Method::GET, &path, None).await?;

        result.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    /// Applies a partial update. Status changes must follow the
    /// lifecycle; moving the appointment to another date or slot
    /// re-checks the target for conflicts.
    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id).await?;

        let mut update_data = serde_json::Map::new();

        let mut date = current.date;
        if let Some(new_date) = &request.date {
            date = parse_appointment_date(new_date)?;
            update_data.insert("date".to_string(), json!(date));
        }

        let mut time_slot = current.time_slot.clone();
        if let Some(new_slot) = request.time_slot {
            if !is_catalog_slot(&new_slot) {
                return Err(AppointmentError::UnknownSlot(new_slot));
            }
            update_data.insert("time_slot".to_string(), json!(new_slot));
            time_slot = new_slot;
        }

        if let Some(new_status) = request.status {
            if new_status != current.status && !current.status.can_transition_to(new_status) {
                return Err(AppointmentError::InvalidStatusTransition {
                    from: current.status,
                    to: new_status,
                });
            }
            update_data.insert("status".to_string(), json!(new_status));
        }

        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        if (date != current.date || time_slot != current.time_slot)
            && self
                .slot_is_taken(current.doctor_id, date, &time_slot, Some(current.id))
                .await?
        {
            return Err(AppointmentError::SlotTaken);
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        debug!("Updating appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(representation_headers()),
            )
            .await?;

        result.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn delete_appointment(&self, appointment_id: &str) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let deleted: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(representation_headers()),
            )
            .await?;

        if deleted.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        debug!("Deleted appointment {}", appointment_id);
        Ok(())
    }

    async fn slot_is_taken(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        time_slot: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&time_slot=eq.{}&status=neq.CANCELLED&select=id",
            doctor_id, date, time_slot
        );
        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Value> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(!rows.is_empty())
    }
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn parse_appointment_date(date: &str) -> Result<NaiveDate, AppointmentError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppointmentError::InvalidDate(date.to_string()))
}
