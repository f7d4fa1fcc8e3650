use std::collections::{HashMap, HashSet};

use chrono::Utc;
use futures::try_join;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AppointmentRow, DoctorSummary, Patient, PatientAppointment, PatientDetail, PatientError,
    PatientWithCount, TreatmentSummary, UpdatePatientRequest,
};

#[derive(Debug, Deserialize)]
struct PatientIdRow {
    patient_id: Uuid,
}

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Clinic roster: every patient with how many bookings they have made.
    pub async fn list_patients(&self) -> Result<Vec<PatientWithCount>, PatientError> {
        let patients: Vec<Patient> = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/patients?order=created_at.desc",
                None,
            )
            .await?;

        let appointment_refs: Vec<PatientIdRow> = self
            .supabase
            .request(
                Method::GET,
                "/rest/v1/appointments?select=patient_id",
                None,
            )
            .await?;

        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for row in &appointment_refs {
            *counts.entry(row.patient_id).or_insert(0) += 1;
        }

        let roster = patients
            .into_iter()
            .map(|patient| {
                let appointment_count = counts.get(&patient.id).copied().unwrap_or(0);
                PatientWithCount {
                    patient,
                    appointment_count,
                }
            })
            .collect();

        Ok(roster)
    }

    /// Patient profile with their visit history, newest visit first.
    pub async fn get_patient(&self, patient_id: &str) -> Result<PatientDetail, PatientError> {
        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let patients: Vec<Patient> = self.supabase.request(Method::GET, &path, None).await?;
        let patient = patients.into_iter().next().ok_or(PatientError::NotFound)?;

        let appointments_path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.desc,time_slot.asc",
            patient_id
        );
        let rows: Vec<AppointmentRow> = self
            .supabase
            .request(Method::GET, &appointments_path, None)
            .await?;

        let doctor_ids = dedup_ids(rows.iter().map(|a| a.doctor_id));
        let treatment_ids = dedup_ids(rows.iter().map(|a| a.treatment_id));

        let (doctors, treatments) = try_join!(
            self.fetch_doctor_summaries(&doctor_ids),
            self.fetch_treatment_summaries(&treatment_ids),
        )?;

        let appointments = rows
            .into_iter()
            .map(|row| PatientAppointment {
                id: row.id,
                date: row.date,
                time_slot: row.time_slot,
                status: row.status,
                notes: row.notes,
                doctor: doctors.get(&row.doctor_id).cloned(),
                treatment: treatments.get(&row.treatment_id).cloned(),
            })
            .collect();

        Ok(PatientDetail {
            patient,
            appointments,
        })
    }

    pub async fn update_patient(
        &self,
        patient_id: &str,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            if name.trim().len() < 2 {
                return Err(PatientError::Validation(
                    "Name must be at least 2 characters".to_string(),
                ));
            }
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(phone) = request.phone {
            if !is_valid_phone(&phone) {
                return Err(PatientError::Validation(
                    "Please provide a valid phone number".to_string(),
                ));
            }
            update_data.insert("phone".to_string(), json!(phone));
        }
        if let Some(address) = request.address {
            if address.trim().len() < 5 {
                return Err(PatientError::Validation(
                    "Address must be at least 5 characters".to_string(),
                ));
            }
            update_data.insert("address".to_string(), json!(address.trim()));
        }
        if let Some(profile_pic) = request.profile_pic {
            update_data.insert("profile_pic".to_string(), json!(profile_pic));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        debug!("Updating patient profile {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}", patient_id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Patient> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        result.into_iter().next().ok_or(PatientError::NotFound)
    }

    async fn fetch_doctor_summaries(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, DoctorSummary>, PatientError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let path = format!(
            "/rest/v1/doctors?id=in.({})&select=id,name,specialization",
            join_ids(ids)
        );
        let rows: Vec<DoctorSummary> =
            self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    async fn fetch_treatment_summaries(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, TreatmentSummary>, PatientError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let path = format!(
            "/rest/v1/treatments?id=in.({})&select=id,name,category,price",
            join_ids(ids)
        );
        let rows: Vec<TreatmentSummary> =
            self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }
}

fn dedup_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Accepts an optional leading `+` followed by 7 to 15 digits; spaces
/// and dashes are ignored.
fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_accepts_international_format() {
        assert!(is_valid_phone("+353851234567"));
        assert!(is_valid_phone("085 123 4567"));
        assert!(is_valid_phone("085-123-4567"));
    }

    #[test]
    fn test_phone_rejects_letters_and_short_numbers() {
        assert!(!is_valid_phone("not-a-phone"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_dedup_ids_removes_repeats() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(vec![a, a, b].into_iter()), vec![a, b]);
    }
}
