use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
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
    AppointmentRow, AppointmentWithRelations, DashboardAppointment, DashboardStats, Doctor,
    DoctorAppointmentsQuery, DoctorDashboard, DoctorDetail, DoctorError, DoctorWithCounts,
    PatientSummary, Review, ReviewWithPatient, ScheduleSummary, TreatmentSummary,
    UpdateDoctorRequest,
};

#[derive(Debug, Deserialize)]
struct DoctorIdRow {
    doctor_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    id: Uuid,
    name: String,
}

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Directory listing with per-doctor booking and review counts.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorWithCounts>, DoctorError> {
        let (doctors, appointment_refs, review_refs) = try_join!(
            self.supabase.request::<Vec<Doctor>>(
                Method::GET,
                "/rest/v1/doctors?order=created_at.desc",
                None,
            ),
            self.supabase.request::<Vec<DoctorIdRow>>(
                Method::GET,
                "/rest/v1/appointments?select=doctor_id",
                None,
            ),
            self.supabase.request::<Vec<DoctorIdRow>>(
                Method::GET,
                "/rest/v1/reviews?select=doctor_id",
                None,
            ),
        )?;

        let appointment_counts = count_by_doctor(&appointment_refs);
        let review_counts = count_by_doctor(&review_refs);

        let listing = doctors
            .into_iter()
            .map(|doctor| {
                let appointment_count = appointment_counts.get(&doctor.id).copied().unwrap_or(0);
                let review_count = review_counts.get(&doctor.id).copied().unwrap_or(0);
                DoctorWithCounts {
                    doctor,
                    appointment_count,
                    review_count,
                }
            })
            .collect();

        Ok(listing)
    }

    /// Full profile view: the doctor plus their weekly schedule,
    /// treatment catalog and reviews. The three profile sections are
    /// independent, so they are fetched in one round.
    pub async fn get_doctor(&self, doctor_id: &str) -> Result<DoctorDetail, DoctorError> {
        let doctor = self.get_doctor_row(doctor_id).await?;

        let schedules_path = format!(
            "/rest/v1/weekly_schedules?doctor_id=eq.{}&select=day,is_off,off_slots",
            doctor_id
        );
        let treatments_path = format!(
            "/rest/v1/treatments?doctor_id=eq.{}&select=id,name,category,duration,price",
            doctor_id
        );
        let reviews_path = format!(
            "/rest/v1/reviews?doctor_id=eq.{}&order=created_at.desc",
            doctor_id
        );

        let (mut schedules, treatments, reviews) = try_join!(
            self.supabase
                .request::<Vec<ScheduleSummary>>(Method::GET, &schedules_path, None),
            self.supabase
                .request::<Vec<TreatmentSummary>>(Method::GET, &treatments_path, None),
            self.supabase
                .request::<Vec<Review>>(Method::GET, &reviews_path, None),
        )?;
        schedules.sort_by_key(|s| day_ordinal(&s.day));

        let patient_ids: Vec<Uuid> = dedup_ids(reviews.iter().map(|r| r.patient_id));
        let patient_names = self.fetch_patient_names(&patient_ids).await?;
        let reviews = attach_patient_names(reviews, &patient_names);

        Ok(DoctorDetail {
            doctor,
            schedules,
            treatments,
            reviews,
        })
    }

    pub async fn update_doctor(
        &self,
        doctor_id: &str,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            if name.trim().len() < 2 {
                return Err(DoctorError::Validation(
                    "Name must be at least 2 characters".to_string(),
                ));
            }
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(specialization) = request.specialization {
            if specialization.trim().len() < 2 {
                return Err(DoctorError::Validation(
                    "Specialization must be at least 2 characters".to_string(),
                ));
            }
            update_data.insert("specialization".to_string(), json!(specialization.trim()));
        }
        if let Some(experience) = request.experience {
            if experience < 0 {
                return Err(DoctorError::Validation(
                    "Experience must be a positive number".to_string(),
                ));
            }
            update_data.insert("experience".to_string(), json!(experience));
        }
        if let Some(fees) = request.fees {
            if fees < 0.0 {
                return Err(DoctorError::Validation(
                    "Fees must be a positive number".to_string(),
                ));
            }
            update_data.insert("fees".to_string(), json!(fees));
        }
        if let Some(description) = request.description {
            update_data.insert("description".to_string(), json!(description));
        }
        if let Some(profile_pic) = request.profile_pic {
            update_data.insert("profile_pic".to_string(), json!(profile_pic));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        debug!("Updating doctor profile {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Doctor> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(headers),
            )
            .await?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    /// Practice overview: booking counters, rating average, today's
    /// visits and the latest reviews.
    pub async fn get_dashboard(&self, doctor_id: &str) -> Result<DoctorDashboard, DoctorError> {
        // One pass over all bookings covers both counters.
        let bookings_path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&select=id,patient_id",
            doctor_id
        );
        let today = Utc::now().date_naive();
        let today_path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&order=time_slot.asc",
            doctor_id, today
        );
        let reviews_path = format!(
            "/rest/v1/reviews?doctor_id=eq.{}&order=created_at.desc",
            doctor_id
        );

        let (bookings, today_rows, reviews) = try_join!(
            self.supabase
                .request::<Vec<Value>>(Method::GET, &bookings_path, None),
            self.supabase
                .request::<Vec<AppointmentRow>>(Method::GET, &today_path, None),
            self.supabase
                .request::<Vec<Review>>(Method::GET, &reviews_path, None),
        )?;

        let total_appointments = bookings.len();
        let total_patients = bookings
            .iter()
            .filter_map(|b| b["patient_id"].as_str())
            .collect::<HashSet<_>>()
            .len();

        let average_rating = average_rating(&reviews);
        let recent: Vec<Review> = reviews.into_iter().take(10).collect();

        let patient_ids: Vec<Uuid> = dedup_ids(
            today_rows
                .iter()
                .map(|a| a.patient_id)
                .chain(recent.iter().map(|r| r.patient_id)),
        );
        let treatment_ids: Vec<Uuid> = dedup_ids(today_rows.iter().map(|a| a.treatment_id));

        let (patient_names, treatment_names) = try_join!(
            self.fetch_patient_names(&patient_ids),
            self.fetch_treatment_names(&treatment_ids),
        )?;

        let today_appointments: Vec<DashboardAppointment> = today_rows
            .into_iter()
            .map(|row| DashboardAppointment {
                id: row.id,
                date: row.date,
                time_slot: row.time_slot,
                status: row.status,
                patient_name: patient_names.get(&row.patient_id).cloned(),
                treatment_name: treatment_names.get(&row.treatment_id).cloned(),
            })
            .collect();

        let recent_reviews = attach_patient_names(recent, &patient_names);

        Ok(DoctorDashboard {
            stats: DashboardStats {
                total_appointments,
                total_patients,
                average_rating,
                today_appointments: today_appointments.len(),
            },
            today_appointments,
            recent_reviews,
        })
    }

    /// The doctor's bookings with patient and treatment details,
    /// optionally narrowed by status or calendar date.
    pub async fn get_appointments(
        &self,
        doctor_id: &str,
        query: &DoctorAppointmentsQuery,
    ) -> Result<Vec<AppointmentWithRelations>, DoctorError> {
        let mut query_parts = vec![
            format!("doctor_id=eq.{}", doctor_id),
            "order=date.asc,time_slot.asc".to_string(),
        ];

        if let Some(status) = &query.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if let Some(date) = &query.date {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                DoctorError::Validation(format!("Invalid date filter: {}", date))
            })?;
            query_parts.push(format!("date=eq.{}", date));
        }

        let path = format!("/rest/v1/appointments?{}", query_parts.join("&"));
        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None).await?;

        let patient_ids: Vec<Uuid> = dedup_ids(rows.iter().map(|a| a.patient_id));
        let treatment_ids: Vec<Uuid> = dedup_ids(rows.iter().map(|a| a.treatment_id));

        let (patients, treatments) = try_join!(
            self.fetch_patient_summaries(&patient_ids),
            self.fetch_treatment_summaries(&treatment_ids),
        )?;

        let appointments = rows
            .into_iter()
            .map(|row| AppointmentWithRelations {
                id: row.id,
                date: row.date,
                time_slot: row.time_slot,
                status: row.status,
                notes: row.notes,
                patient: patients.get(&row.patient_id).cloned(),
                treatment: treatments.get(&row.treatment_id).cloned(),
            })
            .collect();

        Ok(appointments)
    }

    pub(crate) async fn get_doctor_row(&self, doctor_id: &str) -> Result<Doctor, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Doctor> = self.supabase.request(Method::GET, &path, None).await?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub(crate) async fn fetch_patient_names(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, DoctorError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let path = format!(
            "/rest/v1/patients?id=in.({})&select=id,name",
            join_ids(ids)
        );
        let rows: Vec<NameRow> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    async fn fetch_treatment_names(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, DoctorError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let path = format!(
            "/rest/v1/treatments?id=in.({})&select=id,name",
            join_ids(ids)
        );
        let rows: Vec<NameRow> = self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    async fn fetch_patient_summaries(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, PatientSummary>, DoctorError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let path = format!(
            "/rest/v1/patients?id=in.({})&select=id,name,email,phone",
            join_ids(ids)
        );
        let rows: Vec<PatientSummary> =
            self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }

    async fn fetch_treatment_summaries(
        &self,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, TreatmentSummary>, DoctorError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let path = format!(
            "/rest/v1/treatments?id=in.({})&select=id,name,category,duration,price",
            join_ids(ids)
        );
        let rows: Vec<TreatmentSummary> =
            self.supabase.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| (row.id, row)).collect())
    }
}

fn count_by_doctor(rows: &[DoctorIdRow]) -> HashMap<Uuid, usize> {
    let mut counts = HashMap::new();
    for row in rows {
        *counts.entry(row.doctor_id).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn dedup_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating as f64).sum::<f64>() / reviews.len() as f64
}

pub(crate) fn attach_patient_names(
    reviews: Vec<Review>,
    names: &HashMap<Uuid, String>,
) -> Vec<ReviewWithPatient> {
    reviews
        .into_iter()
        .map(|review| {
            let patient_name = names.get(&review.patient_id).cloned();
            ReviewWithPatient {
                review,
                patient_name,
            }
        })
        .collect()
}

fn day_ordinal(day: &str) -> u8 {
    match day {
        "MONDAY" => 0,
        "TUESDAY" => 1,
        "WEDNESDAY" => 2,
        "THURSDAY" => 3,
        "FRIDAY" => 4,
        "SATURDAY" => 5,
        "SUNDAY" => 6,
        _ => 7,
    }
}
