use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AppointmentRow, CreateReviewRequest, DoctorError, Review, ReviewWithPatient,
};
use crate::services::doctor::{attach_patient_names, average_rating, dedup_ids, DoctorService};

pub struct ReviewService {
    supabase: SupabaseClient,
    doctors: DoctorService,
}

impl ReviewService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
        }
    }

    /// Records a review for a completed visit. The reviewed doctor is
    /// taken from the appointment itself, and only the patient who
    /// attended it may leave the review.
    pub async fn create_review(&self, request: CreateReviewRequest) -> Result<Review, DoctorError> {
        if !(1..=5).contains(&request.rating) {
            return Err(DoctorError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let path = format!("/rest/v1/appointments?id=eq.{}", request.appointment_id);
        let appointments: Vec<AppointmentRow> =
            self.supabase.request(Method::GET, &path, None).await?;

        let appointment = appointments
            .into_iter()
            .next()
            .ok_or(DoctorError::ReviewNotAuthorized)?;
        if appointment.patient_id != request.patient_id {
            return Err(DoctorError::ReviewNotAuthorized);
        }

        debug!(
            "Creating review for appointment {} by patient {}",
            request.appointment_id, request.patient_id
        );

        let review_data = json!({
            "appointment_id": request.appointment_id,
            "doctor_id": appointment.doctor_id,
            "patient_id": request.patient_id,
            "rating": request.rating,
            "comment": request.comment,
            "created_at": Utc::now().to_rfc3339(),
        });

        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let result: Vec<Review> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/reviews",
                Some(review_data),
                Some(headers),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| DoctorError::Database(anyhow::anyhow!("Insert returned no row")))
    }

    /// All reviews for a doctor, newest first, with the reviewers'
    /// names and the overall rating average.
    pub async fn list_reviews(
        &self,
        doctor_id: &str,
    ) -> Result<(Vec<ReviewWithPatient>, f64), DoctorError> {
        let path = format!(
            "/rest/v1/reviews?doctor_id=eq.{}&order=created_at.desc",
            doctor_id
        );
        let reviews: Vec<Review> = self.supabase.request(Method::GET, &path, None).await?;

        let rating = average_rating(&reviews);

        let patient_ids = dedup_ids(reviews.iter().map(|r| r.patient_id));
        let patient_names = self.doctors.fetch_patient_names(&patient_ids).await?;

        Ok((attach_patient_names(reviews, &patient_names), rating))
    }
}
