use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateTreatmentRequest, Recommendation, RecommendationRequest, Treatment, TreatmentError,
    TreatmentsQuery, UpdateTreatmentRequest,
};
use crate::services::recommender;

pub struct TreatmentService {
    supabase: SupabaseClient,
}

impl TreatmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Lists treatments, newest first, optionally narrowed to one
    /// doctor's catalog.
    pub async fn list_treatments(
        &self,
        query: &TreatmentsQuery,
    ) -> Result<Vec<Treatment>, TreatmentError> {
        let path = match query.doctor_id {
            Some(doctor_id) => format!(
                "/rest/v1/treatments?doctor_id=eq.{}&order=created_at.desc",
                doctor_id
            ),
            None => "/rest/v1/treatments?order=created_at.desc".to_string(),
        };

        let treatments: Vec<Treatment> =
            self.supabase.request(Method::GET, &path, None).await?;
        Ok(treatments)
    }

    pub async fn get_treatment(&self, treatment_id: &str) -> Result<Treatment, TreatmentError> {
        let path = format!("/rest/v1/treatments?id=eq.{}", treatment_id);
        let result: Vec<Treatment> = self.supabase.request(Method::GET, &path, None).await?;

        result.into_iter().next().ok_or(TreatmentError::NotFound)
    }

    pub async fn create_treatment(
        &self,
        request: CreateTreatmentRequest,
    ) -> Result<Treatment, TreatmentError> {
        validate_name(&request.name)?;
        validate_duration(request.duration)?;
        validate_price(request.price)?;
        if let Some(description) = &request.description {
            validate_description(description)?;
        }

        debug!(
            "Creating treatment '{}' for doctor {}",
            request.name, request.doctor_id
        );

        let body = json!({
            "doctor_id": request.doctor_id,
            "name": request.name.trim(),
            "category": request.category,
            "description": request.description,
            "duration": request.duration,
            "price": request.price,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });

        let result: Vec<Treatment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/treatments",
                Some(body),
                Some(representation_headers()),
            )
            .await?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| TreatmentError::Database(anyhow::anyhow!("Insert returned no row")))
    }

    pub async fn update_treatment(
        &self,
        treatment_id: &str,
        request: UpdateTreatmentRequest,
    ) -> Result<Treatment, TreatmentError> {
        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            validate_name(&name)?;
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(category) = request.category {
            update_data.insert("category".to_string(), json!(category));
        }
        if let Some(description) = request.description {
            validate_description(&description)?;
            update_data.insert("description".to_string(), json!(description));
        }
        if let Some(duration) = request.duration {
            validate_duration(duration)?;
            update_data.insert("duration".to_string(), json!(duration));
        }
        if let Some(price) = request.price {
            validate_price(price)?;
            update_data.insert("price".to_string(), json!(price));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        debug!("Updating treatment {}", treatment_id);

        let path = format!("/rest/v1/treatments?id=eq.{}", treatment_id);
        let result: Vec<Treatment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(representation_headers()),
            )
            .await?;

        result.into_iter().next().ok_or(TreatmentError::NotFound)
    }

    pub async fn delete_treatment(&self, treatment_id: &str) -> Result<(), TreatmentError> {
        let path = format!("/rest/v1/treatments?id=eq.{}", treatment_id);

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
            return Err(TreatmentError::NotFound);
        }

        debug!("Deleted treatment {}", treatment_id);
        Ok(())
    }

    /// Runs the keyword recommender over the stored catalog.
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendation, TreatmentError> {
        let query = TreatmentsQuery {
            doctor_id: request.doctor_id,
        };
        let treatments = self.list_treatments(&query).await?;

        debug!(
            "Scoring {} treatments against symptom text",
            treatments.len()
        );

        Ok(recommender::recommend_treatments(&request.symptoms, treatments))
    }
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn validate_name(name: &str) -> Result<(), TreatmentError> {
    if name.trim().len() < 2 {
        return Err(TreatmentError::Validation(
            "Treatment name must be at least 2 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_duration(duration: i32) -> Result<(), TreatmentError> {
    if !(15..=480).contains(&duration) {
        return Err(TreatmentError::Validation(
            "Duration must be between 15-480 minutes".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), TreatmentError> {
    if price < 0.0 {
        return Err(TreatmentError::Validation(
            "Price must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), TreatmentError> {
    if description.trim().len() > 500 {
        return Err(TreatmentError::Validation(
            "Description must be less than 500 characters".to_string(),
        ));
    }
    Ok(())
}
