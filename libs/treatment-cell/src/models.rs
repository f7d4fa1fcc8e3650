use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentCategory {
    Cleaning,
    Filling,
    RootCanal,
    Extraction,
    Orthodontics,
    Cosmetic,
    Surgery,
}

impl TreatmentCategory {
    /// Symptom keywords that map free-text complaints to this
    /// category. Matching is lower-cased substring containment.
    pub fn symptom_keywords(&self) -> &'static [&'static str] {
        match self {
            TreatmentCategory::Cleaning => {
                &["clean", "plaque", "tartar", "stain", "polish", "hygiene", "checkup"]
            }
            TreatmentCategory::Filling => {
                &["cavity", "hole", "decay", "pain", "sensitive", "toothache"]
            }
            TreatmentCategory::RootCanal => {
                &["severe pain", "infection", "abscess", "swelling", "pus"]
            }
            TreatmentCategory::Extraction => {
                &["remove", "pull", "wisdom", "broken", "damaged beyond repair"]
            }
            TreatmentCategory::Orthodontics => {
                &["crooked", "misaligned", "braces", "straighten", "gap", "overbite"]
            }
            TreatmentCategory::Cosmetic => {
                &["whitening", "veneer", "aesthetic", "smile", "appearance", "discolored"]
            }
            TreatmentCategory::Surgery => {
                &["implant", "gum surgery", "jaw", "surgical", "bone graft"]
            }
        }
    }
}

impl std::fmt::Display for TreatmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TreatmentCategory::Cleaning => "CLEANING",
            TreatmentCategory::Filling => "FILLING",
            TreatmentCategory::RootCanal => "ROOT_CANAL",
            TreatmentCategory::Extraction => "EXTRACTION",
            TreatmentCategory::Orthodontics => "ORTHODONTICS",
            TreatmentCategory::Cosmetic => "COSMETIC",
            TreatmentCategory::Surgery => "SURGERY",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub name: String,
    pub category: TreatmentCategory,
    pub description: Option<String>,
    pub duration: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTreatmentRequest {
    pub doctor_id: Uuid,
    pub name: String,
    pub category: TreatmentCategory,
    pub description: Option<String>,
    pub duration: i32,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTreatmentRequest {
    pub name: Option<String>,
    pub category: Option<TreatmentCategory>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct TreatmentsQuery {
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub symptoms: String,
    pub doctor_id: Option<Uuid>,
}

/// A treatment together with its keyword-overlap score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTreatment {
    #[serde(flatten)]
    pub treatment: Treatment,
    pub score: f64,
}

/// Outcome of a recommendation pass. No keyword hits is a designed
/// outcome with its own fallback message, never an empty list.
#[derive(Debug)]
pub enum Recommendation {
    Matches(Vec<ScoredTreatment>),
    NoMatch,
}

#[derive(Debug, Error)]
pub enum TreatmentError {
    #[error("Treatment not found")]
    NotFound,

    #[error("Invalid treatment data: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<TreatmentError> for AppError {
    fn from(err: TreatmentError) -> Self {
        match err {
            TreatmentError::NotFound => AppError::NotFound("Treatment not found".to_string()),
            TreatmentError::Validation(msg) => AppError::InvalidInput(msg),
            TreatmentError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
