use crate::models::{Recommendation, ScoredTreatment, Treatment};

/// Cap on how many treatments a recommendation returns.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Fallback shown when nothing in the catalog matches the symptoms.
pub const NO_MATCH_MESSAGE: &str = "Based on your symptoms, I recommend scheduling a consultation with our dentist for a proper diagnosis. Please describe your symptoms in more detail or book an appointment.";

/// Scores one treatment against lower-cased symptom text: one point
/// per category keyword found in the text, plus half a point when the
/// treatment's own description appears in it.
fn score_treatment(symptoms_lower: &str, treatment: &Treatment) -> f64 {
    let mut score = 0.0;

    for keyword in treatment.category.symptom_keywords() {
        if symptoms_lower.contains(keyword) {
            score += 1.0;
        }
    }

    if let Some(description) = &treatment.description {
        if !description.is_empty() && symptoms_lower.contains(&description.to_lowercase()) {
            score += 0.5;
        }
    }

    score
}

/// Ranks treatments by keyword overlap with the symptom text.
///
/// Zero-scoring treatments are dropped. The sort is stable, so tied
/// scores keep their catalog order. When nothing scores above zero
/// the outcome is NoMatch rather than an empty list.
pub fn recommend_treatments(symptoms: &str, treatments: Vec<Treatment>) -> Recommendation {
    let symptoms_lower = symptoms.to_lowercase();

    let mut scored: Vec<ScoredTreatment> = treatments
        .into_iter()
        .filter_map(|treatment| {
            let score = score_treatment(&symptoms_lower, &treatment);
            if score > 0.0 {
                Some(ScoredTreatment { treatment, score })
            } else {
                None
            }
        })
        .collect();

    if scored.is_empty() {
        return Recommendation::NoMatch;
    }

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(MAX_RECOMMENDATIONS);

    Recommendation::Matches(scored)
}
