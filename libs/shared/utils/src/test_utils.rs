use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub groq_model: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            groq_api_key: "test-groq-key".to_string(),
            groq_api_url: "http://localhost:54322".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
        }
    }
}

impl TestConfig {
    /// Config whose store and LLM endpoints both point at the same mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            groq_api_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            groq_api_key: self.groq_api_key.clone(),
            groq_api_url: self.groq_api_url.clone(),
            groq_model: self.groq_model.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn doctor_row(doctor_id: &str) -> Value {
        json!({
            "id": doctor_id,
            "name": "Dr. Asha Rao",
            "email": "asha.rao@example.com",
            "specialization": "Orthodontics",
            "experience": 12,
            "fees": 75.0,
            "description": "Braces and alignment specialist",
            "profile_pic": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn patient_row(patient_id: &str) -> Value {
        json!({
            "id": patient_id,
            "name": "Test Patient",
            "email": "patient@example.com",
            "phone": "+353851234567",
            "address": "12 Main Street, Dublin",
            "profile_pic": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn treatment_row(treatment_id: &str, doctor_id: &str, name: &str, category: &str) -> Value {
        json!({
            "id": treatment_id,
            "doctor_id": doctor_id,
            "name": name,
            "category": category,
            "description": null,
            "duration": 45,
            "price": 80.0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn weekly_schedule_row(doctor_id: &str, day: &str, is_off: bool, off_slots: &[&str]) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "day": day,
            "is_off": is_off,
            "start_time": null,
            "end_time": null,
            "off_slots": off_slots
        })
    }

    pub fn override_row(doctor_id: &str, date: &str, is_off: bool, off_slots: &[&str]) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "doctor_id": doctor_id,
            "date": date,
            "is_off": is_off,
            "start_time": null,
            "end_time": null,
            "off_slots": off_slots
        })
    }

    pub fn appointment_row(
        appointment_id: &str,
        doctor_id: &str,
        patient_id: &str,
        treatment_id: &str,
        date: &str,
        time_slot: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": appointment_id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "treatment_id": treatment_id,
            "date": date,
            "time_slot": time_slot,
            "status": status,
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn review_row(review_id: &str, appointment_id: &str, doctor_id: &str, patient_id: &str, rating: i32) -> Value {
        json!({
            "id": review_id,
            "appointment_id": appointment_id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "rating": rating,
            "comment": "Very thorough",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn groq_chat_response(content: &str) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert!(app_config.is_configured());
        assert!(app_config.is_assistant_configured());
    }

    #[test]
    fn mock_server_config_points_both_endpoints_at_mock() {
        let config = TestConfig::with_mock_server("http://127.0.0.1:9999");
        assert_eq!(config.supabase_url, "http://127.0.0.1:9999");
        assert_eq!(config.groq_api_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn groq_response_carries_content() {
        let response = MockClinicResponses::groq_chat_response("hello");
        assert_eq!(response["choices"][0]["message"]["content"], "hello");
    }
}
