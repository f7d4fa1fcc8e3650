use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use schedule_cell::services::AvailabilityService;
use schedule_cell::AvailabilityQuery;
use shared_config::AppConfig;
use treatment_cell::services::recommender::NO_MATCH_MESSAGE;
use treatment_cell::services::TreatmentService;
use treatment_cell::{Recommendation, RecommendationRequest};

use crate::models::{AgentKind, AgentReply, AssistantError, ChatMessage};
use crate::services::groq::GroqClient;

pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error. Please try again or contact support.";

const CLINIC_ASSISTANT_PROMPT: &str = "You are a friendly dental clinic assistant. Help patients with general inquiries about the clinic, services, and guide them to book appointments or get treatment information.

Available actions:
- Answer general clinic questions
- Guide patients to book appointments
- Provide information about dental services
- Route complex queries to specialized agents

Be warm, professional, and concise.";

const APPOINTMENT_AGENT_PROMPT: &str = "You are an appointment scheduling specialist for a dental clinic.

Your tasks:
1. Check the doctor's availability before suggesting times
2. Recommend the next available slot to the patient
3. Always confirm details before booking

Be helpful and clear about available time slots.";

const TREATMENT_ADVISOR_PROMPT: &str = "You are a dental treatment advisor. Help patients understand treatments based on their symptoms.

Your tasks:
1. Analyze patient symptoms
2. Match symptoms to appropriate treatments
3. Explain treatment benefits, duration, and pricing
4. Never diagnose - always recommend consulting with a dentist

Be clear and empathetic.";

const APPOINTMENT_KEYWORDS: [&str; 5] = ["appointment", "book", "schedule", "available", "slot"];
const TREATMENT_KEYWORDS: [&str; 8] = [
    "treatment",
    "pain",
    "symptom",
    "cavity",
    "tooth",
    "procedure",
    "price",
    "cost",
];

/// Keyword routing: scheduling words win over symptom words; anything
/// else goes to the general assistant.
pub fn route_message(message: &str) -> AgentKind {
    let input = message.to_lowercase();

    if APPOINTMENT_KEYWORDS.iter().any(|k| input.contains(k)) {
        return AgentKind::Appointment;
    }
    if TREATMENT_KEYWORDS.iter().any(|k| input.contains(k)) {
        return AgentKind::Treatment;
    }
    AgentKind::Clinic
}

/// Per-message context handed to whichever agent is routed to.
pub struct AgentContext {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub history: Vec<ChatMessage>,
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn kind(&self) -> AgentKind;

    async fn invoke(
        &self,
        message: &str,
        context: &AgentContext,
    ) -> Result<AgentReply, AssistantError>;
}

pub fn agent_for(kind: AgentKind, config: &AppConfig) -> Box<dyn Agent> {
    match kind {
        AgentKind::Clinic => Box::new(ClinicAssistantAgent::new(config)),
        AgentKind::Appointment => Box::new(AppointmentAgent::new(config)),
        AgentKind::Treatment => Box::new(TreatmentAdvisorAgent::new(config)),
    }
}

/// General-purpose assistant for anything the specialists don't cover.
pub struct ClinicAssistantAgent {
    groq: GroqClient,
}

impl ClinicAssistantAgent {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            groq: GroqClient::new(config),
        }
    }
}

#[async_trait]
impl Agent for ClinicAssistantAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Clinic
    }

    async fn invoke(
        &self,
        message: &str,
        context: &AgentContext,
    ) -> Result<AgentReply, AssistantError> {
        let mut messages = vec![ChatMessage::system(CLINIC_ASSISTANT_PROMPT)];
        messages.extend(context.history.iter().cloned());
        messages.push(ChatMessage::user(message));

        let content = self.groq.chat(&messages, 0.7).await?;

        Ok(AgentReply {
            content,
            metadata: json!({}),
        })
    }
}

/// Scheduling specialist. When the caller names a doctor, the next
/// week's open slots are resolved and handed to the model so its
/// suggestions reflect real availability.
pub struct AppointmentAgent {
    groq: GroqClient,
    availability: AvailabilityService,
}

impl AppointmentAgent {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            groq: GroqClient::new(config),
            availability: AvailabilityService::new(config),
        }
    }
}

#[async_trait]
impl Agent for AppointmentAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Appointment
    }

    async fn invoke(
        &self,
        message: &str,
        context: &AgentContext,
    ) -> Result<AgentReply, AssistantError> {
        let mut messages = vec![ChatMessage::system(APPOINTMENT_AGENT_PROMPT)];
        messages.extend(context.history.iter().cloned());

        let mut metadata = json!({});
        if let Some(doctor_id) = context.doctor_id {
            let today = Utc::now().date_naive();
            let query = AvailabilityQuery {
                start_date: today.to_string(),
                end_date: (today + Duration::days(7)).to_string(),
            };

            debug!("Resolving slots for doctor {} before replying", doctor_id);
            let availability = self
                .availability
                .get_availability(&doctor_id.to_string(), &query)
                .await?;

            messages.push(ChatMessage::system(format!(
                "Available slots: {}",
                serde_json::to_string(&availability.available_slots)?
            )));
            metadata = json!({ "available_slots": availability.available_slots });
        }

        messages.push(ChatMessage::user(message));

        let content = self.groq.chat(&messages, 0.5).await?;

        Ok(AgentReply { content, metadata })
    }
}

/// Symptom-to-treatment advisor. Runs the keyword recommender first;
/// when nothing matches, replies with the consultation fallback
/// without calling the model at all.
pub struct TreatmentAdvisorAgent {
    groq: GroqClient,
    treatments: TreatmentService,
}

impl TreatmentAdvisorAgent {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            groq: GroqClient::new(config),
            treatments: TreatmentService::new(config),
        }
    }
}

#[async_trait]
impl Agent for TreatmentAdvisorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Treatment
    }

    async fn invoke(
        &self,
        message: &str,
        context: &AgentContext,
    ) -> Result<AgentReply, AssistantError> {
        let request = RecommendationRequest {
            symptoms: message.to_string(),
            doctor_id: context.doctor_id,
        };
        let recommendation = self.treatments.recommend(&request).await?;

        let matches = match recommendation {
            Recommendation::NoMatch => {
                debug!("No treatment matched the symptom text, skipping the model");
                return Ok(AgentReply {
                    content: NO_MATCH_MESSAGE.to_string(),
                    metadata: json!({ "recommended_treatments": [] }),
                });
            }
            Recommendation::Matches(matches) => matches,
        };

        let messages = vec![
            ChatMessage::system(TREATMENT_ADVISOR_PROMPT),
            ChatMessage::system(format!(
                "Matching treatments: {}",
                serde_json::to_string(&matches)?
            )),
            ChatMessage::user(message),
        ];

        let content = self.groq.chat(&messages, 0.6).await?;

        Ok(AgentReply {
            content,
            metadata: json!({ "recommended_treatments": matches }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduling_words_route_to_appointment_agent() {
        assert_eq!(route_message("I want to book a visit"), AgentKind::Appointment);
        assert_eq!(route_message("any slot on Friday?"), AgentKind::Appointment);
        assert_eq!(route_message("SCHEDULE me in"), AgentKind::Appointment);
    }

    #[test]
    fn test_symptom_words_route_to_treatment_agent() {
        assert_eq!(route_message("my tooth hurts"), AgentKind::Treatment);
        assert_eq!(route_message("how much does a filling cost?"), AgentKind::Treatment);
    }

    #[test]
    fn test_scheduling_wins_when_both_kinds_of_words_appear() {
        assert_eq!(
            route_message("book me in for this toothache"),
            AgentKind::Appointment
        );
    }

    #[test]
    fn test_everything_else_routes_to_clinic_assistant() {
        assert_eq!(route_message("what are your opening hours?"), AgentKind::Clinic);
        assert_eq!(route_message("hello"), AgentKind::Clinic);
    }
}
