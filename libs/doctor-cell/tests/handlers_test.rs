use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::router::{doctor_routes, review_routes};
use shared_utils::test_utils::{MockClinicResponses, TestConfig};

fn create_test_app(mock_server: &MockServer) -> Router {
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    doctor_routes(Arc::new(config))
}

fn create_review_app(mock_server: &MockServer) -> Router {
    let config = TestConfig::with_mock_server(&mock_server.uri()).to_app_config();
    review_routes(Arc::new(config))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_list_doctors_includes_counts() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockClinicResponses::doctor_row(&doctor_id)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "doctor_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"doctor_id": doctor_id},
            {"doctor_id": doctor_id}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .and(query_param("select", "doctor_id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"doctor_id": doctor_id}])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["doctors"][0]["name"], "Dr. Asha Rao");
    assert_eq!(json["doctors"][0]["appointment_count"], 2);
    assert_eq!(json["doctors"][0]["review_count"], 1);
}

#[tokio::test]
async fn test_get_doctor_returns_404_when_missing() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Doctor not found"));
}

#[tokio::test]
async fn test_get_doctor_composes_profile_sections() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let treatment_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();
    let review_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([MockClinicResponses::doctor_row(&doctor_id)])),
        )
        .mount(&mock_server)
        .await;

    // Stored out of order; the profile sorts Monday first.
    Mock::given(method("GET"))
        .and(path("/rest/v1/weekly_schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"day": "WEDNESDAY", "is_off": false, "off_slots": []},
            {"day": "MONDAY", "is_off": false, "off_slots": ["09:00-10:00"]}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": treatment_id, "name": "Scale and polish", "category": "CLEANING", "duration": 30, "price": 60.0}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::review_row(&review_id, &appointment_id, &doctor_id, &patient_id, 5)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("select", "id,name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": patient_id, "name": "Test Patient"}
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Dr. Asha Rao");
    assert_eq!(json["schedules"][0]["day"], "MONDAY");
    assert_eq!(json["schedules"][1]["day"], "WEDNESDAY");
    assert_eq!(json["treatments"][0]["category"], "CLEANING");
    assert_eq!(json["reviews"][0]["rating"], 5);
    assert_eq!(json["reviews"][0]["patient_name"], "Test Patient");
}

#[tokio::test]
async fn test_update_doctor_rejects_short_name() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}", doctor_id))
                .header("content-type", "application/json")
                .body(Body::from(json!({"name": "D"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("at least 2 characters"));
}

#[tokio::test]
async fn test_update_doctor_returns_updated_profile() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();

    let mut updated = MockClinicResponses::doctor_row(&doctor_id);
    updated["fees"] = json!(90.0);

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/{}", doctor_id))
                .header("content-type", "application/json")
                .body(Body::from(json!({"fees": 90.0}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Doctor profile updated successfully");
    assert_eq!(json["doctor"]["fees"], 90.0);
}

#[tokio::test]
async fn test_dashboard_aggregates_bookings_and_ratings() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let patient_a = Uuid::new_v4().to_string();
    let patient_b = Uuid::new_v4().to_string();
    let treatment_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id,patient_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": Uuid::new_v4(), "patient_id": patient_a},
            {"id": Uuid::new_v4(), "patient_id": patient_a},
            {"id": Uuid::new_v4(), "patient_id": patient_b}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("order", "time_slot.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::appointment_row(
                &appointment_id,
                &doctor_id,
                &patient_a,
                &treatment_id,
                "2025-06-02",
                "09:00-10:00",
                "CONFIRMED",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::review_row(
                &Uuid::new_v4().to_string(),
                &appointment_id,
                &doctor_id,
                &patient_a,
                5,
            ),
            MockClinicResponses::review_row(
                &Uuid::new_v4().to_string(),
                &appointment_id,
                &doctor_id,
                &patient_b,
                4,
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": patient_a, "name": "Test Patient"},
            {"id": patient_b, "name": "Second Patient"}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": treatment_id, "name": "Scale and polish"}
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/dashboard", doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stats"]["total_appointments"], 3);
    assert_eq!(json["stats"]["total_patients"], 2);
    assert_eq!(json["stats"]["average_rating"], 4.5);
    assert_eq!(json["stats"]["today_appointments"], 1);
    assert_eq!(json["today_appointments"][0]["patient_name"], "Test Patient");
    assert_eq!(
        json["today_appointments"][0]["treatment_name"],
        "Scale and polish"
    );
    assert_eq!(json["recent_reviews"][0]["rating"], 5);
}

#[tokio::test]
async fn test_doctor_appointments_filtered_by_status() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let treatment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .and(query_param("status", "eq.CONFIRMED"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::appointment_row(
                &Uuid::new_v4().to_string(),
                &doctor_id,
                &patient_id,
                &treatment_id,
                "2025-06-02",
                "10:00-11:00",
                "CONFIRMED",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": patient_id, "name": "Test Patient", "email": "patient@example.com", "phone": null}
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": treatment_id, "name": "Filling", "category": "FILLING", "duration": 45, "price": 80.0}
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/appointments?status=CONFIRMED", doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["appointments"][0]["patient"]["name"], "Test Patient");
    assert_eq!(json["appointments"][0]["treatment"]["name"], "Filling");
}

#[tokio::test]
async fn test_create_review_rejects_other_patients_appointment() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let owner_id = Uuid::new_v4().to_string();
    let intruder_id = Uuid::new_v4().to_string();
    let treatment_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::appointment_row(
                &appointment_id,
                &doctor_id,
                &owner_id,
                &treatment_id,
                "2025-06-02",
                "09:00-10:00",
                "COMPLETED",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_review_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "appointment_id": appointment_id,
                        "patient_id": intruder_id,
                        "rating": 5,
                        "comment": "Great"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Not authorized"));
}

#[tokio::test]
async fn test_create_review_rejects_out_of_range_rating() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_review_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "appointment_id": Uuid::new_v4().to_string(),
                        "patient_id": Uuid::new_v4().to_string(),
                        "rating": 6
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("between 1 and 5"));
}

#[tokio::test]
async fn test_create_review_uses_doctor_from_appointment() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let treatment_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();
    let review_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::appointment_row(
                &appointment_id,
                &doctor_id,
                &patient_id,
                &treatment_id,
                "2025-06-02",
                "09:00-10:00",
                "COMPLETED",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockClinicResponses::review_row(
                &review_id,
                &appointment_id,
                &doctor_id,
                &patient_id,
                5,
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_review_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "appointment_id": appointment_id,
                        "patient_id": patient_id,
                        "rating": 5,
                        "comment": "Very thorough"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Review submitted successfully");
    assert_eq!(json["review"]["doctor_id"], doctor_id);
    assert_eq!(json["review"]["rating"], 5);
}

#[tokio::test]
async fn test_doctor_reviews_include_stats() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4().to_string();
    let patient_id = Uuid::new_v4().to_string();
    let appointment_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockClinicResponses::review_row(
                &Uuid::new_v4().to_string(),
                &appointment_id,
                &doctor_id,
                &patient_id,
                5,
            ),
            MockClinicResponses::review_row(
                &Uuid::new_v4().to_string(),
                &appointment_id,
                &doctor_id,
                &patient_id,
                2,
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": patient_id, "name": "Test Patient"}
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}/reviews", doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stats"]["total_reviews"], 2);
    assert_eq!(json["stats"]["average_rating"], 3.5);
    assert_eq!(json["reviews"][0]["patient_name"], "Test Patient");
}
