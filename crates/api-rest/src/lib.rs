//! # API REST
//!
//! REST API implementation for HMS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, API-key callers)
//!
//! Uses `api-shared` for wire types and `hms-core` for every state change. The store is shared
//! behind one async mutex, so a guard check and the write that follows it happen under the same
//! lock.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod error;
mod handlers;

use api_shared::ApiKeyProvider;
use axum::routing::{get, post, put};
use axum::Router;
use hms_core::EntityStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use auth::Caller;
pub use error::{ApiError, ApiResult};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<EntityStore>>,
    pub auth: Arc<ApiKeyProvider>,
}

impl AppState {
    pub fn new(store: EntityStore, auth: ApiKeyProvider) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            auth: Arc::new(auth),
        }
    }
}

struct ApiKeyAddon;

impl Modify for ApiKeyAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    api_shared::API_KEY_HEADER,
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::directory::list_patients,
        handlers::directory::create_patient,
        handlers::directory::get_patient,
        handlers::directory::update_patient,
        handlers::directory::delete_patient,
        handlers::directory::list_doctors,
        handlers::directory::create_doctor,
        handlers::directory::get_doctor,
        handlers::directory::update_doctor,
        handlers::directory::delete_doctor,
        handlers::directory::list_nurses,
        handlers::directory::create_nurse,
        handlers::directory::get_nurse,
        handlers::directory::update_nurse,
        handlers::directory::delete_nurse,
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::get_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::delete_appointment,
        handlers::appointments::cancel_appointment,
        handlers::appointments::set_appointment_status,
        handlers::appointments::available_slots,
        handlers::appointments::get_slot_template,
        handlers::appointments::set_slot_template,
        handlers::queues::list_waitlist,
        handlers::queues::create_waitlist_entry,
        handlers::queues::get_waitlist_entry,
        handlers::queues::update_waitlist_entry,
        handlers::queues::delete_waitlist_entry,
        handlers::queues::fill_waitlist_entry,
        handlers::queues::list_transfers,
        handlers::queues::create_transfer,
        handlers::queues::get_transfer,
        handlers::queues::update_transfer,
        handlers::queues::delete_transfer,
        handlers::queues::assign_transfer,
        handlers::queues::set_transfer_status,
        handlers::community::list_posts,
        handlers::community::publish_post,
        handlers::community::get_post,
        handlers::community::update_post,
        handlers::community::delete_post,
        handlers::community::like_post,
        handlers::community::comment_on_post,
        handlers::community::delete_comment,
        handlers::community::list_notifications,
        handlers::community::send_notification,
        handlers::community::get_notification,
        handlers::community::set_notification_status,
        handlers::community::delete_notification,
        handlers::dashboard::dashboard,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::PatientReq,
        api_shared::PatientRes,
        api_shared::ListPatientsRes,
        api_shared::DoctorReq,
        api_shared::DoctorRes,
        api_shared::ListDoctorsRes,
        api_shared::NurseReq,
        api_shared::NurseRes,
        api_shared::ListNursesRes,
        api_shared::AppointmentReq,
        api_shared::AppointmentRes,
        api_shared::ListAppointmentsRes,
        api_shared::CancelAppointmentReq,
        api_shared::StatusReq,
        api_shared::AvailableSlotsRes,
        api_shared::SlotTemplateReq,
        api_shared::SlotTemplateRes,
        api_shared::WaitlistReq,
        api_shared::WaitlistRes,
        api_shared::ListWaitlistRes,
        api_shared::FillWaitlistReq,
        api_shared::TransferReq,
        api_shared::TransferRes,
        api_shared::ListTransfersRes,
        api_shared::AssignTransferReq,
        api_shared::PostReq,
        api_shared::PostRes,
        api_shared::CommentReq,
        api_shared::CommentRes,
        api_shared::ListPostsRes,
        api_shared::NotificationReq,
        api_shared::NotificationRes,
        api_shared::ListNotificationsRes,
        api_shared::KpisRes,
        api_shared::DepartmentCountRes,
        api_shared::DayUtilizationRes,
        api_shared::DoctorUtilizationRes,
        api_shared::DashboardRes,
    )),
    modifiers(&ApiKeyAddon)
)]
pub struct ApiDoc;

/// Builds the REST router with Swagger UI mounted at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    use handlers::{appointments, community, dashboard, directory, queues};

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/patients",
            get(directory::list_patients).post(directory::create_patient),
        )
        .route(
            "/patients/:id",
            get(directory::get_patient)
                .put(directory::update_patient)
                .delete(directory::delete_patient),
        )
        .route(
            "/doctors",
            get(directory::list_doctors).post(directory::create_doctor),
        )
        .route(
            "/doctors/:id",
            get(directory::get_doctor)
                .put(directory::update_doctor)
                .delete(directory::delete_doctor),
        )
        .route("/doctors/:id/slots", get(appointments::available_slots))
        .route(
            "/doctors/:id/template",
            get(appointments::get_slot_template).put(appointments::set_slot_template),
        )
        .route(
            "/nurses",
            get(directory::list_nurses).post(directory::create_nurse),
        )
        .route(
            "/nurses/:id",
            get(directory::get_nurse)
                .put(directory::update_nurse)
                .delete(directory::delete_nurse),
        )
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/:id",
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(
            "/appointments/:id/cancel",
            post(appointments::cancel_appointment),
        )
        .route(
            "/appointments/:id/status",
            put(appointments::set_appointment_status),
        )
        .route(
            "/waitlist",
            get(queues::list_waitlist).post(queues::create_waitlist_entry),
        )
        .route(
            "/waitlist/:id",
            get(queues::get_waitlist_entry)
                .put(queues::update_waitlist_entry)
                .delete(queues::delete_waitlist_entry),
        )
        .route("/waitlist/:id/fill", post(queues::fill_waitlist_entry))
        .route(
            "/transfers",
            get(queues::list_transfers).post(queues::create_transfer),
        )
        .route(
            "/transfers/:id",
            get(queues::get_transfer)
                .put(queues::update_transfer)
                .delete(queues::delete_transfer),
        )
        .route("/transfers/:id/assign", post(queues::assign_transfer))
        .route("/transfers/:id/status", put(queues::set_transfer_status))
        .route(
            "/posts",
            get(community::list_posts).post(community::publish_post),
        )
        .route(
            "/posts/:id",
            get(community::get_post)
                .put(community::update_post)
                .delete(community::delete_post),
        )
        .route("/posts/:id/like", post(community::like_post))
        .route("/posts/:id/comments", post(community::comment_on_post))
        .route(
            "/posts/:id/comments/:comment_id",
            axum::routing::delete(community::delete_comment),
        )
        .route(
            "/notifications",
            get(community::list_notifications).post(community::send_notification),
        )
        .route(
            "/notifications/:id",
            get(community::get_notification).delete(community::delete_notification),
        )
        .route(
            "/notifications/:id/status",
            put(community::set_notification_status),
        )
        .route("/dashboard", get(dashboard::dashboard))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use hms_core::{MemoryStore, SeedData};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const ADMIN: &str = "chief-key";
    const CLERK: &str = "desk-key";

    fn app() -> Router {
        let store = EntityStore::open(Arc::new(MemoryStore::new()), SeedData::demo().unwrap())
            .unwrap();
        let auth = ApiKeyProvider::from_env_values(Some(ADMIN.into()), Some(CLERK.into())).unwrap();
        router(AppState::new(store, auth))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            req = req.header(api_shared::API_KEY_HEADER, key);
        }
        let req = match body {
            Some(body) => req
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn booking(time: &str) -> Value {
        json!({
            "patient_id": "P-002",
            "doctor_id": "D-001",
            "date": "2025-12-20",
            "time": time
        })
    }

    #[tokio::test]
    async fn test_health_is_open() {
        let app = app();
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_missing_or_unknown_key_is_unauthorized() {
        let app = app();
        let (status, _) = send(&app, "GET", "/patients", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, "GET", "/patients", Some("guess"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid API key");
    }

    #[tokio::test]
    async fn test_list_patients_with_search() {
        let app = app();
        let (status, body) = send(&app, "GET", "/patients?q=sara", Some(CLERK), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["patients"].as_array().unwrap().len(), 1);
        assert_eq!(body["patients"][0]["id"], "P-002");
    }

    #[tokio::test]
    async fn test_double_booking_is_conflict() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/appointments",
            Some(CLERK),
            Some(booking("10:00 AM")),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("already booked"));

        let (status, body) = send(
            &app,
            "POST",
            "/appointments",
            Some(CLERK),
            Some(booking("11:00 AM")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "Scheduled");
    }

    #[tokio::test]
    async fn test_slots_exclude_booked_labels() {
        let app = app();
        let (status, body) = send(
            &app,
            "GET",
            "/doctors/D-001/slots?date=2025-12-20",
            Some(CLERK),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["slots"],
            json!(["09:00 AM", "11:00 AM", "02:00 PM", "03:00 PM"])
        );

        let (status, _) = send(
            &app,
            "GET",
            "/doctors/D-999/slots?date=2025-12-20",
            Some(CLERK),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancel_frees_slot_and_queues_patient() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/appointments/A-001/cancel",
            Some(CLERK),
            Some(json!({ "enqueue_waitlist": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Cancelled");

        let (_, waitlist) = send(&app, "GET", "/waitlist", Some(CLERK), None).await;
        let entries = waitlist["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["department"], "Dermatology");

        let (status, _) = send(
            &app,
            "POST",
            "/appointments",
            Some(CLERK),
            Some(booking("10:00 AM")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_clerk_cannot_publish_but_admin_can() {
        let app = app();
        let post = json!({
            "title": "Flu season",
            "content": "Vaccination clinic opens Monday.",
            "category": "Announcements"
        });

        let (status, _) = send(&app, "POST", "/posts", Some(CLERK), Some(post.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, "POST", "/posts", Some(ADMIN), Some(post)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["likes"], 0);
    }

    #[tokio::test]
    async fn test_delete_referenced_doctor_is_conflict() {
        let app = app();
        let (status, _) = send(&app, "DELETE", "/doctors/D-001", Some(CLERK), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, "GET", "/doctors/D-001", Some(CLERK), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_reference_is_bad_request() {
        let app = app();
        let (status, _) = send(
            &app,
            "POST",
            "/patients",
            Some(CLERK),
            Some(json!({ "name": "New Patient", "doctor_id": "D-404", "nurse_id": "N-001" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_for_fixed_day() {
        let app = app();
        let (status, body) = send(
            &app,
            "GET",
            "/dashboard?window=today&today=2025-12-20",
            Some(ADMIN),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["kpis"]["appointments_today"], 1);
        assert_eq!(body["kpis"]["doctors_on_duty"], 2);
        assert_eq!(body["department_source"], "appointments");
        assert_eq!(body["departments"][0]["department"], "Dermatology");
        assert_eq!(body["visits_today"].as_array().unwrap().len(), 1);

        let (status, _) = send(&app, "GET", "/dashboard?window=fortnight", Some(ADMIN), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_oversized_horizon() {
        let app = app();
        let (status, body) = send(
            &app,
            "GET",
            "/dashboard?today=2025-12-20&days=4294967295",
            Some(CLERK),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("366"));

        let (status, body) = send(
            &app,
            "GET",
            "/dashboard?today=2025-12-20&days=366",
            Some(CLERK),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["utilization"][0]["days"].as_array().unwrap().len(), 366);
    }

    #[tokio::test]
    async fn test_transfer_assignment_checks_department() {
        let app = app();
        let (status, transfer) = send(
            &app,
            "POST",
            "/transfers",
            Some(CLERK),
            Some(json!({
                "patient_id": "P-001",
                "from_dept": "Dermatology",
                "to_dept": "Neurology",
                "reason": "Follow-up"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(transfer["status"], "Pending");
        let uri = format!("/transfers/{}/assign", transfer["id"].as_str().unwrap());

        let (status, _) = send(
            &app,
            "POST",
            &uri,
            Some(CLERK),
            Some(json!({ "doctor_id": "D-001" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            &uri,
            Some(CLERK),
            Some(json!({ "doctor_id": "D-002" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Assigned");
        assert_eq!(body["assigned_doctor_id"], "D-002");
    }

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/appointments/{id}/cancel"));
        assert!(doc.paths.paths.contains_key("/doctors/{id}/slots"));
    }
}
