//! Booking API router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. Routes are nested under `/api/`. Authentication, locale
//! routing and notification delivery live in outer layers owned by
//! collaborating services; throttling of the reservation entry point is
//! enforced inside the engine itself, keyed by forwarded client address.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::engine::Engine;

/// Build the booking API router.
pub fn api_router(engine: Arc<Engine>) -> Router {
    let ctx = ApiContext::new(engine);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/tenants/:tenant_id/slots",
            get(endpoints::availability::slots),
        )
        .route(
            "/tenants/:tenant_id/first-available",
            get(endpoints::availability::first_available),
        )
        .route(
            "/tenants/:tenant_id/appointments",
            post(endpoints::booking::create),
        )
        .with_state(ctx);

    Router::new().nest("/api", routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Days, NaiveDate};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::EngineConfig;
    use crate::crypto::FieldKeys;
    use crate::db;
    use crate::models::{Service, Tenant, TimeRange};

    struct Fixture {
        app_engine: Arc<Engine>,
        tenant_id: Uuid,
        service_id: Uuid,
        _dir: tempfile::TempDir,
    }

    /// Engine on a temp file, open every day 09:00–17:00, one 60-minute
    /// service.
    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("api.db");
        let keys = FieldKeys::from_master(&[11u8; 32]).unwrap();
        let engine = Engine::new(&db_path, keys, EngineConfig::default()).unwrap();

        let conn = engine.open_db().unwrap();
        let tenant_id = Uuid::new_v4();
        db::insert_tenant(
            &conn,
            &Tenant {
                id: tenant_id,
                name: "Clínica Centro".into(),
            },
        )
        .unwrap();
        for weekday in 0..7 {
            db::set_day_hours(&conn, &tenant_id, weekday, &[TimeRange::new(540, 1020)])
                .unwrap();
        }
        let service_id = Uuid::new_v4();
        db::insert_service(
            &conn,
            &Service {
                id: service_id,
                tenant_id,
                name: "Consultation".into(),
                duration_minutes: 60,
            },
        )
        .unwrap();

        Fixture {
            app_engine: Arc::new(engine),
            tenant_id,
            service_id,
            _dir: dir,
        }
    }

    fn app(fix: &Fixture) -> Router {
        api_router(Arc::clone(&fix.app_engine))
    }

    fn future_date() -> NaiveDate {
        chrono::Local::now()
            .date_naive()
            .checked_add_days(Days::new(30))
            .unwrap()
    }

    fn booking_body(fix: &Fixture, time: &str, email: &str) -> String {
        serde_json::json!({
            "date": future_date(),
            "time": time,
            "service_id": fix.service_id,
            "patient": {
                "name": "Ana Ruiz",
                "email": email,
                "phone": "+34 600 000 001"
            }
        })
        .to_string()
    }

    fn post_booking(fix: &Fixture, body: String, source: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/tenants/{}/appointments", fix.tenant_id))
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", source)
            .body(Body::from(body))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 65536)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let fix = fixture();
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(!json["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slots_response_shape() {
        let fix = fixture();
        let uri = format!(
            "/api/tenants/{}/slots?date={}&service_id={}",
            fix.tenant_id,
            future_date(),
            fix.service_id
        );
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        let slots = json["slots"].as_array().unwrap();
        assert!(slots.contains(&serde_json::json!("09:00")));
        assert!(slots.contains(&serde_json::json!("16:00")));
        assert!(!slots.contains(&serde_json::json!("16:30")));
    }

    #[tokio::test]
    async fn slots_unknown_tenant_is_404() {
        let fix = fixture();
        let uri = format!(
            "/api/tenants/{}/slots?date={}&service_id={}",
            Uuid::new_v4(),
            future_date(),
            fix.service_id
        );
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn booking_succeeds_with_201() {
        let fix = fixture();
        let req = post_booking(&fix, booking_body(&fix, "10:00", "ana@example.com"), "10.0.0.1");
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = response_json(response).await;
        assert!(!json["appointment_id"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn booked_slot_disappears_from_availability() {
        let fix = fixture();
        let req = post_booking(&fix, booking_body(&fix, "10:00", "ana@example.com"), "10.0.0.1");
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let uri = format!(
            "/api/tenants/{}/slots?date={}&service_id={}",
            fix.tenant_id,
            future_date(),
            fix.service_id
        );
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        let json = response_json(response).await;
        let slots = json["slots"].as_array().unwrap();
        assert!(!slots.contains(&serde_json::json!("10:00")));
        assert!(slots.contains(&serde_json::json!("11:00")));
    }

    #[tokio::test]
    async fn second_booking_for_same_slot_is_409() {
        let fix = fixture();
        let first = post_booking(&fix, booking_body(&fix, "10:00", "ana@example.com"), "10.0.0.1");
        let response = app(&fix).oneshot(first).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let second =
            post_booking(&fix, booking_body(&fix, "10:00", "marco@example.com"), "10.0.0.2");
        let response = app(&fix).oneshot(second).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "SLOT_TAKEN");
    }

    #[tokio::test]
    async fn invalid_email_is_400_validation() {
        let fix = fixture();
        let req = post_booking(&fix, booking_body(&fix, "10:00", "not-an-email"), "10.0.0.1");
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn malformed_time_is_400() {
        let fix = fixture();
        let req = post_booking(&fix, booking_body(&fix, "quarter past", "a@b.com"), "10.0.0.1");
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sixth_booking_from_one_source_is_429() {
        let fix = fixture();
        for (i, time) in ["09:00", "10:00", "11:00", "12:00", "13:00"].iter().enumerate() {
            let req = post_booking(
                &fix,
                booking_body(&fix, time, &format!("p{i}@example.com")),
                "203.0.113.7",
            );
            let response = app(&fix).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let sixth = post_booking(
            &fix,
            booking_body(&fix, "15:00", "sixth@example.com"),
            "203.0.113.7",
        );
        let response = app(&fix).oneshot(sixth).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key("Retry-After"));

        let json = response_json(response).await;
        assert_eq!(json["error"]["code"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn first_available_returns_a_date() {
        let fix = fixture();
        let uri = format!(
            "/api/tenants/{}/first-available?service_id={}",
            fix.tenant_id, fix.service_id
        );
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["exhausted"], false);
        assert!(json["date"].is_string());
    }

    #[tokio::test]
    async fn closed_calendar_reports_exhausted() {
        let fix = fixture();
        {
            let conn = fix.app_engine.open_db().unwrap();
            for weekday in 0..7 {
                db::set_day_hours(&conn, &fix.tenant_id, weekday, &[]).unwrap();
            }
        }

        let uri = format!(
            "/api/tenants/{}/first-available?service_id={}",
            fix.tenant_id, fix.service_id
        );
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = response_json(response).await;
        assert_eq!(json["exhausted"], true);
        assert!(json["date"].is_null());
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let fix = fixture();
        let req = Request::builder()
            .uri("/api/nonexistent")
            .body(Body::empty())
            .unwrap();
        let response = app(&fix).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
