use actix_web::{http::StatusCode, test, web, App};
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager};
use serde_json::{json, Value};

use jobboard::config::{AppConfig, DbPool};
use jobboard::handlers;

// A pool that never connects: these tests only exercise routes that reject
// the request before touching the database.
fn offline_pool() -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new("postgres://localhost/unreachable");
    r2d2::Pool::builder()
        .max_size(1)
        .min_idle(Some(0))
        .build_unchecked(manager)
}

fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiry: 1,
        refresh_expiry: 1,
    }
}

macro_rules! test_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(offline_pool()))
                .app_data(web::Data::new(test_config()))
                .configure(handlers::configure)
                .default_service(web::route().to(handlers::not_found)),
        )
        .await
    };
}

#[actix_web::test]
async fn health_reports_ok() {
    let app = test_app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn static_views_render() {
    let app = test_app!();
    for (path, view) in [
        ("/about", "about"),
        ("/category", "category"),
        ("/contact", "contact"),
        ("/testimonial", "testimonial"),
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["view"], view);
    }
}

#[actix_web::test]
async fn unmatched_path_falls_back_to_404_view() {
    let app = test_app!();
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/no-such-page").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["view"], "404");
}

#[actix_web::test]
async fn login_form_lists_declared_fields() {
    let app = test_app!();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let fields = body["form"]["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["name"] == "email"));
    assert!(fields.iter().any(|f| f["name"] == "password"));
}

#[actix_web::test]
async fn login_with_missing_fields_returns_field_errors() {
    let app = test_app!();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
}

#[actix_web::test]
async fn signup_with_short_password_is_rejected_before_any_write() {
    let app = test_app!();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/signup")
            .set_json(json!({
                "username": "candidate",
                "email": "a@x.com",
                "password": "short",
                "confirm_password": "short"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"][0]["field"], "password");
}

#[actix_web::test]
async fn dashboard_requires_a_session() {
    let app = test_app!();
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/dashboard").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_rejects_garbage_tokens() {
    let app = test_app!();
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/logout")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn anonymous_applications_view_prompts_for_login() {
    let app = test_app!();
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/applications").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Please log in to view your applications");
}

#[actix_web::test]
async fn posting_a_job_requires_an_employer_account() {
    let app = test_app!();
    // Candidate token: passes authentication, fails the employer check.
    let token =
        jobboard::services::AuthService::generate_token(1, "a@x.com", false, &test_config())
            .unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/post-job")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({
                "title": "Software Developer",
                "description": "Develop software applications.",
                "location": "New York",
                "company_logo": "logo.png",
                "salary": 90000,
                "category": "Marketing"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
