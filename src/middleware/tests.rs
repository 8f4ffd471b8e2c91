use crate::backend::{Backend, CheckInput, CheckOutput, Decision, InMemoryBackend};
use crate::policy::Policy;
use crate::response::{DeniedBody, X_RATELIMIT_REMAINING, X_RATELIMIT_RESET};
use crate::RateLimiter;
use actix_web::http::header::RETRY_AFTER;
use actix_web::http::StatusCode;
use actix_web::test::{read_body, TestRequest};
use actix_web::{get, test, App, HttpResponse, Responder};
use async_trait::async_trait;
use chrono::DateTime;

#[get("/200")]
async fn route_200() -> impl Responder {
    HttpResponse::Ok().body("Hello world!")
}

/// Stands in for a backend whose store has become unreachable.
#[derive(Clone, Default)]
struct FailingBackend;

#[async_trait(?Send)]
impl Backend for FailingBackend {
    async fn check(&self, _input: CheckInput) -> actix_web::Result<(Decision, CheckOutput)> {
        Err(actix_web::error::ErrorInternalServerError(
            "limiter store unavailable",
        ))
    }
}

fn forwarded_request() -> actix_web::test::TestRequest {
    TestRequest::get()
        .uri("/200")
        .insert_header(("X-Forwarded-For", "1.2.3.4"))
}

#[actix_web::test]
async fn test_allow_then_deny() {
    tokio::time::pause();
    let backend = InMemoryBackend::builder().with_sweep_interval(None).build();
    let limiter = RateLimiter::builder(backend, Policy::new(1, 60)).build();
    let app = test::init_service(App::new().service(route_200).wrap(limiter)).await;
    assert!(
        test::call_service(&app, forwarded_request().to_request())
            .await
            .status()
            .is_success()
    );
    let denied = test::call_service(&app, forwarded_request().to_request()).await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_denied_response_contract() {
    tokio::time::pause();
    let backend = InMemoryBackend::builder().with_sweep_interval(None).build();
    let limiter = RateLimiter::builder(backend, Policy::new(1, 60)).build();
    let app = test::init_service(App::new().service(route_200).wrap(limiter)).await;
    test::call_service(&app, forwarded_request().to_request()).await;
    let denied = test::call_service(&app, forwarded_request().to_request()).await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = denied
        .headers()
        .get(RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=60).contains(&retry_after));
    assert_eq!(
        denied
            .headers()
            .get(X_RATELIMIT_REMAINING.clone())
            .unwrap()
            .to_str()
            .unwrap(),
        "0"
    );
    let reset = denied
        .headers()
        .get(X_RATELIMIT_RESET.clone())
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    DateTime::parse_from_rfc3339(&reset).expect("reset header must be RFC 3339");
    let body: DeniedBody = serde_json::from_slice(&read_body(denied).await).unwrap();
    assert_eq!(body.error, "Too many requests");
    assert_eq!(body.retry_after, retry_after);
}

#[actix_web::test]
async fn test_custom_denied_response() {
    tokio::time::pause();
    let backend = InMemoryBackend::builder().with_sweep_interval(None).build();
    let limiter = RateLimiter::builder(backend, Policy::new(1, 60))
        .denied_response(|_output| HttpResponse::ImATeapot().body("Custom denied response"))
        .build();
    let app = test::init_service(App::new().service(route_200).wrap(limiter)).await;
    test::call_service(&app, forwarded_request().to_request()).await;
    let denied = test::call_service(&app, forwarded_request().to_request()).await;
    assert_eq!(denied.status(), StatusCode::IM_A_TEAPOT);
    let body = String::from_utf8(read_body(denied).await.to_vec()).unwrap();
    assert_eq!(body, "Custom denied response");
}

#[actix_web::test]
async fn test_custom_key_fn() {
    tokio::time::pause();
    let backend = InMemoryBackend::builder().with_sweep_interval(None).build();
    // All requests share one key regardless of headers.
    let limiter = RateLimiter::builder(backend, Policy::new(1, 60))
        .key_fn(|_req| "shared".to_owned())
        .build();
    let app = test::init_service(App::new().service(route_200).wrap(limiter)).await;
    assert!(
        test::call_service(&app, forwarded_request().to_request())
            .await
            .status()
            .is_success()
    );
    let other_client = TestRequest::get()
        .uri("/200")
        .insert_header(("X-Forwarded-For", "5.6.7.8"))
        .to_request();
    let denied = test::call_service(&app, other_client).await;
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_fail_closed_by_default() {
    let limiter = RateLimiter::builder(FailingBackend, Policy::new(1, 60)).build();
    let app = test::init_service(App::new().service(route_200).wrap(limiter)).await;
    let response = test::call_service(&app, forwarded_request().to_request()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_fail_open() {
    let limiter = RateLimiter::builder(FailingBackend, Policy::new(1, 60))
        .fail_open(true)
        .build();
    let app = test::init_service(App::new().service(route_200).wrap(limiter)).await;
    let response = test::call_service(&app, forwarded_request().to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
}
