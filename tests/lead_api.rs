//! End-to-end tests: the gateway router talking to an in-process mock CRM
//! over real HTTP.

#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Form, Path, State};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt; // for `oneshot`

use lead_gateway::api::build_app;
use lead_gateway::app_state::AppState;
use lead_gateway::config::{AllowedOrigins, GatewayConfig};
use lead_gateway::crm::{BitrixClient, CrmApi};
use lead_gateway::service::LeadService;

const WEBHOOK_PATH: &str = "/rest/1/secret-token";

/// Mock CRM recording every call it receives.
#[derive(Default)]
struct MockCrm {
    calls: Mutex<Vec<(String, HashMap<String, String>)>>,
    existing_contact: Option<u64>,
    lookup_delay: Option<Duration>,
    deal_delay: Option<Duration>,
    failing: Vec<&'static str>,
}

impl MockCrm {
    async fn calls_to(&self, method: &str) -> Vec<HashMap<String, String>> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, form)| form.clone())
            .collect()
    }

    async fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }
}

async fn mock_endpoint(
    State(mock): State<Arc<MockCrm>>,
    Path(endpoint): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let method = endpoint.trim_end_matches(".json").to_string();
    mock.calls.lock().await.push((method.clone(), form));

    if mock.failing.iter().any(|failing| *failing == method) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "ERROR_CORE", "error_description": format!("{method} rejected")})),
        );
    }

    let result = match method.as_str() {
        "crm.duplicate.findbycomm" => {
            if let Some(delay) = mock.lookup_delay {
                tokio::time::sleep(delay).await;
            }
            match mock.existing_contact {
                Some(id) => json!({"CONTACT": [id]}),
                None => json!([]),
            }
        }
        "crm.contact.update" => json!(true),
        "crm.contact.add" => json!(101),
        "crm.deal.add" => {
            if let Some(delay) = mock.deal_delay {
                tokio::time::sleep(delay).await;
            }
            json!("555")
        }
        "crm.activity.add" => json!(900),
        _ => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "ERROR_METHOD_NOT_FOUND"})),
            );
        }
    };
    (StatusCode::OK, Json(json!({"result": result})))
}

/// Starts `mock` on an ephemeral port and returns its webhook URL.
async fn spawn_mock(mock: Arc<MockCrm>) -> String {
    let app = Router::new()
        .route(&format!("{WEBHOOK_PATH}/{{endpoint}}"), post(mock_endpoint))
        .with_state(mock);
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("failed to bind mock CRM");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("mock CRM has no address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}{WEBHOOK_PATH}/")
}

fn gateway(config: &GatewayConfig) -> Router {
    let Ok(client) = BitrixClient::new(config.crm_webhook.as_deref(), config.crm_timeout) else {
        panic!("failed to build CRM client");
    };
    let crm: Arc<dyn CrmApi> = Arc::new(client);
    let lead_service = Arc::new(LeadService::new(crm, config));
    build_app(AppState { lead_service }, config)
}

async fn gateway_with_mock(mock: &Arc<MockCrm>, timeout: Duration) -> Router {
    let webhook = spawn_mock(Arc::clone(mock)).await;
    gateway(&GatewayConfig {
        crm_webhook: Some(webhook),
        crm_timeout: timeout,
        ..GatewayConfig::default()
    })
}

async fn post_lead(app: Router, body: String) -> (StatusCode, Value) {
    let Ok(request) = Request::builder()
        .method("POST")
        .uri("/lead")
        .header("content-type", "application/json")
        .body(Body::from(body))
    else {
        panic!("invalid request");
    };
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let Ok(response) = app.oneshot(request).await else {
        panic!("router failed");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("failed to read body");
    };
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_is_ok_without_crm() {
    let app = gateway(&GatewayConfig::default());
    let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
        panic!("invalid request");
    };

    let (status, json) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"status": "ok"}));
}

#[tokio::test]
async fn unconfigured_crm_is_a_configuration_error() {
    let app = gateway(&GatewayConfig::default());

    let (status, json) = post_lead(
        app,
        json!({"name": "Ivan", "phone": "+79990000000"}).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"]["kind"], "configuration");
}

#[tokio::test]
async fn new_client_with_next_service_date() {
    let mock = Arc::new(MockCrm::default());
    let app = gateway_with_mock(&mock, Duration::from_secs(5)).await;

    let (status, json) = post_lead(
        app,
        json!({"name": "Ivan", "phone": "+79990000000", "next_service_date": "2025-06-01"})
            .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["contact_id"], 101);
    assert_eq!(json["deal_id"], 555);
    assert_eq!(json["key"].as_str().map(str::len), Some(40));

    assert_eq!(
        mock.methods().await,
        [
            "crm.duplicate.findbycomm",
            "crm.contact.add",
            "crm.deal.add",
            "crm.activity.add",
            "crm.activity.add",
        ]
    );

    let lookups = mock.calls_to("crm.duplicate.findbycomm").await;
    let [lookup] = lookups.as_slice() else {
        panic!("expected one lookup");
    };
    assert_eq!(lookup.get("entity_type").map(String::as_str), Some("CONTACT"));
    assert_eq!(lookup.get("values[0]").map(String::as_str), Some("+79990000000"));

    let deals = mock.calls_to("crm.deal.add").await;
    let [deal] = deals.as_slice() else {
        panic!("expected one deal");
    };
    assert_eq!(deal.get("fields[CONTACT_ID]").map(String::as_str), Some("101"));
    assert!(
        deal.get("fields[TITLE]")
            .is_some_and(|title| title.contains("Огнезащита"))
    );
    assert_eq!(deal.get("fields[STAGE_ID]").map(String::as_str), Some("NEW"));

    let activities = mock.calls_to("crm.activity.add").await;
    let [_, reminder] = activities.as_slice() else {
        panic!("expected two activities");
    };
    assert_eq!(
        reminder.get("fields[DEADLINE]").map(String::as_str),
        Some("2025-06-01T10:00:00+03:00")
    );
}

#[tokio::test]
async fn existing_contact_is_not_duplicated() {
    let mock = Arc::new(MockCrm {
        existing_contact: Some(42),
        ..MockCrm::default()
    });
    let app = gateway_with_mock(&mock, Duration::from_secs(5)).await;

    let (status, json) = post_lead(
        app,
        json!({"name": "Ivan", "phone": "+79990000000", "telegram_username": "ivan_p"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["contact_id"], 42);
    assert!(mock.calls_to("crm.contact.add").await.is_empty());

    let updates = mock.calls_to("crm.contact.update").await;
    let [update] = updates.as_slice() else {
        panic!("expected one update");
    };
    assert_eq!(update.get("id").map(String::as_str), Some("42"));
    assert_eq!(
        update.get("fields[UF_CRM_TELEGRAM]").map(String::as_str),
        Some("ivan_p")
    );
    assert_eq!(mock.calls_to("crm.activity.add").await.len(), 1);
}

#[tokio::test]
async fn lookup_timeout_creates_new_contact() {
    let mock = Arc::new(MockCrm {
        existing_contact: Some(42),
        lookup_delay: Some(Duration::from_secs(3)),
        ..MockCrm::default()
    });
    let app = gateway_with_mock(&mock, Duration::from_millis(300)).await;

    let (status, json) =
        post_lead(app, json!({"name": "Ivan", "phone": "+79990000000"}).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["contact_id"], 101);
    assert_eq!(mock.calls_to("crm.contact.add").await.len(), 1);
}

#[tokio::test]
async fn deal_rejection_is_a_gateway_error() {
    let mock = Arc::new(MockCrm {
        failing: vec!["crm.deal.add"],
        ..MockCrm::default()
    });
    let app = gateway_with_mock(&mock, Duration::from_secs(5)).await;

    let (status, json) =
        post_lead(app, json!({"name": "Ivan", "phone": "+79990000000"}).to_string()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["kind"], "remote_service");
    assert_eq!(json["error"]["message"], "CRM error: crm.deal.add rejected");
    assert!(mock.calls_to("crm.activity.add").await.is_empty());
}

#[tokio::test]
async fn activity_rejection_still_succeeds() {
    let mock = Arc::new(MockCrm {
        failing: vec!["crm.activity.add"],
        ..MockCrm::default()
    });
    let app = gateway_with_mock(&mock, Duration::from_secs(5)).await;

    let (status, json) = post_lead(
        app,
        json!({"name": "Ivan", "phone": "+79990000000", "next_service_date": "2025-06-01"})
            .to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deal_id"], 555);
    assert_eq!(mock.calls_to("crm.activity.add").await.len(), 2);
}

#[tokio::test]
async fn malformed_submission_is_rejected_before_crm() {
    let mock = Arc::new(MockCrm::default());
    let app = gateway_with_mock(&mock, Duration::from_secs(5)).await;

    let (status, json) = post_lead(app.clone(), json!({"name": "Ivan"}).to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["kind"], "validation");

    let (status, _) = post_lead(app, json!({"name": "Ivan", "phone": "  "}).to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(mock.methods().await.is_empty());
}

#[tokio::test]
async fn configured_origin_gets_credentialed_cors() {
    let app = gateway(&GatewayConfig {
        allowed_origins: AllowedOrigins::parse("https://form.example, https://other.example"),
        ..GatewayConfig::default()
    });
    let Ok(request) = Request::builder()
        .method("OPTIONS")
        .uri("/lead")
        .header("origin", "https://form.example")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
    else {
        panic!("invalid request");
    };

    let Ok(response) = app.oneshot(request).await else {
        panic!("router failed");
    };
    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://form.example")
    );
    assert_eq!(
        headers
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn dropped_caller_does_not_stop_the_pipeline() {
    let mock = Arc::new(MockCrm {
        deal_delay: Some(Duration::from_millis(500)),
        ..MockCrm::default()
    });
    let app = gateway_with_mock(&mock, Duration::from_secs(5)).await;
    let Ok(request) = Request::builder()
        .method("POST")
        .uri("/lead")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "Ivan", "phone": "+79990000000"}).to_string(),
        ))
    else {
        panic!("invalid request");
    };

    // The caller gives up while crm.deal.add is still in flight.
    let abandoned = tokio::time::timeout(Duration::from_millis(200), app.oneshot(request)).await;
    assert!(abandoned.is_err());

    let mut methods = Vec::new();
    for _ in 0..40 {
        methods = mock.methods().await;
        if methods.iter().any(|m| m == "crm.activity.add") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(
        methods,
        [
            "crm.duplicate.findbycomm",
            "crm.contact.add",
            "crm.deal.add",
            "crm.activity.add",
        ]
    );
}
