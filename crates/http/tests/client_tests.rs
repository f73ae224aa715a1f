//! Integration tests for the SCM HTTP client

use scm_core::{BaseConfiguration, BrowserLocation, ResolveOptions, ResolverPolicy};
use scm_http::session::{MemoryTokenStore, Navigator, TokenStore};
use scm_http::types::{
    Attachment, NewRfxEvent, RfxAward, RfxItemResponse, RfxQuotation, RfxResponseSubmission,
    SupplierEvaluation,
};
use scm_http::{ClientError, ScmClient};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    client: ScmClient,
    tokens: Arc<MemoryTokenStore>,
    routes: Arc<Mutex<Vec<String>>>,
}

fn harness(configured: &str, token: Option<&str>) -> Harness {
    let tokens = Arc::new(match token {
        Some(t) => MemoryTokenStore::with_token(t),
        None => MemoryTokenStore::new(),
    });
    let routes = Arc::new(Mutex::new(Vec::new()));
    let sink = routes.clone();
    let navigator: Arc<dyn Navigator> =
        Arc::new(move |route: &str| sink.lock().unwrap().push(route.to_string()));

    let base = BaseConfiguration::resolve(Some(configured), None, ResolveOptions::default());
    let client = ScmClient::builder()
        .base(base)
        .token_store(tokens.clone())
        .navigator(navigator)
        .build()
        .unwrap();

    Harness {
        client,
        tokens,
        routes,
    }
}

#[tokio::test]
async fn test_requests_are_sent_under_path_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/scm/v2/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Dana", "email": "dana@acme.com", "role": "admin" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&format!("{}/scm/v2/", mock_server.uri()), None);
    let users = h.client.list_users().await.unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_bearer_token_and_json_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/supplier-evaluations"))
        .and(header("authorization", "Bearer jwt-123"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "supplier_name": "Acme", "price_score": 4.0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 7,
            "supplier_name": "Acme",
            "price_score": 4.0,
            "composite_score": 81.2
        })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("jwt-123"));
    let created = h
        .client
        .create_supplier_evaluation(&SupplierEvaluation {
            supplier_name: "Acme".into(),
            price_score: Some(4.0),
            ..SupplierEvaluation::default()
        })
        .await
        .unwrap();

    assert_eq!(created.id, Some(7));
    assert_eq!(created.composite_score, Some(81.2));
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_navigates_to_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/departments"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("stale"));
    let result = h.client.list_departments().await;

    match result {
        Err(ClientError::AuthenticationFailed(message)) => assert_eq!(message, "Token expired"),
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
    assert_eq!(h.tokens.token(), None);
    assert_eq!(*h.routes.lock().unwrap(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_server_error_keeps_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/summary"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "db offline" })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("fresh"));
    let err = h.client.dashboard_summary().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "db offline");
    assert_eq!(h.tokens.token().as_deref(), Some("fresh"));
    assert!(h.routes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancellation_has_no_session_side_effects() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/requests/closed"))
        .respond_with(
            ResponseTemplate::new(401).set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("keep-me"));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let request = h.client.request(reqwest::Method::GET, "/api/requests/closed");
    let result: Result<serde_json::Value, _> = h.client.execute_cancellable(request, &cancel).await;

    let err = result.unwrap_err();
    assert!(err.is_canceled());
    assert!(!err.is_auth_expired());
    assert_eq!(err.status(), None);
    assert_eq!(h.tokens.token().as_deref(), Some("keep-me"));
    assert!(h.routes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_timeout_surfaces_as_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/workload"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let base =
        BaseConfiguration::resolve(Some(&mock_server.uri()), None, ResolveOptions::default());
    let client = ScmClient::builder()
        .base(base)
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = client.workload().await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.user_message(), scm_http::client::error::NETWORK_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_non_array_evaluation_list_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/supplier-evaluations"))
        .and(query_param("supplier", "Acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let list = h
        .client
        .list_supplier_evaluations(&[("supplier", "Acme")])
        .await
        .unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_delete_accepts_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/gw/api/supplier-evaluations/12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&format!("{}/gw", mock_server.uri()), None);
    h.client.delete_supplier_evaluation(12).await.unwrap();
}

#[tokio::test]
async fn test_reject_omits_blank_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register-requests/3/reject"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/register-requests/4/reject"))
        .and(body_json(json!({ "reason": "duplicate" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    h.client.reject_account_request(3, Some("   ")).await.unwrap();
    h.client
        .reject_account_request(4, Some(" duplicate "))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_account_requests_and_logs_are_unwrapped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/register-requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "requests": [{ "id": 5, "email": "new@acme.com" }]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin-tools/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let requests = h.client.list_account_requests().await.unwrap();
    assert_eq!(requests[0].email.as_deref(), Some("new@acme.com"));

    let logs = h.client.admin_logs().await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_department_spending_sends_year() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/department-spending"))
        .and(query_param("year", "2026"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "department": "ICU", "month": "2026-01", "total_cost": 1200.0 }
        ])))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let spending = h.client.department_spending(2026).await.unwrap();
    assert_eq!(spending[0]["department"], "ICU");
}

#[tokio::test]
async fn test_attachment_upload_is_multipart() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/attachments/item/42"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("jwt"));
    h.client
        .upload_item_attachment(42, "quote.pdf", b"%PDF-1.7".to_vec())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_attachment_download_uses_encoded_file_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/attachments/download/quote%201.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let attachment: Attachment = serde_json::from_value(json!({
        "id": 1,
        "file_path": "uploads/quote 1.pdf"
    }))
    .unwrap();

    let content = h.client.download_attachment(&attachment).await.unwrap();
    assert_eq!(content.content_type, "application/pdf");
    assert_eq!(&content.bytes[..], b"%PDF-1.7");
}

#[tokio::test]
async fn test_not_found_maps_to_variant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let result = h.client.get_user(99).await;
    assert!(matches!(result, Err(ClientError::NotFound(ref m)) if m == "no such user"));
}

#[tokio::test]
async fn test_relative_origin_only_base_uses_page_origin() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api-gateway/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = BrowserLocation::parse(&format!("{}/requests", mock_server.uri())).unwrap();
    let options = ResolveOptions {
        policy: ResolverPolicy::OriginOnly,
        ..ResolveOptions::default()
    };
    let base = BaseConfiguration::resolve(Some("/api-gateway"), Some(&page), options);
    let client = ScmClient::new(base).unwrap();

    assert!(client.list_users().await.unwrap().is_empty());

    let detached = BaseConfiguration::resolve(Some("/api-gateway"), None, options);
    assert!(matches!(
        ScmClient::new(detached),
        Err(ClientError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_rfx_event_lifecycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rfx-events"))
        .and(body_json(json!({ "title": "Gloves", "rfx_type": "rfp" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3, "title": "Gloves", "rfx_type": "rfp", "status": "open"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/rfx-events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "title": "Gloves", "status": "open", "response_count": 1 }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/rfx-events/3/responses"))
        .and(body_json(json!({
            "supplier_name": "Acme",
            "response_data": {
                "items": [{ "item_name": "Gloves", "quantity": 10.0, "unit_cost": 2.0 }],
                "totals": { "total_cost": 20.0, "total_quantity": 10.0, "total_free_quantity": 0.0 }
            }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/rfx-events/3/status"))
        .and(body_json(json!({ "status": "closed" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/rfx-events/3/award"))
        .and(body_json(json!({ "response_id": 9, "po_number": "PO-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "awarded" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), Some("jwt"));
    let created = h
        .client
        .create_rfx_event(&NewRfxEvent {
            title: " Gloves ".into(),
            rfx_type: "RFP".into(),
            ..NewRfxEvent::default()
        })
        .await
        .unwrap();
    assert_eq!(created.status.as_deref(), Some("open"));

    let events = h.client.list_rfx_events().await.unwrap();
    assert_eq!(events[0].response_count, Some(1));

    let submission = RfxResponseSubmission::new(
        "Acme",
        None,
        None,
        vec![RfxItemResponse {
            item_name: Some("Gloves".into()),
            quantity: Some(10.0),
            unit_cost: Some(2.0),
            ..RfxItemResponse::default()
        }],
    );
    h.client.submit_rfx_response(3, &submission).await.unwrap();
    h.client.update_rfx_status(3, "closed").await.unwrap();

    let award = h
        .client
        .award_rfx_response(3, &RfxAward::new(9, Some("PO-1"), None))
        .await
        .unwrap();
    assert_eq!(award["message"], "awarded");
}

#[tokio::test]
async fn test_rfx_client_side_validation_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let untitled = h
        .client
        .create_rfx_event(&NewRfxEvent {
            title: "   ".into(),
            rfx_type: "rfq".into(),
            ..NewRfxEvent::default()
        })
        .await;
    assert!(matches!(untitled, Err(ClientError::BadRequest(_))));

    let blank = h
        .client
        .analyze_rfx_quotations(3, &[RfxQuotation::default()])
        .await;
    assert!(matches!(blank, Err(ClientError::BadRequest(_))));

    let unnamed = h.client.create_project("  ").await;
    assert!(matches!(unnamed, Err(ClientError::BadRequest(_))));
}

#[tokio::test]
async fn test_rfx_analysis_skips_blank_quotations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/rfx-events/4/analyze"))
        .and(body_json(json!({
            "quotations": [{ "supplier_name": "Acme", "bid_amount": 900.0 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "recommended": "Acme" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let result = h
        .client
        .analyze_rfx_quotations(
            4,
            &[
                RfxQuotation::default(),
                RfxQuotation {
                    supplier_name: Some("Acme".into()),
                    bid_amount: Some(900.0),
                    ..RfxQuotation::default()
                },
            ],
        )
        .await
        .unwrap();
    assert_eq!(result["recommended"], "Acme");
}

#[tokio::test]
async fn test_project_management() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/management"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Expansion", "is_active": true }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/projects"))
        .and(body_json(json!({ "name": "Renovation" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/projects/1/deactivate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Project deactivated",
            "project": { "id": 1, "name": "Expansion", "is_active": false }
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/projects/2/deactivate"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let h = harness(&mock_server.uri(), None);
    let projects = h.client.list_projects().await.unwrap();
    assert_eq!(projects[0].name, "Expansion");

    h.client.create_project(" Renovation ").await.unwrap();

    let updated = h.client.deactivate_project(1).await.unwrap().unwrap();
    assert_eq!(updated.is_active, Some(false));
    assert_eq!(h.client.deactivate_project(2).await.unwrap(), None);
}
