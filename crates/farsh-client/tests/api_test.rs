//! HTTP-level tests against a mock backend.

use std::time::Duration;

use chrono::NaiveDate;
use farsh_client::wire::{CarpetFilter, CheckFilter, InvoiceFilter};
use farsh_client::{
    ApiClient, CatalogService, CatalogView, CheckService, ClientError, InvoiceService,
    InvoiceWorkflow, SaveOutcome, Session, SessionHandle, SessionStore, UserService,
};
use farsh_core::{CheckDraft, InvoiceDraft, LineItem, Money, PaymentMethod, User, UserRole};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

// =============================================================================
// Fixtures
// =============================================================================

const TOKEN: &str = "test-token";

fn user() -> User {
    User {
        id: 1,
        username: "admin".into(),
        email: "admin@example.com".into(),
        full_name: None,
        role: UserRole::Admin,
        is_active: true,
        created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
        last_login: None,
    }
}

fn user_json() -> Value {
    json!({
        "id": 1,
        "username": "admin",
        "email": "admin@example.com",
        "full_name": null,
        "role": "admin",
        "is_active": true,
        "created_at": "2024-01-01T00:00:00",
        "last_login": null
    })
}

fn logged_in() -> SessionHandle {
    std::sync::Arc::new(tokio::sync::RwLock::new(Session::new(TOKEN, user())))
}

fn api_for(server: &MockServer, session: SessionHandle) -> ApiClient {
    let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    ApiClient::new(base, session)
}

fn invoice_json(id: i64) -> Value {
    json!({
        "id": id,
        "invoice_number": format!("INV-{}", id),
        "customer_name": "Sara",
        "payment_method": "چک",
        "description": "",
        "invoice_date": "2024-03-20T00:00:00",
        "total_amount": 200000.0,
        "signature_path": null,
        "is_signed": false,
        "created_at": "2024-03-20T10:00:00",
        "updated_at": "2024-03-20T10:00:00",
        "items": []
    })
}

fn check_json(id: i64, number: &str, invoice_id: Option<i64>) -> Value {
    json!({
        "id": id,
        "check_number": number,
        "amount": 50000.0,
        "payee": "Sara",
        "check_date": "2024-04-20T00:00:00",
        "check_type": "ورودی",
        "status": "ثبت نشده",
        "description": null,
        "invoice_id": invoice_id,
        "carpet_id": null,
        "notification_sent": null,
        "created_at": "2024-03-20T10:00:00",
        "updated_at": "2024-03-20T10:00:00"
    })
}

fn carpet_json(id: i64, pattern: &str) -> Value {
    json!({
        "id": id,
        "pattern": pattern,
        "brand": "Kashan",
        "material": "wool",
        "size": "شش متری",
        "quantity": 2,
        "sale_price": 100000.0,
        "image_path": null,
        "is_consignment": false
    })
}

fn draft() -> InvoiceDraft {
    let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
    draft.set_customer_name("Sara").unwrap();
    draft
        .add_line(LineItem::freeform("Tabriz", 2, Money::from_units(100_000)))
        .unwrap();
    draft
}

fn requests_to(requests: &[Request], verb: &str, suffix: &str) -> usize {
    requests
        .iter()
        .filter(|r| r.method.as_str() == verb && r.url.path().ends_with(suffix))
        .count()
}

// =============================================================================
// Transport
// =============================================================================

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .expect(1)
        .mount(&server)
        .await;

    let users = UserService::new(api_for(&server, logged_in()));
    let me = users.me().await.unwrap();

    assert_eq!(me.username, "admin");
    assert!(me.is_admin());
}

#[tokio::test]
async fn test_string_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/invoices/9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "فاکتور یافت نشد" })))
        .mount(&server)
        .await;

    let invoices = InvoiceService::new(api_for(&server, logged_in()));
    let err = invoices.get(9).await.unwrap_err();

    match &err {
        ClientError::Backend { status, message } => {
            assert_eq!(*status, 404);
            assert_eq!(message, "فاکتور یافت نشد");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message("fallback"), "فاکتور یافت نشد");
}

#[tokio::test]
async fn test_validation_detail_list_is_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/invoices/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                { "loc": ["body", "items", 0, "carpet_id"], "msg": "field required", "type": "missing" }
            ]
        })))
        .mount(&server)
        .await;

    let workflow = InvoiceWorkflow::new(InvoiceService::new(api_for(&server, logged_in())));
    let mut draft = draft();
    let err = workflow.save_draft(&mut draft).await.unwrap_err();

    assert_eq!(err.user_message("fallback"), "carpet_id: field required");
    assert_eq!(draft.server_id(), None);
}

#[tokio::test]
async fn test_unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/inventory"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Could not validate credentials" })),
        )
        .mount(&server)
        .await;

    let reports = farsh_client::ReportService::new(api_for(&server, logged_in()));
    let err = reports.inventory().await.unwrap_err();

    assert!(err.is_auth_error());
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_no_token_sends_nothing() {
    let server = MockServer::start().await;
    let catalog = CatalogService::new(api_for(&server, Session::empty_handle()));

    let err = catalog.list(&CarpetFilter::default()).await.unwrap_err();

    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Save Draft / Finalize
// =============================================================================

#[tokio::test]
async fn test_save_draft_posts_then_puts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/invoices/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(invoice_json(12)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/invoices/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(invoice_json(12)))
        .expect(1)
        .mount(&server)
        .await;

    let workflow = InvoiceWorkflow::new(InvoiceService::new(api_for(&server, logged_in())));
    let mut draft = draft();

    assert_eq!(
        workflow.save_draft(&mut draft).await.unwrap(),
        SaveOutcome::Created(12)
    );
    draft.set_notes("second save").unwrap();
    assert_eq!(
        workflow.save_draft(&mut draft).await.unwrap(),
        SaveOutcome::Updated(12)
    );
}

#[tokio::test]
async fn test_save_draft_without_customer_sends_nothing() {
    let server = MockServer::start().await;
    let workflow = InvoiceWorkflow::new(InvoiceService::new(api_for(&server, logged_in())));
    let mut draft = InvoiceDraft::new(NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
    draft
        .add_line(LineItem::freeform("Tabriz", 1, Money::from_units(10)))
        .unwrap();

    let err = workflow.save_draft(&mut draft).await.unwrap_err();

    assert!(err.is_validation());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_finalize_registers_checks_without_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/invoices/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(invoice_json(12)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/invoices/12/finalize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(invoice_json(12)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/checks/"))
        .and(body_json(json!({
            "check_number": "778899",
            "amount": 50000,
            "payee": "Sara",
            "check_date": "2024-04-20",
            "check_type": "ورودی",
            "invoice_id": 12
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(check_json(5, "778899", Some(12))))
        .expect(1)
        .mount(&server)
        .await;

    let workflow = InvoiceWorkflow::new(InvoiceService::new(api_for(&server, logged_in())));
    let mut draft = draft();
    draft.set_payment_method(PaymentMethod::Check).unwrap();
    draft
        .add_check(CheckDraft::new(
            "778899",
            Money::from_units(50_000),
            NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
        ))
        .unwrap();

    let report = workflow.finalize(&mut draft).await.unwrap();

    assert!(draft.is_finalized());
    assert!(report.is_complete());
    assert_eq!(report.created_checks[0].id, 5);

    // Finalize strictly precedes check creation.
    let requests = server.received_requests().await.unwrap();
    let finalize_at = requests
        .iter()
        .position(|r| r.url.path().ends_with("/finalize"))
        .unwrap();
    let check_at = requests
        .iter()
        .position(|r| r.url.path() == "/api/checks/")
        .unwrap();
    assert!(finalize_at < check_at);
}

#[tokio::test]
async fn test_failed_finalize_registers_no_checks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/invoices/12/finalize"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "فاکتور یافت نشد یا قبلا نهایی شده"
        })))
        .mount(&server)
        .await;

    let workflow = InvoiceWorkflow::new(InvoiceService::new(api_for(&server, logged_in())));
    let mut draft = draft();
    draft.mark_saved(12).unwrap();
    draft.set_payment_method(PaymentMethod::Check).unwrap();
    draft
        .add_check(CheckDraft::new(
            "1",
            Money::from_units(50_000),
            NaiveDate::from_ymd_opt(2024, 4, 20).unwrap(),
        ))
        .unwrap();

    let err = workflow.finalize(&mut draft).await.unwrap_err();

    assert_eq!(err.user_message("fallback"), "فاکتور یافت نشد یا قبلا نهایی شده");
    assert!(!draft.is_finalized());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests_to(&requests, "POST", "/checks/"), 0);
    assert_eq!(requests_to(&requests, "POST", "/invoices/"), 0);
}

// =============================================================================
// Services
// =============================================================================

#[tokio::test]
async fn test_carpet_filters_are_sent_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/carpets/"))
        .and(query_param("search", "afshan"))
        .and(query_param("available_only", "true"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([carpet_json(3, "Afshan")])))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = CatalogService::new(api_for(&server, logged_in()));
    let carpets = catalog
        .list(&CarpetFilter {
            search: Some("  afshan ".into()),
            available_only: true,
            limit: Some(50),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(carpets.len(), 1);
    assert_eq!(carpets[0].sale_price, Some(Money::from_units(100_000)));
}

#[tokio::test]
async fn test_checks_are_filtered_by_invoice_locally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/checks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            check_json(1, "A", Some(12)),
            check_json(2, "B", Some(13)),
            check_json(3, "C", None)
        ])))
        .mount(&server)
        .await;

    let checks = CheckService::new(api_for(&server, logged_in()));
    let for_invoice = checks.list_for_invoice(12).await.unwrap();
    assert_eq!(for_invoice.len(), 1);
    assert_eq!(for_invoice[0].check_number, "A");

    let all = checks.list(&CheckFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_invoice_checks_are_collected_across_pages() {
    let server = MockServer::start().await;
    let first_page: Vec<Value> = (1..=1000)
        .map(|id| check_json(id, &format!("N{}", id), Some(99)))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/checks/"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(first_page)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/checks/"))
        .and(query_param("skip", "1000"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            check_json(1001, "A", Some(5)),
            check_json(1002, "B", Some(7)),
            check_json(1003, "C", Some(5)),
            check_json(1004, "D", Some(5))
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let checks = CheckService::new(api_for(&server, logged_in()));
    let all = checks.list_for_invoice(5).await.unwrap();
    let numbers: Vec<&str> = all.iter().map(|c| c.check_number.as_str()).collect();
    assert_eq!(numbers, vec!["A", "C", "D"]);

    // skip/limit page the invoice's checks, not the global list.
    let paged = checks
        .list(&CheckFilter {
            invoice_id: Some(5),
            skip: Some(1),
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].check_number, "C");

    for request in server.received_requests().await.unwrap() {
        assert!(!request.url.query().unwrap_or_default().contains("invoice_id"));
    }
}

#[tokio::test]
async fn test_upcoming_days_out_of_range_sends_nothing() {
    let server = MockServer::start().await;
    let checks = CheckService::new(api_for(&server, logged_in()));

    assert!(checks.upcoming(0).await.unwrap_err().is_validation());
    assert!(checks.upcoming(91).await.unwrap_err().is_validation());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invoice_list_rejects_inverted_range() {
    let server = MockServer::start().await;
    let invoices = InvoiceService::new(api_for(&server, logged_in()));

    let err = invoices
        .list(&InvoiceFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 5, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_catalog_response_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/carpets/"))
        .and(query_param("search", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([carpet_json(1, "Slow")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/carpets/"))
        .and(query_param("search", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([carpet_json(2, "Fast")])))
        .mount(&server)
        .await;

    let view = CatalogView::new(CatalogService::new(api_for(&server, logged_in())));
    let slow = CarpetFilter {
        search: Some("slow".into()),
        ..Default::default()
    };
    let fast = CarpetFilter {
        search: Some("fast".into()),
        ..Default::default()
    };

    let slow_view = view.clone();
    let slow_task = tokio::spawn(async move { slow_view.refresh(&slow).await });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(view.refresh(&fast).await.unwrap());
    assert!(!slow_task.await.unwrap().unwrap());

    let entries = view.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pattern, "Fast");
}

// =============================================================================
// Session
// =============================================================================

#[tokio::test]
async fn test_login_persists_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "opaque-token",
            "token_type": "bearer",
            "user": user_json()
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let store = SessionStore::hydrate(&path).unwrap();
    let api = api_for(&server, store.handle());

    let user = store.login(&api, "admin", "secret1").await.unwrap();
    assert_eq!(user.username, "admin");
    assert!(store.handle().read().await.is_authenticated());

    let reloaded = SessionStore::hydrate(&path).unwrap();
    assert_eq!(
        reloaded.handle().read().await.valid_token(),
        Some("opaque-token")
    );

    store.logout().await.unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_wrong_password_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "detail": "نام کاربری یا رمز عبور اشتباه است" })),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::hydrate(dir.path().join("session.json")).unwrap();
    let api = api_for(&server, store.handle());

    let err = store.login(&api, "admin", "wrong-password").await.unwrap_err();

    assert!(err.is_auth_error());
    assert_eq!(
        err.user_message("fallback"),
        "نام کاربری یا رمز عبور اشتباه است"
    );
    assert!(!store.handle().read().await.is_authenticated());
}
