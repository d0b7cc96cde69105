use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use pinguin_core::{Channel, NotificationId, TenantId};
use pinguin_http::{AppState, StubSessionValidator};
use pinguin_store::{InMemoryStore, NewNotification, NotificationStore};
use pinguin_tenant::{RetryPolicy, Tenant, TenantRegistry, TenantStatus};

fn tenant(admins: &[&str]) -> Tenant {
    Tenant {
        tenant_id: TenantId::new("acme"),
        display_name: "Acme".into(),
        status: TenantStatus::Active,
        domains: vec!["acme.example.com".into()],
        admin_emails: admins.iter().map(|s| s.to_lowercase()).collect::<HashSet<_>>(),
        email_profiles: vec![],
        sms_profiles: vec![],
        retry_policy: RetryPolicy::default(),
        max_attachment_bytes: 1024,
    }
}

async fn build_app() -> (axum::Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let registry = Arc::new(TenantRegistry::build(vec![tenant(&["admin@acme.io"])]).unwrap());
    let state = AppState::new(store.clone(), registry, Arc::new(StubSessionValidator));
    (pinguin_http::build_router(state, &[]), store)
}

#[tokio::test]
async fn healthz_is_unauthenticated() {
    let (app, _store) = build_app().await;
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_without_session_is_401() {
    let (app, _store) = build_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications")
                .header("host", "acme.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_with_non_admin_session_is_403() {
    let (app, _store) = build_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications")
                .header("host", "acme.example.com")
                .header("x-debug-email", "nobody@acme.io")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_with_admin_session_returns_tenant_scoped_rows() {
    let (app, store) = build_app().await;
    let tenant_id = TenantId::new("acme");
    let now = pinguin_core::now_utc();
    store
        .create(
            &tenant_id,
            NewNotification {
                notification_id: NotificationId::new("n1"),
                tenant_id: tenant_id.clone(),
                channel: Channel::Email,
                recipient: "a@b.com".into(),
                subject: Some("hi".into()),
                body: "hello".into(),
                scheduled_for: now,
                max_retries: 3,
                attachments: vec![],
            },
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/notifications")
                .header("host", "acme.example.com")
                .header("x-debug-email", "admin@acme.io")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cancel_unknown_notification_is_404() {
    let (app, _store) = build_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/notifications/missing/cancel")
                .header("host", "acme.example.com")
                .header("x-debug-email", "admin@acme.io")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
