//! Router tests driven through `tower::ServiceExt::oneshot`.
//!
//! The pool is created lazily and never connected, so only routes that
//! answer before touching the database are exercised here.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use locallibrary::{
    admin::AdminSite, config::AppConfig, create_router, repository::Repository,
    services::Services, AppState,
};

fn app() -> Router {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://locallibrary@localhost/locallibrary")
        .unwrap();
    let site = Arc::new(AdminSite::catalog().unwrap());
    let services = Services::new(Repository::new(pool), site, config.admin.clone());
    create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let resp = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post(uri: &str, payload: Value) -> (StatusCode, Value) {
    let resp = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_check() {
    let (status, body) = get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn admin_index_lists_models_in_registration_order() {
    let (status, body) = get("/admin/").await;
    assert_eq!(status, StatusCode::OK);
    let models: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["model"].as_str().unwrap())
        .collect();
    assert_eq!(models, ["genre", "language", "author", "book", "bookinstance"]);
    assert_eq!(body[2]["changelist_url"], "/admin/author/");
    assert_eq!(body[2]["add_url"], "/admin/author/add/");
}

#[tokio::test]
async fn author_add_form_layout() {
    let (status, body) = get("/admin/author/add/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Add author");
    assert!(body["pk"].is_null());

    let rows = body["fieldsets"][0]["rows"].as_array().unwrap();
    let names: Vec<Vec<&str>> = rows
        .iter()
        .map(|row| {
            row.as_array()
                .unwrap()
                .iter()
                .map(|f| f["name"].as_str().unwrap())
                .collect()
        })
        .collect();
    assert_eq!(
        names,
        vec![vec!["first_name", "last_name"], vec!["date_of_birth", "date_of_death"]]
    );
    assert_eq!(rows[1][1]["label"], "Died");

    let inline = &body["inlines"][0];
    assert_eq!(inline["model"], "book");
    assert_eq!(inline["style"], "stacked");
    assert_eq!(inline["extra"], 3);
    assert!(inline["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn book_instance_add_form_defaults_to_maintenance() {
    let (status, body) = get("/admin/bookinstance/add/").await;
    assert_eq!(status, StatusCode::OK);

    let fieldsets = body["fieldsets"].as_array().unwrap();
    assert_eq!(fieldsets.len(), 2);
    assert!(fieldsets[0]["title"].is_null());
    assert_eq!(fieldsets[1]["title"], "Availability");

    let status_field = &fieldsets[1]["rows"][0][0];
    assert_eq!(status_field["name"], "status");
    assert_eq!(status_field["value"]["type"], "choice");
    assert_eq!(status_field["value"]["value"]["code"], "m");
    assert_eq!(status_field["value"]["value"]["label"], "Maintenance");
}

#[tokio::test]
async fn unknown_admin_model_is_not_found() {
    let (status, body) = get("/admin/loan/add/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5);
}

#[tokio::test]
async fn malformed_primary_key_is_not_found() {
    let (status, _) = get("/admin/author/abc/change/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get("/admin/bookinstance/42/change/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_genre_name_is_rejected() {
    let (status, body) = post("/api/v1/genres", json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 18);

    let (status, _) = post("/api/v1/genres", json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overlong_fields_are_rejected() {
    let (status, body) = post(
        "/api/v1/books",
        json!({
            "title": "Frankenstein",
            "summary": "x".repeat(1001),
            "isbn": "9780141439471",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("summary"));

    let (status, _) = post(
        "/api/v1/authors",
        json!({ "first_name": "M".repeat(101), "last_name": "Shelley" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        "/api/v1/book-instances",
        json!({ "imprint": "x".repeat(201) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detail_route_rejects_non_numeric_id() {
    let (status, _) = get("/author/abc/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = get("/api-docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/genres"));
    assert!(paths.contains_key("/api/v1/book-instances/{id}"));
    assert!(paths.contains_key("/api/v1/health"));
    // Detail pages live outside the API prefix
    assert!(paths.contains_key("/author/{id}/"));
    assert!(paths.contains_key("/book/{id}/"));
    assert!(body.get("servers").map_or(true, Value::is_null));
}

#[tokio::test]
async fn null_character_in_text_is_a_validation_error() {
    let (status, body) = post("/api/v1/genres", json!({ "name": "Sci\u{0}Fi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 18);
    assert_eq!(body["message"], "name: Null characters are not allowed");

    let (status, body) = post(
        "/api/v1/authors",
        json!({ "first_name": "M\u{0}", "last_name": "Shelley" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 18);

    let (status, _) = post("/admin/author/1/change/", json!({ "first_name": "M\u{0}" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_add_form_refuses_fields_it_does_not_show() {
    let (status, body) = post("/admin/genre/add/", json!({ "name": "Poetry", "colour": "red" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "colour: unknown field");

    let (status, body) = post("/admin/genre/add/", json!({ "id": 7, "name": "Poetry" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "id: field is read-only");
}

#[tokio::test]
async fn admin_add_form_requires_mandatory_fields() {
    let (status, body) = post("/admin/author/add/", json!({ "first_name": "Mary" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("last_name"));
}

#[tokio::test]
async fn admin_change_form_refuses_unconfigured_inline() {
    let (status, body) = post(
        "/admin/author/1/change/",
        json!({ "inlines": [{ "model": "bookinstance", "rows": [{ "imprint": "x" }] }] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "book instances cannot be edited on the author form");
}

#[tokio::test]
async fn admin_change_form_reports_invalid_inline_row() {
    let (status, body) = post(
        "/admin/author/1/change/",
        json!({
            "first_name": "M",
            "inlines": [{
                "model": "book",
                "rows": [{ "title": "", "summary": "s", "isbn": "9780141439471" }]
            }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "book[0]: title: This field is required");
}

#[tokio::test]
async fn admin_write_views_for_unknown_models_are_not_found() {
    let (status, body) = post("/admin/loan/add/", json!({ "name": "x" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 5);

    let (status, _) = post("/admin/loan/1/delete/", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = post("/admin/bookinstance/42/delete/", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
