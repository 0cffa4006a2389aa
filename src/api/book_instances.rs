//! Book instance (physical copy) API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{BookInstance, CreateBookInstance, UpdateBookInstance},
};

/// List copies by due date, undated copies last
#[utoipa::path(
    get,
    path = "/book-instances",
    context_path = "/api/v1",
    tag = "book-instances",
    responses(
        (status = 200, description = "Copy list", body = Vec<BookInstance>)
    )
)]
pub async fn list_book_instances(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BookInstance>>> {
    let instances = state.services.catalog.list_book_instances().await?;
    Ok(Json(instances))
}

/// Get copy by ID
#[utoipa::path(
    get,
    path = "/book-instances/{id}",
    context_path = "/api/v1",
    tag = "book-instances",
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy details", body = BookInstance),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.catalog.get_book_instance(id).await?;
    Ok(Json(instance))
}

/// Create copy; the ID is generated by the server
#[utoipa::path(
    post,
    path = "/book-instances",
    context_path = "/api/v1",
    tag = "book-instances",
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid data", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book_instance(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateBookInstance>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    let instance = state.services.catalog.create_book_instance(&data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Update copy
#[utoipa::path(
    put,
    path = "/book-instances/{id}",
    context_path = "/api/v1",
    tag = "book-instances",
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = UpdateBookInstance,
    responses(
        (status = 200, description = "Copy updated", body = BookInstance)
    )
)]
pub async fn update_book_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBookInstance>,
) -> AppResult<Json<BookInstance>> {
    let instance = state.services.catalog.update_book_instance(id, &data).await?;
    Ok(Json(instance))
}

/// Delete copy
#[utoipa::path(
    delete,
    path = "/book-instances/{id}",
    context_path = "/api/v1",
    tag = "book-instances",
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted")
    )
)]
pub async fn delete_book_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
