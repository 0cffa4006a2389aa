//! Language API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::language::{CreateLanguage, Language, UpdateLanguage},
};

/// List all languages
#[utoipa::path(
    get,
    path = "/languages",
    context_path = "/api/v1",
    tag = "languages",
    responses(
        (status = 200, description = "Language list", body = Vec<Language>)
    )
)]
pub async fn list_languages(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}

/// Get language by ID
#[utoipa::path(
    get,
    path = "/languages/{id}",
    context_path = "/api/v1",
    tag = "languages",
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 200, description = "Language details", body = Language)
    )
)]
pub async fn get_language(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Language>> {
    let language = state.services.catalog.get_language(id).await?;
    Ok(Json(language))
}

/// Create language
#[utoipa::path(
    post,
    path = "/languages",
    context_path = "/api/v1",
    tag = "languages",
    request_body = CreateLanguage,
    responses(
        (status = 201, description = "Language created", body = Language)
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateLanguage>,
) -> AppResult<(StatusCode, Json<Language>)> {
    let language = state.services.catalog.create_language(&data).await?;
    Ok((StatusCode::CREATED, Json(language)))
}

/// Update language
#[utoipa::path(
    put,
    path = "/languages/{id}",
    context_path = "/api/v1",
    tag = "languages",
    params(("id" = i32, Path, description = "Language ID")),
    request_body = UpdateLanguage,
    responses(
        (status = 200, description = "Language updated", body = Language)
    )
)]
pub async fn update_language(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(data): Json<UpdateLanguage>,
) -> AppResult<Json<Language>> {
    let language = state.services.catalog.update_language(id, &data).await?;
    Ok(Json(language))
}

/// Delete language
#[utoipa::path(
    delete,
    path = "/languages/{id}",
    context_path = "/api/v1",
    tag = "languages",
    params(("id" = i32, Path, description = "Language ID")),
    responses(
        (status = 204, description = "Language deleted")
    )
)]
pub async fn delete_language(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
