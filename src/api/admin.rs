//! Admin views: model index, paginated change lists, add/change forms and
//! their submissions, and record deletion

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    admin::{
        render::{ChangeForm, ChangeList, Deleted, IndexEntry},
        submit::FormSubmission,
    },
    error::AppResult,
    repository::Page,
};

/// Change list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ChangeListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Registered models, in registration order
pub async fn index(State(state): State<crate::AppState>) -> Json<Vec<IndexEntry>> {
    Json(state.services.admin.index())
}

pub async fn change_list(
    State(state): State<crate::AppState>,
    Path(model): Path<String>,
    Query(query): Query<ChangeListQuery>,
) -> AppResult<Json<ChangeList>> {
    let page = Page::new(
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(state.config.admin.list_per_page),
    );
    let list = state.services.admin.change_list(&model, page).await?;
    Ok(Json(list))
}

pub async fn change_form(
    State(state): State<crate::AppState>,
    Path((model, id)): Path<(String, String)>,
) -> AppResult<Json<ChangeForm>> {
    let page = state.services.admin.change_form(&model, &id).await?;
    Ok(Json(page))
}

/// Blank form with field defaults applied
pub async fn add_form(
    State(state): State<crate::AppState>,
    Path(model): Path<String>,
) -> AppResult<Json<ChangeForm>> {
    let page = state.services.admin.add_form(&model)?;
    Ok(Json(page))
}

/// Create a record (and any inline rows) from the add form
pub async fn add_submit(
    State(state): State<crate::AppState>,
    Path(model): Path<String>,
    Json(form): Json<FormSubmission>,
) -> AppResult<(StatusCode, Json<ChangeForm>)> {
    let page = state.services.admin.save(&model, None, form).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

/// Save the change form together with its inline rows
pub async fn change_submit(
    State(state): State<crate::AppState>,
    Path((model, id)): Path<(String, String)>,
    Json(form): Json<FormSubmission>,
) -> AppResult<Json<ChangeForm>> {
    let page = state.services.admin.save(&model, Some(&id), form).await?;
    Ok(Json(page))
}

pub async fn delete_record(
    State(state): State<crate::AppState>,
    Path((model, id)): Path<(String, String)>,
) -> AppResult<Json<Deleted>> {
    let done = state.services.admin.delete(&model, &id).await?;
    Ok(Json(done))
}
