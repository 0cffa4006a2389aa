//! Language domain methods on Repository

use super::{map_write_error, Page, Repository};
use crate::{
    error::{AppError, AppResult},
    models::language::{CreateLanguage, Language, UpdateLanguage},
};

impl Repository {
    /// List languages, one page or all of them
    pub async fn languages_list(&self, page: Option<Page>) -> AppResult<Vec<Language>> {
        let query = format!("SELECT id, language FROM languages ORDER BY id{}", Page::clause(page));
        let rows = sqlx::query_as::<_, Language>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn languages_count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM languages")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Get language by ID
    pub async fn languages_get_by_id(&self, id: i32) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("SELECT id, language FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    /// Create language
    pub async fn languages_create(&self, data: &CreateLanguage) -> AppResult<Language> {
        sqlx::query_as::<_, Language>("INSERT INTO languages (language) VALUES ($1) RETURNING id, language")
            .bind(data.language.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Language"))
    }

    /// Update language
    pub async fn languages_update(&self, id: i32, data: &UpdateLanguage) -> AppResult<Language> {
        sqlx::query_as::<_, Language>(
            "UPDATE languages SET language = COALESCE($2, language) WHERE id = $1 RETURNING id, language",
        )
        .bind(id)
        .bind(data.language.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Language"))?
        .ok_or_else(|| AppError::NotFound(format!("Language {} not found", id)))
    }

    /// Delete language. Books keep existing; only their link to the language goes.
    pub async fn languages_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language {} not found", id)));
        }
        Ok(())
    }
}
