//! Genre domain methods on Repository

use super::{map_write_error, Page, Repository};
use crate::{
    error::{AppError, AppResult},
    models::genre::{CreateGenre, Genre, UpdateGenre},
};

impl Repository {
    /// List genres, one page or all of them
    pub async fn genres_list(&self, page: Option<Page>) -> AppResult<Vec<Genre>> {
        let query = format!("SELECT id, name FROM genres ORDER BY id{}", Page::clause(page));
        let rows = sqlx::query_as::<_, Genre>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn genres_count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Get genre by ID
    pub async fn genres_get_by_id(&self, id: i32) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    /// Create genre
    pub async fn genres_create(&self, data: &CreateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
            .bind(data.name.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Genre"))
    }

    /// Update genre
    pub async fn genres_update(&self, id: i32, data: &UpdateGenre) -> AppResult<Genre> {
        sqlx::query_as::<_, Genre>(
            "UPDATE genres SET name = COALESCE($2, name) WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(data.name.as_deref().map(str::trim))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Genre"))?
        .ok_or_else(|| AppError::NotFound(format!("Genre {} not found", id)))
    }

    /// Delete genre. Books keep existing; only their link to the genre goes.
    pub async fn genres_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Genre {} not found", id)));
        }
        Ok(())
    }
}
