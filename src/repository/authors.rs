//! Author domain methods on Repository

use sqlx::PgConnection;

use super::{map_write_error, Page, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        order_by_clause, EntityKind,
    },
};

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, date_of_birth, date_of_death";

impl Repository {
    /// List authors in default order (last name, then first name), one page
    /// or all of them
    pub async fn authors_list(&self, page: Option<Page>) -> AppResult<Vec<Author>> {
        let query = format!(
            "SELECT {} FROM authors {}{}",
            AUTHOR_COLUMNS,
            order_by_clause(EntityKind::Author.ordering(), "id"),
            Page::clause(page)
        );
        let rows = sqlx::query_as::<_, Author>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn authors_count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Get author by ID
    pub async fn authors_get_by_id(&self, id: i32) -> AppResult<Author> {
        let query = format!("SELECT {} FROM authors WHERE id = $1", AUTHOR_COLUMNS);
        sqlx::query_as::<_, Author>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Get several authors at once, keyed lookups for list rendering
    pub async fn authors_get_many(&self, ids: &[i32]) -> AppResult<Vec<Author>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {} FROM authors WHERE id = ANY($1)", AUTHOR_COLUMNS);
        let rows = sqlx::query_as::<_, Author>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Create author
    pub async fn authors_create(&self, data: &CreateAuthor) -> AppResult<Author> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, data).await
    }

    /// Update author; absent fields keep their current value
    pub async fn authors_update(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        let mut tx = self.pool.begin().await?;
        let updated = update(&mut tx, id, data).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete author. Their books are kept with the author cleared.
    ///
    /// Returns the number of books left without an author.
    pub async fn authors_delete(&self, id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author {} not found", id)));
        }

        tx.commit().await?;
        Ok(orphaned as u64)
    }
}

pub(super) async fn insert(conn: &mut PgConnection, data: &CreateAuthor) -> AppResult<Author> {
    let query = format!(
        r#"
        INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        AUTHOR_COLUMNS
    );
    sqlx::query_as::<_, Author>(&query)
        .bind(data.first_name.trim())
        .bind(data.last_name.trim())
        .bind(data.date_of_birth)
        .bind(data.date_of_death)
        .fetch_one(conn)
        .await
        .map_err(|e| map_write_error(e, "Author"))
}

/// Merge `data` into the locked row; run inside a transaction
pub(super) async fn update(
    conn: &mut PgConnection,
    id: i32,
    data: &UpdateAuthor,
) -> AppResult<Author> {
    let select = format!("SELECT {} FROM authors WHERE id = $1 FOR UPDATE", AUTHOR_COLUMNS);
    let current = sqlx::query_as::<_, Author>(&select)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;

    let first_name = data.first_name.as_deref().map(str::trim).unwrap_or(current.first_name.as_str());
    let last_name = data.last_name.as_deref().map(str::trim).unwrap_or(current.last_name.as_str());
    let date_of_birth = data.date_of_birth.unwrap_or(current.date_of_birth);
    let date_of_death = data.date_of_death.unwrap_or(current.date_of_death);

    let update = format!(
        r#"
        UPDATE authors
        SET first_name = $2, last_name = $3, date_of_birth = $4, date_of_death = $5
        WHERE id = $1
        RETURNING {}
        "#,
        AUTHOR_COLUMNS
    );
    sqlx::query_as::<_, Author>(&update)
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(date_of_birth)
        .bind(date_of_death)
        .fetch_one(conn)
        .await
        .map_err(|e| map_write_error(e, "Author"))
}
