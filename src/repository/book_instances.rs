//! Book instance (physical copy) domain methods on Repository

use sqlx::PgConnection;
use uuid::Uuid;

use super::{map_write_error, Page, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, CreateBookInstance, UpdateBookInstance},
        order_by_clause, EntityKind,
    },
};

const INSTANCE_COLUMNS: &str = "id, book_id, imprint, due_back, status";

fn default_order() -> String {
    order_by_clause(EntityKind::BookInstance.ordering(), "id")
}

impl Repository {
    /// List copies ordered by due date, copies without one last
    pub async fn book_instances_list(&self, page: Option<Page>) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            "SELECT {} FROM book_instances {}{}",
            INSTANCE_COLUMNS,
            default_order(),
            Page::clause(page)
        );
        let rows = sqlx::query_as::<_, BookInstance>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn book_instances_count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Get copy by ID
    pub async fn book_instances_get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        let query = format!("SELECT {} FROM book_instances WHERE id = $1", INSTANCE_COLUMNS);
        sqlx::query_as::<_, BookInstance>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Copies of one book, in default order
    pub async fn book_instances_by_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let query = format!(
            "SELECT {} FROM book_instances WHERE book_id = $1 {}",
            INSTANCE_COLUMNS,
            default_order()
        );
        let rows = sqlx::query_as::<_, BookInstance>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Create copy with a freshly generated id
    pub async fn book_instances_create(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, data).await
    }

    /// Update copy; the id is never written
    pub async fn book_instances_update(
        &self,
        id: Uuid,
        data: &UpdateBookInstance,
    ) -> AppResult<BookInstance> {
        let mut tx = self.pool.begin().await?;
        let updated = update(&mut tx, id, data).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete copy
    pub async fn book_instances_delete(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.acquire().await?;
        delete(&mut conn, id).await
    }
}

pub(super) async fn insert(
    conn: &mut PgConnection,
    data: &CreateBookInstance,
) -> AppResult<BookInstance> {
    let query = format!(
        r#"
        INSERT INTO book_instances (id, book_id, imprint, due_back, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        INSTANCE_COLUMNS
    );
    sqlx::query_as::<_, BookInstance>(&query)
        .bind(Uuid::new_v4())
        .bind(data.book_id)
        .bind(data.imprint.trim())
        .bind(data.due_back)
        .bind(data.status.code())
        .fetch_one(conn)
        .await
        .map_err(|e| map_write_error(e, "Book instance"))
}

/// Merge `data` into the locked row; run inside a transaction
pub(super) async fn update(
    conn: &mut PgConnection,
    id: Uuid,
    data: &UpdateBookInstance,
) -> AppResult<BookInstance> {
    let select = format!(
        "SELECT {} FROM book_instances WHERE id = $1 FOR UPDATE",
        INSTANCE_COLUMNS
    );
    let current = sqlx::query_as::<_, BookInstance>(&select)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))?;

    let book_id = data.book_id.unwrap_or(current.book_id);
    let imprint = data.imprint.as_deref().map(str::trim).unwrap_or(current.imprint.as_str());
    let due_back = data.due_back.unwrap_or(current.due_back);
    let status = data.status.unwrap_or(current.status);

    let update = format!(
        r#"
        UPDATE book_instances
        SET book_id = $2, imprint = $3, due_back = $4, status = $5
        WHERE id = $1
        RETURNING {}
        "#,
        INSTANCE_COLUMNS
    );
    sqlx::query_as::<_, BookInstance>(&update)
        .bind(id)
        .bind(book_id)
        .bind(imprint)
        .bind(due_back)
        .bind(status.code())
        .fetch_one(conn)
        .await
        .map_err(|e| map_write_error(e, "Book instance"))
}

pub(super) async fn delete(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
        .bind(id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Book instance {} not found", id)));
    }
    Ok(())
}

/// Book of an existing copy
pub(super) async fn book_of(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<i32>> {
    sqlx::query_scalar("SELECT book_id FROM book_instances WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
}
