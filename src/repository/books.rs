//! Book domain methods on Repository

use std::collections::HashMap;

use sqlx::{PgConnection, Row};

use super::{map_write_error, Page, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        genre::Genre,
        language::Language,
    },
};

const BOOK_COLUMNS: &str = "id, title, author_id, summary, isbn";

impl Repository {
    /// List books with their genres and languages, one page or all of them
    pub async fn books_list(&self, page: Option<Page>) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books ORDER BY id{}", BOOK_COLUMNS, Page::clause(page));
        let mut books = sqlx::query_as::<_, Book>(&query)
            .fetch_all(&self.pool)
            .await?;
        self.books_load_links(&mut books).await?;
        Ok(books)
    }

    pub async fn books_count(&self) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Get book by ID with its genres and languages
    pub async fn books_get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
        let mut books = vec![book];
        self.books_load_links(&mut books).await?;
        Ok(books.remove(0))
    }

    /// Get several books at once (without links), for rendering references
    pub async fn books_get_many(&self, ids: &[i32]) -> AppResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {} FROM books WHERE id = ANY($1)", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, Book>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Books written by an author, with links
    pub async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<Book>> {
        let query = format!("SELECT {} FROM books WHERE author_id = $1 ORDER BY id", BOOK_COLUMNS);
        let mut books = sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        self.books_load_links(&mut books).await?;
        Ok(books)
    }

    /// Fill `genres` and `languages` for a batch of books.
    ///
    /// Two queries regardless of batch size.
    async fn books_load_links(&self, books: &mut [Book]) -> AppResult<()> {
        if books.is_empty() {
            return Ok(());
        }
        let ids: Vec<i32> = books.iter().map(|b| b.id).collect();

        let genre_rows = sqlx::query(
            r#"
            SELECT bg.book_id, g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = ANY($1)
            ORDER BY g.name, g.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<i32, Vec<Genre>> = HashMap::new();
        for r in &genre_rows {
            genres.entry(r.get("book_id")).or_default().push(Genre {
                id: r.get("id"),
                name: r.get("name"),
            });
        }

        let language_rows = sqlx::query(
            r#"
            SELECT bl.book_id, l.id, l.language
            FROM book_languages bl
            JOIN languages l ON l.id = bl.language_id
            WHERE bl.book_id = ANY($1)
            ORDER BY l.language, l.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut languages: HashMap<i32, Vec<Language>> = HashMap::new();
        for r in &language_rows {
            languages.entry(r.get("book_id")).or_default().push(Language {
                id: r.get("id"),
                language: r.get("language"),
            });
        }

        for book in books.iter_mut() {
            book.genres = genres.remove(&book.id).unwrap_or_default();
            book.languages = languages.remove(&book.id).unwrap_or_default();
        }
        Ok(())
    }

    /// Create book together with its genre and language links
    pub async fn books_create(&self, data: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        let book = insert(&mut tx, data).await?;
        tx.commit().await?;
        self.books_get_by_id(book.id).await
    }

    /// Update book; absent fields keep their current value and link lists
    /// that are present replace the existing links
    pub async fn books_update(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;
        update(&mut tx, id, data).await?;
        tx.commit().await?;
        self.books_get_by_id(id).await
    }

    /// Delete book. Its copies are kept with the book cleared.
    ///
    /// Returns the number of copies left without a book.
    pub async fn books_delete(&self, id: i32) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;
        let orphaned = delete(&mut tx, id).await?;
        tx.commit().await?;
        Ok(orphaned)
    }
}

/// Insert the book row and its links; links are not loaded on the result
pub(super) async fn insert(conn: &mut PgConnection, data: &CreateBook) -> AppResult<Book> {
    let query = format!(
        r#"
        INSERT INTO books (title, author_id, summary, isbn)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        BOOK_COLUMNS
    );
    let book = sqlx::query_as::<_, Book>(&query)
        .bind(data.title.trim())
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(data.isbn.trim())
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_write_error(e, "Book"))?;

    replace_genre_links(conn, book.id, &data.genre_ids).await?;
    replace_language_links(conn, book.id, &data.language_ids).await?;
    Ok(book)
}

/// Merge `data` into the locked row; run inside a transaction
pub(super) async fn update(conn: &mut PgConnection, id: i32, data: &UpdateBook) -> AppResult<()> {
    let select = format!("SELECT {} FROM books WHERE id = $1 FOR UPDATE", BOOK_COLUMNS);
    let current = sqlx::query_as::<_, Book>(&select)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

    let title = data.title.as_deref().map(str::trim).unwrap_or(current.title.as_str());
    let author_id = data.author_id.unwrap_or(current.author_id);
    let summary = data.summary.as_deref().unwrap_or(current.summary.as_str());
    let isbn = data.isbn.as_deref().map(str::trim).unwrap_or(current.isbn.as_str());

    sqlx::query(
        r#"
        UPDATE books
        SET title = $2, author_id = $3, summary = $4, isbn = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(author_id)
    .bind(summary)
    .bind(isbn)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_write_error(e, "Book"))?;

    if let Some(ref genre_ids) = data.genre_ids {
        replace_genre_links(conn, id, genre_ids).await?;
    }
    if let Some(ref language_ids) = data.language_ids {
        replace_language_links(conn, id, language_ids).await?;
    }
    Ok(())
}

/// Delete the row, returning how many copies lost their book
pub(super) async fn delete(conn: &mut PgConnection, id: i32) -> AppResult<u64> {
    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Book {} not found", id)));
    }
    Ok(orphaned as u64)
}

/// Author of an existing book
pub(super) async fn author_of(conn: &mut PgConnection, id: i32) -> AppResult<Option<i32>> {
    sqlx::query_scalar("SELECT author_id FROM books WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

async fn replace_genre_links(
    conn: &mut PgConnection,
    book_id: i32,
    genre_ids: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    if genre_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO book_genres (book_id, genre_id)
        SELECT $1, g FROM UNNEST($2::int[]) AS g
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(genre_ids)
    .execute(conn)
    .await
    .map_err(|e| map_write_error(e, "Book genre"))?;
    Ok(())
}

async fn replace_language_links(
    conn: &mut PgConnection,
    book_id: i32,
    language_ids: &[i32],
) -> AppResult<()> {
    sqlx::query("DELETE FROM book_languages WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    if language_ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO book_languages (book_id, language_id)
        SELECT $1, l FROM UNNEST($2::int[]) AS l
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(language_ids)
    .execute(conn)
    .await
    .map_err(|e| map_write_error(e, "Book language"))?;
    Ok(())
}
