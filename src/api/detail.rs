//! Public detail pages, the targets of `author-detail` and `book-detail`

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Author, Book, BookInstance},
};

#[derive(Serialize, ToSchema)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: Author,
    /// "last, first"
    pub display: String,
    pub books: Vec<Book>,
}

#[derive(Serialize, ToSchema)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<Author>,
    pub genre_summary: String,
    pub copies: Vec<BookInstance>,
}

/// Author with their books
#[utoipa::path(
    get,
    path = "/author/{id}/",
    tag = "detail",
    params(("id" = i32, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn author_detail(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let catalog = &state.services.catalog;
    let author = catalog.get_author(id).await?;
    let books = catalog.author_books(id).await?;
    Ok(Json(AuthorDetail {
        display: author.to_string(),
        author,
        books,
    }))
}

/// Book with its author and copies
#[utoipa::path(
    get,
    path = "/book/{id}/",
    tag = "detail",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn book_detail(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let catalog = &state.services.catalog;
    let book = catalog.get_book(id).await?;
    let author = match book.author_id {
        Some(author_id) => Some(catalog.get_author(author_id).await?),
        None => None,
    };
    let copies = catalog.book_copies(id).await?;
    Ok(Json(BookDetail {
        genre_summary: book.display_genre(),
        book,
        author,
        copies,
    }))
}
