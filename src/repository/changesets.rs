//! Transactional save of an admin form: the parent record and its inline
//! rows commit together or not at all

use sqlx::PgConnection;
use uuid::Uuid;

use super::{authors, book_instances, books, Repository};
use crate::{
    error::{AppError, AppResult},
    models::changeset::{BookChange, Change, ChangeSet, CopyChange, Save},
};

impl Repository {
    /// Apply a form submission; returns the primary key of the form's record
    pub async fn changeset_apply(&self, set: ChangeSet) -> AppResult<String> {
        match set {
            ChangeSet::Genre(Save::Create(data)) => Ok(self.genres_create(&data).await?.id.to_string()),
            ChangeSet::Genre(Save::Update(id, data)) => {
                Ok(self.genres_update(id, &data).await?.id.to_string())
            }
            ChangeSet::Language(Save::Create(data)) => {
                Ok(self.languages_create(&data).await?.id.to_string())
            }
            ChangeSet::Language(Save::Update(id, data)) => {
                Ok(self.languages_update(id, &data).await?.id.to_string())
            }
            ChangeSet::BookInstance(save) => {
                let mut tx = self.pool.begin().await?;
                let id = match save {
                    Save::Create(data) => book_instances::insert(&mut tx, &data).await?.id,
                    Save::Update(id, data) => book_instances::update(&mut tx, id, &data).await?.id,
                };
                tx.commit().await?;
                Ok(id.to_string())
            }
            ChangeSet::Author { author, books: changes } => {
                let mut tx = self.pool.begin().await?;
                let author_id = match author {
                    Save::Create(data) => authors::insert(&mut tx, &data).await?.id,
                    Save::Update(id, data) => authors::update(&mut tx, id, &data).await?.id,
                };
                for change in changes {
                    apply_book_change(&mut tx, author_id, change).await?;
                }
                tx.commit().await?;
                Ok(author_id.to_string())
            }
            ChangeSet::Book { book, copies } => {
                let mut tx = self.pool.begin().await?;
                let book_id = match book {
                    Save::Create(data) => books::insert(&mut tx, &data).await?.id,
                    Save::Update(id, data) => {
                        books::update(&mut tx, id, &data).await?;
                        id
                    }
                };
                for change in copies {
                    apply_copy_change(&mut tx, book_id, change).await?;
                }
                tx.commit().await?;
                Ok(book_id.to_string())
            }
        }
    }
}

/// Inline rows may only touch children of the form's record
fn check_parent(actual: Option<i32>, parent: i32, what: &str, id: impl std::fmt::Display) -> AppResult<()> {
    if actual == Some(parent) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{} {} does not belong to this record", what, id)))
    }
}

async fn apply_book_change(conn: &mut PgConnection, author_id: i32, change: BookChange) -> AppResult<()> {
    match change {
        Change::Create(mut data) => {
            data.author_id = Some(author_id);
            books::insert(conn, &data).await?;
        }
        Change::Update(id, mut data) => {
            check_parent(books::author_of(conn, id).await?, author_id, "Book", id)?;
            data.author_id = None;
            books::update(conn, id, &data).await?;
        }
        Change::Delete(id) => {
            check_parent(books::author_of(conn, id).await?, author_id, "Book", id)?;
            books::delete(conn, id).await?;
        }
    }
    Ok(())
}

async fn apply_copy_change(conn: &mut PgConnection, book_id: i32, change: CopyChange) -> AppResult<()> {
    match change {
        Change::Create(mut data) => {
            data.book_id = Some(book_id);
            book_instances::insert(conn, &data).await?;
        }
        Change::Update(id, mut data) => {
            check_copy(conn, id, book_id).await?;
            data.book_id = None;
            book_instances::update(conn, id, &data).await?;
        }
        Change::Delete(id) => {
            check_copy(conn, id, book_id).await?;
            book_instances::delete(conn, id).await?;
        }
    }
    Ok(())
}

async fn check_copy(conn: &mut PgConnection, id: Uuid, book_id: i32) -> AppResult<()> {
    check_parent(book_instances::book_of(conn, id).await?, book_id, "Book instance", id)
}
