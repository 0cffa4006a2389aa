//! Catalog management service

use uuid::Uuid;
use validator::Validate;

use crate::{
    admin::submit::within,
    error::AppResult,
    models::{
        author::{Author, CreateAuthor, UpdateAuthor},
        book::{Book, CreateBook, UpdateBook},
        book_instance::{BookInstance, CreateBookInstance, UpdateBookInstance},
        changeset::{Change, ChangeSet, Save},
        genre::{CreateGenre, Genre, UpdateGenre},
        language::{CreateLanguage, Language, UpdateLanguage},
        EntityKind,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check the database is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }

    // =========================================================================
    // GENRES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres_list(None).await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres_get_by_id(id).await
    }

    pub async fn create_genre(&self, data: &CreateGenre) -> AppResult<Genre> {
        data.validate()?;
        let genre = self.repository.genres_create(data).await?;
        tracing::info!(genre_id = genre.id, "genre created");
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, data: &UpdateGenre) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres_update(id, data).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres_delete(id).await?;
        tracing::info!(genre_id = id, "genre deleted");
        Ok(())
    }

    // =========================================================================
    // LANGUAGES
    // =========================================================================

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages_list(None).await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository.languages_get_by_id(id).await
    }

    pub async fn create_language(&self, data: &CreateLanguage) -> AppResult<Language> {
        data.validate()?;
        let language = self.repository.languages_create(data).await?;
        tracing::info!(language_id = language.id, "language created");
        Ok(language)
    }

    pub async fn update_language(&self, id: i32, data: &UpdateLanguage) -> AppResult<Language> {
        data.validate()?;
        self.repository.languages_update(id, data).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages_delete(id).await?;
        tracing::info!(language_id = id, "language deleted");
        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    /// Authors ordered by last name, then first name
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        self.repository.authors_list(None).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.repository.authors_get_by_id(id).await
    }

    pub async fn create_author(&self, data: &CreateAuthor) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors_create(data).await?;
        tracing::info!(author_id = author.id, "author created");
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: &UpdateAuthor) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors_update(id, data).await
    }

    /// Delete an author; their books stay in the catalog without an author
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        let orphaned = self.repository.authors_delete(id).await?;
        tracing::info!(author_id = id, orphaned_books = orphaned, "author deleted");
        Ok(())
    }

    /// Books written by an author
    pub async fn author_books(&self, author_id: i32) -> AppResult<Vec<Book>> {
        self.repository.authors_get_by_id(author_id).await?;
        self.repository.books_by_author(author_id).await
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books_list(None).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books_get_by_id(id).await
    }

    pub async fn create_book(&self, data: &CreateBook) -> AppResult<Book> {
        data.validate()?;
        let book = self.repository.books_create(data).await?;
        tracing::info!(book_id = book.id, "book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, data: &UpdateBook) -> AppResult<Book> {
        data.validate()?;
        self.repository.books_update(id, data).await
    }

    /// Delete a book; its copies stay in the catalog without a book
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        let orphaned = self.repository.books_delete(id).await?;
        tracing::info!(book_id = id, orphaned_copies = orphaned, "book deleted");
        Ok(())
    }

    /// Physical copies of a book
    pub async fn book_copies(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        self.repository.books_get_by_id(book_id).await?;
        self.repository.book_instances_by_book(book_id).await
    }

    // =========================================================================
    // BOOK INSTANCES
    // =========================================================================

    /// Copies ordered by due date, copies without a due date last
    pub async fn list_book_instances(&self) -> AppResult<Vec<BookInstance>> {
        self.repository.book_instances_list(None).await
    }

    pub async fn get_book_instance(&self, id: Uuid) -> AppResult<BookInstance> {
        self.repository.book_instances_get_by_id(id).await
    }

    pub async fn create_book_instance(&self, data: &CreateBookInstance) -> AppResult<BookInstance> {
        data.validate()?;
        let instance = self.repository.book_instances_create(data).await?;
        tracing::info!(instance_id = %instance.id, status = %instance.status, "book instance created");
        Ok(instance)
    }

    pub async fn update_book_instance(
        &self,
        id: Uuid,
        data: &UpdateBookInstance,
    ) -> AppResult<BookInstance> {
        data.validate()?;
        self.repository.book_instances_update(id, data).await
    }

    pub async fn delete_book_instance(&self, id: Uuid) -> AppResult<()> {
        self.repository.book_instances_delete(id).await?;
        tracing::info!(instance_id = %id, "book instance deleted");
        Ok(())
    }

    // =========================================================================
    // ADMIN FORMS
    // =========================================================================

    /// Validate and save a submitted admin form with its inline rows.
    /// Nothing is written unless every row is valid and every write succeeds.
    pub async fn apply_changeset(&self, set: ChangeSet) -> AppResult<String> {
        validate_changeset(&set)?;
        let model = set.model();
        let created = set.is_create();
        let rows = set.child_count();
        let pk = self.repository.changeset_apply(set).await?;
        tracing::info!(model = %model, pk = %pk, created, inline_rows = rows, "admin form saved");
        Ok(pk)
    }
}

fn validate_changeset(set: &ChangeSet) -> AppResult<()> {
    match set {
        ChangeSet::Genre(save) => validate_save(save),
        ChangeSet::Language(save) => validate_save(save),
        ChangeSet::Author { author, books } => {
            validate_save(author)?;
            validate_rows(EntityKind::Book, books)
        }
        ChangeSet::Book { book, copies } => {
            validate_save(book)?;
            validate_rows(EntityKind::BookInstance, copies)
        }
        ChangeSet::BookInstance(save) => validate_save(save),
    }
}

fn validate_save<C: Validate, U: Validate, K>(save: &Save<C, U, K>) -> AppResult<()> {
    match save {
        Save::Create(data) => data.validate()?,
        Save::Update(_, data) => data.validate()?,
    }
    Ok(())
}

fn validate_rows<C: Validate, U: Validate, K>(model: EntityKind, rows: &[Change<C, U, K>]) -> AppResult<()> {
    for (i, row) in rows.iter().enumerate() {
        let result = match row {
            Change::Create(data) => data.validate(),
            Change::Update(_, data) => data.validate(),
            Change::Delete(_) => Ok(()),
        };
        result.map_err(|e| within(&format!("{}[{}]", model.slug(), i), e.into()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::{book::CreateBook, changeset::BookChange},
    };

    fn book(title: &str) -> CreateBook {
        CreateBook {
            title: title.into(),
            author_id: None,
            summary: "A summary".into(),
            isbn: "9780141439471".into(),
            genre_ids: vec![],
            language_ids: vec![],
        }
    }

    #[test]
    fn invalid_inline_row_is_reported_with_its_position() {
        let books: Vec<BookChange> = vec![
            Change::Delete(3),
            Change::Create(book("Mathilda")),
            Change::Create(book("   ")),
        ];
        let set = ChangeSet::Author {
            author: Save::Update(1, UpdateAuthor::default()),
            books,
        };
        match validate_changeset(&set) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "book[2]: title: This field is required"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn nul_in_parent_field_is_refused() {
        let set = ChangeSet::Genre(Save::Create(CreateGenre { name: "Sci\0Fi".into() }));
        assert!(matches!(validate_changeset(&set), Err(AppError::Validation(_))));
    }
}
