//! Changes submitted through an admin form: one parent record plus the
//! inline child rows edited alongside it

use uuid::Uuid;

use super::{
    author::{CreateAuthor, UpdateAuthor},
    book::{CreateBook, UpdateBook},
    book_instance::{CreateBookInstance, UpdateBookInstance},
    genre::{CreateGenre, UpdateGenre},
    language::{CreateLanguage, UpdateLanguage},
    EntityKind,
};

/// Save of the form's own record
#[derive(Debug)]
pub enum Save<C, U, K> {
    Create(C),
    Update(K, U),
}

/// One inline row
#[derive(Debug)]
pub enum Change<C, U, K> {
    Create(C),
    Update(K, U),
    Delete(K),
}

pub type BookChange = Change<CreateBook, UpdateBook, i32>;
pub type CopyChange = Change<CreateBookInstance, UpdateBookInstance, Uuid>;

/// Everything a single form submission writes. Applied in one transaction.
#[derive(Debug)]
pub enum ChangeSet {
    Genre(Save<CreateGenre, UpdateGenre, i32>),
    Language(Save<CreateLanguage, UpdateLanguage, i32>),
    Author {
        author: Save<CreateAuthor, UpdateAuthor, i32>,
        books: Vec<BookChange>,
    },
    Book {
        book: Save<CreateBook, UpdateBook, i32>,
        copies: Vec<CopyChange>,
    },
    BookInstance(Save<CreateBookInstance, UpdateBookInstance, Uuid>),
}

impl<C, U, K> Save<C, U, K> {
    pub fn is_create(&self) -> bool {
        matches!(self, Save::Create(_))
    }
}

impl ChangeSet {
    pub fn model(&self) -> EntityKind {
        match self {
            ChangeSet::Genre(_) => EntityKind::Genre,
            ChangeSet::Language(_) => EntityKind::Language,
            ChangeSet::Author { .. } => EntityKind::Author,
            ChangeSet::Book { .. } => EntityKind::Book,
            ChangeSet::BookInstance(_) => EntityKind::BookInstance,
        }
    }

    pub fn is_create(&self) -> bool {
        match self {
            ChangeSet::Genre(save) => save.is_create(),
            ChangeSet::Language(save) => save.is_create(),
            ChangeSet::Author { author, .. } => author.is_create(),
            ChangeSet::Book { book, .. } => book.is_create(),
            ChangeSet::BookInstance(save) => save.is_create(),
        }
    }

    /// Number of inline rows touched
    pub fn child_count(&self) -> usize {
        match self {
            ChangeSet::Author { books, .. } => books.len(),
            ChangeSet::Book { copies, .. } => copies.len(),
            _ => 0,
        }
    }
}
