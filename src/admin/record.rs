//! Records as the admin sees them: a model row plus the related rows
//! needed to display it, and field values in render-ready form

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    book_instance::instance_label, Author, Book, BookInstance, EntityKind, Genre, Language,
    LoanStatus,
};

/// A reference to another record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRef {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Author> for RecordRef {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.to_string(),
            label: author.to_string(),
            url: Some(author.absolute_url()),
        }
    }
}

impl From<&Book> for RecordRef {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.to_string(),
            label: book.to_string(),
            url: Some(book.absolute_url()),
        }
    }
}

impl From<&Genre> for RecordRef {
    fn from(genre: &Genre) -> Self {
        Self { id: genre.id.to_string(), label: genre.to_string(), url: None }
    }
}

impl From<&Language> for RecordRef {
    fn from(language: &Language) -> Self {
        Self { id: language.id.to_string(), label: language.to_string(), url: None }
    }
}

/// A single field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Empty,
    Int(i32),
    Text(String),
    Date(NaiveDate),
    Uuid(Uuid),
    Choice { code: &'static str, label: &'static str },
    Ref(RecordRef),
    Refs(Vec<RecordRef>),
}

impl FieldValue {
    fn opt_date(date: Option<NaiveDate>) -> Self {
        date.map(FieldValue::Date).unwrap_or(FieldValue::Empty)
    }

    fn opt_ref<T>(target: Option<&T>) -> Self
    where
        for<'a> &'a T: Into<RecordRef>,
    {
        target.map(|t| FieldValue::Ref(t.into())).unwrap_or(FieldValue::Empty)
    }

    fn status(status: LoanStatus) -> Self {
        FieldValue::Choice { code: status.code(), label: status.label() }
    }

    /// Text for a change-list cell
    pub fn display(&self, empty: &str) -> String {
        match self {
            FieldValue::Empty => empty.to_string(),
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Text(s) if s.is_empty() => empty.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Uuid(id) => id.to_string(),
            FieldValue::Choice { label, .. } => label.to_string(),
            FieldValue::Ref(r) => r.label.clone(),
            FieldValue::Refs(refs) if refs.is_empty() => empty.to_string(),
            FieldValue::Refs(refs) => refs
                .iter()
                .map(|r| r.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Initial value of a field on an empty add form
    pub fn initial(model: EntityKind, field: &str) -> Self {
        match (model, field) {
            (EntityKind::BookInstance, "status") => FieldValue::status(LoanStatus::default()),
            (EntityKind::Book, "genre") | (EntityKind::Book, "language") => {
                FieldValue::Refs(Vec::new())
            }
            _ => FieldValue::Empty,
        }
    }
}

/// A model row with the related rows its display needs
#[derive(Debug, Clone)]
pub enum Record {
    Genre(Genre),
    Language(Language),
    Author(Author),
    Book { book: Book, author: Option<Author> },
    BookInstance { instance: BookInstance, book: Option<Book> },
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Genre(_) => EntityKind::Genre,
            Record::Language(_) => EntityKind::Language,
            Record::Author(_) => EntityKind::Author,
            Record::Book { .. } => EntityKind::Book,
            Record::BookInstance { .. } => EntityKind::BookInstance,
        }
    }

    /// Primary key as text
    pub fn pk(&self) -> String {
        match self {
            Record::Genre(g) => g.id.to_string(),
            Record::Language(l) => l.id.to_string(),
            Record::Author(a) => a.id.to_string(),
            Record::Book { book, .. } => book.id.to_string(),
            Record::BookInstance { instance, .. } => instance.id.to_string(),
        }
    }

    /// Display string
    pub fn label(&self) -> String {
        match self {
            Record::Genre(g) => g.to_string(),
            Record::Language(l) => l.to_string(),
            Record::Author(a) => a.to_string(),
            Record::Book { book, .. } => book.to_string(),
            Record::BookInstance { instance, book } => {
                instance_label(instance.id, book.as_ref().map(|b| b.title.as_str()))
            }
        }
    }

    /// Canonical public page, for models that have one
    pub fn absolute_url(&self) -> Option<String> {
        match self {
            Record::Author(a) => Some(a.absolute_url()),
            Record::Book { book, .. } => Some(book.absolute_url()),
            _ => None,
        }
    }

    /// Value of a declared field; `None` when the model has no such field
    pub fn value(&self, field: &str) -> Option<FieldValue> {
        let value = match (self, field) {
            (Record::Genre(g), "id") => FieldValue::Int(g.id),
            (Record::Genre(g), "name") => FieldValue::Text(g.name.clone()),

            (Record::Language(l), "id") => FieldValue::Int(l.id),
            (Record::Language(l), "language") => FieldValue::Text(l.language.clone()),

            (Record::Author(a), "id") => FieldValue::Int(a.id),
            (Record::Author(a), "first_name") => FieldValue::Text(a.first_name.clone()),
            (Record::Author(a), "last_name") => FieldValue::Text(a.last_name.clone()),
            (Record::Author(a), "date_of_birth") => FieldValue::opt_date(a.date_of_birth),
            (Record::Author(a), "date_of_death") => FieldValue::opt_date(a.date_of_death),

            (Record::Book { book, .. }, "id") => FieldValue::Int(book.id),
            (Record::Book { book, .. }, "title") => FieldValue::Text(book.title.clone()),
            (Record::Book { author, .. }, "author") => FieldValue::opt_ref(author.as_ref()),
            (Record::Book { book, .. }, "summary") => FieldValue::Text(book.summary.clone()),
            (Record::Book { book, .. }, "isbn") => FieldValue::Text(book.isbn.clone()),
            (Record::Book { book, .. }, "genre") => {
                FieldValue::Refs(book.genres.iter().map(RecordRef::from).collect())
            }
            (Record::Book { book, .. }, "language") => {
                FieldValue::Refs(book.languages.iter().map(RecordRef::from).collect())
            }

            (Record::BookInstance { instance, .. }, "id") => FieldValue::Uuid(instance.id),
            (Record::BookInstance { book, .. }, "book") => FieldValue::opt_ref(book.as_ref()),
            (Record::BookInstance { instance, .. }, "imprint") => {
                FieldValue::Text(instance.imprint.clone())
            }
            (Record::BookInstance { instance, .. }, "due_back") => {
                FieldValue::opt_date(instance.due_back)
            }
            (Record::BookInstance { instance, .. }, "status") => {
                FieldValue::status(instance.status)
            }

            _ => return None,
        };
        Some(value)
    }
}

/// Genre summary column for books
pub fn display_genre(record: &Record) -> FieldValue {
    match record {
        Record::Book { book, .. } => FieldValue::Text(book.display_genre()),
        _ => FieldValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shelley() -> Author {
        Author {
            id: 1,
            first_name: "Mary".into(),
            last_name: "Shelley".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1797, 8, 30),
            date_of_death: None,
        }
    }

    fn frankenstein() -> Book {
        Book {
            id: 2,
            title: "Frankenstein".into(),
            author_id: Some(1),
            summary: "A creature is made.".into(),
            isbn: "9780486282114".into(),
            genres: vec![Genre { id: 1, name: "Gothic".into() }],
            languages: vec![Language { id: 1, language: "English".into() }],
        }
    }

    #[test]
    fn every_declared_field_has_a_value() {
        let records = [
            Record::Genre(Genre { id: 1, name: "Gothic".into() }),
            Record::Language(Language { id: 1, language: "English".into() }),
            Record::Author(shelley()),
            Record::Book { book: frankenstein(), author: Some(shelley()) },
            Record::BookInstance {
                instance: BookInstance {
                    id: Uuid::new_v4(),
                    book_id: Some(2),
                    imprint: "Lackington, 1818".into(),
                    due_back: None,
                    status: LoanStatus::Available,
                },
                book: Some(frankenstein()),
            },
        ];
        for record in &records {
            for field in record.kind().fields() {
                assert!(
                    record.value(field.name).is_some(),
                    "{}.{} has no value",
                    record.kind(),
                    field.name
                );
            }
            assert!(record.value("no_such_field").is_none());
        }
    }

    #[test]
    fn author_cells() {
        let record = Record::Author(shelley());
        assert_eq!(record.label(), "Shelley, Mary");
        assert_eq!(record.value("date_of_birth").unwrap().display("-"), "1797-08-30");
        assert_eq!(record.value("date_of_death").unwrap().display("-"), "-");
        assert_eq!(record.absolute_url().as_deref(), Some("/author/1/"));
    }

    #[test]
    fn book_author_renders_as_reference() {
        let record = Record::Book { book: frankenstein(), author: Some(shelley()) };
        match record.value("author").unwrap() {
            FieldValue::Ref(r) => {
                assert_eq!(r.label, "Shelley, Mary");
                assert_eq!(r.url.as_deref(), Some("/author/1/"));
            }
            other => panic!("unexpected value {other:?}"),
        }
        assert_eq!(display_genre(&record).display("-"), "Gothic");
    }

    #[test]
    fn orphaned_book_has_empty_author() {
        let mut book = frankenstein();
        book.author_id = None;
        let record = Record::Book { book, author: None };
        assert_eq!(record.value("author"), Some(FieldValue::Empty));
    }

    #[test]
    fn instance_label_and_status() {
        let id = Uuid::new_v4();
        let record = Record::BookInstance {
            instance: BookInstance {
                id,
                book_id: Some(2),
                imprint: "Lackington, 1818".into(),
                due_back: NaiveDate::from_ymd_opt(2024, 5, 1),
                status: LoanStatus::OnLoan,
            },
            book: Some(frankenstein()),
        };
        assert_eq!(record.label(), format!("{} (Frankenstein)", id));
        assert_eq!(record.value("status").unwrap().display("-"), "On loan");
        assert_eq!(record.value("id").unwrap().display("-"), id.to_string());
    }

    #[test]
    fn add_form_initial_status_is_maintenance() {
        assert_eq!(
            FieldValue::initial(EntityKind::BookInstance, "status"),
            FieldValue::Choice { code: "m", label: "Maintenance" }
        );
        assert_eq!(FieldValue::initial(EntityKind::Author, "first_name"), FieldValue::Empty);
    }

    #[test]
    fn empty_values_use_placeholder() {
        assert_eq!(FieldValue::Refs(vec![]).display("(none)"), "(none)");
        assert_eq!(FieldValue::Text(String::new()).display("-"), "-");
    }
}
