//! Book instance (physical copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{book::Book, enums::LoanStatus, storable_text, EntityKind, FieldKind, FieldSpec, OrderField};

/// A physical copy of a book that can be borrowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Unique library ID for this copy, generated at creation and never changed
    pub id: Uuid,
    /// Set to null when the book is deleted
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
}

impl BookInstance {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "Id", FieldKind::Uuid)
            .read_only()
            .help("Unique library ID for this copy of this book"),
        FieldSpec::new("book", "Book", FieldKind::ForeignKey(EntityKind::Book)).optional(),
        FieldSpec::new("imprint", "Imprint", FieldKind::Text).max_length(200),
        FieldSpec::new("due_back", "Due back", FieldKind::Date).optional(),
        FieldSpec::new("status", "Status", FieldKind::Choice)
            .max_length(1)
            .optional()
            .help("Book availability"),
    ];

    pub const ORDERING: &'static [OrderField] = &[OrderField::asc("due_back")];

    /// Display string, given the copy's book if it still has one
    pub fn label(&self, book: Option<&Book>) -> String {
        instance_label(self.id, book.map(|b| b.title.as_str()))
    }
}

/// "<id> (<book title>)"; copies orphaned by a deleted book show "(no book)"
pub fn instance_label(id: impl std::fmt::Display, book_title: Option<&str>) -> String {
    format!("{} ({})", id, book_title.unwrap_or("no book"))
}

/// Create book instance request. The id is always generated.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookInstance {
    pub book_id: Option<i32>,
    #[validate(
        length(max = 200, message = "Imprint must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// Defaults to maintenance
    #[serde(default)]
    pub status: LoanStatus,
}

/// Update book instance request. There is no way to change the id.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBookInstance {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub book_id: Option<Option<i32>>,
    #[validate(
        length(max = 200, message = "Imprint must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub imprint: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_back: Option<Option<NaiveDate>>,
    pub status: Option<LoanStatus>,
}
