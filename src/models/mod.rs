//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod changeset;
pub mod enums;
pub mod genre;
pub mod language;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use author::Author;
pub use book::Book;
pub use book_instance::BookInstance;
pub use enums::LoanStatus;
pub use genre::Genre;
pub use language::Language;

/// Catalog entity types known to the schema and the admin site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Genre,
    Language,
    Author,
    Book,
    BookInstance,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Genre,
        EntityKind::Language,
        EntityKind::Author,
        EntityKind::Book,
        EntityKind::BookInstance,
    ];

    /// URL segment used by the admin site (`/admin/{slug}/`)
    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Genre => "genre",
            EntityKind::Language => "language",
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "bookinstance",
        }
    }

    pub fn verbose_name(self) -> &'static str {
        match self {
            EntityKind::Genre => "genre",
            EntityKind::Language => "language",
            EntityKind::Author => "author",
            EntityKind::Book => "book",
            EntityKind::BookInstance => "book instance",
        }
    }

    pub fn verbose_name_plural(self) -> String {
        format!("{}s", self.verbose_name())
    }

    /// Declared fields, in declaration order
    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Genre => Genre::FIELDS,
            EntityKind::Language => Language::FIELDS,
            EntityKind::Author => Author::FIELDS,
            EntityKind::Book => Book::FIELDS,
            EntityKind::BookInstance => BookInstance::FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Default ordering applied to list queries
    pub fn ordering(self) -> &'static [OrderField] {
        match self {
            EntityKind::Author => Author::ORDERING,
            EntityKind::BookInstance => BookInstance::ORDERING,
            _ => &[],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("unknown model '{}'", s))
    }
}

/// Storage/form type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum FieldKind {
    AutoId,
    Uuid,
    Text,
    LongText,
    Date,
    Choice,
    ForeignKey(EntityKind),
    ManyToMany(EntityKind),
}

/// Declaration of a single model field: name, type and input constraints
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Human-readable label shown on forms and column headers
    pub label: &'static str,
    pub kind: FieldKind,
    /// Whether the form layer rejects an empty value
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
    /// Read-only fields are shown on forms but never written back
    pub editable: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: true,
            max_length: None,
            help_text: None,
            editable: true,
        }
    }

    pub const fn max_length(mut self, max: u64) -> Self {
        self.max_length = Some(max);
        self
    }

    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub const fn help(mut self, text: &'static str) -> Self {
        self.help_text = Some(text);
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }
}

/// One term of a model's default ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderField {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderField {
    pub const fn asc(column: &'static str) -> Self {
        Self { column, descending: false }
    }
}

/// Render an ORDER BY clause for a default ordering.
///
/// NULLs always sort last, which is PostgreSQL's own placement for
/// ascending order; stating it keeps the behavior independent of
/// direction.
pub fn order_by_clause(ordering: &[OrderField], tie_breaker: &str) -> String {
    let mut terms: Vec<String> = ordering
        .iter()
        .map(|o| {
            format!(
                "{} {} NULLS LAST",
                o.column,
                if o.descending { "DESC" } else { "ASC" }
            )
        })
        .collect();
    terms.push(tie_breaker.to_string());
    format!("ORDER BY {}", terms.join(", "))
}

/// Reject text that is empty once surrounding whitespace is removed, or
/// that holds a NUL character (PostgreSQL text cannot store one)
pub(crate) fn storable_text(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("This field is required".into());
        return Err(err);
    }
    if value.contains('\0') {
        let mut err = validator::ValidationError::new("nul_character");
        err.message = Some("Null characters are not allowed".into());
        return Err(err);
    }
    Ok(())
}
