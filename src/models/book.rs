//! Book model (a title, not a physical copy)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{genre::Genre, language::Language, storable_text, EntityKind, FieldKind, FieldSpec};
use crate::urls::Route;

/// Full book model. Genres and languages are loaded from the link tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Set to null when the author is deleted
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[sqlx(skip)]
    #[serde(default)]
    pub languages: Vec<Language>,
}

impl Book {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "ID", FieldKind::AutoId).read_only(),
        FieldSpec::new("title", "Title", FieldKind::Text).max_length(200),
        FieldSpec::new("author", "Author", FieldKind::ForeignKey(EntityKind::Author)).optional(),
        FieldSpec::new("summary", "Summary", FieldKind::LongText)
            .max_length(1000)
            .help("Enter a brief description of the book"),
        FieldSpec::new("isbn", "ISBN", FieldKind::Text)
            .max_length(13)
            .help("13 Character ISBN number"),
        FieldSpec::new("genre", "Genre", FieldKind::ManyToMany(EntityKind::Genre))
            .help("Select a genre for this book"),
        FieldSpec::new("language", "Language", FieldKind::ManyToMany(EntityKind::Language))
            .help("Select a language for this book"),
    ];

    /// Canonical detail page address
    pub fn absolute_url(&self) -> String {
        Route::BookDetail.path(self.id)
    }

    /// Comma-separated genre names, for list views
    pub fn display_genre(&self) -> String {
        genre_summary(&self.genres)
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Join genre names in the order given
pub fn genre_summary(genres: &[Genre]) -> String {
    genres
        .iter()
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub title: String,
    pub author_id: Option<i32>,
    /// Limited to 1000 characters on input only; storage is unbounded text
    #[validate(
        length(max = 1000, message = "Summary must be at most 1000 characters"),
        custom(function = "storable_text")
    )]
    pub summary: String,
    #[validate(
        length(max = 13, message = "ISBN must be at most 13 characters"),
        custom(function = "storable_text")
    )]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub language_ids: Vec<i32>,
}

/// Update book request. Link lists, when present, replace the current links.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(
        length(max = 200, message = "Title must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub author_id: Option<Option<i32>>,
    #[validate(
        length(max = 1000, message = "Summary must be at most 1000 characters"),
        custom(function = "storable_text")
    )]
    pub summary: Option<String>,
    #[validate(
        length(max = 13, message = "ISBN must be at most 13 characters"),
        custom(function = "storable_text")
    )]
    pub isbn: Option<String>,
    pub genre_ids: Option<Vec<i32>>,
    pub language_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book {
            id: 5,
            title: "Frankenstein".into(),
            author_id: Some(1),
            summary: "A scientist creates a creature.".into(),
            isbn: "9780486282114".into(),
            genres: vec![
                Genre { id: 1, name: "Gothic".into() },
                Genre { id: 2, name: "Science Fiction".into() },
            ],
            languages: vec![],
        }
    }

    #[test]
    fn displays_as_title() {
        assert_eq!(book().to_string(), "Frankenstein");
    }

    #[test]
    fn absolute_url_uses_book_detail_route() {
        assert_eq!(book().absolute_url(), "/book/5/");
    }

    #[test]
    fn genre_summary_joins_names() {
        assert_eq!(book().display_genre(), "Gothic, Science Fiction");
        assert_eq!(genre_summary(&[]), "");
    }

    #[test]
    fn summary_over_1000_characters_is_rejected() {
        let data = CreateBook {
            title: "Frankenstein".into(),
            author_id: None,
            summary: "s".repeat(1001),
            isbn: "9780486282114".into(),
            genre_ids: vec![],
            language_ids: vec![],
        };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("summary"));
    }

    #[test]
    fn isbn_over_13_characters_is_rejected() {
        let data = UpdateBook {
            isbn: Some("978-0486282114".into()),
            ..Default::default()
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn update_can_clear_author() {
        let update: UpdateBook = serde_json::from_str(r#"{"author_id": null}"#).unwrap();
        assert_eq!(update.author_id, Some(None));
        assert!(update.genre_ids.is_none());
    }
}
