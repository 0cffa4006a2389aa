//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{storable_text, FieldKind, FieldSpec};

/// A book genre (e.g. Science Fiction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl Genre {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "ID", FieldKind::AutoId).read_only(),
        FieldSpec::new("name", "Name", FieldKind::Text)
            .max_length(200)
            .help("Enter a book genre (e.g. Science Fiction)"),
    ];
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Create genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGenre {
    #[validate(
        length(max = 200, message = "Genre name must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub name: String,
}

/// Update genre request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGenre {
    #[validate(
        length(max = 200, message = "Genre name must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_name() {
        let genre = Genre { id: 1, name: "Science Fiction".into() };
        assert_eq!(genre.to_string(), "Science Fiction");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(CreateGenre { name: String::new() }.validate().is_err());
        assert!(CreateGenre { name: "   ".into() }.validate().is_err());
        assert!(UpdateGenre { name: Some(String::new()) }.validate().is_err());
    }

    #[test]
    fn name_longer_than_200_is_rejected() {
        assert!(CreateGenre { name: "x".repeat(201) }.validate().is_err());
        assert!(CreateGenre { name: "x".repeat(200) }.validate().is_ok());
    }

    #[test]
    fn update_without_name_is_valid() {
        assert!(UpdateGenre { name: None }.validate().is_ok());
    }
}
