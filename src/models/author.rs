//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{storable_text, FieldKind, FieldSpec, OrderField};
use crate::urls::Route;

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "ID", FieldKind::AutoId).read_only(),
        FieldSpec::new("first_name", "First name", FieldKind::Text).max_length(100),
        FieldSpec::new("last_name", "Last name", FieldKind::Text).max_length(100),
        FieldSpec::new("date_of_birth", "Date of birth", FieldKind::Date).optional(),
        FieldSpec::new("date_of_death", "Died", FieldKind::Date).optional(),
    ];

    pub const ORDERING: &'static [OrderField] =
        &[OrderField::asc("last_name"), OrderField::asc("first_name")];

    /// Canonical detail page address
    pub fn absolute_url(&self) -> String {
        Route::AuthorDetail.path(self.id)
    }
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.last_name, self.first_name)
    }
}

/// Create author request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthor {
    #[validate(
        length(max = 100, message = "First name must be at most 100 characters"),
        custom(function = "storable_text")
    )]
    pub first_name: String,
    #[validate(
        length(max = 100, message = "Last name must be at most 100 characters"),
        custom(function = "storable_text")
    )]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Update author request.
///
/// Dates distinguish "absent" (keep) from `null` (clear).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAuthor {
    #[validate(
        length(max = 100, message = "First name must be at most 100 characters"),
        custom(function = "storable_text")
    )]
    pub first_name: Option<String>,
    #[validate(
        length(max = 100, message = "Last name must be at most 100 characters"),
        custom(function = "storable_text")
    )]
    pub last_name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_death: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: i32, first: &str, last: &str) -> Author {
        Author {
            id,
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[test]
    fn displays_as_last_comma_first() {
        assert_eq!(author(1, "Mary", "Shelley").to_string(), "Shelley, Mary");
    }

    #[test]
    fn absolute_url_uses_author_detail_route() {
        assert_eq!(author(42, "Jane", "Austen").absolute_url(), "/author/42/");
    }

    #[test]
    fn names_are_limited_to_100_characters() {
        let data = CreateAuthor {
            first_name: "a".repeat(101),
            last_name: "Austen".into(),
            date_of_birth: None,
            date_of_death: None,
        };
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
    }

    #[test]
    fn update_distinguishes_null_from_missing_dates() {
        let update: UpdateAuthor =
            serde_json::from_str(r#"{"date_of_death": null}"#).unwrap();
        assert_eq!(update.date_of_death, Some(None));
        assert_eq!(update.date_of_birth, None);

        let update: UpdateAuthor =
            serde_json::from_str(r#"{"date_of_birth": "1797-08-30"}"#).unwrap();
        assert_eq!(
            update.date_of_birth,
            Some(NaiveDate::from_ymd_opt(1797, 8, 30))
        );
    }
}
