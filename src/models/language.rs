//! Language model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{storable_text, FieldKind, FieldSpec};

/// A language a book is available in.
///
/// Names are not unique, not even case-insensitively: "English" and
/// "english" can coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub language: String,
}

impl Language {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", "ID", FieldKind::AutoId).read_only(),
        FieldSpec::new("language", "Language", FieldKind::Text)
            .max_length(200)
            .help("Please enter a language"),
    ];
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.language)
    }
}

/// Create language request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLanguage {
    #[validate(
        length(max = 200, message = "Language must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub language: String,
}

/// Update language request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateLanguage {
    #[validate(
        length(max = 200, message = "Language must be at most 200 characters"),
        custom(function = "storable_text")
    )]
    pub language: Option<String>,
}
