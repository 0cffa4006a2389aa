//! Admin interface: per-model list/form configuration, the registry of
//! managed models, rendering of list and form pages, and parsing of
//! submitted forms.

pub mod options;
pub mod record;
pub mod render;
pub mod site;
pub mod submit;

use thiserror::Error;

use crate::models::EntityKind;

pub use options::{Column, FieldGroups, Fieldset, InlineAdmin, InlineStyle, ListColumns, ModelAdmin};
pub use record::{FieldValue, Record, RecordRef};
pub use site::AdminSite;

/// Invalid admin configuration, detected at registration
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("model '{0}' is already registered")]
    AlreadyRegistered(EntityKind),

    #[error("'{model}' has no field '{field}'")]
    UnknownField {
        model: EntityKind,
        field: &'static str,
    },

    #[error("field '{field}' appears more than once on the '{model}' form")]
    DuplicateField {
        model: EntityKind,
        field: &'static str,
    },

    #[error("inline '{child}.{field}' is not a foreign key to '{parent}'")]
    InvalidInline {
        parent: EntityKind,
        child: EntityKind,
        field: &'static str,
    },
}
