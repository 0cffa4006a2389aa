//! Admin site: the registry of models managed through the admin interface

use indexmap::IndexMap;
use std::collections::HashSet;

use super::{
    options::{Column, FieldGroups, Fieldset, InlineAdmin, ListColumns, ModelAdmin},
    record::display_genre,
    AdminError,
};
use crate::models::{EntityKind, FieldKind};

/// Registry of admin configurations, keyed by model.
///
/// Built once at startup and never mutated afterwards; iteration follows
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct AdminSite {
    registry: IndexMap<EntityKind, ModelAdmin>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model with its configuration
    pub fn register(mut self, admin: ModelAdmin) -> Result<Self, AdminError> {
        if self.registry.contains_key(&admin.model) {
            return Err(AdminError::AlreadyRegistered(admin.model));
        }
        check(&admin)?;
        tracing::debug!(model = %admin.model, "registered admin model");
        self.registry.insert(admin.model, admin);
        Ok(self)
    }

    /// Register a model with the uncustomized configuration
    pub fn register_default(self, model: EntityKind) -> Result<Self, AdminError> {
        self.register(ModelAdmin::default_for(model))
    }

    pub fn get(&self, model: EntityKind) -> Option<&ModelAdmin> {
        self.registry.get(&model)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.registry.values()
    }

    /// The library catalog's admin site
    pub fn catalog() -> Result<Self, AdminError> {
        AdminSite::new()
            .register_default(EntityKind::Genre)?
            .register_default(EntityKind::Language)?
            .register(
                ModelAdmin::default_for(EntityKind::Author)
                    .list_display(ListColumns::fields(&[
                        "last_name",
                        "first_name",
                        "date_of_birth",
                        "date_of_death",
                    ]))
                    .fields(FieldGroups::new(vec![Fieldset::untitled()
                        .row(&["first_name", "last_name"])
                        .row(&["date_of_birth", "date_of_death"])]))
                    .inline(InlineAdmin::stacked(EntityKind::Book, "author")),
            )?
            .register(
                ModelAdmin::default_for(EntityKind::Book)
                    // One many-to-many lookup per row
                    .list_display(
                        ListColumns::fields(&["title", "author"])
                            .computed("display_genre", "Genre", display_genre),
                    )
                    .inline(InlineAdmin::tabular(EntityKind::BookInstance, "book")),
            )?
            .register(
                ModelAdmin::default_for(EntityKind::BookInstance)
                    .list_display(ListColumns::fields(&["book", "status", "due_back", "id"]))
                    .fields(FieldGroups::new(vec![
                        Fieldset::untitled().each(&["book", "imprint", "id"]),
                        Fieldset::titled("Availability").each(&["status", "due_back"]),
                    ])),
            )
    }
}

/// Every name a configuration mentions must be a declared field, a form
/// may show a field only once, and inlines must link back to the parent
fn check(admin: &ModelAdmin) -> Result<(), AdminError> {
    let model = admin.model;
    let known = |field: &'static str| {
        model
            .field(field)
            .map(|_| ())
            .ok_or(AdminError::UnknownField { model, field })
    };

    for column in admin.list_display.iter() {
        if let Column::Field(name) = column {
            known(*name)?;
        }
    }

    let mut seen = HashSet::new();
    for name in admin.fields.field_names() {
        known(name)?;
        if !seen.insert(name) {
            return Err(AdminError::DuplicateField { model, field: name });
        }
    }

    for inline in admin.inlines.iter() {
        let fk = inline.model.field(inline.fk_field).ok_or(AdminError::UnknownField {
            model: inline.model,
            field: inline.fk_field,
        })?;
        if fk.kind != FieldKind::ForeignKey(model) {
            return Err(AdminError::InvalidInline {
                parent: model,
                child: inline.model,
                field: inline.fk_field,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::options::InlineStyle;

    fn field_columns(admin: &ModelAdmin) -> Vec<&'static str> {
        admin
            .list_display
            .iter()
            .map(|c| match c {
                Column::Label => "__str__",
                Column::Field(name) => *name,
                Column::Computed(c) => c.name,
            })
            .collect()
    }

    #[test]
    fn catalog_registers_every_model_in_order() {
        let site = AdminSite::catalog().unwrap();
        let models: Vec<_> = site.models().map(|m| m.model).collect();
        assert_eq!(models, EntityKind::ALL);
    }

    #[test]
    fn author_admin() {
        let site = AdminSite::catalog().unwrap();
        let admin = site.get(EntityKind::Author).unwrap();
        assert_eq!(
            field_columns(admin),
            ["last_name", "first_name", "date_of_birth", "date_of_death"]
        );
        let fieldsets = &admin.fields.0;
        assert_eq!(fieldsets.len(), 1);
        assert_eq!(
            fieldsets[0].rows,
            vec![vec!["first_name", "last_name"], vec!["date_of_birth", "date_of_death"]]
        );
        let inlines: Vec<_> = admin.inlines.iter().collect();
        assert_eq!(inlines.len(), 1);
        assert_eq!(inlines[0].model, EntityKind::Book);
        assert_eq!(inlines[0].style, InlineStyle::Stacked);
    }

    #[test]
    fn book_admin() {
        let site = AdminSite::catalog().unwrap();
        let admin = site.get(EntityKind::Book).unwrap();
        assert_eq!(field_columns(admin), ["title", "author", "display_genre"]);
        let inline = admin.inlines.iter().next().unwrap();
        assert_eq!(inline.model, EntityKind::BookInstance);
        assert_eq!(inline.fk_field, "book");
        assert_eq!(inline.style, InlineStyle::Tabular);
    }

    #[test]
    fn book_instance_admin() {
        let site = AdminSite::catalog().unwrap();
        let admin = site.get(EntityKind::BookInstance).unwrap();
        assert_eq!(field_columns(admin), ["book", "status", "due_back", "id"]);
        let fieldsets = &admin.fields.0;
        assert_eq!(fieldsets[0].title, None);
        assert_eq!(fieldsets[0].field_names().collect::<Vec<_>>(), ["book", "imprint", "id"]);
        assert_eq!(fieldsets[1].title, Some("Availability"));
        assert_eq!(fieldsets[1].field_names().collect::<Vec<_>>(), ["status", "due_back"]);
    }

    #[test]
    fn genre_and_language_are_uncustomized() {
        let site = AdminSite::catalog().unwrap();
        for model in [EntityKind::Genre, EntityKind::Language] {
            let admin = site.get(model).unwrap();
            assert_eq!(field_columns(admin), ["__str__"]);
            assert!(admin.inlines.iter().next().is_none());
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let err = AdminSite::new()
            .register_default(EntityKind::Genre)
            .unwrap()
            .register_default(EntityKind::Genre)
            .unwrap_err();
        assert!(matches!(err, AdminError::AlreadyRegistered(EntityKind::Genre)));
    }

    #[test]
    fn unknown_list_field_is_rejected() {
        let admin = ModelAdmin::default_for(EntityKind::Author)
            .list_display(ListColumns::fields(&["middle_name"]));
        let err = AdminSite::new().register(admin).unwrap_err();
        assert!(matches!(
            err,
            AdminError::UnknownField { model: EntityKind::Author, field: "middle_name" }
        ));
    }

    #[test]
    fn field_shown_twice_is_rejected() {
        let admin = ModelAdmin::default_for(EntityKind::Author).fields(FieldGroups::new(vec![
            Fieldset::untitled().row(&["first_name", "first_name"]),
        ]));
        assert!(matches!(
            AdminSite::new().register(admin),
            Err(AdminError::DuplicateField { field: "first_name", .. })
        ));
    }

    #[test]
    fn inline_must_point_at_parent() {
        let admin = ModelAdmin::default_for(EntityKind::Genre)
            .inline(InlineAdmin::tabular(EntityKind::BookInstance, "book"));
        assert!(matches!(
            AdminSite::new().register(admin),
            Err(AdminError::InvalidInline { parent: EntityKind::Genre, .. })
        ));
    }
}
