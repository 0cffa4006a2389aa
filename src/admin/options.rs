//! Per-model admin configuration: list columns, form layout, inlines

use serde::Serialize;

use super::record::{FieldValue, Record};
use crate::models::{EntityKind, FieldKind};

/// A read-only derived column, computed from the record alone
#[derive(Clone, Copy)]
pub struct ComputedColumn {
    pub name: &'static str,
    pub header: &'static str,
    pub compute: fn(&Record) -> FieldValue,
}

impl std::fmt::Debug for ComputedColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputedColumn")
            .field("name", &self.name)
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}

/// One column of a change list
#[derive(Debug, Clone, Copy)]
pub enum Column {
    /// The record's display string
    Label,
    /// A declared model field
    Field(&'static str),
    Computed(ComputedColumn),
}

/// Ordered change-list columns
#[derive(Debug, Clone, Default)]
pub struct ListColumns(pub Vec<Column>);

impl ListColumns {
    pub fn fields(names: &[&'static str]) -> Self {
        Self(names.iter().map(|n| Column::Field(*n)).collect())
    }

    pub fn computed(
        mut self,
        name: &'static str,
        header: &'static str,
        compute: fn(&Record) -> FieldValue,
    ) -> Self {
        self.0.push(Column::Computed(ComputedColumn { name, header, compute }));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.0.iter()
    }
}

/// A titled (or untitled) group of form rows; each row holds fields
/// rendered side by side
#[derive(Debug, Clone, Serialize)]
pub struct Fieldset {
    pub title: Option<&'static str>,
    pub rows: Vec<Vec<&'static str>>,
}

impl Fieldset {
    pub fn untitled() -> Self {
        Self { title: None, rows: Vec::new() }
    }

    pub fn titled(title: &'static str) -> Self {
        Self { title: Some(title), rows: Vec::new() }
    }

    /// Add a row of one or more fields
    pub fn row(mut self, fields: &[&'static str]) -> Self {
        self.rows.push(fields.to_vec());
        self
    }

    /// Add each field on its own row
    pub fn each(mut self, fields: &[&'static str]) -> Self {
        self.rows.extend(fields.iter().map(|f| vec![*f]));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rows.iter().flatten().copied()
    }
}

/// Ordered fieldsets of a change form
#[derive(Debug, Clone, Default, Serialize)]
pub struct FieldGroups(pub Vec<Fieldset>);

impl FieldGroups {
    pub fn new(fieldsets: Vec<Fieldset>) -> Self {
        Self(fieldsets)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fieldset> {
        self.0.iter()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().flat_map(|fs| fs.field_names())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineStyle {
    /// One block per related record, fields stacked vertically
    Stacked,
    /// One table row per related record
    Tabular,
}

/// Sub-list of child records edited on the parent's change form
#[derive(Debug, Clone, Copy)]
pub struct InlineAdmin {
    pub model: EntityKind,
    /// Field on `model` pointing at the parent
    pub fk_field: &'static str,
    pub style: InlineStyle,
    /// Blank forms offered; `None` uses the site default
    pub extra: Option<usize>,
}

impl InlineAdmin {
    pub fn stacked(model: EntityKind, fk_field: &'static str) -> Self {
        Self { model, fk_field, style: InlineStyle::Stacked, extra: None }
    }

    pub fn tabular(model: EntityKind, fk_field: &'static str) -> Self {
        Self { model, fk_field, style: InlineStyle::Tabular, extra: None }
    }

    /// Child fields shown in the inline: everything but the parent link and
    /// the surrogate key
    pub fn field_names(&self) -> Vec<&'static str> {
        self.model
            .fields()
            .iter()
            .filter(|f| f.name != self.fk_field && f.kind != FieldKind::AutoId)
            .map(|f| f.name)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InlineEditors(pub Vec<InlineAdmin>);

impl InlineEditors {
    pub fn iter(&self) -> impl Iterator<Item = &InlineAdmin> {
        self.0.iter()
    }
}

/// Complete admin configuration of one model
#[derive(Debug, Clone)]
pub struct ModelAdmin {
    pub model: EntityKind,
    pub list_display: ListColumns,
    pub fields: FieldGroups,
    pub inlines: InlineEditors,
}

impl ModelAdmin {
    /// Uncustomized configuration: the list shows the display string and
    /// the form shows every editable field on its own row
    pub fn default_for(model: EntityKind) -> Self {
        let editable: Vec<&'static str> = model
            .fields()
            .iter()
            .filter(|f| f.editable)
            .map(|f| f.name)
            .collect();
        Self {
            model,
            list_display: ListColumns(vec![Column::Label]),
            fields: FieldGroups::new(vec![Fieldset::untitled().each(&editable)]),
            inlines: InlineEditors::default(),
        }
    }

    pub fn list_display(mut self, columns: ListColumns) -> Self {
        self.list_display = columns;
        self
    }

    pub fn fields(mut self, fields: FieldGroups) -> Self {
        self.fields = fields;
        self
    }

    pub fn inline(mut self, inline: InlineAdmin) -> Self {
        self.inlines.0.push(inline);
        self
    }
}
