//! Rendering of admin pages from configuration and records

use indexmap::IndexMap;
use serde::Serialize;

use super::{
    options::{Column, InlineAdmin, InlineStyle, ModelAdmin},
    record::{FieldValue, Record},
    site::AdminSite,
};
use crate::models::{EntityKind, FieldSpec};

/// Entry of the admin index page
#[derive(Debug, Serialize)]
pub struct IndexEntry {
    pub model: EntityKind,
    pub verbose_name: &'static str,
    pub verbose_name_plural: String,
    pub changelist_url: String,
    pub add_url: String,
}

#[derive(Debug, Serialize)]
pub struct ColumnHeader {
    pub name: &'static str,
    pub header: String,
    /// Computed columns cannot be sorted or edited
    pub computed: bool,
}

#[derive(Debug, Serialize)]
pub struct ChangeListRow {
    pub pk: String,
    pub label: String,
    pub change_url: String,
    pub cells: Vec<String>,
}

/// A model's list page
#[derive(Debug, Serialize)]
pub struct ChangeList {
    pub model: EntityKind,
    pub title: String,
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<ChangeListRow>,
    pub pagination: Pagination,
}

/// Position of a change list page within the whole list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    /// Rows across all pages
    pub total: i64,
    pub num_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        Self {
            page,
            per_page,
            total,
            num_pages: ((total + per_page - 1) / per_page).max(1),
        }
    }
}

/// A field on a form, with its declaration and current value
#[derive(Debug, Serialize)]
pub struct FormField {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub value: FieldValue,
}

#[derive(Debug, Serialize)]
pub struct RenderedFieldset {
    pub title: Option<&'static str>,
    pub rows: Vec<Vec<FormField>>,
}

#[derive(Debug, Serialize)]
pub struct InlineRow {
    pub pk: String,
    pub label: String,
    pub values: IndexMap<&'static str, FieldValue>,
}

/// Child records edited on the parent's form
#[derive(Debug, Serialize)]
pub struct RenderedInline {
    pub model: EntityKind,
    pub verbose_name_plural: String,
    pub style: InlineStyle,
    pub fk_field: &'static str,
    pub fields: Vec<FieldSpec>,
    pub rows: Vec<InlineRow>,
    /// Blank forms to offer after the existing rows
    pub extra: usize,
}

/// A model's add or change page
#[derive(Debug, Serialize)]
pub struct ChangeForm {
    pub model: EntityKind,
    pub title: String,
    /// Absent on the add form
    pub pk: Option<String>,
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_on_site: Option<String>,
    pub fieldsets: Vec<RenderedFieldset>,
    pub inlines: Vec<RenderedInline>,
}

/// Result of the delete view
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub model: EntityKind,
    pub pk: String,
    pub label: String,
    pub message: String,
    pub changelist_url: String,
}

pub fn deleted(record: &Record) -> Deleted {
    let model = record.kind();
    let label = record.label();
    Deleted {
        model,
        pk: record.pk(),
        message: format!("The {} “{}” was deleted successfully.", model.verbose_name(), label),
        label,
        changelist_url: changelist_url(model),
    }
}

pub fn changelist_url(model: EntityKind) -> String {
    format!("/admin/{}/", model.slug())
}

pub fn change_url(model: EntityKind, pk: &str) -> String {
    format!("/admin/{}/{}/change/", model.slug(), pk)
}

pub fn add_url(model: EntityKind) -> String {
    format!("/admin/{}/add/", model.slug())
}

pub fn index(site: &AdminSite) -> Vec<IndexEntry> {
    site.models()
        .map(|admin| IndexEntry {
            model: admin.model,
            verbose_name: admin.model.verbose_name(),
            verbose_name_plural: admin.model.verbose_name_plural(),
            changelist_url: changelist_url(admin.model),
            add_url: add_url(admin.model),
        })
        .collect()
}

fn header(model: EntityKind, column: &Column) -> ColumnHeader {
    match column {
        Column::Label => ColumnHeader {
            name: "__str__",
            header: model.verbose_name().to_uppercase(),
            computed: true,
        },
        Column::Field(name) => ColumnHeader {
            name: *name,
            header: model
                .field(name)
                .map(|f| f.label.to_string())
                .unwrap_or_else(|| name.to_string()),
            computed: false,
        },
        Column::Computed(c) => ColumnHeader {
            name: c.name,
            header: c.header.to_string(),
            computed: true,
        },
    }
}

fn cell(record: &Record, column: &Column, empty: &str) -> String {
    let value = match column {
        Column::Label => FieldValue::Text(record.label()),
        Column::Field(name) => record.value(name).unwrap_or(FieldValue::Empty),
        Column::Computed(c) => (c.compute)(record),
    };
    value.display(empty)
}

/// Change list for one page of records already in default order
pub fn change_list(
    admin: &ModelAdmin,
    records: &[Record],
    pagination: Pagination,
    empty: &str,
) -> ChangeList {
    let model = admin.model;
    let columns = admin.list_display.iter().map(|c| header(model, c)).collect();
    let rows = records
        .iter()
        .map(|record| {
            let pk = record.pk();
            ChangeListRow {
                change_url: change_url(model, &pk),
                label: record.label(),
                cells: admin.list_display.iter().map(|c| cell(record, c, empty)).collect(),
                pk,
            }
        })
        .collect();
    ChangeList {
        model,
        title: format!("Select {} to change", model.verbose_name()),
        columns,
        rows,
        pagination,
    }
}

fn form_field(model: EntityKind, name: &'static str, record: Option<&Record>) -> Option<FormField> {
    let spec = *model.field(name)?;
    let value = match record {
        Some(r) => r.value(name).unwrap_or(FieldValue::Empty),
        None => FieldValue::initial(model, name),
    };
    Some(FormField { spec, value })
}

fn render_inline(inline: &InlineAdmin, children: &[Record], default_extra: usize) -> RenderedInline {
    let names = inline.field_names();
    let fields = names
        .iter()
        .filter_map(|n| inline.model.field(n).copied())
        .collect();
    let rows = children
        .iter()
        .map(|child| InlineRow {
            pk: child.pk(),
            label: child.label(),
            values: names
                .iter()
                .map(|n| (*n, child.value(n).unwrap_or(FieldValue::Empty)))
                .collect(),
        })
        .collect();
    RenderedInline {
        model: inline.model,
        verbose_name_plural: inline.model.verbose_name_plural(),
        style: inline.style,
        fk_field: inline.fk_field,
        fields,
        rows,
        extra: inline.extra.unwrap_or(default_extra),
    }
}

/// Change form for `record`, or the add form when `record` is `None`.
///
/// `children` holds the related records of each inline, in the order the
/// inlines are configured.
pub fn change_form(
    admin: &ModelAdmin,
    record: Option<&Record>,
    children: &[Vec<Record>],
    default_extra: usize,
) -> ChangeForm {
    let model = admin.model;
    let fieldsets = admin
        .fields
        .iter()
        .map(|fs| RenderedFieldset {
            title: fs.title,
            rows: fs
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .filter_map(|name| form_field(model, *name, record))
                        .collect()
                })
                .collect(),
        })
        .collect();

    let inlines = admin
        .inlines
        .iter()
        .enumerate()
        .map(|(i, cfg)| {
            let rows: &[Record] = match record {
                Some(_) => children.get(i).map(Vec::as_slice).unwrap_or(&[]),
                None => &[],
            };
            render_inline(cfg, rows, default_extra)
        })
        .collect();

    let title = match record {
        Some(_) => format!("Change {}", model.verbose_name()),
        None => format!("Add {}", model.verbose_name()),
    };

    ChangeForm {
        model,
        title,
        pk: record.map(Record::pk),
        label: record.map(Record::label),
        view_on_site: record.and_then(Record::absolute_url),
        fieldsets,
        inlines,
    }
}
