//! Parsing of submitted add/change forms into a change set.
//!
//! Forms are posted as JSON keyed by the field names shown on the form.
//! Relations use the field name too: `"author": 3`, `"genre": [1, 2]`,
//! and choices take their stored code (`"status": "o"`). Inline rows go
//! under `inlines`, grouped by child model:
//!
//! ```json
//! {
//!   "first_name": "Mary",
//!   "inlines": [{
//!     "model": "book",
//!     "rows": [
//!       {"pk": "4", "title": "Frankenstein"},
//!       {"pk": "9", "delete": true},
//!       {"title": "Mathilda", "summary": "...", "isbn": "9780000000000"}
//!     ]
//!   }]
//! }
//! ```

use std::str::FromStr;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::options::{InlineAdmin, ModelAdmin};
use crate::{
    error::{AppError, AppResult},
    models::{
        changeset::{Change, ChangeSet, Save},
        EntityKind, FieldKind, LoanStatus,
    },
};

/// Body of an add or change form submission
#[derive(Debug, Default, Deserialize)]
pub struct FormSubmission {
    #[serde(default)]
    pub inlines: Vec<InlineSubmission>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct InlineSubmission {
    pub model: EntityKind,
    #[serde(default)]
    pub rows: Vec<InlineRowSubmission>,
}

/// One inline row: an existing child when `pk` is set, a new one otherwise
#[derive(Debug, Default, Deserialize)]
pub struct InlineRowSubmission {
    #[serde(default)]
    pub pk: Option<String>,
    #[serde(default)]
    pub delete: bool,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Turn a submission for `admin`'s model into the writes it asks for.
/// `pk` is the record being changed, `None` on the add form.
pub fn parse(admin: &ModelAdmin, pk: Option<&str>, form: FormSubmission) -> AppResult<ChangeSet> {
    let model = admin.model;
    let allowed: Vec<&'static str> = admin.fields.field_names().collect();
    let fields = translate(model, form.fields, &allowed, None)?;
    let mut inlines = group_inlines(admin, form.inlines)?;

    let set = match model {
        EntityKind::Genre => ChangeSet::Genre(save(record_key(model, pk)?, fields)?),
        EntityKind::Language => ChangeSet::Language(save(record_key(model, pk)?, fields)?),
        EntityKind::Author => ChangeSet::Author {
            author: save(record_key(model, pk)?, fields)?,
            books: take_changes(&mut inlines, EntityKind::Book)?,
        },
        EntityKind::Book => ChangeSet::Book {
            book: save(record_key(model, pk)?, fields)?,
            copies: take_changes(&mut inlines, EntityKind::BookInstance)?,
        },
        EntityKind::BookInstance => {
            ChangeSet::BookInstance(save(record_key::<Uuid>(model, pk)?, fields)?)
        }
    };
    Ok(set)
}

/// Primary key of the record in the URL; one that cannot exist is a 404
fn record_key<K: FromStr>(model: EntityKind, pk: Option<&str>) -> AppResult<Option<K>> {
    pk.map(|pk| {
        pk.parse()
            .map_err(|_| AppError::NotFound(format!("{} {} not found", model.verbose_name(), pk)))
    })
    .transpose()
}

fn save<C, U, K>(key: Option<K>, fields: Map<String, Value>) -> AppResult<Save<C, U, K>>
where
    C: DeserializeOwned,
    U: DeserializeOwned,
{
    Ok(match key {
        Some(key) => Save::Update(key, deserialize(fields)?),
        None => Save::Create(deserialize(fields)?),
    })
}

fn deserialize<T: DeserializeOwned>(fields: Map<String, Value>) -> AppResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| AppError::Validation(e.to_string()))
}

/// Map form field names and values onto the request types' shape.
///
/// Only fields on the form are accepted; read-only fields and the inline's
/// link to its parent are refused.
fn translate(
    model: EntityKind,
    fields: Map<String, Value>,
    allowed: &[&'static str],
    parent_link: Option<&str>,
) -> AppResult<Map<String, Value>> {
    let mut out = Map::new();
    for (name, value) in fields {
        let spec = model
            .field(&name)
            .ok_or_else(|| AppError::Validation(format!("{}: unknown field", name)))?;
        if !spec.editable {
            return Err(AppError::Validation(format!("{}: field is read-only", name)));
        }
        if parent_link == Some(spec.name) {
            return Err(AppError::Validation(format!("{}: set from the parent record", name)));
        }
        if !allowed.contains(&spec.name) {
            return Err(AppError::Validation(format!("{}: not on this form", name)));
        }

        match spec.kind {
            FieldKind::ForeignKey(_) => {
                out.insert(format!("{}_id", name), blank_to_null(value));
            }
            FieldKind::ManyToMany(_) => {
                out.insert(format!("{}_ids", name), value);
            }
            FieldKind::Choice => {
                // Blank keeps the current status, or the default on create
                if let Some(status) = status_from_code(&name, value)? {
                    out.insert(name, status);
                }
            }
            FieldKind::Date => {
                out.insert(name, blank_to_null(value));
            }
            _ => {
                out.insert(name, value);
            }
        }
    }
    Ok(out)
}

fn blank_to_null(value: Value) -> Value {
    match value {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        other => other,
    }
}

fn status_from_code(name: &str, value: Value) -> AppResult<Option<Value>> {
    let code = match blank_to_null(value) {
        Value::Null => return Ok(None),
        Value::String(code) => code,
        other => {
            return Err(AppError::Validation(format!("{}: expected a status code, got {}", name, other)))
        }
    };
    let status = LoanStatus::from_code(code.trim()).ok_or_else(|| {
        AppError::Validation(format!("{}: '{}' is not a valid choice", name, code))
    })?;
    serde_json::to_value(status)
        .map(Some)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Rows submitted per configured inline. Rows for a model that is not an
/// inline of this form are refused.
fn group_inlines(
    admin: &ModelAdmin,
    submitted: Vec<InlineSubmission>,
) -> AppResult<Vec<(InlineAdmin, Vec<InlineRowSubmission>)>> {
    let mut grouped: Vec<(InlineAdmin, Vec<InlineRowSubmission>)> =
        admin.inlines.iter().map(|inline| (*inline, Vec::new())).collect();
    for submission in submitted {
        let (_, rows) = grouped
            .iter_mut()
            .find(|(inline, _)| inline.model == submission.model)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "{} cannot be edited on the {} form",
                    submission.model.verbose_name_plural(),
                    admin.model.verbose_name()
                ))
            })?;
        rows.extend(submission.rows);
    }
    Ok(grouped)
}

fn take_changes<C, U, K>(
    inlines: &mut Vec<(InlineAdmin, Vec<InlineRowSubmission>)>,
    child: EntityKind,
) -> AppResult<Vec<Change<C, U, K>>>
where
    C: DeserializeOwned,
    U: DeserializeOwned,
    K: FromStr,
{
    match inlines.iter().position(|(inline, _)| inline.model == child) {
        Some(pos) => {
            let (inline, rows) = inlines.swap_remove(pos);
            changes(&inline, rows)
        }
        None => Ok(Vec::new()),
    }
}

fn changes<C, U, K>(inline: &InlineAdmin, rows: Vec<InlineRowSubmission>) -> AppResult<Vec<Change<C, U, K>>>
where
    C: DeserializeOwned,
    U: DeserializeOwned,
    K: FromStr,
{
    let allowed = inline.field_names();
    let mut out = Vec::new();
    for (i, row) in rows.into_iter().enumerate() {
        let prefix = format!("{}[{}]", inline.model.slug(), i);
        let pk = row.pk.filter(|pk| !pk.trim().is_empty());

        let change = match (pk, row.delete) {
            // Untouched blank form, or a new row removed before saving
            (None, true) => continue,
            (None, false) if row.fields.is_empty() => continue,
            (Some(pk), true) => Change::Delete(child_key(&pk).map_err(|e| within(&prefix, e))?),
            (Some(pk), false) => {
                let key = child_key(&pk).map_err(|e| within(&prefix, e))?;
                let fields = translate(inline.model, row.fields, &allowed, Some(inline.fk_field))
                    .map_err(|e| within(&prefix, e))?;
                Change::Update(key, deserialize(fields).map_err(|e| within(&prefix, e))?)
            }
            (None, false) => {
                let fields = translate(inline.model, row.fields, &allowed, Some(inline.fk_field))
                    .map_err(|e| within(&prefix, e))?;
                Change::Create(deserialize(fields).map_err(|e| within(&prefix, e))?)
            }
        };
        out.push(change);
    }
    Ok(out)
}

fn child_key<K: FromStr>(pk: &str) -> AppResult<K> {
    pk.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid id '{}'", pk)))
}

/// Qualify a validation message with the inline row it came from
pub(crate) fn within(prefix: &str, err: AppError) -> AppError {
    match err {
        AppError::Validation(msg) => AppError::Validation(format!("{}: {}", prefix, msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminSite;
    use serde_json::json;

    fn submission(body: Value) -> FormSubmission {
        serde_json::from_value(body).unwrap()
    }

    fn parse_for(model: EntityKind, pk: Option<&str>, body: Value) -> AppResult<ChangeSet> {
        let site = AdminSite::catalog().unwrap();
        parse(site.get(model).unwrap(), pk, submission(body))
    }

    fn validation_message(result: AppResult<ChangeSet>) -> String {
        match result {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn genre_add_form() {
        let set = parse_for(EntityKind::Genre, None, json!({"name": "Poetry"})).unwrap();
        match set {
            ChangeSet::Genre(Save::Create(data)) => assert_eq!(data.name, "Poetry"),
            other => panic!("unexpected change set: {other:?}"),
        }
    }

    #[test]
    fn author_change_form_with_book_rows() {
        let body = json!({
            "first_name": "M",
            "date_of_death": "",
            "inlines": [{
                "model": "book",
                "rows": [
                    {"pk": "4", "title": "Frankenstein", "genre": [1, 2]},
                    {"pk": "9", "delete": true},
                    {"title": "Mathilda", "summary": "A novella", "isbn": "9780000000000"},
                    {},
                    {"delete": true, "title": "discarded"}
                ]
            }]
        });
        let set = parse_for(EntityKind::Author, Some("1"), body).unwrap();
        let ChangeSet::Author { author, books } = set else {
            panic!("expected an author change set");
        };

        match author {
            Save::Update(1, data) => {
                assert_eq!(data.first_name.as_deref(), Some("M"));
                assert_eq!(data.last_name, None);
                assert_eq!(data.date_of_death, Some(None));
            }
            other => panic!("unexpected author save: {other:?}"),
        }

        assert_eq!(books.len(), 3);
        match &books[0] {
            Change::Update(4, data) => {
                assert_eq!(data.title.as_deref(), Some("Frankenstein"));
                assert_eq!(data.genre_ids, Some(vec![1, 2]));
                assert_eq!(data.author_id, None);
            }
            other => panic!("unexpected row: {other:?}"),
        }
        assert!(matches!(books[1], Change::Delete(9)));
        match &books[2] {
            Change::Create(data) => {
                assert_eq!(data.title, "Mathilda");
                assert!(data.genre_ids.is_empty());
            }
            other => panic!("unexpected row: {other:?}"),
        }
    }

    #[test]
    fn book_form_translates_relations_and_status_codes() {
        let body = json!({
            "title": "Frankenstein",
            "author": 3,
            "summary": "A scientist creates a creature.",
            "isbn": "9780141439471",
            "language": [1],
            "inlines": [{
                "model": "bookinstance",
                "rows": [{"imprint": "Penguin, 2003", "status": "o", "due_back": "2024-06-01"}]
            }]
        });
        let ChangeSet::Book { book, copies } = parse_for(EntityKind::Book, None, body).unwrap() else {
            panic!("expected a book change set");
        };
        match book {
            Save::Create(data) => {
                assert_eq!(data.author_id, Some(3));
                assert_eq!(data.language_ids, vec![1]);
            }
            other => panic!("unexpected book save: {other:?}"),
        }
        match &copies[0] {
            Change::Create(data) => {
                assert_eq!(data.status, LoanStatus::OnLoan);
                assert_eq!(data.due_back, chrono::NaiveDate::from_ymd_opt(2024, 6, 1));
                assert_eq!(data.book_id, None);
            }
            other => panic!("unexpected row: {other:?}"),
        }
    }

    #[test]
    fn blank_status_keeps_the_default() {
        let body = json!({"imprint": "Penguin, 2003", "status": ""});
        match parse_for(EntityKind::BookInstance, None, body).unwrap() {
            ChangeSet::BookInstance(Save::Create(data)) => {
                assert_eq!(data.status, LoanStatus::Maintenance)
            }
            other => panic!("unexpected change set: {other:?}"),
        }
    }

    #[test]
    fn unknown_status_code_is_refused() {
        let msg = validation_message(parse_for(
            EntityKind::BookInstance,
            None,
            json!({"imprint": "x", "status": "z"}),
        ));
        assert!(msg.starts_with("status:"), "{msg}");
    }

    #[test]
    fn unknown_and_read_only_fields_are_refused() {
        let msg = validation_message(parse_for(EntityKind::Genre, None, json!({"name": "x", "colour": "red"})));
        assert_eq!(msg, "colour: unknown field");

        let msg = validation_message(parse_for(EntityKind::Genre, Some("1"), json!({"id": 5})));
        assert_eq!(msg, "id: field is read-only");
    }

    #[test]
    fn inline_rows_cannot_move_to_another_parent() {
        let body = json!({
            "inlines": [{"model": "book", "rows": [{"pk": "4", "author": 2}]}]
        });
        let msg = validation_message(parse_for(EntityKind::Author, Some("1"), body));
        assert_eq!(msg, "book[0]: author: set from the parent record");
    }

    #[test]
    fn inline_for_unconfigured_model_is_refused() {
        let body = json!({"inlines": [{"model": "bookinstance", "rows": []}]});
        let msg = validation_message(parse_for(EntityKind::Author, Some("1"), body));
        assert_eq!(msg, "book instances cannot be edited on the author form");
    }

    #[test]
    fn missing_required_field_on_add() {
        let msg = validation_message(parse_for(EntityKind::Author, None, json!({"first_name": "Mary"})));
        assert!(msg.contains("last_name"), "{msg}");
    }

    #[test]
    fn malformed_record_key_is_not_found() {
        let result = parse_for(EntityKind::Author, Some("abc"), json!({}));
        assert!(matches!(result, Err(AppError::NotFound(_))));
        let result = parse_for(EntityKind::BookInstance, Some("42"), json!({}));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn malformed_row_key_names_the_row() {
        let body = json!({"inlines": [{"model": "bookinstance", "rows": [{"pk": "7", "delete": true}]}]});
        let msg = validation_message(parse_for(EntityKind::Book, Some("1"), body));
        assert_eq!(msg, "bookinstance[0]: invalid id '7'");
    }
}
