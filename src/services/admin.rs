//! Admin service: loads records and renders them through the registered
//! configuration, and saves or deletes through the catalog service

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::catalog::CatalogService;
use crate::{
    admin::{
        render::{self, ChangeForm, ChangeList, Deleted, IndexEntry, Pagination},
        submit::{self, FormSubmission},
        AdminSite, InlineAdmin, ModelAdmin, Record,
    },
    config::AdminConfig,
    error::{AppError, AppResult},
    models::{Author, Book, EntityKind},
    repository::{Page, Repository},
};

#[derive(Clone)]
pub struct AdminService {
    repository: Repository,
    catalog: CatalogService,
    site: Arc<AdminSite>,
    config: AdminConfig,
}

impl AdminService {
    pub fn new(
        repository: Repository,
        catalog: CatalogService,
        site: Arc<AdminSite>,
        config: AdminConfig,
    ) -> Self {
        Self { repository, catalog, site, config }
    }

    /// Resolve a URL slug to a registered model's configuration
    pub fn model_admin(&self, slug: &str) -> AppResult<&ModelAdmin> {
        let model: EntityKind = slug.parse().map_err(AppError::NotFound)?;
        self.site
            .get(model)
            .ok_or_else(|| AppError::NotFound(format!("model '{}' is not registered", slug)))
    }

    pub fn index(&self) -> Vec<IndexEntry> {
        render::index(&self.site)
    }

    pub async fn change_list(&self, slug: &str, page: Page) -> AppResult<ChangeList> {
        let admin = self.model_admin(slug)?;
        let total = self.count(admin.model).await?;
        let records = self.load_page(admin.model, page).await?;
        tracing::debug!(
            model = %admin.model,
            page = page.number,
            rows = records.len(),
            total,
            "rendering change list"
        );
        let pagination = Pagination::new(page.number, page.per_page, total);
        Ok(render::change_list(admin, &records, pagination, &self.config.empty_value_display))
    }

    pub async fn change_form(&self, slug: &str, pk: &str) -> AppResult<ChangeForm> {
        let admin = self.model_admin(slug)?;
        let record = self.load_one(admin.model, pk).await?;
        let mut children = Vec::new();
        for inline in admin.inlines.iter() {
            children.push(self.load_inline(inline, &record).await?);
        }
        Ok(render::change_form(admin, Some(&record), &children, self.config.inline_extra))
    }

    pub fn add_form(&self, slug: &str) -> AppResult<ChangeForm> {
        let admin = self.model_admin(slug)?;
        Ok(render::change_form(admin, None, &[], self.config.inline_extra))
    }

    /// Save an add form (`pk` is `None`) or change form with its inline
    /// rows, then render the saved record's change form
    pub async fn save(
        &self,
        slug: &str,
        pk: Option<&str>,
        form: FormSubmission,
    ) -> AppResult<ChangeForm> {
        let admin = self.model_admin(slug)?;
        let set = submit::parse(admin, pk, form)?;
        let saved = self.catalog.apply_changeset(set).await?;
        self.change_form(slug, &saved).await
    }

    /// Delete one record. Related rows are kept with their link cleared.
    pub async fn delete(&self, slug: &str, pk: &str) -> AppResult<Deleted> {
        let admin = self.model_admin(slug)?;
        let record = self.load_one(admin.model, pk).await?;
        match &record {
            Record::Genre(genre) => self.catalog.delete_genre(genre.id).await?,
            Record::Language(language) => self.catalog.delete_language(language.id).await?,
            Record::Author(author) => self.catalog.delete_author(author.id).await?,
            Record::Book { book, .. } => self.catalog.delete_book(book.id).await?,
            Record::BookInstance { instance, .. } => {
                self.catalog.delete_book_instance(instance.id).await?
            }
        }
        Ok(render::deleted(&record))
    }

    async fn count(&self, model: EntityKind) -> AppResult<i64> {
        match model {
            EntityKind::Genre => self.repository.genres_count().await,
            EntityKind::Language => self.repository.languages_count().await,
            EntityKind::Author => self.repository.authors_count().await,
            EntityKind::Book => self.repository.books_count().await,
            EntityKind::BookInstance => self.repository.book_instances_count().await,
        }
    }

    /// One page of a model's records in default order, with related rows
    /// resolved
    async fn load_page(&self, model: EntityKind, page: Page) -> AppResult<Vec<Record>> {
        let page = Some(page);
        let records = match model {
            EntityKind::Genre => self
                .repository
                .genres_list(page)
                .await?
                .into_iter()
                .map(Record::Genre)
                .collect(),
            EntityKind::Language => self
                .repository
                .languages_list(page)
                .await?
                .into_iter()
                .map(Record::Language)
                .collect(),
            EntityKind::Author => self
                .repository
                .authors_list(page)
                .await?
                .into_iter()
                .map(Record::Author)
                .collect(),
            EntityKind::Book => {
                let books = self.repository.books_list(page).await?;
                let ids = distinct(books.iter().filter_map(|b| b.author_id));
                let authors: HashMap<i32, Author> = self
                    .repository
                    .authors_get_many(&ids)
                    .await?
                    .into_iter()
                    .map(|a| (a.id, a))
                    .collect();
                books
                    .into_iter()
                    .map(|book| {
                        let author = book.author_id.and_then(|id| authors.get(&id).cloned());
                        Record::Book { book, author }
                    })
                    .collect()
            }
            EntityKind::BookInstance => {
                let instances = self.repository.book_instances_list(page).await?;
                let ids = distinct(instances.iter().filter_map(|i| i.book_id));
                let books: HashMap<i32, Book> = self
                    .repository
                    .books_get_many(&ids)
                    .await?
                    .into_iter()
                    .map(|b| (b.id, b))
                    .collect();
                instances
                    .into_iter()
                    .map(|instance| {
                        let book = instance.book_id.and_then(|id| books.get(&id).cloned());
                        Record::BookInstance { instance, book }
                    })
                    .collect()
            }
        };
        Ok(records)
    }

    /// One record by primary key, with related rows resolved
    async fn load_one(&self, model: EntityKind, pk: &str) -> AppResult<Record> {
        let not_found = || AppError::NotFound(format!("{} {} not found", model.verbose_name(), pk));
        let int_pk = || pk.parse::<i32>().map_err(|_| not_found());

        let record = match model {
            EntityKind::Genre => Record::Genre(self.repository.genres_get_by_id(int_pk()?).await?),
            EntityKind::Language => {
                Record::Language(self.repository.languages_get_by_id(int_pk()?).await?)
            }
            EntityKind::Author => Record::Author(self.repository.authors_get_by_id(int_pk()?).await?),
            EntityKind::Book => {
                let book = self.repository.books_get_by_id(int_pk()?).await?;
                let author = match book.author_id {
                    Some(author_id) => Some(self.repository.authors_get_by_id(author_id).await?),
                    None => None,
                };
                Record::Book { book, author }
            }
            EntityKind::BookInstance => {
                let id: Uuid = pk.parse().map_err(|_| not_found())?;
                let instance = self.repository.book_instances_get_by_id(id).await?;
                let book = match instance.book_id {
                    Some(book_id) => Some(self.repository.books_get_by_id(book_id).await?),
                    None => None,
                };
                Record::BookInstance { instance, book }
            }
        };
        Ok(record)
    }

    /// Child records of an inline for the given parent
    async fn load_inline(&self, inline: &InlineAdmin, parent: &Record) -> AppResult<Vec<Record>> {
        match (parent, inline.model) {
            (Record::Author(author), EntityKind::Book) => Ok(self
                .repository
                .books_by_author(author.id)
                .await?
                .into_iter()
                .map(|book| Record::Book { book, author: Some(author.clone()) })
                .collect()),
            (Record::Book { book, .. }, EntityKind::BookInstance) => Ok(self
                .repository
                .book_instances_by_book(book.id)
                .await?
                .into_iter()
                .map(|instance| Record::BookInstance { instance, book: Some(book.clone()) })
                .collect()),
            (parent, child) => Err(AppError::Internal(format!(
                "no inline loader for {} on {}",
                child,
                parent.kind()
            ))),
        }
    }
}

fn distinct(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
