//! Repository layer for database operations

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod changesets;
pub mod genres;
pub mod languages;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Round-trip to the database, for readiness checks
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// One page of a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,
    pub per_page: i64,
}

impl Page {
    pub const MAX_PER_PAGE: i64 = 1000;

    /// Page numbers start at 1; sizes are kept within 1..=MAX_PER_PAGE
    pub fn new(number: i64, per_page: i64) -> Self {
        Self {
            number: number.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.per_page)
    }

    /// Number of pages needed for `total` rows; an empty list still has one
    pub fn num_pages(&self, total: i64) -> i64 {
        ((total + self.per_page - 1) / self.per_page).max(1)
    }

    /// LIMIT/OFFSET suffix for a list query; no page lists every row
    pub(crate) fn clause(page: Option<Page>) -> String {
        match page {
            Some(p) => format!(" LIMIT {} OFFSET {}", p.per_page, p.offset()),
            None => String::new(),
        }
    }
}

const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NOT_NULL_VIOLATION: &str = "23502";
const CHARACTER_NOT_IN_REPERTOIRE: &str = "22021";

/// Translate constraint violations into client errors; everything else
/// stays a database error
pub(crate) fn map_write_error(err: sqlx::Error, what: &str) -> AppError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());
    match code.as_deref() {
        Some(FOREIGN_KEY_VIOLATION) => {
            AppError::BadRequest(format!("{} references a record that does not exist", what))
        }
        Some(CHECK_VIOLATION) | Some(NOT_NULL_VIOLATION) | Some(CHARACTER_NOT_IN_REPERTOIRE) => {
            AppError::Validation(format!("{} has an invalid or missing value", what))
        }
        _ => AppError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offsets() {
        assert_eq!(Page::new(1, 100).offset(), 0);
        assert_eq!(Page::new(3, 20).offset(), 40);
        assert_eq!(Page::clause(Some(Page::new(2, 10))), " LIMIT 10 OFFSET 10");
        assert_eq!(Page::clause(None), "");
    }

    #[test]
    fn page_inputs_are_clamped() {
        assert_eq!(Page::new(0, 0), Page { number: 1, per_page: 1 });
        assert_eq!(Page::new(-4, 50_000).per_page, Page::MAX_PER_PAGE);
        assert_eq!(Page::new(i64::MAX, 100).offset(), i64::MAX);
    }

    #[test]
    fn page_count() {
        let page = Page::new(1, 100);
        assert_eq!(page.num_pages(0), 1);
        assert_eq!(page.num_pages(100), 1);
        assert_eq!(page.num_pages(101), 2);
    }
}
