//! Named detail routes
//!
//! Detail pages (`author-detail`, `book-detail`) are addressed through
//! this table so that models can produce their canonical address without
//! knowing how the router is assembled, and the router mounts the same
//! patterns.

/// Routes that can be reversed into a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `author-detail`
    AuthorDetail,
    /// `book-detail`
    BookDetail,
}

impl Route {
    /// Path pattern in axum syntax
    pub fn pattern(self) -> &'static str {
        match self {
            Route::AuthorDetail => "/author/:id/",
            Route::BookDetail => "/book/:id/",
        }
    }

    /// Build the path for a record id
    pub fn path(self, id: impl std::fmt::Display) -> String {
        self.pattern().replace(":id", &id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_paths() {
        assert_eq!(Route::AuthorDetail.path(7), "/author/7/");
        assert_eq!(Route::BookDetail.path(12), "/book/12/");
    }

    #[test]
    fn patterns_take_one_id() {
        for route in [Route::AuthorDetail, Route::BookDetail] {
            assert_eq!(route.pattern().matches(":id").count(), 1);
        }
    }
}
