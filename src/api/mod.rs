//! API handlers for the catalog REST endpoints, admin views and detail pages

pub mod admin;
pub mod authors;
pub mod book_instances;
pub mod books;
pub mod detail;
pub mod genres;
pub mod health;
pub mod languages;
pub mod openapi;
