//! Business logic services

pub mod admin;
pub mod catalog;

use std::sync::Arc;

use crate::{admin::AdminSite, config::AdminConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub admin: admin::AdminService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, site: Arc<AdminSite>, admin_config: AdminConfig) -> Self {
        let catalog = catalog::CatalogService::new(repository.clone());
        Self {
            admin: admin::AdminService::new(repository, catalog.clone(), site, admin_config),
            catalog,
        }
    }
}
