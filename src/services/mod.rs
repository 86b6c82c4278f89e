//! Business logic services

pub mod loans;
pub mod returns;
pub mod stock;

use std::sync::Arc;

use crate::{
    error::AppResult,
    repository::{CatalogStore, HealthStore, LoanStore, Repository, ReturnStore, StockStore},
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub loans: loans::LoansService,
    pub returns: returns::ReturnsService,
    pub stock: stock::StockService,
    health: Arc<dyn HealthStore>,
}

impl Services {
    /// Create all services backed by the given repository
    pub fn new(repository: Repository) -> Self {
        Self::from_stores(
            Arc::new(repository.loans.clone()),
            Arc::new(repository.returns.clone()),
            Arc::new(repository.stock.clone()),
            Arc::new(repository.catalog.clone()),
            Arc::new(repository),
        )
    }

    /// Wire services onto explicit store handles
    pub fn from_stores(
        loans: Arc<dyn LoanStore>,
        returns: Arc<dyn ReturnStore>,
        stock: Arc<dyn StockStore>,
        catalog: Arc<dyn CatalogStore>,
        health: Arc<dyn HealthStore>,
    ) -> Self {
        Self {
            loans: loans::LoansService::new(loans.clone()),
            returns: returns::ReturnsService::new(loans, returns),
            stock: stock::StockService::new(stock, catalog),
            health,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.health.ping().await
    }
}
