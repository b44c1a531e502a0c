use fcs_common::Money;
use thiserror::Error;

use crate::db_types::Seller;

/// A menu item as the splitter sees it: the current price, the owning seller, and whether it can be sold right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub menu_item_id: i64,
    pub seller_id: i64,
    pub name: String,
    pub price: Money,
    pub available: bool,
}

/// Resolves client-supplied menu item ids against the live catalog.
///
/// Consumed by the checkout flow; the catalog itself (menu CRUD) is managed elsewhere.
#[allow(async_fn_in_trait)]
pub trait CatalogLookup: Clone {
    async fn resolve_item(&self, menu_item_id: i64) -> Result<Option<ResolvedItem>, CatalogError>;

    async fn fetch_seller(&self, seller_id: i64) -> Result<Option<Seller>, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Catalog storage error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
