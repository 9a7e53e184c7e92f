use async_trait::async_trait;
use shared::{
    domain::{CartItem, CategoryId},
    error::FetchError,
    protocol::PaginatedEnvelope,
};

pub mod cart;
pub mod catalog_client;
pub mod navigation;
pub mod product_list;

pub use cart::{CartTotals, InMemoryCart};
pub use catalog_client::HttpCatalogClient;
pub use navigation::{NavigationHandle, NavigationSource, ParamSnapshot};
pub use product_list::{
    parse_category_id, DispatchOutcome, ListingRequest, ListingSubscription, ParamError,
    ProductListController, ViewState,
};

/// Paginated product lookups. Page indexes at this boundary are zero-based.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_by_category(
        &self,
        page_index: u32,
        page_size: u32,
        category_id: CategoryId,
    ) -> Result<PaginatedEnvelope, FetchError>;

    async fn fetch_by_keyword(
        &self,
        page_index: u32,
        page_size: u32,
        keyword: &str,
    ) -> Result<PaginatedEnvelope, FetchError>;
}

pub trait CartService: Send + Sync {
    fn add_item(&self, item: CartItem);
}
