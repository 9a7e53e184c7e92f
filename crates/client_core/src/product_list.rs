//! Product listing view model: picks search or category mode from the route,
//! keeps pagination in step with filter changes, and unpacks catalog pages.

use std::sync::Arc;

use futures::StreamExt;
use shared::{
    domain::{CartItem, CategoryId, Product, DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME},
    error::FetchError,
    protocol::PaginatedEnvelope,
};
use thiserror::Error;
use tokio::{
    sync::{watch, Mutex},
    task::{JoinHandle, JoinSet},
};
use tracing::{debug, info, warn};

use crate::{
    navigation::{NavigationHandle, ParamSnapshot, ID_PARAM, KEYWORD_PARAM, NAME_PARAM},
    CartService, CatalogService,
};

pub const DEFAULT_PAGE_SIZE: u32 = 5;
/// Shown until the first page arrives.
pub const PLACEHOLDER_TOTAL_ELEMENTS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub items: Vec<Product>,
    pub category_id: CategoryId,
    pub previous_category_id: CategoryId,
    pub category_name: String,
    pub search_mode: bool,
    pub keyword: Option<String>,
    pub previous_keyword: Option<String>,
    /// One-based.
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    /// As reported by the server; zero until the first page arrives.
    pub total_pages: u32,
    pub last_error: Option<FetchError>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            category_id: DEFAULT_CATEGORY_ID,
            previous_category_id: DEFAULT_CATEGORY_ID,
            category_name: String::new(),
            search_mode: false,
            keyword: None,
            previous_keyword: None,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_elements: PLACEHOLDER_TOTAL_ELEMENTS,
            total_pages: 0,
            last_error: None,
        }
    }
}

impl ViewState {
    fn prepare_search(&mut self, snapshot: &ParamSnapshot) -> ListingRequest {
        self.keyword = snapshot.get(KEYWORD_PARAM).map(str::to_owned);

        if self.previous_keyword != self.keyword {
            self.page_number = 1;
        }
        self.previous_keyword = self.keyword.clone();

        info!(
            keyword = self.keyword.as_deref().unwrap_or_default(),
            page_number = self.page_number,
            page_size = self.page_size,
            "listing by keyword"
        );

        ListingRequest::Keyword {
            page_index: self.page_number.saturating_sub(1),
            page_size: self.page_size,
            keyword: self.keyword.clone().unwrap_or_default(),
        }
    }

    fn prepare_category(&mut self, snapshot: &ParamSnapshot) -> ListingRequest {
        let (category_id, category_name) = match snapshot.get(ID_PARAM) {
            Some(raw) => match parse_category_id(raw) {
                Ok(id) => (id, snapshot.get(NAME_PARAM).unwrap_or_default().to_owned()),
                Err(err) => {
                    warn!(%err, "falling back to default category");
                    (DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME.to_owned())
                }
            },
            None => (DEFAULT_CATEGORY_ID, DEFAULT_CATEGORY_NAME.to_owned()),
        };
        self.category_id = category_id;
        self.category_name = category_name;

        if self.previous_category_id != self.category_id {
            self.page_number = 1;
        }
        self.previous_category_id = self.category_id;

        info!(
            category_id = self.category_id.0,
            category_name = %self.category_name,
            page_number = self.page_number,
            page_size = self.page_size,
            "listing by category"
        );

        ListingRequest::Category {
            page_index: self.page_number.saturating_sub(1),
            page_size: self.page_size,
            category_id: self.category_id,
        }
    }

    fn unpack(&mut self, envelope: PaginatedEnvelope) {
        let (products, page) = envelope.into_parts();
        self.items = products;
        self.page_number = page.number.saturating_add(1);
        self.page_size = page.size;
        self.total_elements = page.total_elements;
        self.total_pages = page.total_pages;
        self.last_error = None;
    }
}

/// One catalog fetch as issued by a dispatch. `page_index` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRequest {
    Category {
        page_index: u32,
        page_size: u32,
        category_id: CategoryId,
    },
    Keyword {
        page_index: u32,
        page_size: u32,
        keyword: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied { sequence: u64, request: ListingRequest },
    /// A newer dispatch had already been applied when this one completed.
    Superseded { sequence: u64, request: ListingRequest },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("category id {raw:?} is not an integer")]
    InvalidCategoryId { raw: String },
}

pub fn parse_category_id(raw: &str) -> Result<CategoryId, ParamError> {
    raw.trim()
        .parse::<i64>()
        .map(CategoryId)
        .map_err(|_| ParamError::InvalidCategoryId {
            raw: raw.to_string(),
        })
}

struct ListingState {
    view: ViewState,
    next_sequence: u64,
    applied_sequence: u64,
}

pub struct ProductListController {
    catalog: Arc<dyn CatalogService>,
    cart: Arc<dyn CartService>,
    navigation: NavigationHandle,
    inner: Mutex<ListingState>,
    view_tx: watch::Sender<ViewState>,
}

impl ProductListController {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        cart: Arc<dyn CartService>,
        navigation: NavigationHandle,
    ) -> Arc<Self> {
        Self::new_with_page_size(catalog, cart, navigation, DEFAULT_PAGE_SIZE)
    }

    pub fn new_with_page_size(
        catalog: Arc<dyn CatalogService>,
        cart: Arc<dyn CartService>,
        navigation: NavigationHandle,
        page_size: u32,
    ) -> Arc<Self> {
        let view = ViewState {
            page_size,
            ..ViewState::default()
        };
        let (view_tx, _) = watch::channel(view.clone());
        Arc::new(Self {
            catalog,
            cart,
            navigation,
            inner: Mutex::new(ListingState {
                view,
                next_sequence: 0,
                applied_sequence: 0,
            }),
            view_tx,
        })
    }

    /// Starts reacting to navigation: every snapshot, the current one
    /// included, triggers a dispatch. Dispatches may overlap. Everything
    /// spawned here stops when the returned guard is dropped.
    pub fn activate(self: &Arc<Self>) -> ListingSubscription {
        let controller = Arc::clone(self);
        let mut snapshots = self.navigation.stream();
        let task = tokio::spawn(async move {
            let mut inflight = JoinSet::new();
            loop {
                tokio::select! {
                    next = snapshots.next() => {
                        if next.is_none() {
                            break;
                        }
                        let controller = Arc::clone(&controller);
                        inflight.spawn(async move {
                            let _ = controller.list_products().await;
                        });
                    }
                    Some(_) = inflight.join_next(), if !inflight.is_empty() => {}
                }
            }
            debug!("navigation source closed; draining in-flight listings");
            while inflight.join_next().await.is_some() {}
        });
        ListingSubscription { task }
    }

    pub async fn view(&self) -> ViewState {
        self.inner.lock().await.view.clone()
    }

    /// Receives a fresh copy of the view state after every applied response
    /// or failure.
    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    pub async fn list_products(&self) -> Result<DispatchOutcome, FetchError> {
        self.dispatch(|_| {}).await
    }

    pub async fn update_page_size(&self, page_size: u32) -> Result<DispatchOutcome, FetchError> {
        self.dispatch(|view| {
            view.page_size = page_size;
            view.page_number = 1;
        })
        .await
    }

    pub async fn change_page(&self, page_number: u32) -> Result<DispatchOutcome, FetchError> {
        self.dispatch(|view| view.page_number = page_number.max(1)).await
    }

    pub fn add_to_cart(&self, product: &Product) {
        info!(
            product_id = product.id.0,
            name = %product.name,
            unit_price = product.unit_price,
            "adding to cart"
        );
        self.cart.add_item(CartItem::from_product(product));
    }

    /// `adjust` runs under the same lock as the filter comparison, so no
    /// other dispatch or response can land between the two.
    async fn dispatch(
        &self,
        adjust: impl FnOnce(&mut ViewState),
    ) -> Result<DispatchOutcome, FetchError> {
        let (sequence, request) = self.prepare_dispatch(adjust).await;

        let response = match &request {
            ListingRequest::Category {
                page_index,
                page_size,
                category_id,
            } => {
                self.catalog
                    .fetch_by_category(*page_index, *page_size, *category_id)
                    .await
            }
            ListingRequest::Keyword {
                page_index,
                page_size,
                keyword,
            } => {
                self.catalog
                    .fetch_by_keyword(*page_index, *page_size, keyword)
                    .await
            }
        };

        self.apply_response(sequence, request, response).await
    }

    async fn prepare_dispatch(&self, adjust: impl FnOnce(&mut ViewState)) -> (u64, ListingRequest) {
        let snapshot = self.navigation.snapshot();
        let mut guard = self.inner.lock().await;
        guard.next_sequence += 1;
        let sequence = guard.next_sequence;

        let view = &mut guard.view;
        adjust(view);
        view.search_mode = snapshot.has(KEYWORD_PARAM);
        let request = if view.search_mode {
            view.prepare_search(&snapshot)
        } else {
            view.prepare_category(&snapshot)
        };
        (sequence, request)
    }

    async fn apply_response(
        &self,
        sequence: u64,
        request: ListingRequest,
        response: Result<PaginatedEnvelope, FetchError>,
    ) -> Result<DispatchOutcome, FetchError> {
        let mut guard = self.inner.lock().await;
        if sequence < guard.applied_sequence {
            debug!(
                sequence,
                applied = guard.applied_sequence,
                ?request,
                "discarding superseded listing response"
            );
            return Ok(DispatchOutcome::Superseded { sequence, request });
        }
        guard.applied_sequence = sequence;

        let result = match response {
            Ok(envelope) => {
                guard.view.unpack(envelope);
                Ok(DispatchOutcome::Applied { sequence, request })
            }
            Err(err) => {
                warn!(%err, ?request, "listing fetch failed");
                guard.view.last_error = Some(err.clone());
                Err(err)
            }
        };
        self.view_tx.send_replace(guard.view.clone());
        result
    }
}

/// Keeps a controller's navigation subscription alive.
pub struct ListingSubscription {
    task: JoinHandle<()>,
}

impl ListingSubscription {
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn deactivate(self) {
        self.task.abort();
    }
}

impl Drop for ListingSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/product_list_tests.rs"]
mod tests;
