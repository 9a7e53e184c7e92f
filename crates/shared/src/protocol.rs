//! Paginated response shapes of the catalog REST resource.

use serde::{Deserialize, Serialize};

use crate::domain::Product;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedProducts {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Page descriptor. `number` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of products plus its page descriptor. The server omits
/// `_embedded` entirely when the page is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedEnvelope {
    #[serde(rename = "_embedded", default)]
    pub embedded: EmbeddedProducts,
    pub page: PageMeta,
}

impl PaginatedEnvelope {
    pub fn new(products: Vec<Product>, page: PageMeta) -> Self {
        Self {
            embedded: EmbeddedProducts { products },
            page,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.embedded.products
    }

    pub fn into_parts(self) -> (Vec<Product>, PageMeta) {
        (self.embedded.products, self.page)
    }
}
