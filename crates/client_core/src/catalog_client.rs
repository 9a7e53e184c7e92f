//! reqwest-backed `CatalogService` for the products REST resource.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{domain::CategoryId, error::FetchError, protocol::PaginatedEnvelope};
use url::Url;

use crate::CatalogService;

pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8080/api/products";

const FIND_BY_CATEGORY: &str = "findByCategoryId";
const FIND_BY_NAME: &str = "findByNameContaining";

#[derive(Serialize)]
struct CategoryPageQuery {
    id: i64,
    page: u32,
    size: u32,
}

#[derive(Serialize)]
struct KeywordPageQuery<'a> {
    name: &'a str,
    page: u32,
    size: u32,
}

pub struct HttpCatalogClient {
    http: Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, url::ParseError> {
        let parsed = Url::parse(base_url)?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page<Q: Serialize + ?Sized>(
        &self,
        finder: &str,
        query: &Q,
    ) -> Result<PaginatedEnvelope, FetchError> {
        let res = self
            .http
            .get(format!("{}/search/{finder}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(FetchError::status(status.as_u16(), body));
        }

        res.json().await.map_err(|err| {
            if err.is_decode() {
                FetchError::Decode(err.to_string())
            } else {
                FetchError::Transport(err.to_string())
            }
        })
    }
}

#[async_trait]
impl CatalogService for HttpCatalogClient {
    async fn fetch_by_category(
        &self,
        page_index: u32,
        page_size: u32,
        category_id: CategoryId,
    ) -> Result<PaginatedEnvelope, FetchError> {
        self.fetch_page(
            FIND_BY_CATEGORY,
            &CategoryPageQuery {
                id: category_id.0,
                page: page_index,
                size: page_size,
            },
        )
        .await
    }

    async fn fetch_by_keyword(
        &self,
        page_index: u32,
        page_size: u32,
        keyword: &str,
    ) -> Result<PaginatedEnvelope, FetchError> {
        self.fetch_page(
            FIND_BY_NAME,
            &KeywordPageQuery {
                name: keyword,
                page: page_index,
                size: page_size,
            },
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/catalog_client_tests.rs"]
mod tests;
