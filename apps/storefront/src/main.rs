use std::{sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    navigation::{ID_PARAM, NAME_PARAM},
    HttpCatalogClient, InMemoryCart, NavigationSource, ParamSnapshot, ProductListController,
    ViewState,
};
use shared::{
    domain::ProductId,
    error::{ErrorCode, FetchError},
};
use tokio::time::timeout;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, validate_api_base_url};

const FIRST_LISTING_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Parser, Debug)]
#[command(about = "List storefront products by category or keyword")]
struct Args {
    /// Products resource, e.g. http://localhost:8080/api/products
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long, conflicts_with = "category_id")]
    keyword: Option<String>,
    #[arg(long)]
    category_id: Option<String>,
    #[arg(long, requires = "category_id")]
    category_name: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    /// One-based page to show after the first listing.
    #[arg(long)]
    page: Option<u32>,
    /// Product ids from the listed page to put in the cart.
    #[arg(long = "add-to-cart", value_name = "PRODUCT_ID")]
    add_to_cart: Vec<i64>,
}

fn route_params(args: &Args) -> ParamSnapshot {
    if let Some(keyword) = &args.keyword {
        return ParamSnapshot::search(keyword.clone());
    }
    let mut snapshot = ParamSnapshot::new();
    if let Some(id) = &args.category_id {
        snapshot = snapshot.with(ID_PARAM, id.clone());
    }
    if let Some(name) = &args.category_name {
        snapshot = snapshot.with(NAME_PARAM, name.clone());
    }
    snapshot
}

fn failure_hint(err: &FetchError) -> &'static str {
    match err.code() {
        ErrorCode::NotFound => "check that --api-url points at the products resource",
        ErrorCode::Unauthorized | ErrorCode::Forbidden => "the catalog refused anonymous access",
        ErrorCode::Validation => "check --page-size and --category-id",
        ErrorCode::RateLimited => "the catalog is throttling requests; retry later",
        ErrorCode::Internal => "is the catalog service running?",
    }
}

fn describe_failure(context: &str, err: &FetchError) -> String {
    format!("{context}: {err} ({})", failure_hint(err))
}

fn print_view(view: &ViewState) {
    if view.search_mode {
        println!(
            "Search results for '{}'",
            view.keyword.as_deref().unwrap_or_default()
        );
    } else {
        println!("Category: {} (#{})", view.category_name, view.category_id);
    }

    if view.items.is_empty() {
        println!("  No products found.");
    }
    for product in &view.items {
        println!(
            "  [{}] {:<40} ${:>8.2}",
            product.id, product.name, product.unit_price
        );
    }
    println!(
        "Page {} of {} ({} products, {} per page)",
        view.page_number,
        view.total_pages,
        view.total_elements,
        view.page_size
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    let api_base_url = validate_api_base_url(&settings.api_base_url)?;

    let catalog = HttpCatalogClient::new(&api_base_url)
        .with_context(|| format!("failed to build catalog client for {api_base_url}"))?;
    let cart = Arc::new(InMemoryCart::new());
    let navigation = NavigationSource::new(route_params(&args));
    let controller = ProductListController::new_with_page_size(
        Arc::new(catalog),
        cart.clone(),
        navigation.handle(),
        settings.page_size,
    );

    let mut view_rx = controller.subscribe_view();
    let subscription = controller.activate();
    timeout(FIRST_LISTING_TIMEOUT, view_rx.changed())
        .await
        .context("catalog did not answer in time")?
        .context("listing stopped before the first page arrived")?;
    subscription.deactivate();

    if let Some(err) = controller.view().await.last_error {
        bail!(describe_failure("failed to list products", &err));
    }
    if let Some(page) = args.page {
        if let Err(err) = controller.change_page(page).await {
            bail!(describe_failure(&format!("failed to load page {page}"), &err));
        }
    }

    let view = controller.view().await;
    print_view(&view);

    if args.add_to_cart.is_empty() {
        return Ok(());
    }
    for id in &args.add_to_cart {
        match view.items.iter().find(|product| product.id == ProductId(*id)) {
            Some(product) => controller.add_to_cart(product),
            None => tracing::warn!(product_id = id, "product is not on the listed page"),
        }
    }
    let totals = cart.totals();
    println!(
        "Cart: {} item(s), total ${:.2}",
        totals.total_quantity, totals.total_price
    );

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
