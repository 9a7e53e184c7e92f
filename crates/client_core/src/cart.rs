use std::sync::{Mutex, PoisonError};

use shared::domain::CartItem;
use tokio::sync::watch;
use tracing::info;

use crate::CartService;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CartTotals {
    pub total_price: f64,
    pub total_quantity: u32,
}

impl CartTotals {
    fn compute(items: &[CartItem]) -> Self {
        items.iter().fold(Self::default(), |totals, item| Self {
            total_price: totals.total_price + item.subtotal(),
            total_quantity: totals.total_quantity + item.quantity,
        })
    }
}

/// Cart kept in process memory. Lines are keyed by product id; adding a
/// product that is already present bumps its quantity.
pub struct InMemoryCart {
    items: Mutex<Vec<CartItem>>,
    totals: watch::Sender<CartTotals>,
}

impl InMemoryCart {
    pub fn new() -> Self {
        let (totals, _) = watch::channel(CartTotals::default());
        Self {
            items: Mutex::new(Vec::new()),
            totals,
        }
    }

    pub fn items(&self) -> Vec<CartItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn totals(&self) -> CartTotals {
        *self.totals.borrow()
    }

    pub fn subscribe_totals(&self) -> watch::Receiver<CartTotals> {
        self.totals.subscribe()
    }
}

impl Default for InMemoryCart {
    fn default() -> Self {
        Self::new()
    }
}

impl CartService for InMemoryCart {
    fn add_item(&self, item: CartItem) {
        let totals = {
            let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
            match items
                .iter_mut()
                .find(|existing| existing.product_id == item.product_id)
            {
                Some(existing) => existing.quantity += item.quantity,
                None => items.push(item),
            }
            CartTotals::compute(&items)
        };

        info!(
            total_price = totals.total_price,
            total_quantity = totals.total_quantity,
            "cart updated"
        );
        self.totals.send_replace(totals);
    }
}
