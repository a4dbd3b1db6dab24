//! Checkout session shared between tasks.

use std::sync::Arc;

use medusa_sdk::client::{HttpTransport, Transport};
use medusa_sdk::objects::cart::Cart;
use tokio::sync::{Mutex, MutexGuard};

use crate::session::CheckoutSession;
use crate::step::CheckoutStep;

/// A [`CheckoutSession`] behind a single async mutex.
///
/// Holding the guard across an operation's await point serializes all
/// mutations, so two overlapping snapshot replacements can never
/// interleave.
#[derive(Debug)]
pub struct SharedCheckout<T = HttpTransport> {
    inner: Arc<Mutex<CheckoutSession<T>>>,
}

impl<T> Clone for SharedCheckout<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedCheckout<T> {
    pub fn new(session: CheckoutSession<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for the duration of one or more operations.
    pub async fn lock(&self) -> MutexGuard<'_, CheckoutSession<T>> {
        self.inner.lock().await
    }

    /// Copy of the current snapshot.
    pub async fn cart(&self) -> Option<Cart> {
        self.inner.lock().await.cart().cloned()
    }

    pub async fn step(&self) -> CheckoutStep {
        self.inner.lock().await.step()
    }
}

#[cfg(test)]
mod tests {
    use medusa_sdk::client::{MockTransport, StoreClient};
    use medusa_sdk::config::StoreConfig;
    use serde_json::json;
    use url::Url;

    use super::*;

    fn shared() -> SharedCheckout<MockTransport> {
        let config = StoreConfig::new(Url::parse("https://store.example.com").unwrap(), "pk_test");
        let client = StoreClient::with_transport(&config, MockTransport::new()).unwrap();
        SharedCheckout::new(CheckoutSession::new(client))
    }

    fn cart(quantity: i64) -> serde_json::Value {
        json!({ "cart": {
            "id": "cart_01",
            "items": [{ "id": "item_01", "quantity": quantity, "unit_price": 1000 }]
        } })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_mutations_are_serialized() {
        let checkout = shared();
        {
            let mut session = checkout.lock().await;
            let mock = session.client().transport();
            mock.push_json(200, cart(1));
            mock.push_json(200, cart(2));
            mock.push_json(200, cart(3));
            session.load_cart("cart_01").await.unwrap();
        }

        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let checkout = checkout.clone();
                tokio::spawn(async move {
                    let mut session = checkout.lock().await;
                    session.refresh_cart().await.map(|cart| cart.items[0].quantity)
                })
            })
            .collect();

        let mut seen = Vec::new();
        for task in tasks {
            seen.push(task.await.unwrap().unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![2, 3]);

        let held = checkout.cart().await.unwrap();
        assert_eq!(held.items[0].quantity, 3);
        assert_eq!(checkout.step().await, CheckoutStep::Cart);

        let session = checkout.lock().await;
        assert_eq!(session.client().transport().requests().len(), 3);
        assert_eq!(session.client().transport().pending(), 0);
    }
}
