//! The checkout state machine.
//!
//! A [`CheckoutSession`] owns the single cart snapshot. Every successful
//! mutation replaces the snapshot wholesale with the cart the server sent
//! back; a failed one leaves it untouched and fills the error slot. Each
//! operation clears the slot before it starts. Nothing is retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use medusa_sdk::client::{ApiError, HttpTransport, StoreClient, Transport};
use medusa_sdk::objects::CompleteCartResponse;
use medusa_sdk::objects::address::AddressInput;
use medusa_sdk::objects::cart::{Cart, PaymentProvider};
use medusa_sdk::objects::dynamic::Metadata;
use medusa_sdk::objects::order::Order;
use medusa_sdk::objects::requests::{
    AddLineItemRequest, AddShippingMethodRequest, CreateCartRequest, InitPaymentSessionRequest,
    Patch, UpdateCartRequest, UpdateLineItemRequest,
};
use medusa_sdk::objects::shipping::ShippingOption;
use tracing::{debug, info, warn};

use crate::error::CheckoutError;
use crate::readiness::{self, Requirement};
use crate::step::CheckoutStep;

/// Checkout wizard state: current step, cart snapshot, the reads that hang
/// off it, and the error slot.
#[derive(Debug)]
pub struct CheckoutSession<T = HttpTransport> {
    client: StoreClient<T>,
    step: CheckoutStep,
    cart: Option<Cart>,
    order: Option<Order>,
    shipping_options: Vec<ShippingOption>,
    payment_providers: Vec<PaymentProvider>,
    error: Option<CheckoutError>,
    loading: Arc<AtomicBool>,
}

impl<T: Transport> CheckoutSession<T> {
    pub fn new(client: StoreClient<T>) -> Self {
        Self {
            client,
            step: CheckoutStep::Cart,
            cart: None,
            order: None,
            shipping_options: Vec::new(),
            payment_providers: Vec::new(),
            error: None,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn client(&self) -> &StoreClient<T> {
        &self.client
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn cart(&self) -> Option<&Cart> {
        self.cart.as_ref()
    }

    /// The order, once completion has succeeded.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Options from the last successful [`Self::list_shipping_options`].
    pub fn shipping_options(&self) -> &[ShippingOption] {
        &self.shipping_options
    }

    /// Providers from the last successful [`Self::list_payment_providers`].
    pub fn payment_providers(&self) -> &[PaymentProvider] {
        &self.payment_providers
    }

    pub fn last_error(&self) -> Option<&CheckoutError> {
        self.error.as_ref()
    }

    /// An operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Drop the cart, the order, every cached read and the error; back to
    /// [`CheckoutStep::Cart`].
    pub fn reset(&mut self) {
        debug!(from = %self.step, "Checkout reset");
        self.step = CheckoutStep::Cart;
        self.cart = None;
        self.order = None;
        self.shipping_options.clear();
        self.payment_providers.clear();
        self.error = None;
        self.loading.store(false, Ordering::Release);
    }

    // ── Navigation ─────────────────────────────────────────────────────

    /// Move to the next step. Does nothing from `Confirmation` (only
    /// [`Self::complete`] reaches `Complete`) or from `Complete`.
    pub fn advance(&mut self) -> bool {
        match self.step.next() {
            Some(next) => {
                self.move_to(next);
                true
            }
            None => false,
        }
    }

    /// Move to the previous step. Does nothing from `Cart` or `Complete`.
    pub fn retreat(&mut self) -> bool {
        match self.step.previous() {
            Some(previous) => {
                self.move_to(previous);
                true
            }
            None => false,
        }
    }

    /// Go straight to `step` without checking readiness; callers consult
    /// [`Self::missing_requirements`] themselves. Refused for `Complete`
    /// and once the checkout is complete.
    pub fn jump_to(&mut self, step: CheckoutStep) -> bool {
        if self.step.is_terminal() || step.is_terminal() {
            return false;
        }
        self.move_to(step);
        true
    }

    /// Advance only if the current step's readiness holds; otherwise report
    /// what is missing. Never touches the error slot.
    pub fn try_advance(&mut self) -> Result<CheckoutStep, Vec<Requirement>> {
        let missing = self.missing_requirements(self.step);
        if !missing.is_empty() {
            return Err(missing);
        }
        if self.advance() {
            Ok(self.step)
        } else {
            Err(Vec::new())
        }
    }

    /// What the held cart still lacks to leave `step`.
    pub fn missing_requirements(&self, step: CheckoutStep) -> Vec<Requirement> {
        readiness::missing_for(step, self.cart.as_ref())
    }

    /// Whether the held cart may leave `step`.
    pub fn can_leave(&self, step: CheckoutStep) -> bool {
        self.cart
            .as_ref()
            .is_some_and(|cart| readiness::can_leave(step, cart))
    }

    fn move_to(&mut self, step: CheckoutStep) {
        if step != self.step {
            debug!(from = %self.step, to = %step, "Checkout step changed");
            self.step = step;
        }
    }

    // ── Cart lifecycle ─────────────────────────────────────────────────

    /// Create a new cart and hold it, replacing any cart held before.
    pub async fn create_cart(&mut self, body: &CreateCartRequest) -> Result<&Cart, CheckoutError> {
        const OP: &str = "create_cart";
        let _loading = self.start(OP)?;
        let result = self.client.create_cart(body).await;
        self.adopt(OP, result)
    }

    /// Hold a cart, creating one in `region_id` if none is held yet.
    pub async fn ensure_cart(&mut self, region_id: Option<&str>) -> Result<&Cart, CheckoutError> {
        if self.cart.is_some() {
            let _loading = self.start("ensure_cart")?;
            return self.cart.as_ref().ok_or_else(CheckoutError::no_active_cart);
        }
        let body = CreateCartRequest {
            region_id: region_id.map(str::to_owned),
            ..CreateCartRequest::default()
        };
        self.create_cart(&body).await
    }

    /// Fetch a cart by id (e.g. one persisted from an earlier run) and hold
    /// it.
    pub async fn load_cart(&mut self, cart_id: &str) -> Result<&Cart, CheckoutError> {
        const OP: &str = "load_cart";
        let _loading = self.start(OP)?;
        let result = self.client.get_cart(cart_id).await;
        self.adopt(OP, result)
    }

    /// Re-fetch the held cart.
    pub async fn refresh_cart(&mut self) -> Result<&Cart, CheckoutError> {
        const OP: &str = "refresh_cart";
        let (cart_id, _loading) = self.begin(OP)?;
        let result = self.client.get_cart(&cart_id).await;
        self.adopt(OP, result)
    }

    /// Update cart-level fields (email, region, customer, addresses,
    /// metadata).
    pub async fn update_cart(&mut self, body: &UpdateCartRequest) -> Result<&Cart, CheckoutError> {
        const OP: &str = "update_cart";
        let (cart_id, _loading) = self.begin(OP)?;
        let result = self.client.update_cart(&cart_id, body).await;
        self.adopt(OP, result)
    }

    pub async fn set_email(&mut self, email: &str) -> Result<&Cart, CheckoutError> {
        const OP: &str = "set_email";
        let (cart_id, _loading) = self.begin(OP)?;
        let email = email.trim();
        if !looks_like_email(email) {
            return Err(self.fail(
                OP,
                CheckoutError::validation(format!("{email:?} is not an email address")),
            ));
        }
        let body = UpdateCartRequest {
            email: Patch::Set(email.to_owned()),
            ..UpdateCartRequest::default()
        };
        let result = self.client.update_cart(&cart_id, &body).await;
        self.adopt(OP, result)
    }

    // ── Line items ─────────────────────────────────────────────────────

    pub async fn add_line_item(
        &mut self,
        variant_id: &str,
        quantity: u32,
    ) -> Result<&Cart, CheckoutError> {
        const OP: &str = "add_line_item";
        let (cart_id, _loading) = self.begin(OP)?;
        let body = AddLineItemRequest {
            variant_id: variant_id.to_owned(),
            quantity,
            metadata: None,
        };
        let result = self.client.add_line_item(&cart_id, &body).await;
        self.adopt(OP, result)
    }

    /// Change a line's quantity. Zero is rejected; use
    /// [`Self::remove_line_item`].
    pub async fn update_line_item(
        &mut self,
        line_item_id: &str,
        quantity: u32,
    ) -> Result<&Cart, CheckoutError> {
        const OP: &str = "update_line_item";
        let (cart_id, _loading) = self.begin(OP)?;
        let body = UpdateLineItemRequest {
            quantity,
            metadata: None,
        };
        let result = self
            .client
            .update_line_item(&cart_id, line_item_id, &body)
            .await;
        self.adopt(OP, result)
    }

    pub async fn remove_line_item(&mut self, line_item_id: &str) -> Result<&Cart, CheckoutError> {
        const OP: &str = "remove_line_item";
        let (cart_id, _loading) = self.begin(OP)?;
        let result = self.client.remove_line_item(&cart_id, line_item_id).await;
        self.adopt(OP, result)
    }

    // ── Addresses ──────────────────────────────────────────────────────

    pub async fn set_shipping_address(
        &mut self,
        address: AddressInput,
    ) -> Result<&Cart, CheckoutError> {
        const OP: &str = "set_shipping_address";
        let (cart_id, _loading) = self.begin(OP)?;
        if let Err(e) = address.validate() {
            return Err(self.fail(OP, CheckoutError::validation(format!("shipping {e}"))));
        }
        let body = UpdateCartRequest {
            shipping_address: Patch::Set(address),
            ..UpdateCartRequest::default()
        };
        let result = self.client.update_cart(&cart_id, &body).await;
        self.adopt(OP, result)
    }

    pub async fn set_billing_address(
        &mut self,
        address: AddressInput,
    ) -> Result<&Cart, CheckoutError> {
        const OP: &str = "set_billing_address";
        let (cart_id, _loading) = self.begin(OP)?;
        if let Err(e) = address.validate() {
            return Err(self.fail(OP, CheckoutError::validation(format!("billing {e}"))));
        }
        let body = UpdateCartRequest {
            billing_address: Patch::Set(address),
            ..UpdateCartRequest::default()
        };
        let result = self.client.update_cart(&cart_id, &body).await;
        self.adopt(OP, result)
    }

    // ── Shipping ───────────────────────────────────────────────────────

    /// Fetch the shipping options for the held cart. A read: the snapshot
    /// is not touched.
    pub async fn list_shipping_options(&mut self) -> Result<&[ShippingOption], CheckoutError> {
        const OP: &str = "list_shipping_options";
        let (cart_id, _loading) = self.begin(OP)?;
        match self.client.list_shipping_options(&cart_id).await {
            Ok(options) => {
                debug!(operation = OP, %cart_id, count = options.len(), "Shipping options loaded");
                self.shipping_options = options;
                Ok(&self.shipping_options)
            }
            Err(e) => Err(self.fail(OP, e.into())),
        }
    }

    /// Attach a shipping option, with any provider-specific `data` the
    /// fulfillment provider expects (e.g. a pickup point id).
    pub async fn add_shipping_method(
        &mut self,
        option_id: &str,
        data: Option<Metadata>,
    ) -> Result<&Cart, CheckoutError> {
        const OP: &str = "add_shipping_method";
        let (cart_id, _loading) = self.begin(OP)?;
        let body = AddShippingMethodRequest {
            option_id: option_id.to_owned(),
            data,
        };
        let result = self.client.add_shipping_method(&cart_id, &body).await;
        self.adopt(OP, result)
    }

    // ── Payment ────────────────────────────────────────────────────────

    /// Fetch the payment providers of the held cart's region. A read.
    pub async fn list_payment_providers(&mut self) -> Result<&[PaymentProvider], CheckoutError> {
        const OP: &str = "list_payment_providers";
        let (_, _loading) = self.begin(OP)?;
        let region_id = match self.cart.as_ref().and_then(|cart| cart.region_id.clone()) {
            Some(region_id) => region_id,
            None => {
                return Err(self.fail(OP, CheckoutError::validation("cart has no region")));
            }
        };
        match self.client.list_payment_providers(&region_id).await {
            Ok(providers) => {
                debug!(operation = OP, %region_id, count = providers.len(), "Payment providers loaded");
                self.payment_providers = providers;
                Ok(&self.payment_providers)
            }
            Err(e) => Err(self.fail(OP, e.into())),
        }
    }

    /// Make sure the cart has a payment collection, then re-fetch the cart.
    pub async fn init_payment_sessions(&mut self) -> Result<&Cart, CheckoutError> {
        const OP: &str = "init_payment_sessions";
        let (cart_id, _loading) = self.begin(OP)?;
        let result = match self.client.create_payment_collection(&cart_id).await {
            Ok(_) => self.client.get_cart(&cart_id).await,
            Err(e) => Err(e),
        };
        self.adopt(OP, result)
    }

    /// Open a session with `provider_id`, creating the payment collection
    /// first if the cart has none, then re-fetch the cart.
    pub async fn select_payment_session(
        &mut self,
        provider_id: &str,
    ) -> Result<&Cart, CheckoutError> {
        self.payment_session("select_payment_session", provider_id, None)
            .await
    }

    /// Send provider-specific data for the session with `provider_id`, then
    /// re-fetch the cart.
    pub async fn update_payment_session(
        &mut self,
        provider_id: &str,
        data: Metadata,
    ) -> Result<&Cart, CheckoutError> {
        self.payment_session("update_payment_session", provider_id, Some(data))
            .await
    }

    async fn payment_session(
        &mut self,
        operation: &'static str,
        provider_id: &str,
        data: Option<Metadata>,
    ) -> Result<&Cart, CheckoutError> {
        let (cart_id, _loading) = self.begin(operation)?;
        let existing = self
            .cart
            .as_ref()
            .and_then(|cart| cart.payment_collection.as_ref())
            .map(|collection| collection.id.clone());
        if existing.is_none() && data.is_some() {
            return Err(self.fail(
                operation,
                CheckoutError::validation("no payment session to update; select a provider first"),
            ));
        }

        let body = InitPaymentSessionRequest {
            provider_id: provider_id.to_owned(),
            data,
        };
        let result = self.open_session(&cart_id, existing, &body).await;
        self.adopt(operation, result)
    }

    async fn open_session(
        &self,
        cart_id: &str,
        collection_id: Option<String>,
        body: &InitPaymentSessionRequest,
    ) -> Result<Cart, ApiError> {
        let collection_id = match collection_id {
            Some(id) => id,
            None => self.client.create_payment_collection(cart_id).await?.id,
        };
        self.client
            .init_payment_session(&collection_id, body)
            .await?;
        self.client.get_cart(cart_id).await
    }

    // ── Promotions ─────────────────────────────────────────────────────

    pub async fn apply_discount(&mut self, code: &str) -> Result<&Cart, CheckoutError> {
        const OP: &str = "apply_discount";
        let (cart_id, _loading) = self.begin(OP)?;
        let codes = [code.trim().to_owned()];
        let result = self.client.apply_promo_codes(&cart_id, &codes).await;
        self.adopt(OP, result)
    }

    pub async fn remove_discount(&mut self, code: &str) -> Result<&Cart, CheckoutError> {
        const OP: &str = "remove_discount";
        let (cart_id, _loading) = self.begin(OP)?;
        let codes = [code.trim().to_owned()];
        let result = self.client.remove_promo_codes(&cart_id, &codes).await;
        self.adopt(OP, result)
    }

    // ── Completion ─────────────────────────────────────────────────────

    /// Ask the server to convert the held cart into an order. Only allowed
    /// from `Confirmation`. On success the session moves to `Complete` and
    /// holds the order; on any failure it stays at `Confirmation` with the
    /// snapshot unchanged.
    pub async fn complete(&mut self) -> Result<&Order, CheckoutError> {
        const OP: &str = "complete";
        let (cart_id, _loading) = self.begin(OP)?;
        if self.step != CheckoutStep::Confirmation {
            let error = CheckoutError::invalid_transition(format!(
                "cannot complete from the {} step",
                self.step
            ));
            return Err(self.fail(OP, error));
        }

        match self.client.complete_cart(&cart_id).await {
            Ok(CompleteCartResponse::Order { order }) => {
                info!(
                    operation = OP,
                    %cart_id,
                    order_id = %order.id,
                    total = order.totals.total,
                    "Checkout completed"
                );
                self.move_to(CheckoutStep::Complete);
                let order: &Order = self.order.insert(order);
                Ok(order)
            }
            Ok(CompleteCartResponse::Cart { error, .. }) => {
                let message = error
                    .map(|e| e.message)
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| "the store did not accept the order".to_owned());
                Err(self.fail(OP, CheckoutError::completion_rejected(message)))
            }
            Err(e) => Err(self.fail(OP, e.into())),
        }
    }

    // ── Operation bookkeeping ──────────────────────────────────────────

    /// Clear the error slot and mark an operation in flight until the
    /// returned guard drops, including when the operation's future is
    /// dropped mid-flight. Refused once the checkout is complete.
    fn start(&mut self, operation: &'static str) -> Result<InFlight, CheckoutError> {
        self.error = None;
        debug!(operation, step = %self.step, "Checkout operation started");
        if self.step.is_terminal() {
            return Err(self.fail(
                operation,
                CheckoutError::invalid_transition("checkout is complete; reset to start over"),
            ));
        }
        Ok(InFlight::begin(&self.loading))
    }

    /// [`Self::start`], then return the held cart's id.
    fn begin(&mut self, operation: &'static str) -> Result<(String, InFlight), CheckoutError> {
        let in_flight = self.start(operation)?;
        match &self.cart {
            Some(cart) => Ok((cart.id.clone(), in_flight)),
            None => Err(self.fail(operation, CheckoutError::no_active_cart())),
        }
    }

    /// Record a failure in the error slot and hand it back.
    fn fail(&mut self, operation: &'static str, error: CheckoutError) -> CheckoutError {
        warn!(
            operation,
            cart_id = self.cart.as_ref().map(|cart| cart.id.as_str()),
            kind = ?error.kind,
            status = error.status,
            error = %error,
            "Checkout operation failed"
        );
        self.error = Some(error.clone());
        error
    }

    /// Replace the snapshot with the server's cart, or record the failure
    /// and keep the old one.
    ///
    /// A different cart restarts the wizard at `Cart`; a different cart or
    /// region drops the cached shipping options and payment providers.
    fn adopt(
        &mut self,
        operation: &'static str,
        result: Result<Cart, ApiError>,
    ) -> Result<&Cart, CheckoutError> {
        match result {
            Ok(cart) => {
                let (switched, region_changed) = match &self.cart {
                    Some(held) => (held.id != cart.id, held.region_id != cart.region_id),
                    None => (true, true),
                };
                if switched || region_changed {
                    self.shipping_options.clear();
                    self.payment_providers.clear();
                }
                if switched {
                    self.move_to(CheckoutStep::Cart);
                }
                info!(
                    operation,
                    cart_id = %cart.id,
                    items = cart.items.len(),
                    total = cart.totals.total,
                    "Cart snapshot replaced"
                );
                let cart: &Cart = self.cart.insert(cart);
                Ok(cart)
            }
            Err(e) => Err(self.fail(operation, e.into())),
        }
    }
}

/// Marks an operation in flight; clears the mark when dropped.
#[derive(Debug)]
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn begin(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self(Arc::clone(flag))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
