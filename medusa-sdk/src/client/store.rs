//! Typed client for the Medusa **Store API** (storefront → commerce server).
//!
//! Every request carries the publishable API key in the
//! `x-publishable-api-key` header and JSON content-type / accept headers.
//! Responses with a status of 400 or above become
//! [`ApiError::ServerError`] with the raw body preserved.

use std::any::type_name;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use super::transport::{ApiRequest, HttpTransport, Transport};
use super::{ApiError, HttpMethod, payload_excerpt};
use crate::config::StoreConfig;
use crate::objects::cart::{Cart, PaymentCollection, PaymentProvider};
use crate::objects::product::Product;
use crate::objects::region::Region;
use crate::objects::requests::{
    AddLineItemRequest, AddShippingMethodRequest, CreateCartRequest,
    CreatePaymentCollectionRequest, InitPaymentSessionRequest, ProductQuery, PromoCodesRequest,
    UpdateCartRequest, UpdateLineItemRequest,
};
use crate::objects::shipping::ShippingOption;
use crate::objects::{
    CartEnvelope, CategoryPage, CompleteCartResponse, PaymentCollectionEnvelope,
    PaymentProvidersEnvelope, ProductEnvelope, ProductPage, RegionEnvelope, RegionPage,
    ShippingOptionsEnvelope,
};

/// Header carrying the publishable API key.
pub const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Typed HTTP client for the Medusa Store API.
///
/// Generic over its [`Transport`] so the network can be swapped out; the
/// default is [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct StoreClient<T = HttpTransport> {
    transport: T,
    base_url: Url,
    headers: HeaderMap,
}

impl StoreClient<HttpTransport> {
    /// Create a client over `reqwest` with the configured timeout.
    pub fn new(config: &StoreConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.timeout)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> StoreClient<T> {
    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: &StoreConfig, transport: T) -> Result<Self, ApiError> {
        let mut key = HeaderValue::from_str(&config.publishable_api_key).map_err(|_| {
            ApiError::InvalidRequest("publishable API key is not a valid header value".into())
        })?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(PUBLISHABLE_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            transport,
            base_url: config.base_url.clone(),
            headers,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an absolute endpoint path onto the base URL, keeping any path
    /// prefix the base URL already has.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        if !endpoint.starts_with('/') {
            return Err(ApiError::InvalidRequest(format!(
                "endpoint must start with '/': {endpoint}"
            )));
        }
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{endpoint}"))?)
    }

    /// Send a request to any endpoint and decode the answer as `R`.
    ///
    /// `extra_headers` are added on top of the JSON and key headers and
    /// replace them on conflict. The typed methods below cover the Store
    /// API; this is the escape hatch for everything else.
    pub async fn send<R, B>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
        extra_headers: &HeaderMap,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut headers = self.headers.clone();
        for (name, value) in extra_headers {
            headers.insert(name.clone(), value.clone());
        }
        self.execute(method, endpoint, body, headers).await
    }

    async fn request<R, B>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(method, endpoint, body, self.headers.clone())
            .await
    }

    async fn execute<R, B>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint)?;
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to encode request body: {e}")))?
            .map(Bytes::from);

        debug!(method = %method, url = %url, "Store API request");

        let request = ApiRequest {
            method,
            url: url.clone(),
            headers,
            body,
        };
        let resp = match self.transport.send(request).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(method = %method, url = %url, error = %e, "Store API request failed");
                return Err(e);
            }
        };

        if resp.status >= 400 {
            warn!(
                method = %method,
                url = %url,
                status = resp.status,
                "Store API returned an error status"
            );
            return Err(ApiError::ServerError {
                status: resp.status,
                body: String::from_utf8_lossy(&resp.body).into_owned(),
            });
        }

        serde_json::from_slice(&resp.body).map_err(|source| {
            let payload = payload_excerpt(&resp.body);
            error!(
                url = %url,
                target_type = type_name::<R>(),
                payload = %payload,
                error = %source,
                "Failed to decode Store API response"
            );
            ApiError::DecodeFailure {
                target: type_name::<R>(),
                payload,
                source,
            }
        })
    }

    async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, ApiError> {
        self.request::<R, ()>(HttpMethod::Get, endpoint, None).await
    }

    async fn post<R: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        self.request(HttpMethod::Post, endpoint, Some(body)).await
    }

    // ── Carts ──────────────────────────────────────────────────────────

    /// `POST /store/carts` – create a cart.
    pub async fn create_cart(&self, body: &CreateCartRequest) -> Result<Cart, ApiError> {
        for item in &body.items {
            check_quantity(item.quantity)?;
        }
        let envelope: CartEnvelope = self.post("/store/carts", body).await?;
        Ok(envelope.cart)
    }

    /// `GET /store/carts/{id}` – fetch the current snapshot of a cart.
    pub async fn get_cart(&self, cart_id: &str) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        let envelope: CartEnvelope = self.get(&format!("/store/carts/{id}")).await?;
        Ok(envelope.cart)
    }

    /// `POST /store/carts/{id}` – update cart-level fields, including the
    /// shipping and billing addresses.
    pub async fn update_cart(
        &self,
        cart_id: &str,
        body: &UpdateCartRequest,
    ) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        if let Some(address) = body.shipping_address.as_set() {
            address
                .validate()
                .map_err(|e| ApiError::InvalidRequest(format!("shipping {e}")))?;
        }
        if let Some(address) = body.billing_address.as_set() {
            address
                .validate()
                .map_err(|e| ApiError::InvalidRequest(format!("billing {e}")))?;
        }
        let envelope: CartEnvelope = self.post(&format!("/store/carts/{id}"), body).await?;
        Ok(envelope.cart)
    }

    /// `POST /store/carts/{id}/line-items` – add a variant to the cart.
    pub async fn add_line_item(
        &self,
        cart_id: &str,
        body: &AddLineItemRequest,
    ) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        segment("variant id", &body.variant_id)?;
        check_quantity(body.quantity)?;
        let envelope: CartEnvelope = self
            .post(&format!("/store/carts/{id}/line-items"), body)
            .await?;
        Ok(envelope.cart)
    }

    /// `POST /store/carts/{id}/line-items/{line_id}` – change a quantity.
    ///
    /// A zero quantity is rejected; use [`Self::remove_line_item`].
    pub async fn update_line_item(
        &self,
        cart_id: &str,
        line_item_id: &str,
        body: &UpdateLineItemRequest,
    ) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        let line_id = segment("line item id", line_item_id)?;
        check_quantity(body.quantity)?;
        let envelope: CartEnvelope = self
            .post(&format!("/store/carts/{id}/line-items/{line_id}"), body)
            .await?;
        Ok(envelope.cart)
    }

    /// `DELETE /store/carts/{id}/line-items/{line_id}` – remove a line.
    pub async fn remove_line_item(
        &self,
        cart_id: &str,
        line_item_id: &str,
    ) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        let line_id = segment("line item id", line_item_id)?;
        let envelope: CartEnvelope = self
            .request::<_, ()>(
                HttpMethod::Delete,
                &format!("/store/carts/{id}/line-items/{line_id}"),
                None,
            )
            .await?;
        Ok(envelope.cart)
    }

    // ── Shipping ───────────────────────────────────────────────────────

    /// `GET /store/shipping-options?cart_id={id}` – options the cart is
    /// eligible for.
    pub async fn list_shipping_options(
        &self,
        cart_id: &str,
    ) -> Result<Vec<ShippingOption>, ApiError> {
        let id = segment("cart id", cart_id)?;
        let envelope: ShippingOptionsEnvelope = self
            .get(&format!("/store/shipping-options?cart_id={id}"))
            .await?;
        Ok(envelope.shipping_options)
    }

    /// `POST /store/carts/{id}/shipping-methods` – attach a shipping option.
    pub async fn add_shipping_method(
        &self,
        cart_id: &str,
        body: &AddShippingMethodRequest,
    ) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        segment("shipping option id", &body.option_id)?;
        let envelope: CartEnvelope = self
            .post(&format!("/store/carts/{id}/shipping-methods"), body)
            .await?;
        Ok(envelope.cart)
    }

    // ── Payment ────────────────────────────────────────────────────────

    /// `POST /store/payment-collections` – create (or fetch) the cart's
    /// payment collection.
    pub async fn create_payment_collection(
        &self,
        cart_id: &str,
    ) -> Result<PaymentCollection, ApiError> {
        segment("cart id", cart_id)?;
        let body = CreatePaymentCollectionRequest {
            cart_id: cart_id.to_owned(),
        };
        let envelope: PaymentCollectionEnvelope =
            self.post("/store/payment-collections", &body).await?;
        Ok(envelope.payment_collection)
    }

    /// `POST /store/payment-collections/{id}/payment-sessions` – open or
    /// refresh a session with one provider.
    pub async fn init_payment_session(
        &self,
        payment_collection_id: &str,
        body: &InitPaymentSessionRequest,
    ) -> Result<PaymentCollection, ApiError> {
        let id = segment("payment collection id", payment_collection_id)?;
        segment("provider id", &body.provider_id)?;
        let envelope: PaymentCollectionEnvelope = self
            .post(&format!("/store/payment-collections/{id}/payment-sessions"), body)
            .await?;
        Ok(envelope.payment_collection)
    }

    /// `GET /store/payment-providers?region_id={id}` – providers enabled in
    /// a region.
    pub async fn list_payment_providers(
        &self,
        region_id: &str,
    ) -> Result<Vec<PaymentProvider>, ApiError> {
        let id = segment("region id", region_id)?;
        let envelope: PaymentProvidersEnvelope = self
            .get(&format!("/store/payment-providers?region_id={id}"))
            .await?;
        Ok(envelope.payment_providers)
    }

    // ── Promotions ─────────────────────────────────────────────────────

    /// `POST /store/carts/{id}/promotions` – apply discount codes.
    pub async fn apply_promo_codes(
        &self,
        cart_id: &str,
        codes: &[String],
    ) -> Result<Cart, ApiError> {
        self.promotions(HttpMethod::Post, cart_id, codes).await
    }

    /// `DELETE /store/carts/{id}/promotions` – remove discount codes.
    pub async fn remove_promo_codes(
        &self,
        cart_id: &str,
        codes: &[String],
    ) -> Result<Cart, ApiError> {
        self.promotions(HttpMethod::Delete, cart_id, codes).await
    }

    async fn promotions(
        &self,
        method: HttpMethod,
        cart_id: &str,
        codes: &[String],
    ) -> Result<Cart, ApiError> {
        let id = segment("cart id", cart_id)?;
        if codes.is_empty() || codes.iter().any(|code| code.trim().is_empty()) {
            return Err(ApiError::InvalidRequest(
                "promo codes must be non-empty".into(),
            ));
        }
        let body = PromoCodesRequest {
            promo_codes: codes.to_vec(),
        };
        let envelope: CartEnvelope = self
            .request(method, &format!("/store/carts/{id}/promotions"), Some(&body))
            .await?;
        Ok(envelope.cart)
    }

    // ── Completion ─────────────────────────────────────────────────────

    /// `POST /store/carts/{id}/complete` – convert the cart into an order.
    ///
    /// A refusal (`type: "cart"`) is a successful response; callers decide
    /// how to surface it.
    pub async fn complete_cart(&self, cart_id: &str) -> Result<CompleteCartResponse, ApiError> {
        let id = segment("cart id", cart_id)?;
        self.request::<_, ()>(HttpMethod::Post, &format!("/store/carts/{id}/complete"), None)
            .await
    }

    // ── Catalog ────────────────────────────────────────────────────────

    /// `GET /store/products` – one page of products.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, ApiError> {
        self.get(&format!("/store/products?{}", query.to_query_string()))
            .await
    }

    /// `GET /store/products/{id}` – one product, region-priced if a region
    /// is given.
    pub async fn get_product(
        &self,
        product_id: &str,
        region_id: Option<&str>,
    ) -> Result<Product, ApiError> {
        let id = segment("product id", product_id)?;
        let endpoint = match region_id {
            Some(region_id) => format!(
                "/store/products/{id}?region_id={}",
                segment("region id", region_id)?
            ),
            None => format!("/store/products/{id}"),
        };
        let envelope: ProductEnvelope = self.get(&endpoint).await?;
        Ok(envelope.product)
    }

    /// `GET /store/product-categories`
    pub async fn list_categories(&self) -> Result<CategoryPage, ApiError> {
        self.get("/store/product-categories").await
    }

    /// `GET /store/regions`
    pub async fn list_regions(&self) -> Result<RegionPage, ApiError> {
        self.get("/store/regions").await
    }

    /// `GET /store/regions/{id}`
    pub async fn get_region(&self, region_id: &str) -> Result<Region, ApiError> {
        let id = segment("region id", region_id)?;
        let envelope: RegionEnvelope = self.get(&format!("/store/regions/{id}")).await?;
        Ok(envelope.region)
    }
}

/// Percent-encode an identifier for use in a path or query, rejecting blanks.
fn segment<'a>(what: &str, value: &'a str) -> Result<std::borrow::Cow<'a, str>, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidRequest(format!("{what} must not be empty")));
    }
    Ok(urlencoding::encode(value))
}

fn check_quantity(quantity: u32) -> Result<(), ApiError> {
    if quantity == 0 {
        return Err(ApiError::InvalidRequest(
            "quantity must be at least 1; remove the line item instead".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::{ErrorKind, MockTransport};
    use crate::objects::address::AddressInput;
    use crate::objects::requests::Patch;

    fn client() -> StoreClient<MockTransport> {
        let config = StoreConfig::new(
            Url::parse("https://store.example.com/").unwrap(),
            "pk_test_123",
        );
        StoreClient::with_transport(&config, MockTransport::new()).unwrap()
    }

    fn cart_json(id: &str) -> serde_json::Value {
        json!({ "id": id, "currency_code": "eur", "items": [] })
    }

    #[tokio::test]
    async fn test_headers_and_url() {
        let client = client();
        client
            .transport()
            .push_json(200, json!({ "cart": cart_json("cart_01") }));

        let cart = client.get_cart("cart_01").await.unwrap();
        assert_eq!(cart.id, "cart_01");

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.as_str(), "https://store.example.com/store/carts/cart_01");
        assert_eq!(
            request.headers.get(PUBLISHABLE_KEY_HEADER).unwrap(),
            "pk_test_123"
        );
        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");
        assert!(request.body.is_none());
    }

    #[tokio::test]
    async fn test_send_with_extra_headers() {
        let client = client();
        client
            .transport()
            .push_json(200, json!({ "customer": { "id": "cus_01" } }));

        let mut extra = HeaderMap::new();
        extra.insert("authorization", HeaderValue::from_static("Bearer token"));
        let answer: serde_json::Value = client
            .send(
                HttpMethod::Patch,
                "/store/customers/me",
                Some(&json!({ "first_name": "Ana" })),
                &extra,
            )
            .await
            .unwrap();
        assert_eq!(answer["customer"]["id"], "cus_01");

        let request = &client.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(request.headers.get("authorization").unwrap(), "Bearer token");
        assert_eq!(
            request.headers.get(PUBLISHABLE_KEY_HEADER).unwrap(),
            "pk_test_123"
        );
        assert_eq!(request.json_body(), Some(json!({ "first_name": "Ana" })));
    }

    #[tokio::test]
    async fn test_base_path_prefix_is_kept() {
        let config = StoreConfig::new(
            Url::parse("https://example.com/commerce").unwrap(),
            "pk_test_123",
        );
        let client = StoreClient::with_transport(&config, MockTransport::new()).unwrap();
        client
            .transport()
            .push_json(200, json!({ "regions": [], "count": 0, "offset": 0, "limit": 50 }));
        client.list_regions().await.unwrap();
        assert_eq!(
            client.transport().requests()[0].url.as_str(),
            "https://example.com/commerce/store/regions"
        );
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let client = client();
        client.transport().push_json(
            404,
            json!({ "type": "not_found", "message": "Cart id not found: cart_x" }),
        );
        let err = client.get_cart("cart_x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.server_message().as_deref(), Some("Cart id not found: cart_x"));
    }

    #[tokio::test]
    async fn test_decode_failure_names_target() {
        let client = client();
        client
            .transport()
            .push_json(200, json!({ "cart": { "id": "cart_01", "total": "lots" } }));
        let err = client.get_cart("cart_01").await.unwrap_err();
        match err {
            ApiError::DecodeFailure { target, payload, .. } => {
                assert!(target.contains("CartEnvelope"));
                assert!(payload.contains("lots"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_failure_passes_through() {
        let client = client();
        client.transport().push_error(ApiError::NetworkFailure {
            message: "operation timed out".into(),
            timed_out: true,
        });
        let err = client.get_cart("cart_01").await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_invalid_requests_are_not_sent() {
        let client = client();

        let err = client.get_cart("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let body = UpdateLineItemRequest {
            quantity: 0,
            metadata: None,
        };
        let err = client
            .update_line_item("cart_01", "item_01", &body)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let body = UpdateCartRequest {
            shipping_address: Patch::Set(AddressInput::default()),
            ..UpdateCartRequest::default()
        };
        let err = client.update_cart("cart_01", &body).await.unwrap_err();
        assert!(err.to_string().contains("address_1"));

        let err = client.apply_promo_codes("cart_01", &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_remove_line_item_reads_parent() {
        let client = client();
        client.transport().push_json(
            200,
            json!({ "id": "item_01", "object": "line-item", "deleted": true, "parent": cart_json("cart_01") }),
        );
        let cart = client.remove_line_item("cart_01", "item_01").await.unwrap();
        assert!(cart.items.is_empty());
        let request = &client.transport().requests()[0];
        assert_eq!(request.method, HttpMethod::Delete);
        assert_eq!(request.path_and_query(), "/store/carts/cart_01/line-items/item_01");
    }

    #[tokio::test]
    async fn test_promo_code_body_and_encoding() {
        let client = client();
        client
            .transport()
            .push_json(200, json!({ "cart": cart_json("cart 01") }));
        client
            .apply_promo_codes("cart 01", &["SUMMER25".to_owned()])
            .await
            .unwrap();
        let request = &client.transport().requests()[0];
        assert_eq!(request.path_and_query(), "/store/carts/cart%2001/promotions");
        assert_eq!(request.json_body(), Some(json!({ "promo_codes": ["SUMMER25"] })));
    }

    #[tokio::test]
    async fn test_shipping_options_query() {
        let client = client();
        client.transport().push_json(
            200,
            json!({ "shipping_options": [{ "id": "so_1", "name": "Standard", "amount": 500 }] }),
        );
        let options = client.list_shipping_options("cart_01").await.unwrap();
        assert_eq!(options[0].amount, Some(500));
        assert_eq!(
            client.transport().requests()[0].path_and_query(),
            "/store/shipping-options?cart_id=cart_01"
        );
    }

    #[tokio::test]
    async fn test_product_listing_query() {
        let client = client();
        client.transport().push_json(
            200,
            json!({ "products": [], "count": 0, "offset": 20, "limit": 20 }),
        );
        let query = ProductQuery {
            offset: 20,
            collection_ids: vec!["pcol_1".into()],
            ..ProductQuery::default()
        };
        client.list_products(&query).await.unwrap();
        assert_eq!(
            client.transport().requests()[0].path_and_query(),
            "/store/products?limit=20&offset=20&collection_id[]=pcol_1"
        );
    }
}
