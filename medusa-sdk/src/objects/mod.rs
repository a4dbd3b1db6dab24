pub mod address;
pub mod cart;
pub mod coerce;
pub mod datetime;
pub mod dynamic;
pub mod order;
pub mod product;
pub mod region;
pub mod requests;
pub mod shipping;

use serde::{Deserialize, Deserializer, Serialize};

use self::cart::{Cart, PaymentCollection, PaymentProvider};
use self::order::Order;
use self::product::{Product, ProductCategory};
use self::region::Region;
use self::shipping::ShippingOption;

/// Decode `null` as the type's default, for collections and strings the
/// server sometimes nulls out.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{ "cart": … }`. Line item deletion answers with `{ "parent": … }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEnvelope {
    #[serde(alias = "parent")]
    pub cart: Cart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingOptionsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_options: Vec<ShippingOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCollectionEnvelope {
    pub payment_collection: PaymentCollection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProvidersEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_providers: Vec<PaymentProvider>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEnvelope {
    pub region: Region,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEnvelope {
    pub product: Product,
}

/// Offset-paginated list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(
        alias = "products",
        alias = "product_categories",
        alias = "regions",
        default = "Vec::new"
    )]
    pub items: Vec<T>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub count: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub offset: i64,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub limit: i64,
}

impl<T> Page<T> {
    /// More results exist past this page.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.count
    }
}

pub type ProductPage = Page<Product>;
pub type CategoryPage = Page<ProductCategory>;
pub type RegionPage = Page<Region>;

/// Answer of `POST /store/carts/{id}/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompleteCartResponse {
    /// The cart was converted.
    Order { order: Order },
    /// The server refused to convert; the cart is returned as it stands.
    Cart {
        cart: Cart,
        #[serde(default)]
        error: Option<CompletionError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Error body Medusa sends alongside a failing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
