//! Parties (postal addresses), carts and the storefront handle.

use serde::{Deserialize, Serialize};

use super::id::{CartId, CustomerId, PartyId};

/// A postal address owned by a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// The address ID.
    pub external_id: PartyId,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Company name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Address line 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    /// Address line 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// State or province code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Postal/ZIP code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_postal_code: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Whether this is the customer's primary address.
    #[serde(default)]
    pub is_primary: bool,
}

impl Party {
    /// A party reference carrying only its ID.
    ///
    /// Enough for removal requests.
    #[must_use]
    pub fn reference(external_id: impl Into<PartyId>) -> Self {
        Self {
            external_id: external_id.into(),
            ..Self::default()
        }
    }
}

/// The storefront an operation runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storefront {
    /// Shop name known to the backend.
    pub shop_name: String,
}

impl Storefront {
    /// Create a storefront handle.
    #[must_use]
    pub fn new(shop_name: impl Into<String>) -> Self {
        Self {
            shop_name: shop_name.into(),
        }
    }
}

/// A shopping cart, as far as the account facade needs to know it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// The cart ID.
    pub external_id: CartId,
    /// The customer (or anonymous visitor) owning the cart.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Number of lines in the cart.
    #[serde(default)]
    pub line_count: u32,
}
