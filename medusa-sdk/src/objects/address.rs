//! Shipping and billing addresses.

use serde::{Deserialize, Serialize};

use super::dynamic::Metadata;

/// An address attached to a cart or order, as returned by the server.
///
/// The server stores partially filled addresses, so required fields decode
/// `null` as an empty string; [`Address::is_complete`] tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub address_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub city: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Address {
    /// Every required field is non-blank.
    pub fn is_complete(&self) -> bool {
        missing_required([&self.address_1, &self.city, &self.country_code, &self.postal_code])
            .is_empty()
    }
}

fn nullable_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// An address the client proposes for a cart.
///
/// Required fields are plain strings so they are always serialized; the
/// server still rejects blanks, so [`AddressInput::validate`] catches them
/// before a request is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub address_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// A required address field that is missing or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Address1,
    City,
    CountryCode,
    PostalCode,
}

impl AddressField {
    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressField::Address1 => "address_1",
            AddressField::City => "city",
            AddressField::CountryCode => "country_code",
            AddressField::PostalCode => "postal_code",
        }
    }
}

impl std::fmt::Display for AddressField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address failed local validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("address is missing required fields: {}", join_fields(.missing))]
pub struct AddressValidationError {
    pub missing: Vec<AddressField>,
}

const REQUIRED: [AddressField; 4] = [
    AddressField::Address1,
    AddressField::City,
    AddressField::CountryCode,
    AddressField::PostalCode,
];

fn missing_required(values: [&str; 4]) -> Vec<AddressField> {
    REQUIRED
        .into_iter()
        .zip(values)
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
}

fn join_fields(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(AddressField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl AddressInput {
    /// Build an input with the four required fields set.
    pub fn new(
        address_1: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            address_1: address_1.into(),
            city: city.into(),
            country_code: country_code.into(),
            postal_code: postal_code.into(),
            ..Self::default()
        }
    }

    /// Check the required fields, reporting every blank one.
    pub fn validate(&self) -> Result<(), AddressValidationError> {
        let missing =
            missing_required([&self.address_1, &self.city, &self.country_code, &self.postal_code]);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressValidationError { missing })
        }
    }
}

impl From<Address> for AddressInput {
    fn from(address: Address) -> Self {
        Self {
            first_name: address.first_name,
            last_name: address.last_name,
            company: address.company,
            address_1: address.address_1,
            address_2: address.address_2,
            city: address.city,
            country_code: address.country_code,
            province: address.province,
            postal_code: address.postal_code,
            phone: address.phone,
            metadata: address.metadata,
        }
    }
}
