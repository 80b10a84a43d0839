//! Record model for one detail page

use serde::{Deserialize, Serialize};

/// Location block of a listing
///
/// Serialized flat into the enclosing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "provinsi", default, skip_serializing_if = "String::is_empty")]
    pub province: String,

    #[serde(rename = "kota", default, skip_serializing_if = "String::is_empty")]
    pub city: String,

    #[serde(rename = "alamat", default, skip_serializing_if = "String::is_empty")]
    pub address: String,
}

/// Structured data extracted from one detail page
///
/// Every field except the URL starts unset (empty string or `false`) and
/// unset fields are left out of the serialized record. The URL is fixed at
/// construction and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    url: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rent_price: String,

    #[serde(flatten)]
    pub location: Location,

    #[serde(rename = "jenis_kost", default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    #[serde(rename = "free_wifi", default, skip_serializing_if = "std::ops::Not::not")]
    pub has_wifi: bool,

    #[serde(rename = "has_ac", default, skip_serializing_if = "std::ops::Not::not")]
    pub has_air_conditioning: bool,

    #[serde(rename = "kamar_mandi", default, skip_serializing_if = "std::ops::Not::not")]
    pub has_private_bathroom: bool,
}

impl Listing {
    /// Creates an empty record for the detail page at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// The detail-page address this record was fetched from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serializes the record as indented JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
