use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

use crate::models::common::{ Coordinates, PropertyType, VerificationStatus };
use crate::models::user::User;

/// A registered land parcel as returned by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub size: f64,
    pub price: f64,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub owner: Option<OwnerRef>,
    #[serde(default)]
    pub documents: Vec<PropertyDocument>,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub registration_date: Option<DateTime<Utc>>,
}

impl Property {
    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().map(OwnerRef::id)
    }

    /// The image flagged as main, if any
    pub fn main_image(&self) -> Option<&PropertyImage> {
        self.images.iter().find(|image| image.is_main)
    }

    /// Case-insensitive match on title, area or city
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.title, &self.location.area, &self.location.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// The owner is either populated or a bare reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    User(User),
    Id(String),
}

impl OwnerRef {
    pub fn id(&self) -> &str {
        match self {
            OwnerRef::User(user) => &user.id,
            OwnerRef::Id(id) => id,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            OwnerRef::User(user) => user.full_name(),
            OwnerRef::Id(id) => id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDocument {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub doc_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

/// `GET /properties` envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPage {
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total: u64,
}

/// `GET /properties/search` envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertySearchResults {
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// Price buckets offered by the search view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceRange {
    #[default]
    All,
    Under100k,
    From100kTo500k,
    Above500k,
}

impl PriceRange {
    /// `(minPrice, maxPrice)` query bounds
    pub fn bounds(&self) -> (Option<u64>, Option<u64>) {
        match self {
            PriceRange::All => (None, None),
            PriceRange::Under100k => (None, Some(100_000)),
            PriceRange::From100kTo500k => (Some(100_000), Some(500_000)),
            PriceRange::Above500k => (Some(500_000), None),
        }
    }

    pub fn parse(value: &str) -> Option<PriceRange> {
        match value.trim() {
            "all" | "" => Some(PriceRange::All),
            "0-100000" | "under-100k" => Some(PriceRange::Under100k),
            "100000-500000" | "100k-500k" => Some(PriceRange::From100kTo500k),
            "500000" | "above-500k" => Some(PriceRange::Above500k),
            _ => None,
        }
    }
}

/// Server-side search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub property_type: Option<PropertyType>,
    pub verification_status: Option<VerificationStatus>,
    pub price: PriceRange,
    /// Applied client-side to the returned set
    pub text: String,
}

impl SearchQuery {
    /// Query-string pairs, omitting unset filters
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(property_type) = self.property_type {
            params.push(("type", property_type.as_str().to_string()));
        }
        if let Some(status) = self.verification_status {
            params.push(("verificationStatus", status.as_str().to_string()));
        }
        let (min, max) = self.price.bounds();
        if let Some(min) = min {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = max {
            params.push(("maxPrice", max.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_property() {
        let json = r#"{
            "_id": "p1",
            "title": "Hillside plot",
            "type": "residential",
            "size": 500,
            "price": 120000,
            "location": {"address": "12 Hill Rd", "area": "western-urban", "city": "Freetown"},
            "owner": {"_id": "u1", "firstName": "Ada", "lastName": "Cole", "email": "ada@x.io"},
            "images": [{"url": "/a.jpg", "isMain": false}, {"url": "/b.jpg", "isMain": true}],
            "verificationStatus": "pending",
            "registrationDate": "2024-03-01T10:00:00Z"
        }"#;
        let property: Property = serde_json::from_str(json).unwrap();
        assert_eq!(property.owner_id(), Some("u1"));
        assert_eq!(property.main_image().map(|i| i.url.as_str()), Some("/b.jpg"));
        assert_eq!(property.verification_status, VerificationStatus::Pending);
        assert!(property.matches_text("freetown"));
        assert!(!property.matches_text("bo town"));
    }

    #[test]
    fn search_params_skip_unset_filters() {
        let query = SearchQuery {
            property_type: Some(PropertyType::Commercial),
            price: PriceRange::Above500k,
            ..SearchQuery::default()
        };
        assert_eq!(
            query.to_params(),
            vec![("type", "commercial".to_string()), ("minPrice", "500000".to_string())]
        );
    }
}
