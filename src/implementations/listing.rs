use log::debug;

use crate::errors::RegistryResult;
use crate::models::common::{ PropertyType, VerificationStatus };
use crate::models::property::Property;
use crate::traits::backend::BackendApi;

/// Client-side filter of the properties view. `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub status: Option<VerificationStatus>,
    pub property_type: Option<PropertyType>,
}

impl ListFilter {
    pub fn matches(&self, property: &Property) -> bool {
        self.status.map_or(true, |status| property.verification_status == status) &&
            self.property_type.map_or(true, |kind| property.property_type == kind)
    }
}

/// Properties fetched once per view, filtered locally
#[derive(Debug, Clone, Default)]
pub struct PropertyList {
    properties: Vec<Property>,
    filter: ListFilter,
}

impl PropertyList {
    pub async fn load<B>(backend: &B) -> RegistryResult<Self> where B: BackendApi + ?Sized {
        let page = backend.list_properties().await?;
        debug!("Loaded {} properties", page.properties.len());
        Ok(Self::from_properties(page.properties))
    }

    pub fn from_properties(properties: Vec<Property>) -> Self {
        Self { properties, filter: ListFilter::default() }
    }

    /// Change the filter. Never triggers a fetch.
    pub fn set_filter(&mut self, filter: ListFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> ListFilter {
        self.filter
    }

    pub fn all(&self) -> &[Property] {
        &self.properties
    }

    pub fn visible(&self) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|property| self.filter.matches(property))
            .collect()
    }
}
