use crate::errors::FieldErrors;
use crate::models::common::{ Coordinates, PaymentMethod, PropertyType };
use crate::validation;

/// Raw values of the property registration form, shared by all steps
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub title: String,
    pub property_type: String,
    pub property_size: String,
    pub property_description: String,
    pub price: String,
    pub street_address: String,
    pub city: String,
    pub district: String,
    pub coordinates: String,
    pub payment_method: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDetails {
    pub title: String,
    pub property_type: PropertyType,
    pub size: f64,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationDetails {
    pub street_address: String,
    pub city: String,
    pub district: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub amount: f64,
}

impl RegistrationForm {
    pub fn validate_details(&self) -> Result<PropertyDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let title = validation::required(&mut errors, "title", &self.title, "Property title is required");
        let property_type = validation
            ::required(&mut errors, "propertyType", &self.property_type, "Property type is required")
            .and_then(|raw| {
                let parsed = raw.parse::<PropertyType>().ok();
                if parsed.is_none() {
                    errors.add("propertyType", "Property type must be residential, commercial or agricultural");
                }
                parsed
            });
        let size = validation::positive_number(
            &mut errors,
            "propertySize",
            &self.property_size,
            "Property size is required"
        );
        let description = validation::required(
            &mut errors,
            "propertyDescription",
            &self.property_description,
            "Description is required"
        );
        let price = validation::positive_number(&mut errors, "price", &self.price, "Price is required");

        match (title, property_type, size, description, price) {
            (Some(title), Some(property_type), Some(size), Some(description), Some(price)) if errors.is_empty() => {
                Ok(PropertyDetails { title, property_type, size, description, price })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_location(&self) -> Result<LocationDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let street_address = validation::required(
            &mut errors,
            "streetAddress",
            &self.street_address,
            "Street address is required"
        );
        let city = validation::required(&mut errors, "city", &self.city, "City is required");
        let district = validation::required(&mut errors, "district", &self.district, "District is required");
        let coordinates = validation
            ::required(&mut errors, "coordinates", &self.coordinates, "Coordinates are required")
            .and_then(|raw| {
                let parsed = validation::parse_coordinates(&raw);
                if parsed.is_none() {
                    errors.add("coordinates", "Coordinates must look like \"lat, lng\"");
                }
                parsed
            });

        match (street_address, city, district, coordinates) {
            (Some(street_address), Some(city), Some(district), Some((lat, lng))) if errors.is_empty() => {
                Ok(LocationDetails {
                    street_address,
                    city,
                    district,
                    coordinates: Coordinates { lat, lng },
                })
            }
            _ => Err(errors),
        }
    }

    pub fn validate_payment(&self) -> Result<PaymentDetails, FieldErrors> {
        let mut errors = FieldErrors::new();
        let method = validation
            ::required(&mut errors, "paymentMethod", &self.payment_method, "Payment method is required")
            .and_then(|raw| {
                let parsed = raw.parse::<PaymentMethod>().ok();
                if parsed.is_none() {
                    errors.add("paymentMethod", "Unknown payment method");
                }
                parsed
            });
        let amount = validation::positive_number(&mut errors, "amount", &self.amount, "Amount is required");

        match (method, amount) {
            (Some(method), Some(amount)) if errors.is_empty() => Ok(PaymentDetails { method, amount }),
            _ => Err(errors),
        }
    }
}

/// Everything `POST /properties` needs besides the files
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub details: PropertyDetails,
    pub location: LocationDetails,
}

impl NewProperty {
    /// Multi-part text fields, nested keys in bracket notation
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let d = &self.details;
        let l = &self.location;
        vec![
            ("title".to_string(), d.title.clone()),
            ("type".to_string(), d.property_type.as_str().to_string()),
            ("size".to_string(), d.size.to_string()),
            ("description".to_string(), d.description.clone()),
            ("price".to_string(), d.price.to_string()),
            ("location[address]".to_string(), l.street_address.clone()),
            ("location[area]".to_string(), l.district.clone()),
            ("location[city]".to_string(), l.city.clone()),
            ("location[coordinates][lat]".to_string(), l.coordinates.lat.to_string()),
            ("location[coordinates][lng]".to_string(), l.coordinates.lng.to_string())
        ]
    }
}
