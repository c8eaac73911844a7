//! Search intent snapshot and the listing predicate.

use serde::Serialize;

use crate::listing::{Listing, PropertyType, RoomSize};

/// Upper bound of the price slider.
pub const PRICE_CEILING: f64 = 10_000.0;
pub const PRICE_STEP: f64 = 100.0;

/// Inclusive monthly price bounds, always ordered and within `[0, PRICE_CEILING]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    min: f64,
    max: f64,
}

impl PriceRange {
    /// Clamps both ends into range. A minimum above the maximum collapses onto it.
    pub fn new(min: f64, max: f64) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, PRICE_CEILING) };
        let max = clamp(max);
        let min = clamp(min).min(max);
        Self { min, max }
    }

    pub fn full() -> Self {
        Self {
            min: 0.0,
            max: PRICE_CEILING,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    pub fn is_full(&self) -> bool {
        self.min <= 0.0 && self.max >= PRICE_CEILING
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::full()
    }
}

/// Complete snapshot of the filter controls. A new one replaces the old one
/// wholesale on every control change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterState {
    pub location: String,
    pub price_range: PriceRange,
    pub property_type: Option<PropertyType>,
    pub room_size: Option<RoomSize>,
}

impl FilterState {
    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    pub fn with_price_range(self, price_range: PriceRange) -> Self {
        Self {
            price_range,
            ..self
        }
    }

    pub fn with_property_type(self, property_type: PropertyType) -> Self {
        Self {
            property_type: Some(property_type),
            ..self
        }
    }

    pub fn with_room_size(self, room_size: RoomSize) -> Self {
        Self {
            room_size: Some(room_size),
            ..self
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.location.is_empty()
            && self.price_range.is_full()
            && self.property_type.is_none()
            && self.room_size.is_none()
    }

    /// True when the listing satisfies every active constraint.
    ///
    /// Size and type compare the raw listing value against the selection's
    /// wire string exactly; a listing without the attribute fails a set
    /// constraint. Location is a case-insensitive substring test.
    pub fn matches(&self, listing: &Listing) -> bool {
        if !self.price_range.contains(listing.price) {
            return false;
        }

        if let Some(size) = self.room_size {
            if listing.room_size.as_deref() != Some(size.as_str()) {
                return false;
            }
        }

        if let Some(kind) = self.property_type {
            if listing.property_type.as_deref() != Some(kind.as_str()) {
                return false;
            }
        }

        if !self.location.is_empty()
            && !listing
                .location
                .to_lowercase()
                .contains(&self.location.to_lowercase())
        {
            return false;
        }

        true
    }
}
