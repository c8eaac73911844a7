//! Browse-side listing record and the enumerated filter choices.

use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

/// One rentable unit as shown on the public listing grid.
///
/// `room_size` and `property_type` stay raw strings: the listing source may
/// carry values outside the select options, and those simply never match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
}

impl Listing {
    pub fn primary_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Condo,
    Studio,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Condo,
        PropertyType::Studio,
    ];

    /// Value carried on the wire and compared against `Listing::property_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::House => "house",
            PropertyType::Condo => "condo",
            PropertyType::Studio => "studio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::House => "House",
            PropertyType::Condo => "Condo",
            PropertyType::Studio => "Studio",
        }
    }

    /// Blank or unknown select values mean "any type".
    pub fn parse_selection(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomSize {
    #[serde(rename = "studio")]
    Studio,
    #[serde(rename = "1")]
    OneBedroom,
    #[serde(rename = "2")]
    TwoBedrooms,
    #[serde(rename = "3")]
    ThreeBedrooms,
    #[serde(rename = "4")]
    FourPlusBedrooms,
}

impl RoomSize {
    pub const ALL: [RoomSize; 5] = [
        RoomSize::Studio,
        RoomSize::OneBedroom,
        RoomSize::TwoBedrooms,
        RoomSize::ThreeBedrooms,
        RoomSize::FourPlusBedrooms,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomSize::Studio => "studio",
            RoomSize::OneBedroom => "1",
            RoomSize::TwoBedrooms => "2",
            RoomSize::ThreeBedrooms => "3",
            RoomSize::FourPlusBedrooms => "4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoomSize::Studio => "Studio",
            RoomSize::OneBedroom => "1 Bedroom",
            RoomSize::TwoBedrooms => "2 Bedrooms",
            RoomSize::ThreeBedrooms => "3 Bedrooms",
            RoomSize::FourPlusBedrooms => "4+ Bedrooms",
        }
    }

    pub fn parse_selection(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}
