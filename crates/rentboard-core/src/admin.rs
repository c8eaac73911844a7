//! Records edited from the landlord dashboard and exchanged with the rental API.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::listing::Listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Active,
    Inactive,
    #[default]
    Available,
    Unavailable,
}

impl RoomStatus {
    pub const ALL: [RoomStatus; 4] = [
        RoomStatus::Active,
        RoomStatus::Inactive,
        RoomStatus::Available,
        RoomStatus::Unavailable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomStatus::Active => "ACTIVE",
            RoomStatus::Inactive => "INACTIVE",
            RoomStatus::Available => "AVAILABLE",
            RoomStatus::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amenity {
    #[serde(rename = "WiFi")]
    Wifi,
    #[serde(rename = "TV")]
    Tv,
    Parking,
    Kitchen,
    Pool,
    Gym,
}

impl Amenity {
    pub const ALL: [Amenity; 6] = [
        Amenity::Wifi,
        Amenity::Tv,
        Amenity::Parking,
        Amenity::Kitchen,
        Amenity::Pool,
        Amenity::Gym,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Amenity::Wifi => "WiFi",
            Amenity::Tv => "TV",
            Amenity::Parking => "Parking",
            Amenity::Kitchen => "Kitchen",
            Amenity::Pool => "Pool",
            Amenity::Gym => "Gym",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == value.trim())
    }
}

/// Full room record as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub price: f64,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_bed")]
    pub bed: u32,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_bed() -> u32 {
    1
}

impl Room {
    pub fn to_listing(&self) -> Listing {
        Listing {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            location: self.location.clone(),
            images: self.images.clone(),
            amenities: self.amenities.clone(),
            room_size: self.room_size.clone(),
            property_type: self.property_type.clone(),
        }
    }

    /// Overwrites the editable fields with a validated form payload.
    pub fn apply_form(&mut self, data: &RoomFormData) {
        self.name = data.name.clone();
        self.description = data.description.clone();
        self.amenities = data.amenities.iter().map(|a| a.as_str().to_string()).collect();
        self.price = data.price;
        self.location = data.location.clone();
        self.images = data.images.clone();
        self.bed = data.bed;
        self.status = data.status;
    }
}

/// Create/update payload for a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomFormData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amenities: Vec<Amenity>,
    pub price: f64,
    pub location: String,
    pub images: Vec<String>,
    pub bed: u32,
    pub status: RoomStatus,
}

impl Default for RoomFormData {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: Some(String::new()),
            amenities: Vec::new(),
            price: 0.0,
            location: String::new(),
            images: Vec::new(),
            bed: 1,
            status: RoomStatus::Available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Cleaning,
    Maintenance,
    Inspection,
    Repair,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Cleaning,
        ServiceType::Maintenance,
        ServiceType::Inspection,
        ServiceType::Repair,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Cleaning => "CLEANING",
            ServiceType::Maintenance => "MAINTENANCE",
            ServiceType::Inspection => "INSPECTION",
            ServiceType::Repair => "REPAIR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceFrequency {
    Monthly,
    Quarterly,
    Biannually,
    Annually,
}

impl ServiceFrequency {
    pub const ALL: [ServiceFrequency; 4] = [
        ServiceFrequency::Monthly,
        ServiceFrequency::Quarterly,
        ServiceFrequency::Biannually,
        ServiceFrequency::Annually,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceFrequency::Monthly => "MONTHLY",
            ServiceFrequency::Quarterly => "QUARTERLY",
            ServiceFrequency::Biannually => "BIANNUALLY",
            ServiceFrequency::Annually => "ANNUALLY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value.trim())
    }

    pub fn months(self) -> u32 {
        match self {
            ServiceFrequency::Monthly => 1,
            ServiceFrequency::Quarterly => 3,
            ServiceFrequency::Biannually => 6,
            ServiceFrequency::Annually => 12,
        }
    }

    pub fn next_due(self, from: DateTime<Utc>) -> DateTime<Utc> {
        from.checked_add_months(Months::new(self.months()))
            .unwrap_or(from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSchedule {
    pub id: i64,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub frequency: ServiceFrequency,
    pub room_id: i64,
    pub room_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub last_performed: Option<DateTime<Utc>>,
    pub next_due: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceSchedule {
    /// Active schedules whose next visit falls on or before `now + days`.
    pub fn is_due_within(&self, now: DateTime<Utc>, days: i64) -> bool {
        self.is_active && self.next_due <= now + Duration::days(days)
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.last_performed = Some(at);
        self.next_due = self.frequency.next_due(at);
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub id: i64,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub frequency: ServiceFrequency,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceConfigInput {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub frequency: ServiceFrequency,
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceScheduleInput {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub frequency: ServiceFrequency,
    pub room_id: i64,
    pub room_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).single().unwrap()
    }

    #[test]
    fn room_decodes_api_payload_and_projects_to_listing() {
        let room: Room = serde_json::from_str(
            r#"{
                "id": "7",
                "name": "Garden Studio",
                "amenities": ["WiFi", "Kitchen"],
                "price": 1450,
                "location": "Berkeley, CA",
                "images": ["https://cdn.example/rooms/7/a.jpg"],
                "bed": 1,
                "status": "AVAILABLE",
                "propertyType": "studio",
                "createdAt": "2025-01-04T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(room.status, RoomStatus::Available);
        let listing = room.to_listing();
        assert_eq!(listing.property_type.as_deref(), Some("studio"));
        assert_eq!(listing.primary_image(), "https://cdn.example/rooms/7/a.jpg");
        assert!(listing.room_size.is_none());
    }

    #[test]
    fn schedule_uses_type_key_and_screaming_enums() {
        let schedule: ServiceSchedule = serde_json::from_str(
            r#"{
                "id": 3,
                "type": "CLEANING",
                "frequency": "QUARTERLY",
                "roomId": 7,
                "roomName": "Garden Studio",
                "isActive": true,
                "lastPerformed": null,
                "nextDue": "2025-03-01T09:00:00Z",
                "createdAt": "2025-01-01T09:00:00Z",
                "updatedAt": "2025-01-01T09:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(schedule.service_type, ServiceType::Cleaning);
        let json = serde_json::to_value(&schedule).unwrap();
        assert_eq!(json["type"], "CLEANING");
        assert_eq!(json["roomId"], 7);
    }

    #[test]
    fn completing_advances_next_due_by_frequency() {
        let mut schedule = ServiceSchedule {
            id: 1,
            service_type: ServiceType::Inspection,
            frequency: ServiceFrequency::Biannually,
            room_id: 2,
            room_name: "Loft".into(),
            description: None,
            is_active: true,
            last_performed: None,
            next_due: at(2025, 1, 31),
            created_at: at(2024, 7, 31),
            updated_at: at(2024, 7, 31),
        };
        schedule.mark_completed(at(2025, 1, 31));
        assert_eq!(schedule.last_performed, Some(at(2025, 1, 31)));
        assert_eq!(schedule.next_due, at(2025, 7, 31));
    }

    #[test]
    fn due_window_ignores_inactive_schedules() {
        let mut schedule = ServiceSchedule {
            id: 1,
            service_type: ServiceType::Repair,
            frequency: ServiceFrequency::Monthly,
            room_id: 2,
            room_name: "Loft".into(),
            description: None,
            is_active: true,
            last_performed: None,
            next_due: at(2025, 5, 10),
            created_at: at(2025, 1, 1),
            updated_at: at(2025, 1, 1),
        };
        assert!(schedule.is_due_within(at(2025, 5, 4), 7));
        assert!(!schedule.is_due_within(at(2025, 5, 1), 7));
        schedule.is_active = false;
        assert!(!schedule.is_due_within(at(2025, 5, 4), 7));
    }

    #[test]
    fn config_input_defaults_to_active() {
        let input: CreateServiceConfigInput =
            serde_json::from_str(r#"{"type":"REPAIR","frequency":"ANNUALLY","description":"Roof"}"#)
                .unwrap();
        assert!(input.is_active);
    }

    #[test]
    fn amenities_use_display_spelling_on_the_wire() {
        let json = serde_json::to_string(&vec![Amenity::Wifi, Amenity::Tv]).unwrap();
        assert_eq!(json, r#"["WiFi","TV"]"#);
        assert_eq!(Amenity::parse("Gym"), Some(Amenity::Gym));
        assert_eq!(Amenity::parse("gym"), None);
    }
}
