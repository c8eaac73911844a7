//! Typed descriptions of the dashboard forms and their validation.
//!
//! Every form field is an enum variant with a static [`FieldDescriptor`];
//! submitted values arrive as raw strings and only leave this module as the
//! typed payloads from [`crate::admin`].

use serde::Deserialize;
use thiserror::Error;

use crate::admin::{
    Amenity, CreateServiceScheduleInput, Room, RoomFormData, RoomStatus, ServiceFrequency,
    ServiceType,
};

const STATUS_OPTIONS: &[&str] = &["ACTIVE", "INACTIVE", "AVAILABLE", "UNAVAILABLE"];
const AMENITY_OPTIONS: &[&str] = &["WiFi", "TV", "Parking", "Kitchen", "Pool", "Gym"];
const SERVICE_TYPE_OPTIONS: &[&str] = &["CLEANING", "MAINTENANCE", "INSPECTION", "REPAIR"];
const FREQUENCY_OPTIONS: &[&str] = &["MONTHLY", "QUARTERLY", "BIANNUALLY", "ANNUALLY"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Select(&'static [&'static str]),
    /// Comma or newline separated values.
    List,
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRule {
    Optional,
    Required,
    MinLength(usize),
    MinValue(f64),
    OneOf(&'static [&'static str]),
    AllOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rule: FieldRule,
    pub message: &'static str,
}

impl FieldDescriptor {
    const fn new(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        rule: FieldRule,
        message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            rule,
            message,
        }
    }

    /// Checks one raw value against the kind and the rule.
    pub fn check(&self, raw: &str) -> Result<(), String> {
        let value = raw.trim();
        let numeric = match self.kind {
            FieldKind::Number if !value.is_empty() => Some(
                value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| format!("{} must be a number", self.label))?,
            ),
            FieldKind::Integer if !value.is_empty() => Some(
                value
                    .parse::<i64>()
                    .map_err(|_| format!("{} must be a whole number", self.label))?
                    as f64,
            ),
            _ => None,
        };

        let ok = match self.rule {
            FieldRule::Optional => true,
            FieldRule::Required => !value.is_empty(),
            FieldRule::MinLength(n) => value.chars().count() >= n,
            FieldRule::MinValue(min) => numeric.is_some_and(|v| v >= min),
            FieldRule::OneOf(options) => options.contains(&value),
            FieldRule::AllOf(options) => split_list(value).all(|v| options.contains(&v)),
        };
        if ok {
            Ok(())
        } else {
            Err(self.message.to_string())
        }
    }
}

pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{} invalid field(s)", .0.len())]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == name)
            .map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    fn push(&mut self, descriptor: &FieldDescriptor, message: impl Into<String>) {
        self.0.push(FieldError {
            field: descriptor.name,
            message: message.into(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomField {
    Name,
    Description,
    Price,
    Location,
    Images,
    Amenities,
    Bed,
    Status,
}

impl RoomField {
    pub const ALL: [RoomField; 8] = [
        RoomField::Name,
        RoomField::Description,
        RoomField::Price,
        RoomField::Location,
        RoomField::Images,
        RoomField::Amenities,
        RoomField::Bed,
        RoomField::Status,
    ];

    pub const fn descriptor(self) -> FieldDescriptor {
        use FieldKind as K;
        use FieldRule as R;
        match self {
            RoomField::Name => FieldDescriptor::new(
                "name",
                "Room Name",
                K::Text,
                R::MinLength(2),
                "Name must be at least 2 characters.",
            ),
            RoomField::Description => {
                FieldDescriptor::new("description", "Description", K::Text, R::Optional, "")
            }
            RoomField::Price => FieldDescriptor::new(
                "price",
                "Price",
                K::Number,
                R::MinValue(0.0),
                "Price must be at least 0",
            ),
            RoomField::Location => {
                FieldDescriptor::new("location", "Location", K::Text, R::Optional, "")
            }
            RoomField::Images => FieldDescriptor::new("images", "Image URLs", K::List, R::Optional, ""),
            RoomField::Amenities => FieldDescriptor::new(
                "amenities",
                "Amenities",
                K::List,
                R::AllOf(AMENITY_OPTIONS),
                "Amenities must be chosen from WiFi, TV, Parking, Kitchen, Pool, Gym",
            ),
            RoomField::Bed => FieldDescriptor::new(
                "bed",
                "Beds",
                K::Integer,
                R::MinValue(1.0),
                "Bed count must be at least 1",
            ),
            RoomField::Status => FieldDescriptor::new(
                "status",
                "Status",
                K::Select(STATUS_OPTIONS),
                R::OneOf(STATUS_OPTIONS),
                "Choose a valid status",
            ),
        }
    }
}

/// Room dialog values exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RoomFormInput {
    pub name: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub images: String,
    pub amenities: String,
    pub bed: String,
    pub status: String,
}

impl RoomFormInput {
    /// Values a blank "Add Room" dialog starts with.
    pub fn blank() -> Self {
        Self {
            price: "0".into(),
            bed: "1".into(),
            status: RoomStatus::Available.as_str().into(),
            ..Self::default()
        }
    }

    pub fn from_room(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            description: room.description.clone().unwrap_or_default(),
            price: room.price.to_string(),
            location: room.location.clone(),
            images: room.images.join("\n"),
            amenities: room.amenities.join(", "),
            bed: room.bed.to_string(),
            status: room.status.as_str().into(),
        }
    }

    pub fn raw(&self, field: RoomField) -> &str {
        match field {
            RoomField::Name => &self.name,
            RoomField::Description => &self.description,
            RoomField::Price => &self.price,
            RoomField::Location => &self.location,
            RoomField::Images => &self.images,
            RoomField::Amenities => &self.amenities,
            RoomField::Bed => &self.bed,
            RoomField::Status => &self.status,
        }
    }

    pub fn validate(&self) -> Result<RoomFormData, FormErrors> {
        let mut errors = FormErrors::default();
        for field in RoomField::ALL {
            let descriptor = field.descriptor();
            if let Err(message) = descriptor.check(self.raw(field)) {
                errors.push(&descriptor, message);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let price = self.price.trim().parse::<f64>();
        let bed = self.bed.trim().parse::<u32>();
        let status = RoomStatus::parse(&self.status);
        let amenities = split_list(&self.amenities)
            .map(Amenity::parse)
            .collect::<Option<Vec<_>>>();

        match (price, bed, status, amenities) {
            (Ok(price), Ok(bed), Some(status), Some(amenities)) => {
                let description = self.description.trim();
                Ok(RoomFormData {
                    name: self.name.trim().to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                    amenities,
                    price,
                    location: self.location.trim().to_string(),
                    images: split_list(&self.images).map(str::to_string).collect(),
                    bed,
                    status,
                })
            }
            (price, bed, ..) => {
                if price.is_err() {
                    errors.push(&RoomField::Price.descriptor(), "Price must be a number");
                }
                if bed.is_err() {
                    errors.push(&RoomField::Bed.descriptor(), "Bed count is out of range");
                }
                Err(errors)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceScheduleField {
    Type,
    Frequency,
    RoomId,
    Description,
    IsActive,
}

impl ServiceScheduleField {
    pub const ALL: [ServiceScheduleField; 5] = [
        ServiceScheduleField::Type,
        ServiceScheduleField::Frequency,
        ServiceScheduleField::RoomId,
        ServiceScheduleField::Description,
        ServiceScheduleField::IsActive,
    ];

    pub const fn descriptor(self) -> FieldDescriptor {
        use FieldKind as K;
        use FieldRule as R;
        match self {
            ServiceScheduleField::Type => FieldDescriptor::new(
                "service_type",
                "Service Type",
                K::Select(SERVICE_TYPE_OPTIONS),
                R::OneOf(SERVICE_TYPE_OPTIONS),
                "Choose a service type",
            ),
            ServiceScheduleField::Frequency => FieldDescriptor::new(
                "frequency",
                "Frequency",
                K::Select(FREQUENCY_OPTIONS),
                R::OneOf(FREQUENCY_OPTIONS),
                "Choose a frequency",
            ),
            ServiceScheduleField::RoomId => FieldDescriptor::new(
                "room_id",
                "Room",
                K::Integer,
                R::MinValue(1.0),
                "Select a room",
            ),
            ServiceScheduleField::Description => {
                FieldDescriptor::new("description", "Description", K::Text, R::Optional, "")
            }
            ServiceScheduleField::IsActive => {
                FieldDescriptor::new("is_active", "Active", K::Checkbox, R::Optional, "")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ServiceScheduleFormInput {
    pub service_type: String,
    pub frequency: String,
    pub room_id: String,
    pub description: String,
    /// Present (usually "on") only when the checkbox is ticked.
    pub is_active: String,
}

impl ServiceScheduleFormInput {
    pub fn blank() -> Self {
        Self {
            service_type: ServiceType::Cleaning.as_str().into(),
            frequency: ServiceFrequency::Monthly.as_str().into(),
            is_active: "on".into(),
            ..Self::default()
        }
    }

    pub fn raw(&self, field: ServiceScheduleField) -> &str {
        match field {
            ServiceScheduleField::Type => &self.service_type,
            ServiceScheduleField::Frequency => &self.frequency,
            ServiceScheduleField::RoomId => &self.room_id,
            ServiceScheduleField::Description => &self.description,
            ServiceScheduleField::IsActive => &self.is_active,
        }
    }

    /// Validates against the rooms that can be scheduled; the chosen room
    /// supplies the schedule's display name.
    pub fn validate(&self, rooms: &[Room]) -> Result<CreateServiceScheduleInput, FormErrors> {
        let mut errors = FormErrors::default();
        for field in ServiceScheduleField::ALL {
            let descriptor = field.descriptor();
            if let Err(message) = descriptor.check(self.raw(field)) {
                errors.push(&descriptor, message);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let room_descriptor = ServiceScheduleField::RoomId.descriptor();
        let room = self
            .room_id
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| rooms.iter().find(|r| r.id == id.to_string()).map(|r| (id, r)));
        let service_type = ServiceType::parse(&self.service_type);
        let frequency = ServiceFrequency::parse(&self.frequency);

        match (room, service_type, frequency) {
            (Some((room_id, room)), Some(service_type), Some(frequency)) => {
                let description = self.description.trim();
                Ok(CreateServiceScheduleInput {
                    service_type,
                    frequency,
                    room_id,
                    room_name: room.name.clone(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                    is_active: !self.is_active.trim().is_empty(),
                })
            }
            _ => {
                errors.push(&room_descriptor, room_descriptor.message);
                Err(errors)
            }
        }
    }
}
