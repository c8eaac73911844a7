//! Core domain model for rentboard: listings, the filter/paginate engine
//! behind the room grid, and the typed records the landlord dashboard edits.

pub mod admin;
pub mod browse;
pub mod filter;
pub mod form;
pub mod listing;
pub mod paginate;

pub use admin::{
    Amenity, CreateServiceConfigInput, CreateServiceScheduleInput, Room, RoomFormData,
    RoomStatus, ServiceConfig, ServiceFrequency, ServiceSchedule, ServiceType,
};
pub use browse::BrowseState;
pub use filter::{FilterState, PriceRange, PRICE_CEILING, PRICE_STEP};
pub use form::{
    FieldDescriptor, FieldError, FieldKind, FieldRule, FormErrors, RoomField, RoomFormInput,
    ServiceScheduleField, ServiceScheduleFormInput,
};
pub use listing::{Listing, PropertyType, RoomSize};
pub use paginate::{
    clamp_page, page_window, paginate, total_pages, ListingPage, PageLink, PageWindow,
    DEFAULT_PAGE_SIZE,
};

pub const CRATE_NAME: &str = "rentboard-core";
