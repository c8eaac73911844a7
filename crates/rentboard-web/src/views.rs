//! Flat view structs handed to the templates.

use chrono::{DateTime, Utc};
use rentboard_core::{
    FieldDescriptor, FieldKind, FieldRule, FilterState, FormErrors, Listing, ListingPage,
    PageLink, PropertyType, Room, RoomField, RoomFormInput, RoomSize, ServiceConfig,
    ServiceSchedule, ServiceScheduleField, ServiceScheduleFormInput, PRICE_CEILING, PRICE_STEP,
};
use url::form_urlencoded;

/// `path` plus an encoded query string, or just `path` when there are no pairs.
pub fn href(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}

/// Query pairs that reproduce a filter snapshot, optionally pinned to a page.
pub fn filter_pairs(filters: &FilterState, page: Option<usize>) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if !filters.location.is_empty() {
        pairs.push(("location", filters.location.clone()));
    }
    pairs.push(("min_price", filters.price_range.min().to_string()));
    pairs.push(("max_price", filters.price_range.max().to_string()));
    if let Some(property_type) = filters.property_type {
        pairs.push(("property_type", property_type.as_str().to_string()));
    }
    if let Some(room_size) = filters.room_size {
        pairs.push(("room_size", room_size.as_str().to_string()));
    }
    if let Some(page) = page {
        pairs.push(("page", page.to_string()));
    }
    pairs
}

fn encode_pairs(pairs: &[(&str, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

pub fn format_price(price: f64) -> String {
    format!("${price:.0}")
}

fn format_day(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// "BIANNUALLY" -> "Biannually".
pub fn humanize(value: &str) -> String {
    let lower = value.to_lowercase().replace('_', " ");
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn size_label(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => RoomSize::parse_selection(raw)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => String::new(),
    }
}

fn type_label(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => PropertyType::parse_selection(raw)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| raw.to_string()),
        None => String::new(),
    }
}

#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    fn new(value: &str, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
            selected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterFormView {
    pub location: String,
    pub min_price: String,
    pub max_price: String,
    pub price_ceiling: String,
    pub price_step: String,
    pub property_types: Vec<OptionView>,
    pub room_sizes: Vec<OptionView>,
}

impl FilterFormView {
    pub fn new(filters: &FilterState) -> Self {
        let mut property_types = vec![OptionView::new("", "Any type", filters.property_type.is_none())];
        property_types.extend(
            PropertyType::ALL
                .into_iter()
                .map(|t| OptionView::new(t.as_str(), t.label(), filters.property_type == Some(t))),
        );
        let mut room_sizes = vec![OptionView::new("", "Any size", filters.room_size.is_none())];
        room_sizes.extend(
            RoomSize::ALL
                .into_iter()
                .map(|s| OptionView::new(s.as_str(), s.label(), filters.room_size == Some(s))),
        );
        Self {
            location: filters.location.clone(),
            min_price: filters.price_range.min().to_string(),
            max_price: filters.price_range.max().to_string(),
            price_ceiling: PRICE_CEILING.to_string(),
            price_step: PRICE_STEP.to_string(),
            property_types,
            room_sizes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub price: String,
    pub image: String,
    pub room_size: String,
    pub property_type: String,
    pub amenities: String,
}

impl CardView {
    fn new(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            name: listing.name.clone(),
            location: listing.location.clone(),
            price: format_price(listing.price),
            image: listing.primary_image().to_string(),
            room_size: size_label(listing.room_size.as_deref()),
            property_type: type_label(listing.property_type.as_deref()),
            amenities: listing.amenities.join(", "),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageLinkView {
    pub label: String,
    /// Encoded filters plus page, shared by the htmx and plain links.
    pub query: String,
    pub current: bool,
    pub gap: bool,
}

#[derive(Debug, Clone)]
pub struct GridView {
    pub cards: Vec<CardView>,
    pub total_count: usize,
    pub page: usize,
    pub total_pages: usize,
    pub show_pagination: bool,
    pub links: Vec<PageLinkView>,
    pub has_previous: bool,
    pub previous_query: String,
    pub has_next: bool,
    pub next_query: String,
}

impl GridView {
    pub fn new(page: &ListingPage<'_>, filters: &FilterState) -> Self {
        let window = page.window();
        let query = |n: usize| encode_pairs(&filter_pairs(filters, Some(n)));
        let links = window
            .links
            .iter()
            .map(|link| match *link {
                PageLink::Page { number, current } => PageLinkView {
                    label: number.to_string(),
                    query: query(number),
                    current,
                    gap: false,
                },
                PageLink::Gap => PageLinkView {
                    label: "…".to_string(),
                    query: String::new(),
                    current: false,
                    gap: true,
                },
            })
            .collect();

        Self {
            cards: page.items.iter().map(|l| CardView::new(l)).collect(),
            total_count: page.total_count,
            page: page.page,
            total_pages: page.total_pages,
            show_pagination: page.total_pages > 1,
            links,
            has_previous: window.previous.is_some(),
            previous_query: window.previous.map(&query).unwrap_or_default(),
            has_next: window.next.is_some(),
            next_query: window.next.map(&query).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub bed: u32,
    pub status: String,
    pub room_size: String,
    pub property_type: String,
}

impl RoomDetailView {
    pub fn new(room: &Room) -> Self {
        let listing = room.to_listing();
        let images = if room.images.is_empty() {
            vec![listing.primary_image().to_string()]
        } else {
            room.images.clone()
        };
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            description: room.description.clone().unwrap_or_default(),
            price: format_price(room.price),
            location: room.location.clone(),
            images,
            amenities: room.amenities.clone(),
            bed: room.bed,
            status: humanize(room.status.as_str()),
            room_size: size_label(room.room_size.as_deref()),
            property_type: type_label(room.property_type.as_deref()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItem {
    Overview,
    Rooms,
    Services,
}

impl NavItem {
    pub fn as_str(self) -> &'static str {
        match self {
            NavItem::Overview => "overview",
            NavItem::Rooms => "rooms",
            NavItem::Services => "services",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            NavItem::Overview => "/dashboard",
            NavItem::Rooms => "/dashboard/rooms",
            NavItem::Services => "/dashboard/services",
        }
    }
}

/// Dashboard chrome for one request. Built from the `sidebar` query parameter
/// and threaded into every dashboard template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutContext {
    pub sidebar_collapsed: bool,
    pub active: NavItem,
}

impl LayoutContext {
    pub fn new(sidebar: Option<&str>, active: NavItem) -> Self {
        Self {
            sidebar_collapsed: sidebar.map(str::trim) == Some("collapsed"),
            active,
        }
    }

    pub fn is_active(&self, item: &str) -> bool {
        self.active.as_str() == item
    }

    /// Link to a dashboard path that keeps the current sidebar state.
    pub fn link(&self, path: &str, pairs: &[(&str, &str)]) -> String {
        let mut all = pairs.to_vec();
        if self.sidebar_collapsed {
            all.push(("sidebar", "collapsed"));
        }
        href(path, &all)
    }

    pub fn nav_href(&self, item: &str) -> String {
        let path = match item {
            "rooms" => NavItem::Rooms.path(),
            "services" => NavItem::Services.path(),
            _ => NavItem::Overview.path(),
        };
        self.link(path, &[])
    }

    pub fn toggle_href(&self) -> String {
        let next = if self.sidebar_collapsed { "expanded" } else { "collapsed" };
        href(self.active.path(), &[("sidebar", next)])
    }
}

#[derive(Debug, Clone)]
pub struct FieldView {
    pub name: &'static str,
    pub label: &'static str,
    /// One of `text`, `number`, `select`, `textarea`, `checkbox`.
    pub control: &'static str,
    pub step: &'static str,
    pub value: String,
    pub options: Vec<OptionView>,
    pub hint: String,
    pub required: bool,
    pub checked: bool,
    pub error: String,
}

impl FieldView {
    pub fn new(descriptor: FieldDescriptor, raw: &str, errors: &FormErrors) -> Self {
        let (control, step, options) = match descriptor.kind {
            FieldKind::Text => ("text", "", Vec::new()),
            FieldKind::Number => ("number", "any", Vec::new()),
            FieldKind::Integer => ("number", "1", Vec::new()),
            FieldKind::Select(values) => (
                "select",
                "",
                values
                    .iter()
                    .map(|v| OptionView::new(v, humanize(v), *v == raw.trim()))
                    .collect(),
            ),
            FieldKind::List => ("textarea", "", Vec::new()),
            FieldKind::Checkbox => ("checkbox", "", Vec::new()),
        };
        let hint = match descriptor.rule {
            FieldRule::AllOf(values) => format!("Comma separated: {}", values.join(", ")),
            _ if descriptor.kind == FieldKind::List => "One per line".to_string(),
            _ => String::new(),
        };
        Self {
            name: descriptor.name,
            label: descriptor.label,
            control,
            step,
            value: raw.to_string(),
            options,
            hint,
            required: !matches!(descriptor.rule, FieldRule::Optional),
            checked: !raw.trim().is_empty(),
            error: errors.for_field(descriptor.name).unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormView {
    pub action: String,
    pub submit_label: &'static str,
    pub fields: Vec<FieldView>,
}

impl FormView {
    pub fn room(action: String, editing: bool, input: &RoomFormInput, errors: &FormErrors) -> Self {
        Self {
            action,
            submit_label: if editing { "Update Room" } else { "Add Room" },
            fields: RoomField::ALL
                .into_iter()
                .map(|f| FieldView::new(f.descriptor(), input.raw(f), errors))
                .collect(),
        }
    }

    /// The room id field becomes a select over the rooms that can be scheduled.
    pub fn service_schedule(
        action: String,
        input: &ServiceScheduleFormInput,
        errors: &FormErrors,
        rooms: &[Room],
    ) -> Self {
        let fields = ServiceScheduleField::ALL
            .into_iter()
            .map(|f| {
                let mut view = FieldView::new(f.descriptor(), input.raw(f), errors);
                if f == ServiceScheduleField::RoomId {
                    let selected = input.room_id.trim();
                    view.control = "select";
                    view.options = std::iter::once(OptionView::new("", "Select a room", selected.is_empty()))
                        .chain(
                            rooms
                                .iter()
                                .map(|r| OptionView::new(&r.id, r.name.clone(), r.id == selected)),
                        )
                        .collect();
                }
                view
            })
            .collect();
        Self {
            action,
            submit_label: "Create Schedule",
            fields,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub price: String,
    pub bed: u32,
    pub status: String,
    pub edit_href: String,
    pub view_href: String,
    pub delete_action: String,
}

impl RoomRow {
    pub fn new(room: &Room, layout: &LayoutContext) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            location: room.location.clone(),
            price: format_price(room.price),
            bed: room.bed,
            status: humanize(room.status.as_str()),
            edit_href: layout.link(NavItem::Rooms.path(), &[("edit", room.id.as_str())]),
            view_href: format!("/rooms/{}", room.id),
            delete_action: layout.link(&format!("/dashboard/rooms/{}/delete", room.id), &[]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct ScheduleRow {
    pub id: i64,
    pub service_type: String,
    pub frequency: String,
    pub room_name: String,
    pub description: String,
    pub active: bool,
    pub last_performed: String,
    pub next_due: String,
    pub overdue: bool,
    pub complete_action: String,
}

impl ScheduleRow {
    pub fn new(schedule: &ServiceSchedule, now: DateTime<Utc>, layout: &LayoutContext) -> Self {
        Self {
            id: schedule.id,
            service_type: humanize(schedule.service_type.as_str()),
            frequency: humanize(schedule.frequency.as_str()),
            room_name: schedule.room_name.clone(),
            description: schedule.description.clone().unwrap_or_default(),
            active: schedule.is_active,
            last_performed: schedule
                .last_performed
                .map(format_day)
                .unwrap_or_else(|| "never".to_string()),
            next_due: format_day(schedule.next_due),
            overdue: schedule.is_active && schedule.next_due < now,
            complete_action: layout.link(
                &format!("/dashboard/services/{}/complete", schedule.id),
                &[],
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigRow {
    pub service_type: String,
    pub frequency: String,
    pub description: String,
    pub active: bool,
}

impl ConfigRow {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            service_type: humanize(config.service_type.as_str()),
            frequency: humanize(config.frequency.as_str()),
            description: config.description.clone(),
            active: config.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentboard_core::paginate;

    fn listing(i: usize) -> Listing {
        Listing {
            id: i.to_string(),
            name: format!("Room {i}"),
            price: 1000.0 + i as f64,
            location: "Oakland, CA".into(),
            images: vec![],
            amenities: vec!["WiFi".into(), "Pool".into()],
            room_size: Some("2".into()),
            property_type: Some("loft".into()),
        }
    }

    #[test]
    fn page_links_carry_filters_and_page() {
        let listings = (1..=40).map(listing).collect::<Vec<_>>();
        let filters = FilterState::default().with_location("oakland");
        let page = paginate(&listings, &filters, 5, 4);
        let grid = GridView::new(&page, &filters);
        assert!(grid.show_pagination);
        assert_eq!(grid.previous_query, "location=oakland&min_price=0&max_price=10000&page=3");
        assert!(grid.links.iter().any(|l| l.gap));
        let current = grid.links.iter().find(|l| l.current).unwrap();
        assert_eq!(current.label, "4");
    }

    #[test]
    fn single_page_hides_pagination() {
        let listings = (1..=3).map(listing).collect::<Vec<_>>();
        let page = paginate(&listings, &FilterState::default(), 9, 1);
        let grid = GridView::new(&page, &FilterState::default());
        assert!(!grid.show_pagination);
        assert!(!grid.has_previous && !grid.has_next);
        assert_eq!(grid.cards[0].price, "$1001");
        assert_eq!(grid.cards[0].room_size, "2 Bedrooms");
        assert_eq!(grid.cards[0].property_type, "loft");
        assert_eq!(grid.cards[0].image, rentboard_core::listing::PLACEHOLDER_IMAGE);
    }

    #[test]
    fn href_encodes_free_text() {
        assert_eq!(
            href("/", &[("location", "San Francisco, CA")]),
            "/?location=San+Francisco%2C+CA"
        );
        assert_eq!(href("/dashboard", &[]), "/dashboard");
    }

    #[test]
    fn layout_keeps_collapsed_sidebar_in_links() {
        let layout = LayoutContext::new(Some("collapsed"), NavItem::Rooms);
        assert!(layout.sidebar_collapsed);
        assert_eq!(layout.nav_href("services"), "/dashboard/services?sidebar=collapsed");
        assert_eq!(layout.toggle_href(), "/dashboard/rooms?sidebar=expanded");
        assert_eq!(
            layout.link("/dashboard/rooms", &[("edit", "3")]),
            "/dashboard/rooms?edit=3&sidebar=collapsed"
        );

        let expanded = LayoutContext::new(None, NavItem::Overview);
        assert!(!expanded.sidebar_collapsed);
        assert!(expanded.is_active("overview"));
        assert_eq!(expanded.nav_href("rooms"), "/dashboard/rooms");
    }

    #[test]
    fn room_form_fields_follow_descriptors() {
        let mut input = RoomFormInput::blank();
        input.name = "A".into();
        let errors = input.validate().unwrap_err();
        let form = FormView::room("/dashboard/rooms".into(), false, &input, &errors);
        let names = form.fields.iter().map(|f| f.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["name", "description", "price", "location", "images", "amenities", "bed", "status"]
        );
        assert_eq!(form.fields[0].error, "Name must be at least 2 characters.");
        let status = form.fields.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.control, "select");
        assert!(status.options.iter().any(|o| o.value == "AVAILABLE" && o.selected));
        assert_eq!(humanize("BIANNUALLY"), "Biannually");
    }
}
