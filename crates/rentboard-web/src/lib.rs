//! Axum + Askama site for rentboard: the public room browser and the landlord dashboard.

mod views;

use std::num::IntErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use rentboard_client::{load_listings, open_backend, ApiError, RentalApi, UPCOMING_WINDOW_DAYS};
use rentboard_core::{
    BrowseState, FilterState, FormErrors, PriceRange, PropertyType, RoomFormInput, RoomSize,
    RoomStatus, ServiceScheduleFormInput, DEFAULT_PAGE_SIZE, PRICE_CEILING,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{info, warn};

use views::{
    ConfigRow, FilterFormView, FormView, GridView, LayoutContext, NavItem, RoomDetailView,
    RoomRow, ScheduleRow, StatusCountView,
};

pub const CRATE_NAME: &str = "rentboard-web";

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub port: u16,
    pub page_size: usize,
    /// Serve from this rooms JSON file instead of the remote API.
    pub fixtures: Option<PathBuf>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            page_size: DEFAULT_PAGE_SIZE,
            fixtures: None,
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("RENTBOARD_WEB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            page_size: std::env::var("RENTBOARD_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.page_size),
            fixtures: std::env::var_os("RENTBOARD_FIXTURES").map(PathBuf::from),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn RentalApi>,
    pub config: WebConfig,
}

impl AppState {
    pub fn new(api: Arc<dyn RentalApi>, config: WebConfig) -> Self {
        Self { api, config }
    }
}

/// Raw grid query; anything blank or unparseable falls back to "no constraint".
#[derive(Debug, Default, Deserialize)]
struct ListingQuery {
    location: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
    property_type: Option<String>,
    room_size: Option<String>,
    page: Option<String>,
}

impl ListingQuery {
    fn filters(&self) -> FilterState {
        let price = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let mut filters = FilterState::default()
            .with_location(self.location.clone().unwrap_or_default())
            .with_price_range(PriceRange::new(
                price(&self.min_price).unwrap_or(0.0),
                price(&self.max_price).unwrap_or(PRICE_CEILING),
            ));
        if let Some(t) = self.property_type.as_deref().and_then(PropertyType::parse_selection) {
            filters = filters.with_property_type(t);
        }
        if let Some(s) = self.room_size.as_deref().and_then(RoomSize::parse_selection) {
            filters = filters.with_room_size(s);
        }
        filters
    }

    /// Numbers outside `i64` saturate; the engine then clamps them.
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| match p.trim().parse::<i64>() {
                Ok(page) => Some(page),
                Err(err) => match err.kind() {
                    IntErrorKind::PosOverflow => Some(i64::MAX),
                    IntErrorKind::NegOverflow => Some(i64::MIN),
                    _ => None,
                },
            })
            .unwrap_or(1)
    }
}

#[derive(Debug, Default, Deserialize)]
struct DashboardQuery {
    sidebar: Option<String>,
    edit: Option<String>,
}

impl DashboardQuery {
    fn layout(&self, active: NavItem) -> LayoutContext {
        LayoutContext::new(self.sidebar.as_deref(), active)
    }
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    filter: FilterFormView,
    grid: GridView,
}

#[derive(Template)]
#[template(path = "room_grid_partial.html")]
struct RoomGridPartialTemplate {
    grid: GridView,
}

#[derive(Template)]
#[template(path = "room_detail.html")]
struct RoomDetailTemplate {
    room: RoomDetailView,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    layout: LayoutContext,
    backend: &'static str,
    total_rooms: usize,
    status_counts: Vec<StatusCountView>,
    upcoming: Vec<ScheduleRow>,
    upcoming_days: i64,
}

#[derive(Template)]
#[template(path = "dashboard_rooms.html")]
struct DashboardRoomsTemplate {
    layout: LayoutContext,
    rooms: Vec<RoomRow>,
    form_title: String,
    form: FormView,
    editing: bool,
    cancel_href: String,
}

#[derive(Template)]
#[template(path = "dashboard_services.html")]
struct DashboardServicesTemplate {
    layout: LayoutContext,
    schedules: Vec<ScheduleRow>,
    configs: Vec<ConfigRow>,
    form: FormView,
    has_rooms: bool,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    title: String,
    message: String,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/rooms/grid", get(room_grid_handler))
        .route("/rooms/{id}", get(room_detail_handler))
        .route("/dashboard", get(dashboard_handler))
        .route(
            "/dashboard/rooms",
            get(dashboard_rooms_handler).post(create_room_handler),
        )
        .route("/dashboard/rooms/{id}", post(update_room_handler))
        .route("/dashboard/rooms/{id}/delete", post(delete_room_handler))
        .route(
            "/dashboard/services",
            get(dashboard_services_handler).post(create_schedule_handler),
        )
        .route(
            "/dashboard/services/{id}/complete",
            post(complete_schedule_handler),
        )
        .route("/assets/app.css", get(app_css_handler))
        .with_state(Arc::new(state))
}

pub async fn serve(config: WebConfig) -> anyhow::Result<()> {
    let api = open_backend(config.fixtures.as_deref()).await?;
    let port = config.port;
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;
    info!(port, backend = api.backend_name(), "rentboard web listening");
    axum::serve(listener, app(AppState::new(api, config))).await?;
    Ok(())
}

pub async fn serve_from_env() -> anyhow::Result<()> {
    serve(WebConfig::from_env()).await
}

/// Runs the filter/paginate engine for one request.
async fn load_grid(state: &AppState, query: &ListingQuery) -> Result<GridView, ApiError> {
    let listings = load_listings(state.api.as_ref()).await?;
    let mut browse = BrowseState::new(state.config.page_size);
    browse.apply_filters(query.filters());
    browse.select_page(query.page());
    let page = browse.view(&listings);
    Ok(GridView::new(&page, browse.filters()))
}

async fn index_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    match load_grid(&state, &query).await {
        Ok(grid) => render_html(IndexTemplate {
            filter: FilterFormView::new(&query.filters()),
            grid,
        }),
        Err(err) => bad_gateway(err),
    }
}

async fn room_grid_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    match load_grid(&state, &query).await {
        Ok(grid) => {
            let mut resp = render_html(RoomGridPartialTemplate { grid });
            resp.headers_mut().insert(
                header::HeaderName::from_static("hx-trigger"),
                HeaderValue::from_static("roomGridLoaded"),
            );
            resp
        }
        Err(err) => bad_gateway(err),
    }
}

async fn room_detail_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.api.list_rooms().await {
        Ok(rooms) => match rooms.iter().find(|r| r.id == id) {
            Some(room) => render_html(RoomDetailTemplate {
                room: RoomDetailView::new(room),
            }),
            None => not_found("Room not found"),
        },
        Err(err) => bad_gateway(err),
    }
}

async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let layout = query.layout(NavItem::Overview);
    let (rooms, upcoming) = match tokio::try_join!(
        state.api.list_rooms(),
        state.api.upcoming_services()
    ) {
        Ok(loaded) => loaded,
        Err(err) => return bad_gateway(err),
    };
    let status_counts = RoomStatus::ALL
        .into_iter()
        .map(|status| StatusCountView {
            label: views::humanize(status.as_str()),
            count: rooms.iter().filter(|r| r.status == status).count(),
        })
        .collect();
    let now = Utc::now();
    render_html(DashboardTemplate {
        layout,
        backend: state.api.backend_name(),
        total_rooms: rooms.len(),
        status_counts,
        upcoming: upcoming
            .iter()
            .map(|s| ScheduleRow::new(s, now, &layout))
            .collect(),
        upcoming_days: UPCOMING_WINDOW_DAYS,
    })
}

/// Which room the dialog is editing, and what was last submitted.
struct RoomEditor {
    target: Option<String>,
    input: RoomFormInput,
    errors: FormErrors,
}

async fn rooms_page(
    state: &AppState,
    layout: LayoutContext,
    editor: Option<RoomEditor>,
    status: StatusCode,
) -> Response {
    let rooms = match state.api.list_rooms().await {
        Ok(rooms) => rooms,
        Err(err) => return bad_gateway(err),
    };
    let editor = editor.unwrap_or_else(|| RoomEditor {
        target: None,
        input: RoomFormInput::blank(),
        errors: FormErrors::default(),
    });
    let (form_title, action) = match &editor.target {
        Some(id) => (
            "Edit Room".to_string(),
            layout.link(&format!("/dashboard/rooms/{id}"), &[]),
        ),
        None => (
            "Add Room".to_string(),
            layout.link(NavItem::Rooms.path(), &[]),
        ),
    };
    let editing = editor.target.is_some();
    let tpl = DashboardRoomsTemplate {
        layout,
        rooms: rooms.iter().map(|r| RoomRow::new(r, &layout)).collect(),
        form_title,
        form: FormView::room(action, editing, &editor.input, &editor.errors),
        editing,
        cancel_href: layout.link(NavItem::Rooms.path(), &[]),
    };
    with_status(render_html(tpl), status)
}

async fn dashboard_rooms_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let layout = query.layout(NavItem::Rooms);
    let editor = match query.edit.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => match state.api.list_rooms().await {
            Ok(rooms) => match rooms.iter().find(|r| r.id == id) {
                Some(room) => Some(RoomEditor {
                    target: Some(room.id.clone()),
                    input: RoomFormInput::from_room(room),
                    errors: FormErrors::default(),
                }),
                None => return not_found("Room not found"),
            },
            Err(err) => return bad_gateway(err),
        },
        None => None,
    };
    rooms_page(&state, layout, editor, StatusCode::OK).await
}

async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
    Form(input): Form<RoomFormInput>,
) -> Response {
    let layout = query.layout(NavItem::Rooms);
    match input.validate() {
        Ok(data) => match state.api.create_room(&data).await {
            Ok(room) => {
                info!(id = %room.id, name = %room.name, "room created");
                Redirect::to(&layout.link(NavItem::Rooms.path(), &[])).into_response()
            }
            Err(err) => bad_gateway(err),
        },
        Err(errors) => {
            let editor = RoomEditor {
                target: None,
                input,
                errors,
            };
            rooms_page(&state, layout, Some(editor), StatusCode::UNPROCESSABLE_ENTITY).await
        }
    }
}

async fn update_room_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DashboardQuery>,
    Form(input): Form<RoomFormInput>,
) -> Response {
    let layout = query.layout(NavItem::Rooms);
    match input.validate() {
        Ok(data) => match state.api.update_room(&id, &data).await {
            Ok(room) => {
                info!(id = %room.id, "room updated");
                Redirect::to(&layout.link(NavItem::Rooms.path(), &[])).into_response()
            }
            Err(err) if err.is_not_found() => not_found("Room not found"),
            Err(err) => bad_gateway(err),
        },
        Err(errors) => {
            let editor = RoomEditor {
                target: Some(id),
                input,
                errors,
            };
            rooms_page(&state, layout, Some(editor), StatusCode::UNPROCESSABLE_ENTITY).await
        }
    }
}

async fn delete_room_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let layout = query.layout(NavItem::Rooms);
    match state.api.delete_room(&id).await {
        Ok(()) => {
            info!(%id, "room deleted");
            Redirect::to(&layout.link(NavItem::Rooms.path(), &[])).into_response()
        }
        Err(err) if err.is_not_found() => not_found("Room not found"),
        Err(err) => bad_gateway(err),
    }
}

async fn services_page(
    state: &AppState,
    layout: LayoutContext,
    input: &ServiceScheduleFormInput,
    errors: &FormErrors,
    status: StatusCode,
) -> Response {
    let (rooms, schedules, configs) = match tokio::try_join!(
        state.api.list_rooms(),
        state.api.list_service_schedules(),
        state.api.list_service_configs()
    ) {
        Ok(loaded) => loaded,
        Err(err) => return bad_gateway(err),
    };
    let now = Utc::now();
    let action = layout.link(NavItem::Services.path(), &[]);
    let tpl = DashboardServicesTemplate {
        layout,
        schedules: schedules
            .iter()
            .map(|s| ScheduleRow::new(s, now, &layout))
            .collect(),
        configs: configs.iter().map(ConfigRow::new).collect(),
        form: FormView::service_schedule(action, input, errors, &rooms),
        has_rooms: !rooms.is_empty(),
    };
    with_status(render_html(tpl), status)
}

async fn dashboard_services_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let layout = query.layout(NavItem::Services);
    services_page(
        &state,
        layout,
        &ServiceScheduleFormInput::blank(),
        &FormErrors::default(),
        StatusCode::OK,
    )
    .await
}

async fn create_schedule_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
    Form(input): Form<ServiceScheduleFormInput>,
) -> Response {
    let layout = query.layout(NavItem::Services);
    let rooms = match state.api.list_rooms().await {
        Ok(rooms) => rooms,
        Err(err) => return bad_gateway(err),
    };
    match input.validate(&rooms) {
        Ok(schedule) => match state.api.create_service_schedule(&schedule).await {
            Ok(created) => {
                info!(id = created.id, room = %created.room_name, "service schedule created");
                Redirect::to(&layout.link(NavItem::Services.path(), &[])).into_response()
            }
            Err(err) => bad_gateway(err),
        },
        Err(errors) => {
            services_page(
                &state,
                layout,
                &input,
                &errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await
        }
    }
}

async fn complete_schedule_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let layout = query.layout(NavItem::Services);
    match state.api.complete_service_schedule(id).await {
        Ok(schedule) => {
            info!(id, next_due = %schedule.next_due, "service marked completed");
            Redirect::to(&layout.link(NavItem::Services.path(), &[])).into_response()
        }
        Err(err) if err.is_not_found() => not_found("Service schedule not found"),
        Err(err) => bad_gateway(err),
    }
}

async fn app_css_handler() -> Response {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_str!("../assets/app.css"),
    )
        .into_response()
}

fn render_html<T: Template>(tpl: T) -> Response {
    match tpl.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => server_error(anyhow::anyhow!(err.to_string())),
    }
}

fn with_status(mut resp: Response, status: StatusCode) -> Response {
    if resp.status().is_success() {
        *resp.status_mut() = status;
    }
    resp
}

fn error_page(status: StatusCode, title: &str, message: String) -> Response {
    let tpl = ErrorTemplate {
        status: status.as_u16(),
        title: title.to_string(),
        message,
    };
    match tpl.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (status, Html(title.to_string())).into_response(),
    }
}

fn not_found(message: &str) -> Response {
    error_page(StatusCode::NOT_FOUND, "Not found", message.to_string())
}

fn bad_gateway(err: ApiError) -> Response {
    warn!(error = %err, "rental backend request failed");
    error_page(
        StatusCode::BAD_GATEWAY,
        "Rental service unavailable",
        err.to_string(),
    )
}

fn server_error(err: anyhow::Error) -> Response {
    warn!(error = %err, "template render failed");
    error_page(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Server error",
        err.to_string(),
    )
}
