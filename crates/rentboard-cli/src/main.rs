use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rentboard_client::{load_listings, open_backend};
use rentboard_core::{
    BrowseState, FilterState, ListingPage, PriceRange, PropertyType, RoomSize, DEFAULT_PAGE_SIZE,
    PRICE_CEILING,
};
use rentboard_web::WebConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rentboard")]
#[command(about = "Rentboard listing browser and landlord dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the web site and dashboard.
    Serve {
        /// Rooms JSON file to serve instead of the remote API.
        #[arg(long)]
        fixtures: Option<PathBuf>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Filter and page through listings from the terminal.
    Search(SearchArgs),
    /// List every room with its status.
    Rooms {
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value_t = 0.0)]
    min_price: f64,
    #[arg(long, default_value_t = PRICE_CEILING)]
    max_price: f64,
    #[arg(long, value_parser = parse_property_type)]
    property_type: Option<PropertyType>,
    #[arg(long, value_parser = parse_room_size)]
    room_size: Option<RoomSize>,
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    page: i64,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

impl SearchArgs {
    fn filters(&self) -> FilterState {
        let mut filters = FilterState::default()
            .with_location(self.location.clone())
            .with_price_range(PriceRange::new(self.min_price, self.max_price));
        if let Some(property_type) = self.property_type {
            filters = filters.with_property_type(property_type);
        }
        if let Some(room_size) = self.room_size {
            filters = filters.with_room_size(room_size);
        }
        filters
    }
}

fn parse_property_type(value: &str) -> Result<PropertyType, String> {
    PropertyType::parse_selection(value).ok_or_else(|| {
        let known = PropertyType::ALL.map(PropertyType::as_str).join(", ");
        format!("unknown property type `{value}` (expected one of: {known})")
    })
}

fn parse_room_size(value: &str) -> Result<RoomSize, String> {
    RoomSize::parse_selection(value).ok_or_else(|| {
        let known = RoomSize::ALL.map(RoomSize::as_str).join(", ");
        format!("unknown room size `{value}` (expected one of: {known})")
    })
}

/// Flag first, then `RENTBOARD_FIXTURES`.
fn fixtures_or_env(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| WebConfig::from_env().fixtures)
}

fn print_page(page: &ListingPage<'_>) {
    for listing in &page.items {
        println!(
            "{:>6}  {:<32}  ${:>7.0}  {}",
            listing.id, listing.name, listing.price, listing.location
        );
    }
    println!(
        "page {}/{} ({} matches)",
        page.page, page.total_pages, page.total_count
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        fixtures: None,
        port: None,
    }) {
        Commands::Serve { fixtures, port } => {
            let mut config = WebConfig::from_env();
            if fixtures.is_some() {
                config.fixtures = fixtures;
            }
            if let Some(port) = port {
                config.port = port;
            }
            rentboard_web::serve(config).await?;
        }
        Commands::Search(args) => {
            let api = open_backend(fixtures_or_env(args.fixtures.clone()).as_deref()).await?;
            let listings = load_listings(api.as_ref())
                .await
                .context("loading listings")?;
            info!(backend = api.backend_name(), listings = listings.len(), "searching");

            let mut browse = BrowseState::new(args.page_size);
            browse.apply_filters(args.filters());
            browse.select_page(args.page);
            print_page(&browse.view(&listings));
        }
        Commands::Rooms { fixtures } => {
            let api = open_backend(fixtures_or_env(fixtures).as_deref()).await?;
            let rooms = api.list_rooms().await.context("listing rooms")?;
            for room in &rooms {
                println!(
                    "{:>6}  {:<11}  {:<32}  ${:>7.0}  {}",
                    room.id,
                    room.status.as_str(),
                    room.name,
                    room.price,
                    room.location
                );
            }
            println!("{} rooms", rooms.len());
        }
    }

    Ok(())
}
