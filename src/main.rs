use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{init_tracing, load_config};
use core_types::{NewProperty, NewUser, PropertyFilter, PropertyListing};
use database::{connect, DbRepository};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

/// The main entry point for the LightBnB data tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first so `--help` works without a valid config.
    let cli = Cli::parse();

    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    let config = load_config().context("Failed to load configuration")?;
    let _log_guard = init_tracing(&config.logging)?;

    let db_pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    let repo = DbRepository::new(db_pool);
    let default_limit = config.search.default_limit;

    // Execute the appropriate command
    match cli.command {
        Commands::User(args) => handle_user(&repo, args).await,
        Commands::AddUser(args) => {
            let user = NewUser {
                name: args.name,
                email: args.email,
                password: args.password,
            };
            print_json(&repo.add_user(&user).await?)
        }
        Commands::Reservations(args) => {
            let limit = args.limit.unwrap_or(default_limit);
            print_json(&repo.get_all_reservations(args.guest_id, limit).await?)
        }
        Commands::Search(args) => {
            let limit = args.limit.unwrap_or(default_limit);
            let filter = args.into_filter();
            let listings = repo.get_all_properties(&filter, limit).await?;
            println!("{}", listings_table(&listings));
            Ok(())
        }
        Commands::AddProperty(args) => {
            let raw = std::fs::read_to_string(&args.json)
                .with_context(|| format!("Failed to read {}", args.json.display()))?;
            let property: NewProperty = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid property", args.json.display()))?;
            print_json(&repo.add_property(&property).await?)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Query and update the LightBnB listings database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single user by email or id.
    User(UserArgs),
    /// Register a new user.
    AddUser(AddUserArgs),
    /// List a guest's reservations, earliest first.
    Reservations(ReservationsArgs),
    /// Search property listings, cheapest first.
    Search(SearchArgs),
    /// Insert a property listing read from a JSON file.
    AddProperty(AddPropertyArgs),
}

#[derive(Parser)]
struct UserArgs {
    #[arg(long, conflicts_with = "id", required_unless_present = "id")]
    email: Option<String>,

    #[arg(long)]
    id: Option<i32>,
}

#[derive(Parser)]
struct AddUserArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    /// The password hash to store.
    #[arg(long)]
    password: String,
}

#[derive(Parser)]
struct ReservationsArgs {
    #[arg(long)]
    guest_id: i32,

    /// Maximum number of rows (defaults to `search.default_limit`).
    #[arg(long)]
    limit: Option<i64>,
}

#[derive(Parser)]
struct SearchArgs {
    /// Part of the city name.
    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    owner_id: Option<i32>,

    /// Minimum nightly price, in currency units (e.g. 49.99).
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Maximum nightly price, in currency units (e.g. 149.99).
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Minimum average review rating.
    #[arg(long)]
    min_rating: Option<f64>,

    /// Maximum number of rows (defaults to `search.default_limit`).
    #[arg(long)]
    limit: Option<i64>,
}

impl SearchArgs {
    fn into_filter(self) -> PropertyFilter {
        PropertyFilter {
            city: self.city,
            owner_id: self.owner_id,
            minimum_price_per_night: self.min_price,
            maximum_price_per_night: self.max_price,
            minimum_rating: self.min_rating,
        }
    }
}

#[derive(Parser)]
struct AddPropertyArgs {
    /// Path to a JSON document with the 14 property fields.
    #[arg(long)]
    json: PathBuf,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_user(repo: &DbRepository, args: UserArgs) -> anyhow::Result<()> {
    let user = match (args.email, args.id) {
        (Some(email), _) => repo.get_user_with_email(&email).await?,
        (None, Some(id)) => repo.get_user_with_id(id).await?,
        (None, None) => anyhow::bail!("either --email or --id is required"),
    };

    match user {
        Some(user) => print_json(&user),
        None => {
            tracing::warn!("No matching user.");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn listings_table(listings: &[PropertyListing]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "ID", "Title", "City", "Per Night", "Bedrooms", "Bathrooms", "Rating",
    ]);

    for listing in listings {
        let property = &listing.property;
        let rating = listing
            .average_rating
            .map(|rating| rating.round_dp(2).to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            property.id.to_string(),
            property.title.clone(),
            property.city.clone(),
            format!(
                "{}.{:02}",
                property.cost_per_night / 100,
                property.cost_per_night % 100
            ),
            property.number_of_bedrooms.to_string(),
            property.number_of_bathrooms.to_string(),
            rating,
        ]);
    }

    table
}
