use actions::{Argon2Hasher, PasswordHasher};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::settings::Settings;
use configuration::Environment;
use core_types::{format_currency, Customer, InvoiceStatus, Revenue};
use database::{DbRepository, SeedData, SeedInvoice, SeedUser};
use serde::Deserialize;
use std::path::PathBuf;
use uuid::Uuid;

/// The main entry point for the invoice dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = configuration::load_config_from(&cli.config)?;
    if let Some(environment) = cli.environment {
        settings.application.environment = environment;
    }
    let _guard =
        configuration::init_tracing(&settings.logging, settings.application.environment)?;

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Serve => web_server::run_server(settings).await,
        Commands::Migrate => handle_migrate(&settings).await,
        Commands::Seed(args) => handle_seed(args, &settings).await,
        Commands::Summary => handle_summary(&settings).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed.");
    }
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Invoice management dashboard: API server and database tooling.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML settings file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `application.environment` from the settings.
    #[arg(long, global = true, value_enum)]
    environment: Option<Environment>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve,
    /// Apply pending database migrations.
    Migrate,
    /// Load users, customers, invoices and revenue from a JSON file.
    Seed(SeedArgs),
    /// Print the dashboard cards and monthly revenue.
    Summary,
}

#[derive(Parser)]
struct SeedArgs {
    /// JSON file with `users`, `customers`, `invoices` and `revenue` arrays.
    #[arg(long)]
    file: PathBuf,
}

// ==============================================================================
// Seed File
// ==============================================================================

/// A user as written in the seed file, with a plaintext password.
#[derive(Debug, Deserialize)]
struct SeedFileUser {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    name: String,
    email: String,
    password: String,
}

/// An invoice as written in the seed file. `amount` is in cents.
///
/// Give every invoice an `id` if the file is meant to be loaded more than once;
/// rows without one get a fresh id on every run.
#[derive(Debug, Deserialize)]
struct SeedFileInvoice {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    customer_id: Uuid,
    amount: i32,
    status: InvoiceStatus,
    date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeedFile {
    users: Vec<SeedFileUser>,
    customers: Vec<Customer>,
    invoices: Vec<SeedFileInvoice>,
    revenue: Vec<Revenue>,
}

impl SeedFile {
    /// Hashes every password. Plaintext never leaves this function.
    fn into_seed_data(self, hasher: &impl PasswordHasher) -> anyhow::Result<SeedData> {
        let users = self
            .users
            .into_iter()
            .map(|u| {
                Ok(SeedUser {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                    password: hasher.hash(&u.password)?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let invoices = self
            .invoices
            .into_iter()
            .map(|i| SeedInvoice {
                id: i.id,
                customer_id: i.customer_id,
                amount: i.amount,
                status: i.status,
                date: i.date,
            })
            .collect();

        Ok(SeedData {
            users,
            customers: self.customers,
            invoices,
            revenue: self.revenue,
        })
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_migrate(settings: &Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database).await?;
    database::run_migrations(&db_pool).await?;
    database::close(&db_pool).await;
    println!("Migrations applied.");
    Ok(())
}

async fn handle_seed(args: SeedArgs, settings: &Settings) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)?;
    let file: SeedFile = serde_json::from_str(&raw)?;
    let data = file.into_seed_data(&Argon2Hasher)?;

    let db_pool = database::connect(&settings.database).await?;
    database::run_migrations(&db_pool).await?;
    let report = DbRepository::new(db_pool.clone()).seed(&data).await;
    database::close(&db_pool).await;
    let report = report?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Table", "Rows inserted"])
        .add_row(vec!["users".to_string(), report.users.to_string()])
        .add_row(vec!["customers".to_string(), report.customers.to_string()])
        .add_row(vec!["invoices".to_string(), report.invoices.to_string()])
        .add_row(vec!["revenue".to_string(), report.revenue.to_string()]);
    println!("{table}");
    Ok(())
}

async fn handle_summary(settings: &Settings) -> anyhow::Result<()> {
    let db_pool = database::connect(&settings.database).await?;
    let repo = DbRepository::new(db_pool.clone());
    let fetched = tokio::try_join!(repo.fetch_card_data(), repo.fetch_revenue());
    database::close(&db_pool).await;
    let (cards, revenue) = fetched?;

    let mut card_table = Table::new();
    card_table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Collected", "Pending", "Total Invoices", "Total Customers"])
        .add_row(vec![
            cards.total_paid_invoices,
            cards.total_pending_invoices,
            cards.number_of_invoices.to_string(),
            cards.number_of_customers.to_string(),
        ]);
    println!("{card_table}");

    let mut revenue_table = Table::new();
    revenue_table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Month", "Revenue"]);
    for month in revenue {
        revenue_table.add_row(vec![month.month, format_currency(i64::from(month.revenue) * 100)]);
    }
    println!("{revenue_table}");
    Ok(())
}
