//! Database seeder for Rentledger development and testing.
//!
//! Seeds a demo building (chart of accounts, two items, a tenant, a vendor)
//! and prints a bearer token for local requests.
//!
//! Usage: cargo run --bin seeder [building_id]

use anyhow::Context;
use rentledger_db::entities::accounts;
use rentledger_db::seed::seed_demo_building;
use rentledger_shared::AppConfig;
use rentledger_shared::jwt::{JwtConfig, JwtService};
use rentledger_shared::types::{BuildingId, UserId};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

/// Building seeded when none is given.
const DEFAULT_BUILDING_ID: i64 = 1;
/// User the printed token is issued for.
const DEV_USER_ID: i64 = 1;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let building_id = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<BuildingId>()
            .with_context(|| format!("Invalid building ID {arg:?}"))?,
        None => BuildingId::new(DEFAULT_BUILDING_ID),
    };

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = rentledger_db::connect(&config)
        .await
        .context("Failed to connect to database")?;

    let existing = accounts::Entity::find()
        .filter(accounts::Column::BuildingId.eq(building_id.get()))
        .count(&db)
        .await?;
    if existing > 0 {
        println!("  Building {building_id} already has {existing} accounts, skipping...");
    } else {
        println!("Seeding building {building_id}...");
        let demo = seed_demo_building(&db, building_id)
            .await
            .context("Failed to seed demo building")?;
        println!("  Bank account:        {}", demo.bank);
        println!("  Receivable account:  {}", demo.receivable);
        println!("  Deposits account:    {}", demo.deposits);
        println!("  Payable account:     {}", demo.payable);
        println!("  Equity account:      {}", demo.equity);
        println!("  Rental income:       {}", demo.rent_income);
        println!("  Repairs expense:     {}", demo.repairs);
        println!("  Rent item:           {}", demo.rent_item);
        println!("  Discount item:       {}", demo.discount_item);
        println!("  Tenant:              {}", demo.customer);
        println!("  Vendor:              {}", demo.vendor);
    }

    let jwt = JwtService::new(JwtConfig::with_secret(config.jwt_secret));
    let token = jwt
        .generate_token(UserId::new(DEV_USER_ID))
        .context("Failed to issue development token")?;
    println!("Development token (user {DEV_USER_ID}):");
    println!("  {token}");

    println!("Seeding complete!");
    Ok(())
}
