use sea_orm::Database;
use sea_orm_migration::prelude::*;

use migration::Migrator;

const USAGE: &str = "usage: migration [up [N] | down [N] | fresh | refresh | reset | status]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("up");
    let steps = match args.get(1) {
        Some(raw) => Some(raw.parse::<u32>().map_err(|_| USAGE)?),
        None => None,
    };

    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:./tally.db?mode=rwc".to_string());
    let db = Database::connect(&url).await?;

    match command {
        "up" => Migrator::up(&db, steps).await?,
        // Without a count, only the latest migration is rolled back.
        "down" => Migrator::down(&db, Some(steps.unwrap_or(1))).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "refresh" => Migrator::refresh(&db).await?,
        "reset" => Migrator::reset(&db).await?,
        "status" => Migrator::status(&db).await?,
        _ => return Err(USAGE.into()),
    }

    Ok(())
}
