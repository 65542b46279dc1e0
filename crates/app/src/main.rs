use chrono::TimeDelta;
use migration::{Migrator, MigratorTrait};
use server::TokenKeys;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let config = settings.server;
    let db = parse_database(&config.database).await?;

    let mut builder = engine::Engine::builder().database(db);
    if let Some(cost) = config.password_cost {
        builder = builder.password_cost(cost);
    }
    let engine = builder.build().await?;

    let ttl = TimeDelta::try_hours(config.token_ttl_hours)
        .ok_or("server.token_ttl_hours is out of range")?;
    let keys = TokenKeys::new(config.jwt_secret.as_bytes(), ttl);

    let bind = config.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(engine, keys, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(&url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready at {url}");
    Ok(database)
}
