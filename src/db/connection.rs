use sqlx::{migrate::MigrateDatabase, Pool, Sqlite, SqlitePool};

pub async fn establish_connection(database_url: &str) -> Result<Pool<Sqlite>, sqlx::Error> {
    // Create database if it doesn't exist
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePool::connect(database_url).await?;

    // WAL keeps appends durable without blocking external readers
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;

    Ok(pool)
}
