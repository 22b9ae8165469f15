pub type DbPool = sqlx::SqlitePool;
pub type DbConnection = sqlx::SqliteConnection;
