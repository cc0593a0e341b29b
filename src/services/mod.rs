pub mod auth_service;
pub mod parking_service;

/// In-memory SQLite pool seeded with the migration schema, shared by the
/// service test modules. Capped at one connection: every `:memory:`
/// connection is its own database.
#[cfg(test)]
pub(crate) async fn test_pool() -> std::sync::Arc<sqlx::SqlitePool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");

    let sql = include_str!("../../migrations/0001_init.sql");
    for stmt in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(stmt).execute(&pool).await.expect("schema statement");
    }

    std::sync::Arc::new(pool)
}
