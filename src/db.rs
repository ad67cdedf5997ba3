use anyhow::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, Schema, SqlxPostgresConnector, Statement,
};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tokio::fs;

use crate::entity::{
    CartItems, Categories, Favorites, OrderItems, Orders, Products, Reviews, Users,
};

pub type DbPool = sqlx::PgPool;
pub type OrmConn = DatabaseConnection;

/// Create the sqlx connection pool used for migrations and seeding.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Wrap an existing sqlx pool into a SeaORM connection. All request-path
/// queries go through this connection.
pub fn orm_from_pool(pool: DbPool) -> OrmConn {
    SqlxPostgresConnector::from_sqlx_postgres_pool(pool)
}

/// Create a SeaORM connection straight from a URL (migrate binary, tests).
pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Minimal migration runner that executes SQL files in `migrations/` in filename order.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    let mut entries = fs::read_dir("migrations").await?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        let sql = fs::read_to_string(&file).await?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let statement = format!("{stmt};");
            conn.execute(Statement::from_string(backend, statement))
                .await?;
        }
    }

    Ok(())
}

/// Create every table from the entity definitions. The integration tests
/// run against in-memory SQLite, where the SQL migrations do not apply.
pub async fn setup_schema(conn: &OrmConn) -> Result<()> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);

    conn.execute(backend.build(&schema.create_table_from_entity(Users)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(Categories)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(Products)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(CartItems)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(Orders)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(OrderItems)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(Reviews)))
        .await?;
    conn.execute(backend.build(&schema.create_table_from_entity(Favorites)))
        .await?;

    Ok(())
}
