//! PostgreSQL user store
//!
//! Expects an existing `users` table:
//! `userid BIGSERIAL PRIMARY KEY, name TEXT, age BIGINT, location TEXT`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use stash_core::{NewUser, StoreError, User, UserStore};
use std::time::Duration;

pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Open a connection pool. Every query checks a connection out of the
    /// pool and returns it when the query finishes, on success or error.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self> {
        tracing::info!(
            "Connecting to PostgreSQL (max_connections={})...",
            max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        tracing::info!("PostgreSQL connection established");

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for Database {
    async fn insert(&self, user: &NewUser) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, location, age)
            VALUES ($1, $2, $3)
            RETURNING userid
            "#,
        )
        .bind(&user.name)
        .bind(&user.location)
        .bind(user.age)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        tracing::info!("Inserted user {}", id);
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT userid, name, age, location FROM users WHERE userid = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(|r| r.into()))
    }

    async fn get_all(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT userid, name, age, location FROM users ORDER BY userid
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

// Helper struct for sqlx query_as
#[derive(sqlx::FromRow)]
struct UserRow {
    userid: i64,
    name: String,
    age: i64,
    location: String,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.userid,
            name: r.name,
            age: r.age,
            location: r.location,
        }
    }
}

fn store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_) => StoreError::Decode(e.to_string()),
        _ => StoreError::Database(e.to_string()),
    }
}
