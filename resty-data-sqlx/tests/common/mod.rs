#![allow(dead_code)]

use std::time::Duration;

use resty_data::Entity;
use resty_data_sqlx::SqlxStore;
use serde::Serialize;
use sqlx::sqlite::SqlitePoolOptions;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Animal {
    pub id: i64,
    pub name: Option<String>,
    pub legs: i64,
}

impl Entity for Animal {
    fn table_name() -> &'static str {
        "animals"
    }
    fn columns() -> &'static [&'static str] {
        &["id", "name", "legs"]
    }
}

/// Keyed by a column that is not called `id`.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub yet_another_id: i64,
    pub label: String,
}

impl Entity for Tag {
    fn table_name() -> &'static str {
        "tags"
    }
    fn columns() -> &'static [&'static str] {
        &["yet_another_id", "label"]
    }
}

/// An in-memory store with a single connection: a session that is never
/// released makes the next one time out.
pub async fn store() -> SqlxStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(2))
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT UNIQUE,
            legs INTEGER NOT NULL DEFAULT 4
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE tags (
            yet_another_id INTEGER PRIMARY KEY,
            label TEXT NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    SqlxStore::new(pool)
}

pub async fn count(store: &SqlxStore, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(store.pool())
        .await
        .unwrap();
    row.0
}
