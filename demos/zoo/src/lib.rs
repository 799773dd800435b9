//! A small zoo: keepers and the animals they look after.

use resty::prelude::*;
use resty::resty_data_sqlx::SqlxResult;
use serde::Serialize;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Keeper {
    pub id: i64,
    pub name: String,
}

impl Entity for Keeper {
    fn table_name() -> &'static str {
        "keepers"
    }
    fn columns() -> &'static [&'static str] {
        &["id", "name"]
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Animal {
    pub id: i64,
    pub name: String,
    pub legs: i64,
    pub keeper_id: Option<i64>,
}

impl Entity for Animal {
    fn table_name() -> &'static str {
        "animals"
    }
    fn columns() -> &'static [&'static str] {
        &["id", "name", "legs", "keeper_id"]
    }
}

/// Rejects animals without a name and trims the ones that have one.
pub struct NameCheck;

impl SaveHook<Animal> for NameCheck {
    async fn before_save(
        &self,
        _ctx: &RequestContext,
        mut record: Record,
        _target: SaveTarget<'_, Animal>,
        _session: &mut Session,
    ) -> Result<Record, HttpError> {
        if let Some(name) = record.get("name").and_then(|v| v.as_str()) {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(HttpError::BadRequest("animal name must not be blank".into()));
            }
            record.insert("name", trimmed);
        }
        Ok(record)
    }
}

pub async fn migrate(store: &SqlxStore) -> SqlxResult<()> {
    for statement in [
        "CREATE TABLE IF NOT EXISTS keepers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            legs INTEGER NOT NULL DEFAULT 4,
            keeper_id INTEGER REFERENCES keepers(id)
        )",
    ] {
        sqlx::query(statement)
            .execute(store.pool())
            .await
            .map_err(|e| e.into_data_error())?;
    }
    Ok(())
}

/// Mount every zoo resource on one router.
pub fn app(store: SqlxStore) -> Result<Router, HttpError> {
    let keepers = ModelResource::<Keeper>::new(
        store.clone(),
        ResourceDescriptor::new("Keepers")
            .id_param("keeper_id")
            .serializer(JsonSerializer::new()),
    )?;
    let animals = ModelResource::with_hook(
        store.clone(),
        ResourceDescriptor::<Animal>::new("Animals")
            .id_param("animal_id")
            .serializer(JsonSerializer::new())
            .list_serializer(FieldSerializer::new(["id", "name"])),
        NameCheck,
    )?;
    let keeper_animals = ModelResource::<Animal>::new(
        store,
        ResourceDescriptor::new("KeeperAnimals")
            .id_param("animal_id")
            .allowed_methods([Method::GET])
            .serializer(JsonSerializer::new()),
    )?;

    Ok(Router::new()
        .merge(resource_router("/keepers", keepers))
        .merge(resource_router("/animals", animals))
        .merge(resource_router("/keepers/{keeper_id}/animals", keeper_animals)))
}
