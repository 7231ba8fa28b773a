//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteExecutor;

/// Find all active dining tables
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT id, name, capacity, pair_group, is_active FROM dining_table WHERE is_active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

/// Load the full catalog (active and inactive) for matching.
///
/// The engine needs inactive rows too: a pair group whose partner row is
/// merely deactivated is unusable, while a missing partner row is a catalog
/// inconsistency. Generic over the executor so the coordinator can read the
/// catalog inside its booking transaction.
pub async fn find_catalog<'e>(db: impl SqliteExecutor<'e>) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT id, name, capacity, pair_group, is_active FROM dining_table ORDER BY id",
    )
    .fetch_all(db)
    .await?;
    Ok(tables)
}

/// Find table by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, name, capacity, pair_group, is_active FROM dining_table WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, name, capacity, pair_group, is_active FROM dining_table WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

/// Count rows (active or not) carrying a pair group id
async fn count_pair_members(pool: &SqlitePool, pair_group: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM dining_table WHERE pair_group = ?")
            .bind(pair_group)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Create a new dining table
pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table '{}' already exists",
            data.name
        )));
    }

    // A pair group holds at most two tables
    if let Some(group) = data.pair_group
        && count_pair_members(pool, group).await? >= 2
    {
        return Err(RepoError::Validation(format!(
            "Pair group {group} already has two members"
        )));
    }

    let capacity = data.capacity.unwrap_or(4);
    if capacity <= 0 {
        return Err(RepoError::Validation(format!(
            "Capacity must be positive: {capacity}"
        )));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO dining_table (name, capacity, pair_group, is_active) VALUES (?, ?, ?, 1) RETURNING id",
    )
    .bind(&data.name)
    .bind(capacity)
    .bind(data.pair_group)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}

/// Update a dining table
pub async fn update(pool: &SqlitePool, id: i64, data: DiningTableUpdate) -> RepoResult<DiningTable> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dining table {id} not found")))?;

    if let Some(name) = &data.name
        && name != &existing.name
        && find_by_name(pool, name).await?.is_some()
    {
        return Err(RepoError::Duplicate(format!("Table '{name}' already exists")));
    }

    let pair_group = match data.pair_group {
        Some(new_group) => {
            if let Some(group) = new_group
                && existing.pair_group != Some(group)
                && count_pair_members(pool, group).await? >= 2
            {
                return Err(RepoError::Validation(format!(
                    "Pair group {group} already has two members"
                )));
            }
            new_group
        }
        None => existing.pair_group,
    };

    let name = data.name.unwrap_or(existing.name);
    let capacity = data.capacity.unwrap_or(existing.capacity);
    let is_active = data.is_active.unwrap_or(existing.is_active);

    if capacity <= 0 {
        return Err(RepoError::Validation(format!(
            "Capacity must be positive: {capacity}"
        )));
    }

    sqlx::query(
        "UPDATE dining_table SET name = ?, capacity = ?, pair_group = ?, is_active = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(capacity)
    .bind(pair_group)
    .bind(is_active)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Dining table {id} not found")))
}

/// Soft delete a dining table (takes it out of matching)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE dining_table SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
