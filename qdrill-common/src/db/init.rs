//! Database initialization
//!
//! Opens (or creates) the SQLite file and creates every table idempotently.
//! Child tables cascade on delete from their owning drill or plan.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is pinned to one connection that never expires.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create every table (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_drills_table(pool).await?;
    create_drill_list_values_table(pool).await?;
    create_practice_plans_table(pool).await?;
    create_practice_plan_goals_table(pool).await?;
    create_practice_plan_sections_table(pool).await?;
    create_practice_plan_section_goals_table(pool).await?;
    create_practice_plan_items_table(pool).await?;
    create_practice_plan_item_timelines_table(pool).await?;

    Ok(())
}

async fn create_drills_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drills (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brief_description TEXT NOT NULL,
            detailed_description TEXT,
            complexity TEXT,
            suggested_length_text TEXT,
            suggested_length_min INTEGER,
            suggested_length_max INTEGER,
            people_exact INTEGER,
            people_min INTEGER,
            people_max INTEGER,
            video_link TEXT,
            has_images INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// List-valued drill fields (skill_level, skills_focused_on, ...), one row per entry
async fn create_drill_list_values_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS drill_list_values (
            drill_id INTEGER NOT NULL REFERENCES drills(id) ON DELETE CASCADE,
            field TEXT NOT NULL,
            position INTEGER NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (drill_id, field, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_practice_plans_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS practice_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            practice_goals_set INTEGER NOT NULL DEFAULT 0,
            phase_of_season TEXT,
            estimated_number_of_participants INTEGER,
            level_of_experience TEXT,
            description TEXT,
            start_time TEXT,
            visibility TEXT CHECK (visibility IN ('public', 'unlisted', 'private')),
            is_editable_by_others INTEGER,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_practice_plan_goals_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS practice_plan_goals (
            plan_id INTEGER NOT NULL REFERENCES practice_plans(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            goal TEXT NOT NULL,
            PRIMARY KEY (plan_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_practice_plan_sections_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS practice_plan_sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            plan_id INTEGER NOT NULL REFERENCES practice_plans(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            section_order INTEGER NOT NULL,
            notes TEXT,
            UNIQUE (plan_id, section_order)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_practice_plan_section_goals_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS practice_plan_section_goals (
            section_id INTEGER NOT NULL REFERENCES practice_plan_sections(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            goal TEXT NOT NULL,
            PRIMARY KEY (section_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// drill_id points at a stored drill; formation_id is an external reference
async fn create_practice_plan_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS practice_plan_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            section_id INTEGER NOT NULL REFERENCES practice_plan_sections(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            item_type TEXT NOT NULL CHECK (item_type IN ('drill', 'formation', 'break', 'activity')),
            name TEXT NOT NULL,
            duration INTEGER NOT NULL CHECK (duration >= 1),
            drill_id INTEGER REFERENCES drills(id),
            formation_id INTEGER,
            parallel_group_id TEXT,
            parallel_timeline TEXT,
            UNIQUE (section_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_practice_plan_item_timelines_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS practice_plan_item_timelines (
            item_id INTEGER NOT NULL REFERENCES practice_plan_items(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            timeline TEXT NOT NULL,
            PRIMARY KEY (item_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
