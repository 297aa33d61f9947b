//! Practice plan persistence
//!
//! A plan is written as one transaction across the plan, section, item and
//! goal tables, so a failed insert leaves nothing behind. Reads load each
//! table once for the whole set of requested plans and assemble the tree in
//! memory.

use crate::models::{
    Item, ItemKind, NewPracticePlan, ParallelTrack, PracticePlan, Section, Visibility,
};
use crate::validation::FieldErrors;
use crate::{Error, Result};
use chrono::NaiveTime;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::{debug, info};

const TIME_FORMAT: &str = "%H:%M:%S";

/// Suffix appended to the name of a duplicated plan
const COPY_SUFFIX: &str = " (Copy)";

/// Database repository for practice plans
#[derive(Clone)]
pub struct PracticePlanRepository {
    pool: SqlitePool,
}

impl PracticePlanRepository {
    /// Create new repository with database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a validated plan with all of its sections and items
    ///
    /// Every `drill` item must name a stored drill; unknown ids come back as
    /// `Error::Validation` at `sections[i].items[j].drill_id`.
    pub async fn insert(&self, plan: NewPracticePlan) -> Result<PracticePlan> {
        let mut tx = self.pool.begin().await?;
        let plan_id = insert_plan(&mut tx, &plan).await?;
        tx.commit().await?;

        info!(
            "Saved practice plan {} ({}) with {} sections",
            plan_id,
            plan.name,
            plan.sections.len()
        );
        Ok(plan.with_id(plan_id))
    }

    /// Copy a stored plan, sections and items included, as `"<name> (Copy)"`
    ///
    /// Read and write happen in one transaction.
    pub async fn duplicate(&self, id: i64) -> Result<PracticePlan> {
        let mut tx = self.pool.begin().await?;

        let original = load_plans(&mut *tx, Some(id))
            .await?
            .pop()
            .ok_or_else(|| not_found(id))?;
        let mut copy = original.details;
        copy.name.push_str(COPY_SUFFIX);

        let copy_id = insert_plan(&mut tx, &copy).await?;
        tx.commit().await?;

        info!("Duplicated practice plan {} as {} ({})", id, copy_id, copy.name);
        Ok(copy.with_id(copy_id))
    }

    /// Load one plan with its full section tree; `Error::NotFound` when unknown
    pub async fn get_by_id(&self, id: i64) -> Result<PracticePlan> {
        let mut conn = self.pool.acquire().await?;
        load_plans(&mut *conn, Some(id))
            .await?
            .pop()
            .ok_or_else(|| not_found(id))
    }

    /// Every stored plan in ascending id order
    pub async fn list_all(&self) -> Result<Vec<PracticePlan>> {
        let mut conn = self.pool.acquire().await?;
        let plans = load_plans(&mut *conn, None).await?;
        debug!("Loaded {} practice plans", plans.len());
        Ok(plans)
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Practice plan {} not found", id))
}

/// Write a plan and its children inside `tx`; returns the new plan id
async fn insert_plan(tx: &mut Transaction<'_, Sqlite>, plan: &NewPracticePlan) -> Result<i64> {
    check_drill_references(tx, plan).await?;

    let plan_id = sqlx::query(
        r#"
        INSERT INTO practice_plans (
            name, practice_goals_set, phase_of_season, estimated_number_of_participants,
            level_of_experience, description, start_time, visibility, is_editable_by_others
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&plan.name)
    .bind(plan.practice_goals.is_some())
    .bind(&plan.phase_of_season)
    .bind(plan.estimated_number_of_participants)
    .bind(&plan.level_of_experience)
    .bind(&plan.description)
    .bind(plan.start_time.map(|t| t.format(TIME_FORMAT).to_string()))
    .bind(plan.visibility.map(|v| v.as_str()))
    .bind(plan.is_editable_by_others)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    for (position, goal) in plan.practice_goals.iter().flatten().enumerate() {
        sqlx::query("INSERT INTO practice_plan_goals (plan_id, position, goal) VALUES (?, ?, ?)")
            .bind(plan_id)
            .bind(position as i64)
            .bind(goal)
            .execute(&mut **tx)
            .await?;
    }

    for section in &plan.sections {
        insert_section(tx, plan_id, section).await?;
    }

    Ok(plan_id)
}

/// Paths index sections in stored (sorted) order
async fn check_drill_references(
    tx: &mut Transaction<'_, Sqlite>,
    plan: &NewPracticePlan,
) -> Result<()> {
    let mut known: HashMap<i64, bool> = HashMap::new();
    let mut errors = FieldErrors::new();

    for (section_index, section) in plan.sections.iter().enumerate() {
        for (item_index, item) in section.items.iter().enumerate() {
            let Some(drill_id) = item.kind.drill_id() else {
                continue;
            };
            let exists = match known.get(&drill_id) {
                Some(exists) => *exists,
                None => {
                    let exists = sqlx::query("SELECT 1 FROM drills WHERE id = ?")
                        .bind(drill_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .is_some();
                    known.insert(drill_id, exists);
                    exists
                }
            };
            if !exists {
                errors.add(
                    format!("sections[{}].items[{}].drill_id", section_index, item_index),
                    format!("Drill {} does not exist.", drill_id),
                );
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

async fn insert_section(
    tx: &mut Transaction<'_, Sqlite>,
    plan_id: i64,
    section: &Section,
) -> Result<()> {
    let section_id = sqlx::query(
        "INSERT INTO practice_plan_sections (plan_id, name, section_order, notes) VALUES (?, ?, ?, ?)",
    )
    .bind(plan_id)
    .bind(&section.name)
    .bind(section.order)
    .bind(&section.notes)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    for (position, goal) in section.goals.iter().enumerate() {
        sqlx::query(
            "INSERT INTO practice_plan_section_goals (section_id, position, goal) VALUES (?, ?, ?)",
        )
        .bind(section_id)
        .bind(position as i64)
        .bind(goal)
        .execute(&mut **tx)
        .await?;
    }

    for (position, item) in section.items.iter().enumerate() {
        let item_id = sqlx::query(
            r#"
            INSERT INTO practice_plan_items (
                section_id, position, item_type, name, duration, drill_id, formation_id,
                parallel_group_id, parallel_timeline
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(section_id)
        .bind(position as i64)
        .bind(item.kind.type_name())
        .bind(&item.name)
        .bind(item.duration)
        .bind(item.kind.drill_id())
        .bind(item.kind.formation_id())
        .bind(item.parallel.as_ref().map(|p| p.parallel_group_id.as_str()))
        .bind(item.parallel.as_ref().map(|p| p.parallel_timeline.as_str()))
        .execute(&mut **tx)
        .await?
        .last_insert_rowid();

        let timelines = item.parallel.iter().flat_map(|p| p.group_timelines.iter());
        for (position, timeline) in timelines.enumerate() {
            sqlx::query(
                "INSERT INTO practice_plan_item_timelines (item_id, position, timeline) VALUES (?, ?, ?)",
            )
            .bind(item_id)
            .bind(position as i64)
            .bind(timeline)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}

/// Load one plan (`Some(id)`) or all plans (`None`), ordered by id
///
/// Each query binds the filter twice: `? IS NULL OR plan_id = ?`.
async fn load_plans(conn: &mut SqliteConnection, plan_id: Option<i64>) -> Result<Vec<PracticePlan>> {
    let plan_rows = sqlx::query(
        r#"
        SELECT id, name, practice_goals_set, phase_of_season, estimated_number_of_participants,
               level_of_experience, description, start_time, visibility, is_editable_by_others
        FROM practice_plans
        WHERE ? IS NULL OR id = ?
        ORDER BY id
        "#,
    )
    .bind(plan_id)
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?;
    if plan_rows.is_empty() {
        return Ok(Vec::new());
    }

    let goal_rows = sqlx::query(
        r#"
        SELECT plan_id, goal
        FROM practice_plan_goals
        WHERE ? IS NULL OR plan_id = ?
        ORDER BY plan_id, position
        "#,
    )
    .bind(plan_id)
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut plan_goals: HashMap<i64, Vec<String>> = HashMap::new();
    for row in goal_rows {
        plan_goals
            .entry(row.try_get("plan_id")?)
            .or_default()
            .push(row.try_get("goal")?);
    }

    let section_goal_rows = sqlx::query(
        r#"
        SELECT g.section_id, g.goal
        FROM practice_plan_section_goals g
        JOIN practice_plan_sections s ON s.id = g.section_id
        WHERE ? IS NULL OR s.plan_id = ?
        ORDER BY g.section_id, g.position
        "#,
    )
    .bind(plan_id)
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut section_goals: HashMap<i64, Vec<String>> = HashMap::new();
    for row in section_goal_rows {
        section_goals
            .entry(row.try_get("section_id")?)
            .or_default()
            .push(row.try_get("goal")?);
    }

    let timeline_rows = sqlx::query(
        r#"
        SELECT t.item_id, t.timeline
        FROM practice_plan_item_timelines t
        JOIN practice_plan_items i ON i.id = t.item_id
        JOIN practice_plan_sections s ON s.id = i.section_id
        WHERE ? IS NULL OR s.plan_id = ?
        ORDER BY t.item_id, t.position
        "#,
    )
    .bind(plan_id)
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut timelines: HashMap<i64, Vec<String>> = HashMap::new();
    for row in timeline_rows {
        timelines
            .entry(row.try_get("item_id")?)
            .or_default()
            .push(row.try_get("timeline")?);
    }

    let item_rows = sqlx::query(
        r#"
        SELECT i.id, i.section_id, i.item_type, i.name, i.duration, i.drill_id, i.formation_id,
               i.parallel_group_id, i.parallel_timeline
        FROM practice_plan_items i
        JOIN practice_plan_sections s ON s.id = i.section_id
        WHERE ? IS NULL OR s.plan_id = ?
        ORDER BY i.section_id, i.position
        "#,
    )
    .bind(plan_id)
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut items: HashMap<i64, Vec<Item>> = HashMap::new();
    for row in item_rows {
        let section_id: i64 = row.try_get("section_id")?;
        let item = item_from_row(&row, &mut timelines)?;
        items.entry(section_id).or_default().push(item);
    }

    let section_rows = sqlx::query(
        r#"
        SELECT id, plan_id, name, section_order, notes
        FROM practice_plan_sections
        WHERE ? IS NULL OR plan_id = ?
        ORDER BY plan_id, section_order
        "#,
    )
    .bind(plan_id)
    .bind(plan_id)
    .fetch_all(&mut *conn)
    .await?;
    let mut sections: HashMap<i64, Vec<Section>> = HashMap::new();
    for row in section_rows {
        let section_id: i64 = row.try_get("id")?;
        let owner: i64 = row.try_get("plan_id")?;
        sections.entry(owner).or_default().push(Section {
            name: row.try_get("name")?,
            order: row.try_get("section_order")?,
            notes: row.try_get("notes")?,
            goals: section_goals.remove(&section_id).unwrap_or_default(),
            items: items.remove(&section_id).unwrap_or_default(),
        });
    }

    plan_rows
        .iter()
        .map(|row| {
            let id: i64 = row.try_get("id")?;
            plan_from_row(
                row,
                plan_goals.remove(&id).unwrap_or_default(),
                sections.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}

fn plan_from_row(row: &SqliteRow, goals: Vec<String>, sections: Vec<Section>) -> Result<PracticePlan> {
    let id: i64 = row.try_get("id")?;
    let goals_set: bool = row.try_get("practice_goals_set")?;

    let start_time = row
        .try_get::<Option<String>, _>("start_time")?
        .map(|text| {
            NaiveTime::parse_from_str(&text, TIME_FORMAT).map_err(|e| {
                Error::Internal(format!("Plan {} has bad start_time '{}': {}", id, text, e))
            })
        })
        .transpose()?;

    let visibility = row
        .try_get::<Option<String>, _>("visibility")?
        .map(|text| {
            Visibility::parse(&text).ok_or_else(|| {
                Error::Internal(format!("Plan {} has bad visibility '{}'", id, text))
            })
        })
        .transpose()?;

    let plan = NewPracticePlan {
        name: row.try_get("name")?,
        practice_goals: goals_set.then_some(goals),
        phase_of_season: row.try_get("phase_of_season")?,
        estimated_number_of_participants: row.try_get("estimated_number_of_participants")?,
        level_of_experience: row.try_get("level_of_experience")?,
        description: row.try_get("description")?,
        start_time,
        visibility,
        is_editable_by_others: row.try_get("is_editable_by_others")?,
        sections,
    };

    Ok(plan.with_id(id))
}

fn item_from_row(row: &SqliteRow, timelines: &mut HashMap<i64, Vec<String>>) -> Result<Item> {
    let item_id: i64 = row.try_get("id")?;
    let item_type: String = row.try_get("item_type")?;
    let kind = ItemKind::from_parts(
        &item_type,
        row.try_get("drill_id")?,
        row.try_get("formation_id")?,
    )
    .ok_or_else(|| {
        Error::Internal(format!(
            "Item {} has type '{}' without its reference id",
            item_id, item_type
        ))
    })?;

    let group_id: Option<String> = row.try_get("parallel_group_id")?;
    let timeline: Option<String> = row.try_get("parallel_timeline")?;
    let parallel = match (group_id, timeline) {
        (Some(parallel_group_id), Some(parallel_timeline)) => Some(ParallelTrack {
            parallel_group_id,
            parallel_timeline,
            group_timelines: timelines.remove(&item_id).unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(Item {
        name: row.try_get("name")?,
        duration: row.try_get("duration")?,
        kind,
        parallel,
    })
}
