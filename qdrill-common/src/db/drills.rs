//! Drill persistence
//!
//! Scalar fields live in `drills`; every list-valued field is stored as
//! ordered rows of `drill_list_values` keyed by field name.

use crate::models::{Drill, NewDrill, PeopleCount, Range, SuggestedLength};
use crate::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;
use tracing::{debug, info};

const SKILL_LEVEL: &str = "skill_level";
const SKILLS_FOCUSED_ON: &str = "skills_focused_on";
const POSITIONS_FOCUSED_ON: &str = "positions_focused_on";
const IMAGES: &str = "images";

const SELECT_DRILL: &str = r#"
    SELECT id, name, brief_description, detailed_description, complexity,
           suggested_length_text, suggested_length_min, suggested_length_max,
           people_exact, people_min, people_max, video_link, has_images
    FROM drills
"#;

/// List values of one drill, grouped by field name in stored order
type ListValues = HashMap<String, Vec<String>>;

/// Database repository for drills
#[derive(Clone)]
pub struct DrillRepository {
    pool: SqlitePool,
}

impl DrillRepository {
    /// Create new repository with database pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a validated drill and return it with its new id
    pub async fn insert(&self, drill: NewDrill) -> Result<Drill> {
        let mut tx = self.pool.begin().await?;

        let (length_text, length_range) = match &drill.suggested_length {
            SuggestedLength::Text(text) => (Some(text.as_str()), None),
            SuggestedLength::Range(range) => (None, Some(*range)),
        };
        let (people_exact, people_range) = match drill.number_of_people {
            Some(PeopleCount::Exact(count)) => (Some(count), None),
            Some(PeopleCount::Range(range)) => (None, Some(range)),
            None => (None, None),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO drills (
                name, brief_description, detailed_description, complexity,
                suggested_length_text, suggested_length_min, suggested_length_max,
                people_exact, people_min, people_max, video_link, has_images
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&drill.name)
        .bind(&drill.brief_description)
        .bind(&drill.detailed_description)
        .bind(&drill.complexity)
        .bind(length_text)
        .bind(length_range.map(|r| r.min))
        .bind(length_range.map(|r| r.max))
        .bind(people_exact)
        .bind(people_range.map(|r| r.min))
        .bind(people_range.map(|r| r.max))
        .bind(&drill.video_link)
        .bind(drill.images.is_some())
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        insert_list_values(&mut tx, id, SKILL_LEVEL, &drill.skill_level).await?;
        insert_list_values(&mut tx, id, SKILLS_FOCUSED_ON, &drill.skills_focused_on).await?;
        insert_list_values(&mut tx, id, POSITIONS_FOCUSED_ON, &drill.positions_focused_on).await?;
        if let Some(images) = &drill.images {
            insert_list_values(&mut tx, id, IMAGES, images).await?;
        }

        tx.commit().await?;

        info!("Saved drill {} ({})", id, drill.name);
        Ok(drill.with_id(id))
    }

    /// Load one drill; `Error::NotFound` when the id is unknown
    pub async fn get_by_id(&self, id: i64) -> Result<Drill> {
        let row = sqlx::query(&format!("{SELECT_DRILL} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Drill {} not found", id)))?;

        let rows = sqlx::query(
            "SELECT field, value FROM drill_list_values WHERE drill_id = ? ORDER BY field, position",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut lists = ListValues::new();
        for list_row in rows {
            lists
                .entry(list_row.get("field"))
                .or_default()
                .push(list_row.get("value"));
        }

        drill_from_row(&row, lists)
    }

    /// Every stored drill in ascending id order
    pub async fn list_all(&self) -> Result<Vec<Drill>> {
        let rows = sqlx::query(&format!("{SELECT_DRILL} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        let value_rows = sqlx::query(
            "SELECT drill_id, field, value FROM drill_list_values ORDER BY drill_id, field, position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut lists: HashMap<i64, ListValues> = HashMap::new();
        for value_row in value_rows {
            lists
                .entry(value_row.get("drill_id"))
                .or_default()
                .entry(value_row.get("field"))
                .or_default()
                .push(value_row.get("value"));
        }

        debug!("Loaded {} drills", rows.len());
        rows.iter()
            .map(|row| {
                let id: i64 = row.get("id");
                drill_from_row(row, lists.remove(&id).unwrap_or_default())
            })
            .collect()
    }
}

async fn insert_list_values(
    tx: &mut Transaction<'_, Sqlite>,
    drill_id: i64,
    field: &str,
    values: &[String],
) -> Result<()> {
    for (position, value) in values.iter().enumerate() {
        sqlx::query(
            "INSERT INTO drill_list_values (drill_id, field, position, value) VALUES (?, ?, ?, ?)",
        )
        .bind(drill_id)
        .bind(field)
        .bind(position as i64)
        .bind(value)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

fn drill_from_row(row: &SqliteRow, mut lists: ListValues) -> Result<Drill> {
    let id: i64 = row.try_get("id")?;

    let suggested_length = match (
        row.try_get::<Option<String>, _>("suggested_length_text")?,
        row.try_get::<Option<u32>, _>("suggested_length_min")?,
        row.try_get::<Option<u32>, _>("suggested_length_max")?,
    ) {
        (Some(text), _, _) => SuggestedLength::Text(text),
        (None, Some(min), Some(max)) => SuggestedLength::Range(Range { min, max }),
        _ => {
            return Err(Error::Internal(format!(
                "Drill {} has no stored suggested_length",
                id
            )))
        }
    };

    let number_of_people = match (
        row.try_get::<Option<u32>, _>("people_exact")?,
        row.try_get::<Option<u32>, _>("people_min")?,
        row.try_get::<Option<u32>, _>("people_max")?,
    ) {
        (Some(count), _, _) => Some(PeopleCount::Exact(count)),
        (None, Some(min), Some(max)) => Some(PeopleCount::Range(Range { min, max })),
        _ => None,
    };

    let has_images: bool = row.try_get("has_images")?;
    let images = lists.remove(IMAGES);

    let drill = NewDrill {
        name: row.try_get("name")?,
        brief_description: row.try_get("brief_description")?,
        detailed_description: row.try_get("detailed_description")?,
        skill_level: lists.remove(SKILL_LEVEL).unwrap_or_default(),
        complexity: row.try_get("complexity")?,
        suggested_length,
        number_of_people,
        skills_focused_on: lists.remove(SKILLS_FOCUSED_ON).unwrap_or_default(),
        positions_focused_on: lists.remove(POSITIONS_FOCUSED_ON).unwrap_or_default(),
        video_link: row.try_get("video_link")?,
        images: has_images.then(|| images.unwrap_or_default()),
    };

    Ok(drill.with_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_in_memory;

    fn sample_drill(name: &str) -> NewDrill {
        NewDrill {
            name: name.to_string(),
            brief_description: "Pass around a circle".to_string(),
            detailed_description: None,
            skill_level: vec!["Beginner".to_string(), "Intermediate".to_string()],
            complexity: Some("Low".to_string()),
            suggested_length: SuggestedLength::Text("10-15 minutes".to_string()),
            number_of_people: Some(PeopleCount::Range(Range { min: 5, max: 10 })),
            skills_focused_on: vec!["Passing".to_string(), "Catching".to_string()],
            positions_focused_on: vec!["Chaser".to_string()],
            video_link: Some("https://example.com/video".to_string()),
            images: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_drill() {
        let repo = DrillRepository::new(init_in_memory().await.unwrap());

        let stored = repo.insert(sample_drill("Five star")).await.unwrap();
        let loaded = repo.get_by_id(stored.id).await.unwrap();

        assert_eq!(loaded, stored);
        assert_eq!(loaded.details, sample_drill("Five star"));
    }

    #[tokio::test]
    async fn test_range_length_and_exact_people() {
        let repo = DrillRepository::new(init_in_memory().await.unwrap());
        let mut drill = sample_drill("Range");
        drill.suggested_length = SuggestedLength::Range(Range { min: 5, max: 10 });
        drill.number_of_people = Some(PeopleCount::Exact(7));

        let stored = repo.insert(drill.clone()).await.unwrap();
        let loaded = repo.get_by_id(stored.id).await.unwrap();

        assert_eq!(loaded.details, drill);
    }

    #[tokio::test]
    async fn test_empty_image_list_differs_from_absent() {
        let repo = DrillRepository::new(init_in_memory().await.unwrap());
        let mut drill = sample_drill("Images");
        drill.images = Some(vec![]);
        drill.number_of_people = None;

        let stored = repo.insert(drill).await.unwrap();
        let loaded = repo.get_by_id(stored.id).await.unwrap();

        assert_eq!(loaded.details.images, Some(vec![]));
        assert_eq!(loaded.details.number_of_people, None);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let repo = DrillRepository::new(init_in_memory().await.unwrap());

        let err = repo.get_by_id(99999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_all_in_id_order() {
        let repo = DrillRepository::new(init_in_memory().await.unwrap());
        let first = repo.insert(sample_drill("First")).await.unwrap();
        let second = repo.insert(sample_drill("Second")).await.unwrap();

        assert!(second.id > first.id);
        let all = repo.list_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }
}
