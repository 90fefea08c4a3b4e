//! Persistence of the excursion tree.

use std::sync::Arc;

use itertools::Itertools;
use rusqlite::{params, Connection, Transaction};
use url::Url;

use super::db::{get_connection, DbPool};
use crate::content::{
    Engagement, Excursion, ExcursionId, FileRef, InfoContent, InformationPart, PartId, Point, PointId,
};
use crate::core::error::AppResult;

/// Save/load interface the editor commits through. One call per commit; a
/// point or part edit saves its whole owning excursion.
pub trait ExcursionStore: Send + Sync {
    fn save(&self, excursion: &Excursion) -> AppResult<()>;

    fn delete(&self, id: ExcursionId) -> AppResult<()>;

    fn load_all(&self) -> AppResult<Vec<Excursion>>;
}

/// SQLite-backed store. Media lists are kept as JSON arrays of keys.
#[derive(Clone)]
pub struct SqliteExcursionStore {
    pool: Arc<DbPool>,
}

impl SqliteExcursionStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

fn encode_files(files: &[FileRef]) -> AppResult<String> {
    Ok(serde_json::to_string(files)?)
}

fn decode_files(raw: &str) -> AppResult<Vec<FileRef>> {
    Ok(serde_json::from_str(raw)?)
}

fn decode_url(raw: Option<String>) -> AppResult<Option<Url>> {
    Ok(raw.map(|raw| Url::parse(&raw)).transpose()?)
}

fn insert_part(tx: &Transaction<'_>, position: usize, part: &InformationPart) -> AppResult<()> {
    tx.execute(
        "INSERT INTO information_parts
            (id, point_id, position, name, link, text, audio, photos, views, likes, dislikes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            part.id.0,
            part.point_id.0,
            position as i64,
            part.content.name,
            part.content.link.as_ref().map(Url::as_str),
            part.content.text,
            encode_files(&part.content.audio)?,
            encode_files(&part.content.photos)?,
            part.stats.views as i64,
            part.stats.likes as i64,
            part.stats.dislikes as i64,
        ],
    )?;
    Ok(())
}

fn insert_point(tx: &Transaction<'_>, position: usize, point: &Point) -> AppResult<()> {
    tx.execute(
        "INSERT INTO points
            (id, excursion_id, position, name, link, text, audio, photos, address,
             location_photo, location_link, views, likes, dislikes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            point.id.0,
            point.excursion_id.0,
            position as i64,
            point.content.name,
            point.content.link.as_ref().map(Url::as_str),
            point.content.text,
            encode_files(&point.content.audio)?,
            encode_files(&point.content.photos)?,
            point.address,
            point.location_photo.as_ref().map(FileRef::as_str),
            point.location_link.as_ref().map(Url::as_str),
            point.stats.views as i64,
            point.stats.likes as i64,
            point.stats.dislikes as i64,
        ],
    )?;
    for (position, part) in point.extra_parts.iter().enumerate() {
        insert_part(tx, position, part)?;
    }
    Ok(())
}

struct ContentRow {
    name: String,
    link: Option<String>,
    text: String,
    audio: String,
    photos: String,
}

impl ContentRow {
    fn decode(self) -> AppResult<InfoContent> {
        Ok(InfoContent {
            name: self.name,
            link: decode_url(self.link)?,
            text: self.text,
            audio: decode_files(&self.audio)?,
            photos: decode_files(&self.photos)?,
        })
    }
}

fn engagement(views: i64, likes: i64, dislikes: i64) -> Engagement {
    Engagement {
        views: views.max(0) as u64,
        likes: likes.max(0) as u64,
        dislikes: dislikes.max(0) as u64,
    }
}

fn load_parts(conn: &Connection) -> AppResult<Vec<InformationPart>> {
    let mut stmt = conn.prepare(
        "SELECT id, point_id, name, link, text, audio, photos, views, likes, dislikes
         FROM information_parts ORDER BY point_id, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            PartId(row.get(0)?),
            PointId(row.get(1)?),
            ContentRow {
                name: row.get(2)?,
                link: row.get(3)?,
                text: row.get(4)?,
                audio: row.get(5)?,
                photos: row.get(6)?,
            },
            engagement(row.get(7)?, row.get(8)?, row.get(9)?),
        ))
    })?;

    let mut parts = Vec::new();
    for row in rows {
        let (id, point_id, content, stats) = row?;
        parts.push(InformationPart {
            id,
            point_id,
            content: content.decode()?,
            stats,
        });
    }
    Ok(parts)
}

fn load_points(conn: &Connection) -> AppResult<Vec<Point>> {
    let mut stmt = conn.prepare(
        "SELECT id, excursion_id, name, link, text, audio, photos, address,
                location_photo, location_link, views, likes, dislikes
         FROM points ORDER BY excursion_id, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            PointId(row.get(0)?),
            ExcursionId(row.get(1)?),
            ContentRow {
                name: row.get(2)?,
                link: row.get(3)?,
                text: row.get(4)?,
                audio: row.get(5)?,
                photos: row.get(6)?,
            },
            row.get::<_, String>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, Option<String>>(9)?,
            engagement(row.get(10)?, row.get(11)?, row.get(12)?),
        ))
    })?;

    let mut parts_by_point = load_parts(conn)?.into_iter().into_group_map_by(|part| part.point_id);
    let mut points = Vec::new();
    for row in rows {
        let (id, excursion_id, content, address, location_photo, location_link, stats) = row?;
        points.push(Point {
            id,
            excursion_id,
            content: content.decode()?,
            address,
            location_photo: location_photo.map(FileRef::new),
            location_link: decode_url(location_link)?,
            extra_parts: parts_by_point.remove(&id).unwrap_or_default(),
            stats,
        });
    }
    Ok(points)
}

impl ExcursionStore for SqliteExcursionStore {
    fn save(&self, excursion: &Excursion) -> AppResult<()> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO excursions
                (id, name, is_paid, is_draft, duration_minutes, views, likes, dislikes, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                is_paid = excluded.is_paid,
                is_draft = excluded.is_draft,
                duration_minutes = excluded.duration_minutes,
                views = excluded.views,
                likes = excluded.likes,
                dislikes = excluded.dislikes,
                updated_at = excluded.updated_at",
            params![
                excursion.id.0,
                excursion.name,
                excursion.is_paid,
                excursion.is_draft,
                excursion.duration_minutes,
                excursion.stats.views as i64,
                excursion.stats.likes as i64,
                excursion.stats.dislikes as i64,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        // Children are rewritten wholesale so order and removals follow the tree.
        tx.execute(
            "DELETE FROM information_parts WHERE point_id IN (SELECT id FROM points WHERE excursion_id = ?1)",
            params![excursion.id.0],
        )?;
        tx.execute("DELETE FROM points WHERE excursion_id = ?1", params![excursion.id.0])?;
        for (position, point) in excursion.points.iter().enumerate() {
            insert_point(&tx, position, point)?;
        }

        tx.commit()?;
        log::debug!("Saved excursion {} with {} points", excursion.id, excursion.points.len());
        Ok(())
    }

    fn delete(&self, id: ExcursionId) -> AppResult<()> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM information_parts WHERE point_id IN (SELECT id FROM points WHERE excursion_id = ?1)",
            params![id.0],
        )?;
        tx.execute("DELETE FROM points WHERE excursion_id = ?1", params![id.0])?;
        tx.execute("DELETE FROM excursions WHERE id = ?1", params![id.0])?;
        tx.commit()?;
        Ok(())
    }

    fn load_all(&self) -> AppResult<Vec<Excursion>> {
        let conn = get_connection(&self.pool)?;
        let mut points_by_excursion = load_points(&conn)?
            .into_iter()
            .into_group_map_by(|point| point.excursion_id);

        let mut stmt = conn.prepare(
            "SELECT id, name, is_paid, is_draft, duration_minutes, views, likes, dislikes
             FROM excursions ORDER BY id",
        )?;
        let excursions = stmt
            .query_map([], |row| {
                let id = ExcursionId(row.get(0)?);
                Ok(Excursion {
                    id,
                    name: row.get(1)?,
                    is_paid: row.get(2)?,
                    is_draft: row.get(3)?,
                    duration_minutes: row.get(4)?,
                    points: Vec::new(),
                    stats: engagement(row.get(5)?, row.get(6)?, row.get(7)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(excursions
            .into_iter()
            .map(|mut excursion| {
                excursion.points = points_by_excursion.remove(&excursion.id).unwrap_or_default();
                excursion
            })
            .collect())
    }
}
