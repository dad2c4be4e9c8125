use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};

use crate::documents::{CourseDocument, InstitutionDocument};
use crate::util::{is_path_segment, write_json_pretty};

pub trait DocumentStore {
    fn save_course(&mut self, document: &CourseDocument) -> Result<()>;
    fn save_institution(&mut self, document: &InstitutionDocument) -> Result<()>;
}

#[derive(Debug)]
pub struct JsonDirectoryStore {
    root: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn course_path(&self, document: &CourseDocument) -> Result<PathBuf> {
        let file_name = format!("{}-{}.json", document.course_id, document.course_mode);
        Ok(self
            .root
            .join("courses")
            .join(path_segment(&document.institution_id)?)
            .join(path_segment(&file_name)?))
    }

    pub fn institution_path(&self, document: &InstitutionDocument) -> Result<PathBuf> {
        let file_name = format!("{}.json", document.institution_id);
        Ok(self.root.join("institutions").join(path_segment(&file_name)?))
    }
}

fn path_segment(value: &str) -> Result<&str> {
    if !is_path_segment(value) {
        bail!("refusing to write document with unsafe path component {value:?}");
    }
    Ok(value)
}

impl DocumentStore for JsonDirectoryStore {
    fn save_course(&mut self, document: &CourseDocument) -> Result<()> {
        write_json_pretty(&self.course_path(document)?, document)
    }

    fn save_institution(&mut self, document: &InstitutionDocument) -> Result<()> {
        write_json_pretty(&self.institution_path(document)?, document)
    }
}

#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let connection =
            Connection::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

impl DocumentStore for SqliteStore {
    fn save_course(&mut self, document: &CourseDocument) -> Result<()> {
        let body = serde_json::to_string(document).context("failed to serialize course document")?;
        self.connection
            .execute(
                "INSERT INTO courses (id, institution_id, course_id, course_mode, version, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                   version = excluded.version,
                   created_at = excluded.created_at,
                   body = excluded.body",
                params![
                    document.id,
                    document.institution_id,
                    document.course_id,
                    document.course_mode,
                    document.version,
                    document.created_at,
                    body,
                ],
            )
            .with_context(|| format!("failed to save course {}", document.course_id))?;
        Ok(())
    }

    fn save_institution(&mut self, document: &InstitutionDocument) -> Result<()> {
        let body =
            serde_json::to_string(document).context("failed to serialize institution document")?;
        self.connection
            .execute(
                "INSERT INTO institutions (id, institution_id, version, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                   version = excluded.version,
                   created_at = excluded.created_at,
                   body = excluded.body",
                params![
                    document.id,
                    document.institution_id,
                    document.version,
                    document.created_at,
                    body,
                ],
            )
            .with_context(|| format!("failed to save institution {}", document.institution_id))?;
        Ok(())
    }
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS courses (
              id TEXT PRIMARY KEY,
              institution_id TEXT NOT NULL,
              course_id TEXT NOT NULL,
              course_mode TEXT NOT NULL,
              version INTEGER NOT NULL,
              created_at TEXT NOT NULL,
              body TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_courses_institution ON courses(institution_id);

            CREATE TABLE IF NOT EXISTS institutions (
              id TEXT PRIMARY KEY,
              institution_id TEXT NOT NULL,
              version INTEGER NOT NULL,
              created_at TEXT NOT NULL,
              body TEXT NOT NULL
            );
            ",
        )
        .context("failed to create document schema")
}

pub fn count_rows(connection: &Connection, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {table}");
    connection
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("failed to count {table}"))
}
