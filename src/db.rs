use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tokio::sync::{Mutex, MutexGuard};

/// Shared handle to the embedded store. All writers are append-only inserts
/// keyed by freshly generated ids, so serializing access through one
/// connection is sufficient.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("failed to open database at {}", path.as_ref().display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        apply_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}

fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT NOT NULL,
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS groups (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS group_members (
            group_id TEXT NOT NULL,
            contact_id TEXT NOT NULL,
            PRIMARY KEY (group_id, contact_id)
        );

        CREATE TABLE IF NOT EXISTS outreach_instances (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS delivery_attempts (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            channel TEXT NOT NULL,
            contact_id TEXT NOT NULL,
            body TEXT NOT NULL,
            direction TEXT NOT NULL,
            provider_message_id TEXT,
            successful INTEGER NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contact_logs (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            channel TEXT NOT NULL,
            contact_id TEXT NOT NULL,
            instance_id TEXT NOT NULL,
            initiator_email TEXT NOT NULL,
            successful INTEGER NOT NULL,
            associated_group_id TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS broadcast_logs (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            channel TEXT NOT NULL,
            group_id TEXT NOT NULL,
            instance_id TEXT NOT NULL,
            initiator_email TEXT NOT NULL,
            created_at TEXT NOT NULL
        );",
    )
    .context("failed to apply database schema")?;
    Ok(())
}
