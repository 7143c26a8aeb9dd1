use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::Database;
use crate::models::{Contact, Group, NewContact, NewGroup};

use super::{format_timestamp, parse_timestamp, parse_uuid};

/// Contact and group lookups used by the recipient resolver, plus the
/// creation operations the CRUD layer (and tests) seed through.
#[derive(Clone)]
pub struct ContactStore {
    db: Database,
}

impl ContactStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_contact(&self, new: NewContact) -> Result<Contact> {
        let contact = Contact {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            notes: new.notes,
            created_at: Utc::now(),
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO contacts (id, organization_id, name, phone, email, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                contact.id.to_string(),
                contact.organization_id,
                contact.name,
                contact.phone,
                contact.email,
                contact.notes,
                format_timestamp(contact.created_at),
            ],
        )
        .context("failed to insert contact")?;
        Ok(contact)
    }

    pub async fn get_contact(&self, contact_id: Uuid) -> Result<Option<Contact>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, name, phone, email, notes, created_at
             FROM contacts WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![contact_id.to_string()], contact_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub async fn create_group(&self, new: NewGroup) -> Result<Group> {
        let group = Group {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO groups (id, organization_id, name, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                group.id.to_string(),
                group.organization_id,
                group.name,
                group.description,
                format_timestamp(group.created_at),
            ],
        )
        .context("failed to insert group")?;
        Ok(group)
    }

    pub async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, name, description, created_at
             FROM groups WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![group_id.to_string()], group_from_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub async fn add_group_member(&self, group_id: Uuid, contact_id: Uuid) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT OR IGNORE INTO group_members (group_id, contact_id) VALUES (?1, ?2)",
            params![group_id.to_string(), contact_id.to_string()],
        )
        .context("failed to add group member")?;
        Ok(())
    }

    /// Membership is read at call time; a dispatch resolves whatever the
    /// group contains at this moment.
    pub async fn contacts_in_group(&self, group_id: Uuid) -> Result<Vec<Contact>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT c.id, c.organization_id, c.name, c.phone, c.email, c.notes, c.created_at
             FROM contacts c
             JOIN group_members m ON m.contact_id = c.id
             WHERE m.group_id = ?1
             ORDER BY c.created_at ASC",
        )?;
        let rows = stmt.query_map(params![group_id.to_string()], contact_from_row)?;

        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: parse_uuid(row.get(0)?, 0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        notes: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?, 6)?,
    })
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: parse_uuid(row.get(0)?, 0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        created_at: parse_timestamp(row.get(4)?, 4)?,
    })
}
